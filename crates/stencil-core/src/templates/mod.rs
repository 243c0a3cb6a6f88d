//! Template repositories: identifiers, fetching and version compatibility

pub mod fetcher;
pub mod repo;
pub mod version;

pub use fetcher::{RemoteFetcher, TemplateFetcher, TemplateSource};
pub use repo::RepoId;
pub use version::check_compatibility;
