//! Product configuration trait for CLI binaries
//!
//! Each binary built on this library implements [`ProductConfig`] once and
//! passes it by reference through the whole run. Nothing in the core reads
//! process-wide state on its own; forge endpoints, bundled configuration and
//! keyword policy all come from here.

use crate::substitute::TokenStyle;
use std::path::Path;

/// Configuration trait for scaffolding CLI products
///
/// Each product defines:
/// - Product identity (name, display name, user agent)
/// - Forge endpoints used for validation, download and generated URLs
/// - Bundled static configuration
/// - Manifest rewriting policy (file name, generated keywords, token style)
/// - Post-setup instructions
pub trait ProductConfig: Clone + Send + Sync + 'static {
    /// Internal product name (used for CLI command, env vars)
    fn name(&self) -> &'static str;

    /// Human-readable display name
    fn display_name(&self) -> &'static str;

    /// Host of the code forge, used to build author and repository URLs
    fn forge_host(&self) -> &'static str {
        "github.com"
    }

    /// Base URL of the forge REST API
    fn forge_api_url(&self) -> &'static str {
        "https://api.github.com"
    }

    /// Environment variable name for overriding the forge API URL
    fn forge_api_url_env(&self) -> &'static str;

    /// Environment variable naming a directory with `templates.yaml` and `placeholders.yaml`
    fn config_dir_env(&self) -> &'static str;

    /// Template list compiled into the binary
    fn bundled_templates(&self) -> &'static str;

    /// Placeholder definitions compiled into the binary
    fn bundled_placeholders(&self) -> &'static str;

    /// File name of the package manifest that gets structured rewriting
    fn manifest_file(&self) -> &'static str {
        "package.json"
    }

    /// Ecosystem tags merged into the manifest `keywords` list
    fn ecosystem_keywords(&self) -> &'static [&'static str];

    /// Fixed tags appended after the project name in the `keywords` list
    fn category_keywords(&self) -> &'static [&'static str] {
        &[]
    }

    /// How placeholders appear inside template files
    fn token_style(&self) -> TokenStyle {
        TokenStyle::Delimited
    }

    /// Generate the "next steps" instructions after project creation
    fn next_steps(&self, dir: &Path) -> Vec<String>;

    /// User agent string for HTTP requests
    fn user_agent(&self) -> &'static str {
        self.name()
    }
}
