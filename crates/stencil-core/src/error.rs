//! Error taxonomy for a scaffolding run
//!
//! Only [`ScaffoldError`] aborts a run. [`FileError`] is always recovered
//! locally by the substitution passes and surfaces as a warning.

use std::path::PathBuf;
use thiserror::Error;

/// Fatal failure of a run; [`ScaffoldError::stage`] names the stage that failed
#[derive(Debug, Error)]
pub enum ScaffoldError {
    #[error("{0}")]
    Config(String),

    #[error("template repository '{repo}' was not found on {forge}")]
    RepositoryNotFound { repo: String, forge: String },

    #[error("could not verify template repository '{repo}': {reason}")]
    Validation { repo: String, reason: String },

    #[error("could not prepare {}: {reason}", path.display())]
    Target { path: PathBuf, reason: String },

    #[error("failed to download template '{repo}': {reason}")]
    Download { repo: String, reason: String },

    #[error("prompt failed: {0}")]
    Prompt(String),
}

impl ScaffoldError {
    /// Short name of the stage that failed, for user-facing output
    pub fn stage(&self) -> &'static str {
        match self {
            ScaffoldError::Config(_) => "configuration",
            ScaffoldError::RepositoryNotFound { .. } | ScaffoldError::Validation { .. } => {
                "validation"
            }
            ScaffoldError::Target { .. } => "target directory",
            ScaffoldError::Download { .. } => "download",
            ScaffoldError::Prompt(_) => "input",
        }
    }
}

/// Errors reported by a [`crate::templates::RemoteFetcher`]
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("repository not found")]
    NotFound,

    #[error("{0}")]
    Other(String),
}

impl From<anyhow::Error> for FetchError {
    fn from(err: anyhow::Error) -> Self {
        FetchError::Other(format!("{:#}", err))
    }
}

/// Problem with a single file during scanning or rewriting
#[derive(Debug, Error)]
pub enum FileError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("{} is not valid UTF-8 text, skipped", path.display())]
    NotText { path: PathBuf },

    #[error(
        "could not parse {} as JSON, only plain substitution applied: {source}",
        path.display()
    )]
    Manifest {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}
