//! Stencil Core - template-driven project generator
//!
//! This library turns a template repository on a code forge into a new project:
//! it checks the repository exists, asks for placeholder values, downloads the
//! snapshot, reports how often each placeholder occurs, and rewrites the files.
//! A binary supplies its identity and bundled configuration through
//! [`ProductConfig`].
//!
//! # Architecture
//!
//! - **Core operations** - template fetching (`templates`), token matching and
//!   file rewriting (`substitute`), configuration loading (`config`)
//! - **Orchestration** - [`Pipeline`] drives a run through its states and returns
//!   a [`RunOutcome`]; user interaction goes through the [`Prompter`] and
//!   [`Reporter`] traits
//! - **CLI interface** - optional cliclack-based prompts (feature-gated)
//!
//! # Feature Flags
//!
//! - `tui` (default): Enables the cliclack-based prompts module
//!
//! # Example Usage (without TUI)
//!
//! ```ignore
//! use stencil_core::{Pipeline, RunOptions, Settings, TemplateFetcher};
//!
//! let settings = Settings::load(&MyConfig, None)?;
//! let fetcher = TemplateFetcher::from_config(&MyConfig)?;
//! let outcome = Pipeline::new(&MyConfig, &settings, options, "1.0.0",
//!     &mut my_prompter, &mut my_reporter, &fetcher)
//!     .run()
//!     .await;
//! ```

pub mod config;
pub mod error;
pub mod interact;
pub mod pipeline;
pub mod product;
pub mod substitute;
pub mod templates;

#[cfg(feature = "tui")]
pub mod tui;

// Re-export main types for convenience
pub use config::{ConfigSource, PlaceholderDefinition, Settings, Template};
pub use error::{FetchError, FileError, ScaffoldError};
pub use interact::{Prompter, Reporter};
pub use pipeline::{GenerationReport, Pipeline, RunOptions, RunOutcome, RunState, UserInputs};
pub use product::ProductConfig;
pub use substitute::{OccurrenceStats, TokenStyle};
pub use templates::{RemoteFetcher, RepoId, TemplateFetcher, TemplateSource};

#[cfg(feature = "tui")]
pub use tui::run;
