//! Run orchestration
//!
//! A run moves through [`RunState`] in order:
//!
//! `Idle → TemplateSelected → Validated → InputsCollected → TargetResolved →
//! Downloaded → Scanned → Rewritten → Done`
//!
//! with `Cancelled` when the user backs out and `Failed` on configuration,
//! validation, target or download errors. Per-file problems never fail a run.
//! The pipeline returns a [`RunOutcome`]; printing and exit codes are the
//! caller's business.

pub mod inputs;

pub use inputs::{collect_inputs, keys, UserInputs};

use crate::config::{Settings, Template};
use crate::error::{FetchError, ScaffoldError};
use crate::interact::{Prompter, Reporter};
use crate::product::ProductConfig;
use crate::substitute::{
    list_files, LocalFiles, ManifestPolicy, OccurrenceStats, Substituter,
};
use crate::templates::{check_compatibility, RemoteFetcher, RepoId};
use heck::ToKebabCase;
use std::path::{Path, PathBuf};

/// Where a run is, or where it ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    TemplateSelected,
    Validated,
    InputsCollected,
    TargetResolved,
    Downloaded,
    Scanned,
    Rewritten,
    Done,
    Cancelled,
    Failed,
}

/// Choices made on the command line
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Template name or `owner/name`; asked for when absent
    pub template: Option<String>,

    /// Generate into `cwd` instead of a new directory named after the project
    pub in_place: bool,

    /// Skip the confirmation for a non-empty target
    pub assume_yes: bool,

    pub cwd: PathBuf,
}

/// What a successful run produced
#[derive(Debug, Clone)]
pub struct GenerationReport {
    pub template: Template,
    pub target_dir: PathBuf,
    pub files_downloaded: usize,
    pub stats: OccurrenceStats,
    pub modified_files: usize,
}

impl GenerationReport {
    /// True when the scan found no placeholder tokens at all
    pub fn nothing_to_replace(&self) -> bool {
        self.stats.total() == 0
    }
}

/// Final state of a run
#[derive(Debug)]
pub struct RunOutcome {
    pub state: RunState,
    pub error: Option<ScaffoldError>,
    pub report: Option<GenerationReport>,
    /// Every state the run passed through, starting with `Idle`
    pub history: Vec<RunState>,
}

impl RunOutcome {
    /// A run that failed before the pipeline could start (e.g. unreadable configuration)
    pub fn failed(error: ScaffoldError) -> Self {
        Self {
            state: RunState::Failed,
            error: Some(error),
            report: None,
            history: vec![RunState::Idle, RunState::Failed],
        }
    }
}

/// One scaffolding run with its collaborators
pub struct Pipeline<'a, C, P, R, F> {
    config: &'a C,
    settings: &'a Settings,
    options: RunOptions,
    cli_version: &'a str,
    prompter: &'a mut P,
    reporter: &'a mut R,
    fetcher: &'a F,
    history: Vec<RunState>,
}

impl<'a, C, P, R, F> Pipeline<'a, C, P, R, F>
where
    C: ProductConfig,
    P: Prompter,
    R: Reporter,
    F: RemoteFetcher,
{
    pub fn new(
        config: &'a C,
        settings: &'a Settings,
        options: RunOptions,
        cli_version: &'a str,
        prompter: &'a mut P,
        reporter: &'a mut R,
        fetcher: &'a F,
    ) -> Self {
        Self {
            config,
            settings,
            options,
            cli_version,
            prompter,
            reporter,
            fetcher,
            history: vec![RunState::Idle],
        }
    }

    fn advance(&mut self, state: RunState) {
        tracing::debug!(?state, "run state");
        self.history.push(state);
    }

    /// Drive the run to `Done`, `Cancelled` or `Failed`
    pub async fn run(mut self) -> RunOutcome {
        let (state, error, report) = match self.execute().await {
            Ok(Some(report)) => (RunState::Done, None, Some(report)),
            Ok(None) => (RunState::Cancelled, None, None),
            Err(e) => {
                tracing::debug!(stage = e.stage(), error = %e, "run failed");
                (RunState::Failed, Some(e), None)
            }
        };
        self.advance(state);

        RunOutcome {
            state,
            error,
            report,
            history: self.history,
        }
    }

    async fn execute(&mut self) -> Result<Option<GenerationReport>, ScaffoldError> {
        let Some(template) = self.select_template()? else {
            return Ok(None);
        };
        self.advance(RunState::TemplateSelected);

        if let Some(warning) = check_compatibility(self.cli_version, &template) {
            self.reporter.warn(&warning);
        }

        let repo: RepoId = template.repo.parse().map_err(ScaffoldError::Config)?;
        self.validate(&repo).await?;
        self.advance(RunState::Validated);

        let style = self.config.token_style();
        let inputs = collect_inputs(&self.settings.placeholders, &mut *self.prompter, style)
            .map_err(|e| ScaffoldError::Prompt(format!("{:#}", e)))?;
        let Some(inputs) = inputs else {
            return Ok(None);
        };
        self.advance(RunState::InputsCollected);

        let Some(target_dir) = self.resolve_target(&inputs).await? else {
            return Ok(None);
        };
        self.advance(RunState::TargetResolved);

        self.reporter
            .step(&format!("Downloading {} into {}", repo, target_dir.display()));
        let files_downloaded = self
            .fetcher
            .materialize(&repo, &target_dir)
            .await
            .map_err(|e| ScaffoldError::Download {
                repo: repo.to_string(),
                reason: e.to_string(),
            })?;
        self.advance(RunState::Downloaded);

        let files = list_files(&target_dir).map_err(|e| ScaffoldError::Target {
            path: target_dir.clone(),
            reason: format!("{:#}", e),
        })?;
        let substituter = Substituter::new(
            &target_dir,
            &inputs,
            style,
            ManifestPolicy::from_config(self.config),
            self.config.manifest_file(),
            LocalFiles,
        );

        let stats = substituter.scan(&files, &mut *self.reporter);
        self.reporter.scan_summary(&stats);
        self.advance(RunState::Scanned);

        let modified_files = substituter.rewrite(&files, &mut *self.reporter);
        self.advance(RunState::Rewritten);

        Ok(Some(GenerationReport {
            template,
            target_dir,
            files_downloaded,
            stats,
            modified_files,
        }))
    }

    fn select_template(&mut self) -> Result<Option<Template>, ScaffoldError> {
        let settings = self.settings;
        let templates = &settings.templates;

        if let Some(id) = &self.options.template {
            return match settings.find_template(id) {
                Some(template) => Ok(Some(template.clone())),
                // Any owner/name not in the catalogue is used as-is
                None if id.contains('/') => Ok(Some(Template {
                    name: id.clone(),
                    description: String::new(),
                    repo: id.clone(),
                    min_version: None,
                })),
                None => {
                    let available: Vec<&str> = templates.iter().map(|t| t.name.as_str()).collect();
                    Err(ScaffoldError::Config(format!(
                        "template '{}' not found. Available templates: {}",
                        id,
                        available.join(", ")
                    )))
                }
            };
        }

        if templates.len() == 1 {
            return Ok(templates.first().cloned());
        }

        let selected = self
            .prompter
            .select_template(templates)
            .map_err(|e| ScaffoldError::Prompt(format!("{:#}", e)))?;
        Ok(selected.and_then(|idx| templates.get(idx).cloned()))
    }

    async fn validate(&mut self, repo: &RepoId) -> Result<(), ScaffoldError> {
        self.reporter.step(&format!("Checking {} on {}", repo, self.config.forge_host()));
        self.fetcher.exists(repo).await.map_err(|e| match e {
            FetchError::NotFound => ScaffoldError::RepositoryNotFound {
                repo: repo.to_string(),
                forge: self.config.forge_host().to_string(),
            },
            FetchError::Other(reason) => ScaffoldError::Validation {
                repo: repo.to_string(),
                reason,
            },
        })
    }

    /// Pick the output directory and clear the way for it
    ///
    /// `Ok(None)` when the user declines to overwrite a non-empty directory.
    async fn resolve_target(
        &mut self,
        inputs: &UserInputs,
    ) -> Result<Option<PathBuf>, ScaffoldError> {
        let target = if self.options.in_place {
            self.options.cwd.clone()
        } else {
            let slug = inputs
                .get_nonempty(keys::PROJECT_NAME)
                .map(|name| name.to_kebab_case())
                .filter(|slug| !slug.is_empty())
                .ok_or_else(|| {
                    ScaffoldError::Config(format!(
                        "a {} value is needed to name the project directory",
                        keys::PROJECT_NAME
                    ))
                })?;
            self.options.cwd.join(slug)
        };

        let entries = existing_entries(&target)?;
        if entries == 0 {
            return Ok(Some(target));
        }

        if !self.options.assume_yes {
            let confirmed = self
                .prompter
                .confirm_overwrite(&target, entries)
                .map_err(|e| ScaffoldError::Prompt(format!("{:#}", e)))?;
            if !confirmed {
                return Ok(None);
            }
        }

        // Generating in place merges into the directory; a project directory is replaced
        if !self.options.in_place {
            tokio::fs::remove_dir_all(&target)
                .await
                .map_err(|e| ScaffoldError::Target {
                    path: target.clone(),
                    reason: e.to_string(),
                })?;
        }

        Ok(Some(target))
    }
}

/// Number of entries in `dir`; 0 when it does not exist
fn existing_entries(dir: &Path) -> Result<usize, ScaffoldError> {
    if !dir.exists() {
        return Ok(0);
    }
    if !dir.is_dir() {
        return Err(ScaffoldError::Target {
            path: dir.to_path_buf(),
            reason: "a file with that name already exists".to_string(),
        });
    }
    std::fs::read_dir(dir)
        .map(|entries| entries.count())
        .map_err(|e| ScaffoldError::Target {
            path: dir.to_path_buf(),
            reason: e.to_string(),
        })
}
