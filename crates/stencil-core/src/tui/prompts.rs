//! Charm-style CLI prompts using cliclack

use crate::config::{PlaceholderDefinition, Settings, Template};
use crate::error::ScaffoldError;
use crate::interact::{Prompter, Reporter};
use crate::pipeline::{Pipeline, RunOptions, RunOutcome, RunState};
use crate::product::ProductConfig;
use crate::substitute::OccurrenceStats;
use crate::templates::TemplateFetcher;
use anyhow::{Context, Result};
use std::io;
use std::path::{Path, PathBuf};

/// CLI arguments for a generation run
#[derive(Debug, Clone, Default)]
pub struct CreateArgs {
    /// Template name or `owner/name` identifier
    pub template: Option<String>,

    /// Generate into the current directory instead of a new project directory
    pub in_place: bool,

    /// Directory holding `templates.yaml` and `placeholders.yaml`
    pub config_dir: Option<PathBuf>,

    /// Local directory of `owner/name` template folders instead of the forge (for development use)
    pub template_dir: Option<PathBuf>,

    /// Auto-confirm all prompts (non-interactive mode)
    pub yes: bool,
}

/// Treat Esc / Ctrl-C inside a prompt as a cancellation
fn cancellable<T>(result: io::Result<T>) -> Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(e) if e.kind() == io::ErrorKind::Interrupted => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Terminal output failures are not worth aborting a run over
fn emit(result: io::Result<()>) {
    if let Err(e) = result {
        tracing::warn!(error = %e, "failed to write to terminal");
    }
}

/// Asks questions with cliclack prompts
#[derive(Debug, Default)]
pub struct ClackPrompter;

impl Prompter for ClackPrompter {
    fn select_template(&mut self, templates: &[Template]) -> Result<Option<usize>> {
        let mut select = cliclack::select("Select a template");
        for (idx, template) in templates.iter().enumerate() {
            select = select.item(idx, &template.name, &template.description);
        }
        cancellable(select.interact())
    }

    fn ask(
        &mut self,
        placeholder: &PlaceholderDefinition,
        default: &str,
    ) -> Result<Option<String>> {
        let mut input = cliclack::input(&placeholder.prompt);
        if !default.is_empty() {
            input = input.placeholder(default).default_input(default);
        }
        let mut input = input.required(placeholder.required && default.is_empty());
        cancellable(input.interact::<String>())
    }

    fn confirm_overwrite(&mut self, dir: &Path, entries: usize) -> Result<bool> {
        cliclack::log::warning(format!(
            "{} already has {} existing items",
            dir.display(),
            entries
        ))?;
        let confirmed = cliclack::confirm("Overwrite it?")
            .initial_value(false)
            .interact();
        Ok(cancellable(confirmed)?.unwrap_or(false))
    }
}

/// Reports progress through cliclack's log lines
#[derive(Debug, Default)]
pub struct ClackReporter;

impl Reporter for ClackReporter {
    fn step(&mut self, message: &str) {
        emit(cliclack::log::step(message));
    }

    fn warn(&mut self, message: &str) {
        emit(cliclack::log::warning(message));
    }

    fn scan_summary(&mut self, stats: &OccurrenceStats) {
        if stats.total() == 0 {
            emit(cliclack::log::info(format!(
                "Scanned {} files, no placeholders found",
                stats.files_scanned
            )));
            return;
        }

        let lines: Vec<String> = stats
            .iter()
            .filter(|s| s.count > 0)
            .map(|s| format!("{} -> {:?} ({}x)", s.key, s.replacement, s.count))
            .collect();
        emit(cliclack::note(
            format!("Placeholders in {} files", stats.files_scanned),
            lines.join("\n"),
        ));
    }
}

fn setup_fetcher<C: ProductConfig>(
    config: &C,
    template_dir: &Option<PathBuf>,
) -> Result<TemplateFetcher, ScaffoldError> {
    match template_dir {
        Some(path) => {
            emit(cliclack::log::info(format!(
                "Using local templates from {}",
                path.display()
            )));
            Ok(TemplateFetcher::from_local(path.clone(), config.user_agent()))
        }
        None => TemplateFetcher::from_config(config)
            .map_err(|e| ScaffoldError::Config(format!("{:#}", e))),
    }
}

/// Run the CLI with interactive prompts and present the outcome
pub async fn run<C: ProductConfig>(
    config: &C,
    args: CreateArgs,
    cli_version: &str,
) -> Result<RunOutcome> {
    cliclack::intro(format!("{} v{}", config.display_name(), cli_version))?;

    let cwd = std::env::current_dir().context("Failed to determine the current directory")?;

    let prepared = Settings::load(config, args.config_dir.as_deref()).and_then(|settings| {
        let fetcher = setup_fetcher(config, &args.template_dir)?;
        Ok((settings, fetcher))
    });

    let outcome = match prepared {
        Ok((settings, fetcher)) => {
            let options = RunOptions {
                template: args.template,
                in_place: args.in_place,
                assume_yes: args.yes,
                cwd: cwd.clone(),
            };
            let mut prompter = ClackPrompter;
            let mut reporter = ClackReporter;
            Pipeline::new(
                config,
                &settings,
                options,
                cli_version,
                &mut prompter,
                &mut reporter,
                &fetcher,
            )
            .run()
            .await
        }
        Err(e) => RunOutcome::failed(e),
    };

    present(config, &outcome, &cwd)?;
    Ok(outcome)
}

/// One line naming the failed stage and the reason
fn failure_message(error: &ScaffoldError) -> String {
    format!("{} failed: {}", error.stage(), error)
}

fn present<C: ProductConfig>(config: &C, outcome: &RunOutcome, cwd: &Path) -> Result<()> {
    match (outcome.state, &outcome.report, &outcome.error) {
        (RunState::Done, Some(report), _) => {
            if report.nothing_to_replace() {
                cliclack::log::info("No placeholders found, nothing to replace")?;
            } else {
                cliclack::log::success(format!(
                    "Updated {} of {} files",
                    report.modified_files, report.files_downloaded
                ))?;
            }

            let dir = report.target_dir.strip_prefix(cwd).unwrap_or(&report.target_dir);
            let steps = if dir.as_os_str().is_empty() {
                config.next_steps(Path::new("."))
            } else {
                config.next_steps(dir)
            };

            println!();
            println!("  Next steps");
            println!();
            for (i, step) in steps.iter().enumerate() {
                println!("  {}.  {}", i + 1, step);
            }

            cliclack::outro(format!("Created {}", report.template.name))?;
        }
        (RunState::Failed, _, Some(error)) => {
            cliclack::log::error(failure_message(error))?;
            cliclack::outro_cancel("Project was not created")?;
        }
        _ => {
            cliclack::outro_cancel("Cancelled")?;
        }
    }
    Ok(())
}
