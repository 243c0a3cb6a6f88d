//! stencil CLI - generate projects from template repositories

use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use stencil_core::tui::CreateArgs;
use stencil_core::{ProductConfig, RunState};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// CLI version
pub const CLI_VERSION: &str = env!("CARGO_PKG_VERSION");

/// stencil product configuration
#[derive(Clone)]
pub struct StencilConfig;

impl ProductConfig for StencilConfig {
    fn name(&self) -> &'static str {
        "stencil"
    }

    fn display_name(&self) -> &'static str {
        "stencil"
    }

    fn forge_api_url_env(&self) -> &'static str {
        "STENCIL_API_URL"
    }

    fn config_dir_env(&self) -> &'static str {
        "STENCIL_CONFIG_DIR"
    }

    fn bundled_templates(&self) -> &'static str {
        include_str!("../config/templates.yaml")
    }

    fn bundled_placeholders(&self) -> &'static str {
        include_str!("../config/placeholders.yaml")
    }

    fn ecosystem_keywords(&self) -> &'static [&'static str] {
        &["typescript", "javascript"]
    }

    fn category_keywords(&self) -> &'static [&'static str] {
        &["utility"]
    }

    fn next_steps(&self, dir: &Path) -> Vec<String> {
        let mut steps = Vec::new();

        if dir != Path::new(".") {
            steps.push(format!("cd {}", dir.display()));
        }
        steps.push("npm install".to_string());
        steps.push("Open README.md to get started".to_string());

        steps
    }
}

#[derive(Parser, Debug)]
#[command(name = "stencil")]
#[command(about = "CLI for generating projects from template repositories")]
#[command(version)]
pub struct Args {
    /// Template name from the catalogue, or any `owner/name` repository
    pub template: Option<String>,

    /// Generate into the current directory instead of a new project directory
    #[arg(short = 'c', long = "current-dir")]
    pub current_dir: bool,

    /// Directory with templates.yaml and placeholders.yaml overriding the bundled ones
    #[arg(long = "config-dir")]
    pub config_dir: Option<PathBuf>,

    /// Local directory of templates to use instead of the forge (for development use)
    #[arg(long = "template-dir")]
    pub template_dir: Option<PathBuf>,

    /// Auto-confirm all prompts (non-interactive mode)
    #[arg(short, long)]
    pub yes: bool,
}

impl From<Args> for CreateArgs {
    fn from(args: Args) -> Self {
        CreateArgs {
            template: args.template,
            in_place: args.current_dir,
            config_dir: args.config_dir,
            template_dir: args.template_dir,
            yes: args.yes,
        }
    }
}

/// Diagnostics go to stderr, filtered by `STENCIL_LOG` (default `warn`)
fn init_tracing() {
    let filter = EnvFilter::try_from_env("STENCIL_LOG")
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run(args: Args) -> Result<RunState> {
    let config = StencilConfig;
    let outcome = stencil_core::run(&config, args.into(), CLI_VERSION).await?;
    tracing::debug!(history = ?outcome.history, "run finished");
    Ok(outcome.state)
}

/// 0 when the project was created or the user backed out, 1 when the run failed
fn exit_code(state: RunState) -> u8 {
    match state {
        RunState::Failed => 1,
        _ => 0,
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    // Ensure terminal cursor is restored on panic
    let default_panic = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = console::Term::stderr().show_cursor();
        default_panic(info);
    }));

    // Handle Ctrl+C gracefully
    ctrlc::set_handler(move || {
        let _ = console::Term::stderr().show_cursor();
        std::process::exit(130);
    })
    .ok();

    init_tracing();
    let args = Args::parse();

    let result = run(args).await;

    // Ensure cursor is visible on normal exit
    let _ = console::Term::stderr().show_cursor();

    match result {
        Ok(state) => ExitCode::from(exit_code(state)),
        Err(e) => {
            eprintln!("{} {:#}", "error:".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_args_map_to_create_args() {
        let args =
            Args::parse_from(["stencil", "library", "-c", "--yes", "--config-dir", "conf"]);
        let create: CreateArgs = args.into();
        assert_eq!(create.template.as_deref(), Some("library"));
        assert!(create.in_place);
        assert!(create.yes);
        assert_eq!(create.config_dir, Some(PathBuf::from("conf")));
        assert!(create.template_dir.is_none());
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(exit_code(RunState::Done), 0);
        assert_eq!(exit_code(RunState::Cancelled), 0);
        assert_eq!(exit_code(RunState::Failed), 1);
    }

    #[test]
    fn test_bundled_configuration_loads() {
        let settings = stencil_core::Settings::load(&StencilConfig, None).unwrap();
        assert!(settings.find_template("library").is_some());
        assert_eq!(settings.placeholders[0].key, "PROJECT_NAME");
    }

    #[test]
    fn test_next_steps_skip_cd_in_place() {
        let steps = StencilConfig.next_steps(Path::new("."));
        assert!(!steps.iter().any(|s| s.starts_with("cd ")));
        let steps = StencilConfig.next_steps(Path::new("my-app"));
        assert_eq!(steps[0], "cd my-app");
    }
}
