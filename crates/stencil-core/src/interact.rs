//! Collaborators at the edge of a run: asking the user and telling the user
//!
//! The pipeline never prints. Everything user-facing goes through a
//! [`Reporter`], every question through a [`Prompter`].

use crate::config::{PlaceholderDefinition, Template};
use crate::substitute::OccurrenceStats;
use anyhow::Result;
use std::path::Path;

/// Asks the user questions
///
/// `Ok(None)` is a cancellation. `Ok(Some(String::new()))` is a valid empty
/// answer. `Err` is reserved for a broken terminal.
pub trait Prompter {
    /// Pick one of `templates`, returning its index
    fn select_template(&mut self, templates: &[Template]) -> Result<Option<usize>>;

    /// Ask for one placeholder value; `default` already has earlier answers expanded
    fn ask(&mut self, placeholder: &PlaceholderDefinition, default: &str) -> Result<Option<String>>;

    /// Confirm writing into a directory that already has `entries` items
    fn confirm_overwrite(&mut self, dir: &Path, entries: usize) -> Result<bool>;
}

/// Receives progress, warnings and the scan summary
pub trait Reporter {
    fn step(&mut self, message: &str);
    fn warn(&mut self, message: &str);
    fn scan_summary(&mut self, stats: &OccurrenceStats);
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::collections::VecDeque;

    /// Answers questions from a script; running out of answers cancels
    #[derive(Debug, Default)]
    pub struct ScriptedPrompter {
        pub template: Option<usize>,
        pub answers: VecDeque<Option<String>>,
        pub overwrite: bool,
        pub asked: Vec<(String, String)>,
        pub overwrite_prompts: usize,
    }

    impl ScriptedPrompter {
        pub fn answering(answers: &[Option<&str>]) -> Self {
            Self {
                template: Some(0),
                answers: answers.iter().map(|a| a.map(String::from)).collect(),
                overwrite: true,
                ..Default::default()
            }
        }
    }

    impl Prompter for ScriptedPrompter {
        fn select_template(&mut self, _templates: &[Template]) -> Result<Option<usize>> {
            Ok(self.template)
        }

        fn ask(
            &mut self,
            placeholder: &PlaceholderDefinition,
            default: &str,
        ) -> Result<Option<String>> {
            self.asked.push((placeholder.key.clone(), default.to_string()));
            Ok(self.answers.pop_front().flatten())
        }

        fn confirm_overwrite(&mut self, _dir: &Path, _entries: usize) -> Result<bool> {
            self.overwrite_prompts += 1;
            Ok(self.overwrite)
        }
    }

    /// Keeps everything it is told
    #[derive(Debug, Default)]
    pub struct RecordingReporter {
        pub steps: Vec<String>,
        pub warnings: Vec<String>,
        pub summaries: Vec<OccurrenceStats>,
    }

    impl Reporter for RecordingReporter {
        fn step(&mut self, message: &str) {
            self.steps.push(message.to_string());
        }

        fn warn(&mut self, message: &str) {
            self.warnings.push(message.to_string());
        }

        fn scan_summary(&mut self, stats: &OccurrenceStats) {
            self.summaries.push(stats.clone());
        }
    }
}
