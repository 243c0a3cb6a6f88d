//! Placeholder substitution over a materialized template
//!
//! Two full sequential passes over the same file list:
//! - [`Substituter::scan`] reads every text file and counts tokens. Nothing is written.
//! - [`Substituter::rewrite`] applies the manifest rewrite, then plain
//!   substitution, and writes a file only when its content changed.
//!
//! A problem with one file is reported as a warning and never stops the pass.

pub mod binary;
pub mod files;
pub mod manifest;
pub mod matcher;
pub mod text;
pub mod walker;

pub use binary::is_binary;
pub use files::{FileAccess, LocalFiles};
pub use manifest::{rewrite_manifest, rewrite_manifest_str, ManifestPolicy};
pub use matcher::{count_occurrences, Substitution, Substitutions, TokenStyle};
pub use text::rewrite_text;
pub use walker::list_files;

use crate::error::FileError;
use crate::interact::Reporter;
use crate::pipeline::UserInputs;
use std::path::{Path, PathBuf};

/// Occurrences of one placeholder before any rewriting
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaceholderStat {
    pub key: String,
    pub count: usize,
    pub replacement: String,
}

/// Result of the read-only scan, in input order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OccurrenceStats {
    entries: Vec<PlaceholderStat>,
    pub files_scanned: usize,
}

impl OccurrenceStats {
    fn new(substitutions: &Substitutions) -> Self {
        Self {
            entries: substitutions
                .iter()
                .map(|s| PlaceholderStat {
                    key: s.key.clone(),
                    count: 0,
                    replacement: s.replacement.clone(),
                })
                .collect(),
            files_scanned: 0,
        }
    }

    pub fn get(&self, key: &str) -> Option<&PlaceholderStat> {
        self.entries.iter().find(|e| e.key == key)
    }

    pub fn iter(&self) -> impl Iterator<Item = &PlaceholderStat> {
        self.entries.iter()
    }

    /// Total occurrences across all keys
    pub fn total(&self) -> usize {
        self.entries.iter().map(|e| e.count).sum()
    }
}

/// Everything needed to substitute placeholders in one project directory
pub struct Substituter<'a, F: FileAccess> {
    root: &'a Path,
    inputs: &'a UserInputs,
    substitutions: Substitutions,
    policy: ManifestPolicy,
    manifest_path: PathBuf,
    files: F,
}

impl<'a, F: FileAccess> Substituter<'a, F> {
    pub fn new(
        root: &'a Path,
        inputs: &'a UserInputs,
        style: TokenStyle,
        policy: ManifestPolicy,
        manifest_file: &str,
        files: F,
    ) -> Self {
        Self {
            root,
            inputs,
            substitutions: Substitutions::from_inputs(inputs, style),
            policy,
            manifest_path: root.join(manifest_file),
            files,
        }
    }

    /// Access to the file layer, mainly for inspection in tests
    pub fn files(&self) -> &F {
        &self.files
    }

    /// Path relative to the project root, for messages
    fn display<'p>(&self, path: &'p Path) -> std::path::Display<'p> {
        path.strip_prefix(self.root).unwrap_or(path).display()
    }

    fn read_text(&self, path: &Path) -> Result<String, FileError> {
        let bytes = self.files.read(path).map_err(|source| FileError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        String::from_utf8(bytes).map_err(|_| FileError::NotText {
            path: path.to_path_buf(),
        })
    }

    /// Count tokens in every text file without modifying anything
    pub fn scan<R: Reporter>(&self, paths: &[PathBuf], reporter: &mut R) -> OccurrenceStats {
        let mut stats = OccurrenceStats::new(&self.substitutions);

        for path in paths.iter().filter(|p| !is_binary(p)) {
            let content = match self.read_text(path) {
                Ok(content) => content,
                Err(e) => {
                    tracing::debug!(path = %self.display(path), "scan skipped file");
                    reporter.warn(&e.to_string());
                    continue;
                }
            };

            stats.files_scanned += 1;
            for (stat, substitution) in stats.entries.iter_mut().zip(self.substitutions.iter()) {
                stat.count += substitution.count(&content);
            }
        }

        stats
    }

    /// Rewrite every text file, returning how many were modified on disk
    pub fn rewrite<R: Reporter>(&self, paths: &[PathBuf], reporter: &mut R) -> usize {
        let mut modified = 0;

        for path in paths.iter().filter(|p| !is_binary(p)) {
            match self.rewrite_file(path, reporter) {
                Ok(true) => {
                    tracing::debug!(path = %self.display(path), "rewrote file");
                    modified += 1;
                }
                Ok(false) => {}
                Err(e) => reporter.warn(&e.to_string()),
            }
        }

        modified
    }

    fn rewrite_file<R: Reporter>(&self, path: &Path, reporter: &mut R) -> Result<bool, FileError> {
        let original = self.read_text(path)?;
        let mut content = original.clone();

        if path == self.manifest_path {
            match rewrite_manifest_str(&original, self.inputs, &self.policy) {
                Ok(Some(updated)) => content = updated,
                Ok(None) => {}
                Err(source) => reporter.warn(
                    &FileError::Manifest {
                        path: path.to_path_buf(),
                        source,
                    }
                    .to_string(),
                ),
            }
        }

        if let Some(updated) = rewrite_text(&content, &self.substitutions) {
            content = updated;
        }

        if content == original {
            return Ok(false);
        }

        self.files
            .write(path, content.as_bytes())
            .map_err(|source| FileError::Write {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(true)
    }
}
