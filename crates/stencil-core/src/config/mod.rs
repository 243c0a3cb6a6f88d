//! Static configuration: the template catalogue and placeholder definitions
//!
//! Both documents are YAML. They are loaded once before any prompting and are
//! read-only for the rest of the run.

use crate::error::ScaffoldError;
use crate::product::ProductConfig;
use crate::templates::RepoId;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

pub const TEMPLATES_FILE: &str = "templates.yaml";
pub const PLACEHOLDERS_FILE: &str = "placeholders.yaml";

/// A remote template repository the user can generate from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Template {
    /// Short name used on the command line
    pub name: String,

    /// Description shown in the template picker
    pub description: String,

    /// Forge identifier, `owner/name`
    pub repo: String,

    /// Oldest CLI version the template is known to work with
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_version: Option<String>,
}

/// One substitutable variable and how to ask for it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaceholderDefinition {
    pub key: String,
    pub prompt: String,

    /// May reference keys collected earlier using the deployment's token form
    #[serde(default)]
    pub default: String,

    #[serde(default)]
    pub required: bool,
}

/// Where the static configuration came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    Bundled,
    Directory(PathBuf),
}

/// Loaded static configuration
#[derive(Debug, Clone)]
pub struct Settings {
    pub templates: Vec<Template>,
    pub placeholders: Vec<PlaceholderDefinition>,
    pub source: ConfigSource,
}

impl Settings {
    /// Load configuration from `dir`, the product's env override, or the bundled documents
    pub fn load<C: ProductConfig>(config: &C, dir: Option<&Path>) -> Result<Self, ScaffoldError> {
        let dir = dir
            .map(Path::to_path_buf)
            .or_else(|| std::env::var_os(config.config_dir_env()).map(PathBuf::from));

        let settings = match dir {
            Some(dir) => Self::from_dir(&dir),
            None => Self::from_documents(
                config.bundled_templates(),
                config.bundled_placeholders(),
                ConfigSource::Bundled,
            ),
        };

        settings.map_err(|e| ScaffoldError::Config(format!("{:#}", e)))
    }

    /// Load both documents from a directory; either file missing is an error
    pub fn from_dir(dir: &Path) -> Result<Self> {
        let templates_path = dir.join(TEMPLATES_FILE);
        let placeholders_path = dir.join(PLACEHOLDERS_FILE);

        let templates = std::fs::read_to_string(&templates_path)
            .with_context(|| format!("Failed to read {}", templates_path.display()))?;
        let placeholders = std::fs::read_to_string(&placeholders_path)
            .with_context(|| format!("Failed to read {}", placeholders_path.display()))?;

        Self::from_documents(
            &templates,
            &placeholders,
            ConfigSource::Directory(dir.to_path_buf()),
        )
    }

    /// Parse and validate the two YAML documents
    pub fn from_documents(
        templates: &str,
        placeholders: &str,
        source: ConfigSource,
    ) -> Result<Self> {
        let templates: Vec<Template> = serde_yaml::from_str(templates)
            .with_context(|| format!("Failed to parse {}", TEMPLATES_FILE))?;
        let placeholders: Vec<PlaceholderDefinition> = serde_yaml::from_str(placeholders)
            .with_context(|| format!("Failed to parse {}", PLACEHOLDERS_FILE))?;

        if templates.is_empty() {
            anyhow::bail!("{} lists no templates", TEMPLATES_FILE);
        }
        if placeholders.is_empty() {
            anyhow::bail!("{} defines no placeholders", PLACEHOLDERS_FILE);
        }

        let mut names = HashSet::new();
        for template in &templates {
            if !names.insert(template.name.as_str()) {
                anyhow::bail!(
                    "Duplicate template name '{}' in {}",
                    template.name,
                    TEMPLATES_FILE
                );
            }
            if let Err(reason) = template.repo.parse::<RepoId>() {
                anyhow::bail!(
                    "Template '{}' in {}: {}",
                    template.name,
                    TEMPLATES_FILE,
                    reason
                );
            }
        }

        let mut keys = HashSet::new();
        for placeholder in &placeholders {
            if placeholder.key.trim().is_empty() {
                anyhow::bail!("Placeholder with empty key in {}", PLACEHOLDERS_FILE);
            }
            if !keys.insert(placeholder.key.as_str()) {
                anyhow::bail!(
                    "Duplicate placeholder key '{}' in {}",
                    placeholder.key,
                    PLACEHOLDERS_FILE
                );
            }
        }

        Ok(Self {
            templates,
            placeholders,
            source,
        })
    }

    /// Find a template by name, or by its `owner/name` identifier
    pub fn find_template(&self, id: &str) -> Option<&Template> {
        self.templates
            .iter()
            .find(|t| t.name == id)
            .or_else(|| self.templates.iter().find(|t| t.repo.eq_ignore_ascii_case(id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::product::testing::{TestProduct, PLACEHOLDERS, TEMPLATES};

    #[test]
    fn test_bundled_documents_parse() {
        let settings = Settings::load(&TestProduct::default(), None).unwrap();
        assert_eq!(settings.source, ConfigSource::Bundled);
        assert_eq!(settings.templates.len(), 2);
        assert_eq!(settings.templates[1].min_version.as_deref(), Some("99.0.0"));
        assert_eq!(settings.placeholders[0].key, "PROJECT_NAME");
        assert!(settings.placeholders[0].required);
        assert!(settings.placeholders[3].default.is_empty());
    }

    #[test]
    fn test_find_template_by_name_or_repo() {
        let settings =
            Settings::from_documents(TEMPLATES, PLACEHOLDERS, ConfigSource::Bundled).unwrap();
        assert_eq!(settings.find_template("cli").unwrap().repo, "acme/node-cli");
        assert_eq!(
            settings.find_template("Acme/TS-Library").unwrap().name,
            "library"
        );
        assert!(settings.find_template("missing").is_none());
    }

    #[test]
    fn test_missing_file_in_directory_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(TEMPLATES_FILE), TEMPLATES).unwrap();

        let err = Settings::load(&TestProduct::default(), Some(dir.path())).unwrap_err();
        assert!(matches!(err, ScaffoldError::Config(_)));
        assert!(err.to_string().contains(PLACEHOLDERS_FILE));
    }

    #[test]
    fn test_directory_source() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(TEMPLATES_FILE), TEMPLATES).unwrap();
        std::fs::write(dir.path().join(PLACEHOLDERS_FILE), PLACEHOLDERS).unwrap();

        let settings = Settings::load(&TestProduct::default(), Some(dir.path())).unwrap();
        assert_eq!(settings.source, ConfigSource::Directory(dir.path().to_path_buf()));
    }

    #[test]
    fn test_duplicate_keys_rejected() {
        let placeholders = "- key: A\n  prompt: a\n- key: A\n  prompt: again\n";
        let err = Settings::from_documents(TEMPLATES, placeholders, ConfigSource::Bundled)
            .unwrap_err();
        assert!(err.to_string().contains("Duplicate placeholder key 'A'"));
    }

    #[test]
    fn test_malformed_repo_rejected() {
        let templates = "- name: broken\n  description: x\n  repo: acme/.git\n";
        let err = Settings::from_documents(templates, PLACEHOLDERS, ConfigSource::Bundled)
            .unwrap_err();
        assert!(err.to_string().contains("Template 'broken'"));

        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(TEMPLATES_FILE),
            "- name: deep\n  description: x\n  repo: a/b/c\n",
        )
        .unwrap();
        std::fs::write(dir.path().join(PLACEHOLDERS_FILE), PLACEHOLDERS).unwrap();

        let err = Settings::load(&TestProduct::default(), Some(dir.path())).unwrap_err();
        assert!(err.to_string().contains("Template 'deep'"));
        assert_eq!(err.stage(), "configuration");
    }

    #[test]
    fn test_empty_template_list_rejected() {
        assert!(Settings::from_documents("[]", PLACEHOLDERS, ConfigSource::Bundled).is_err());
    }
}
