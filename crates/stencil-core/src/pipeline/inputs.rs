//! Collecting placeholder values from the user

use crate::config::PlaceholderDefinition;
use crate::interact::Prompter;
use crate::substitute::{Substitution, TokenStyle};
use anyhow::Result;

/// Keys the manifest rewriter and target resolution understand
pub mod keys {
    pub const PROJECT_NAME: &str = "PROJECT_NAME";
    pub const PACKAGE_NAME: &str = "PACKAGE_NAME";
    pub const AUTHOR_NAME: &str = "AUTHOR_NAME";
    pub const USERNAME: &str = "USERNAME";
}

/// Placeholder values in the order they were collected
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserInputs {
    entries: Vec<(String, String)>,
}

impl UserInputs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a value; an existing key keeps its position
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Value for `key` unless it is missing or blank
    pub fn get_nonempty(&self, key: &str) -> Option<&str> {
        self.get(key).filter(|v| !v.trim().is_empty())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for UserInputs {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut inputs = UserInputs::new();
        for (key, value) in iter {
            inputs.insert(key, value);
        }
        inputs
    }
}

/// Expand earlier answers inside a default value
fn expand_default(default: &str, collected: &UserInputs, style: TokenStyle) -> String {
    collected
        .iter()
        .fold(default.to_string(), |acc, (key, value)| {
            Substitution::new(key, value, style).apply(&acc).into_owned()
        })
}

/// Ask for every placeholder in order
///
/// Returns `Ok(None)` when the user cancels at any question, or when a
/// required placeholder ends up blank. A partial map is never returned.
pub fn collect_inputs<P: Prompter>(
    definitions: &[PlaceholderDefinition],
    prompter: &mut P,
    style: TokenStyle,
) -> Result<Option<UserInputs>> {
    let mut inputs = UserInputs::new();

    for definition in definitions {
        let default = expand_default(&definition.default, &inputs, style);

        let Some(answer) = prompter.ask(definition, &default)? else {
            tracing::debug!(key = %definition.key, "input cancelled");
            return Ok(None);
        };

        let value = if answer.trim().is_empty() {
            default
        } else {
            answer.trim().to_string()
        };

        if definition.required && value.trim().is_empty() {
            tracing::debug!(key = %definition.key, "required input left blank");
            return Ok(None);
        }

        inputs.insert(definition.key.clone(), value);
    }

    Ok(Some(inputs))
}
