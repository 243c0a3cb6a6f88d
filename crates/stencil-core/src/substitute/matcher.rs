//! Placeholder tokens and literal matching
//!
//! Counting and replacing share one compiled pattern per key, so the scan
//! summary and the rewrite always agree on what a match is.

use crate::pipeline::UserInputs;
use regex::{NoExpand, Regex};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

/// How a placeholder key appears in template files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenStyle {
    /// `{{KEY}}`
    #[default]
    Delimited,
    /// `KEY` anywhere in the text
    Bare,
}

impl TokenStyle {
    pub fn token(self, key: &str) -> String {
        match self {
            TokenStyle::Delimited => format!("{{{{{}}}}}", key),
            TokenStyle::Bare => key.to_string(),
        }
    }
}

/// Count non-overlapping literal occurrences of `token`; metacharacters are escaped
pub fn count_occurrences(content: &str, token: &str) -> usize {
    if token.is_empty() {
        return 0;
    }
    literal(token).find_iter(content).count()
}

fn literal(token: &str) -> Regex {
    Regex::new(&regex::escape(token)).expect("escaped literal is a valid pattern")
}

/// One key, its token form in files, and the value it becomes
#[derive(Debug, Clone)]
pub struct Substitution {
    pub key: String,
    pub token: String,
    pub replacement: String,
    pattern: Regex,
}

impl Substitution {
    pub fn new(key: &str, replacement: &str, style: TokenStyle) -> Self {
        let token = style.token(key);
        Self {
            key: key.to_string(),
            pattern: literal(&token),
            token,
            replacement: replacement.to_string(),
        }
    }

    pub fn count(&self, content: &str) -> usize {
        self.pattern.find_iter(content).count()
    }

    pub fn apply<'a>(&self, content: &'a str) -> Cow<'a, str> {
        self.pattern.replace_all(content, NoExpand(&self.replacement))
    }
}

/// Substitutions for a whole run, in input order
#[derive(Debug, Clone, Default)]
pub struct Substitutions {
    items: Vec<Substitution>,
}

impl Substitutions {
    pub fn from_inputs(inputs: &UserInputs, style: TokenStyle) -> Self {
        Self {
            items: inputs
                .iter()
                .filter(|(key, _)| !key.is_empty())
                .map(|(key, value)| Substitution::new(key, value, style))
                .collect(),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Substitution> {
        self.items.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
