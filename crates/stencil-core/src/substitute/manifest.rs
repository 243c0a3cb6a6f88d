//! Structured rewriting of the package manifest (`package.json`)
//!
//! Fields are edited on the parsed document instead of as text so nested
//! objects stay valid and `keywords` can be merged. Several fields may be a
//! plain string or an object; every update matches on the shape it finds.
//! Key order is preserved on output (`serde_json` with `preserve_order`).

use crate::pipeline::inputs::{keys, UserInputs};
use crate::product::ProductConfig;
use heck::ToKebabCase;
use serde_json::{Map, Value};
use std::collections::HashSet;

/// Inputs to the rewrite that come from the product rather than the user
#[derive(Debug, Clone)]
pub struct ManifestPolicy {
    pub forge_host: String,
    pub ecosystem_keywords: Vec<String>,
    pub category_keywords: Vec<String>,
}

impl ManifestPolicy {
    pub fn from_config<C: ProductConfig>(config: &C) -> Self {
        Self {
            forge_host: config.forge_host().to_string(),
            ecosystem_keywords: config
                .ecosystem_keywords()
                .iter()
                .map(|s| s.to_string())
                .collect(),
            category_keywords: config
                .category_keywords()
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }

    fn profile_url(&self, username: &str) -> String {
        format!("https://{}/{}", self.forge_host, username)
    }

    fn repository_url(&self, username: &str, project: &str) -> String {
        format!("{}/{}", self.profile_url(username), project.to_kebab_case())
    }

    /// Tags merged into `keywords`: ecosystem tags, the lower-cased project name, category tags
    fn generated_keywords(&self, project: &str) -> Vec<String> {
        self.ecosystem_keywords
            .iter()
            .cloned()
            .chain(std::iter::once(project.trim().to_lowercase()))
            .chain(self.category_keywords.iter().cloned())
            .collect()
    }
}

/// The two shapes `author`, `repository` and `bugs` come in
enum FieldForm<'a> {
    Text(&'a mut String),
    Object(&'a mut Map<String, Value>),
}

impl<'a> FieldForm<'a> {
    fn of(value: &'a mut Value) -> Option<Self> {
        match value {
            Value::String(s) => Some(FieldForm::Text(s)),
            Value::Object(map) => Some(FieldForm::Object(map)),
            _ => None,
        }
    }
}

/// Set a value, reporting whether it actually changed
fn set_value(slot: &mut Value, value: &str) -> bool {
    if slot.as_str() == Some(value) {
        return false;
    }
    *slot = Value::String(value.to_string());
    true
}

fn set_text(slot: &mut String, value: &str) -> bool {
    if slot == value {
        return false;
    }
    *slot = value.to_string();
    true
}

/// Overwrite `key` on an object only when it is already there
fn set_existing(map: &mut Map<String, Value>, key: &str, value: &str) -> bool {
    map.get_mut(key).is_some_and(|slot| set_value(slot, value))
}

/// Rewrite a link-like field (`repository`, `bugs`) that is either a URL string or `{ url }`
fn rewrite_link(document: &mut Map<String, Value>, field: &str, url: &str) -> bool {
    match document.get_mut(field).and_then(FieldForm::of) {
        Some(FieldForm::Text(text)) => set_text(text, url),
        Some(FieldForm::Object(map)) => set_existing(map, "url", url),
        None => false,
    }
}

/// Apply every field update whose preconditions hold; returns whether anything changed
///
/// Updates are independent: one not firing never stops the next.
pub fn rewrite_manifest(
    document: &mut Map<String, Value>,
    inputs: &UserInputs,
    policy: &ManifestPolicy,
) -> bool {
    let package_name = inputs.get_nonempty(keys::PACKAGE_NAME);
    let author_name = inputs.get_nonempty(keys::AUTHOR_NAME);
    let username = inputs.get_nonempty(keys::USERNAME);
    let project = inputs.get_nonempty(keys::PROJECT_NAME);

    let mut changed = false;

    if let Some(name) = package_name {
        changed |= match document.get_mut("name") {
            Some(slot) => set_value(slot, name),
            None => {
                document.insert("name".to_string(), Value::String(name.to_string()));
                true
            }
        };
    }

    match document.get_mut("author").and_then(FieldForm::of) {
        Some(FieldForm::Object(author)) => {
            if let Some(name) = author_name {
                changed |= set_existing(author, "name", name);
            }
            if let Some(user) = username {
                changed |= set_existing(author, "url", &policy.profile_url(user));
            }
        }
        Some(FieldForm::Text(author)) => {
            if let Some(name) = author_name {
                changed |= set_text(author, name);
            }
        }
        None => {}
    }

    if let (Some(user), Some(project)) = (username, project) {
        let repo_url = policy.repository_url(user, project);

        changed |= rewrite_link(document, "repository", &repo_url);
        changed |= rewrite_link(document, "bugs", &format!("{}/issues", repo_url));

        if let Some(homepage) = document.get_mut("homepage") {
            changed |= set_value(homepage, &repo_url);
        }
    }

    if let Some(project) = project {
        if let Some(Value::Array(existing)) = document.get_mut("keywords") {
            let merged = merge_keywords(existing, &policy.generated_keywords(project));
            if merged != *existing {
                *existing = merged;
                changed = true;
            }
        }
    }

    changed
}

/// Existing entries first in their original order, then new tags; no duplicates
fn merge_keywords(existing: &[Value], generated: &[String]) -> Vec<Value> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut merged: Vec<Value> = Vec::with_capacity(existing.len() + generated.len());

    for entry in existing {
        let keep = match entry.as_str() {
            Some(tag) => seen.insert(tag.to_string()),
            None => !merged.contains(entry),
        };
        if keep {
            merged.push(entry.clone());
        }
    }

    for tag in generated {
        if !tag.is_empty() && seen.insert(tag.clone()) {
            merged.push(Value::String(tag.clone()));
        }
    }

    merged
}

/// Parse, rewrite and re-serialise manifest text
///
/// `Ok(None)` means the document was valid but no field changed, so the
/// original formatting is left alone.
pub fn rewrite_manifest_str(
    content: &str,
    inputs: &UserInputs,
    policy: &ManifestPolicy,
) -> Result<Option<String>, serde_json::Error> {
    let mut document: Map<String, Value> = serde_json::from_str(content)?;

    if !rewrite_manifest(&mut document, inputs, policy) {
        return Ok(None);
    }

    let mut output = serde_json::to_string_pretty(&document)?;
    if content.ends_with('\n') {
        output.push('\n');
    }
    Ok(Some(output))
}
