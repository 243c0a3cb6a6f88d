//! Version comparison between the CLI and a template's declared minimum

use crate::config::Template;
use semver::Version;

/// Returns a warning when the template asks for a newer CLI than the one running
///
/// Unparseable versions on either side skip the check.
pub fn check_compatibility(cli_version: &str, template: &Template) -> Option<String> {
    let required = parse_version(template.min_version.as_deref()?)?;
    let running = parse_version(cli_version)?;

    if running < required {
        Some(format!(
            "Template '{}' expects CLI version {} or newer, you are running {}",
            template.name, required, running
        ))
    } else {
        None
    }
}

/// Parse a version string, tolerating a leading `v`
fn parse_version(version_str: &str) -> Option<Version> {
    let cleaned = version_str.trim();
    let cleaned = cleaned.strip_prefix('v').unwrap_or(cleaned);
    Version::parse(cleaned).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn template(min_version: Option<&str>) -> Template {
        Template {
            name: "library".into(),
            description: String::new(),
            repo: "acme/lib".into(),
            min_version: min_version.map(String::from),
        }
    }

    #[test]
    fn test_cli_older_than_template() {
        let warning = check_compatibility("0.1.0", &template(Some("0.2.0")));
        assert!(warning.unwrap().contains("0.2.0"));
    }

    #[test]
    fn test_cli_same_or_newer() {
        assert!(check_compatibility("0.2.0", &template(Some("v0.2.0"))).is_none());
        assert!(check_compatibility("1.0.0", &template(Some("0.2.0"))).is_none());
    }

    #[test]
    fn test_missing_or_invalid_versions() {
        assert!(check_compatibility("0.1.0", &template(None)).is_none());
        assert!(check_compatibility("invalid", &template(Some("0.2.0"))).is_none());
        assert!(check_compatibility("0.1.0", &template(Some("soon"))).is_none());
    }
}
