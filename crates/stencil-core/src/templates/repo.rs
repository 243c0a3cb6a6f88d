//! Forge repository identifiers

use std::fmt;
use std::str::FromStr;

/// `owner/name` identifier of a repository on the forge
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepoId {
    owner: String,
    name: String,
}

impl RepoId {
    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl FromStr for RepoId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.trim().split('/');
        let owner = parts.next();
        let name = parts
            .next()
            .map(|name| name.strip_suffix(".git").unwrap_or(name));
        match (owner, name, parts.next()) {
            (Some(owner), Some(name), None) if valid_segment(owner) && valid_segment(name) => {
                Ok(Self {
                    owner: owner.to_string(),
                    name: name.to_string(),
                })
            }
            _ => Err(format!(
                "'{}' is not a repository identifier of the form owner/name",
                s
            )),
        }
    }
}

fn valid_segment(segment: &str) -> bool {
    !segment.is_empty()
        && segment != "."
        && segment != ".."
        && segment
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
}

impl fmt::Display for RepoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_owner_and_name() {
        let repo: RepoId = "acme/ts-library".parse().unwrap();
        assert_eq!(repo.owner(), "acme");
        assert_eq!(repo.name(), "ts-library");
        assert_eq!(repo.to_string(), "acme/ts-library");
    }

    #[test]
    fn test_git_suffix_dropped() {
        let repo: RepoId = "acme/starter.git".parse().unwrap();
        assert_eq!(repo.name(), "starter");

        // Only one suffix is removed
        let repo: RepoId = "acme/x.git.git".parse().unwrap();
        assert_eq!(repo.name(), "x.git");
    }

    #[test]
    fn test_rejects_malformed() {
        for bad in [
            "",
            "acme",
            "acme/",
            "/lib",
            "a/b/c",
            "acme/my lib",
            "../x",
            "acme/.git",
        ] {
            assert!(bad.parse::<RepoId>().is_err(), "accepted {:?}", bad);
        }
    }
}
