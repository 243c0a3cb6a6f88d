//! Recursive file listing for a generated project

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Directory names never descended into
pub const EXCLUDED_DIRS: &[&str] = &[".git", "node_modules"];

/// List every file under `root`, skipping VCS metadata and dependency caches
///
/// Entries are sorted by file name within each directory, so the order is
/// the same on every run over the same tree. Symlinks are not followed.
/// Entries that cannot be read are logged and skipped; only an unreadable
/// root is an error.
pub fn list_files(root: &Path) -> Result<Vec<PathBuf>> {
    std::fs::read_dir(root)
        .with_context(|| format!("Failed to read directory {}", root.display()))?;

    let walker = WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| entry.depth() == 0 || !is_excluded_dir(entry));

    let mut files = Vec::new();
    for entry in walker {
        match entry {
            Ok(entry) if entry.file_type().is_file() => files.push(entry.into_path()),
            Ok(_) => {}
            Err(e) => tracing::warn!(error = %e, "skipping unreadable entry"),
        }
    }

    Ok(files)
}

fn is_excluded_dir(entry: &walkdir::DirEntry) -> bool {
    entry.file_type().is_dir()
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| EXCLUDED_DIRS.contains(&name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn relative(root: &Path, files: &[PathBuf]) -> Vec<String> {
        files
            .iter()
            .map(|p| {
                p.strip_prefix(root)
                    .unwrap()
                    .to_string_lossy()
                    .replace('\\', "/")
            })
            .collect()
    }

    #[test]
    fn test_lists_nested_files_and_skips_excluded_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("src/deep/er")).unwrap();
        fs::create_dir_all(root.join(".git/objects")).unwrap();
        fs::create_dir_all(root.join("node_modules/pkg")).unwrap();
        fs::create_dir_all(root.join("packages/a/node_modules")).unwrap();
        fs::write(root.join("package.json"), "{}").unwrap();
        fs::write(root.join("src/index.ts"), "").unwrap();
        fs::write(root.join("src/deep/er/mod.ts"), "").unwrap();
        fs::write(root.join(".git/HEAD"), "").unwrap();
        fs::write(root.join("node_modules/pkg/index.js"), "").unwrap();
        fs::write(root.join("packages/a/node_modules/x.js"), "").unwrap();
        fs::write(root.join("packages/a/.gitignore"), "").unwrap();

        let files = list_files(root).unwrap();
        assert_eq!(
            relative(root, &files),
            vec![
                "package.json",
                "packages/a/.gitignore",
                "src/deep/er/mod.ts",
                "src/index.ts"
            ]
        );
    }

    #[test]
    fn test_order_is_stable() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.txt", "a.txt", "c/d.txt"] {
            let path = dir.path().join(name);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, "").unwrap();
        }
        assert_eq!(list_files(dir.path()).unwrap(), list_files(dir.path()).unwrap());
    }

    #[test]
    fn test_file_named_like_excluded_dir_is_listed() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("node_modules"), "").unwrap();
        assert_eq!(list_files(dir.path()).unwrap().len(), 1);
    }

    #[test]
    fn test_missing_root_is_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(list_files(&dir.path().join("missing")).is_err());
    }
}
