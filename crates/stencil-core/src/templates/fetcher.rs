//! Template retrieval from the forge (GitHub) or a local directory
//!
//! Both sources end the same way: the complete file set is held in memory
//! first and only then written to the destination. A failed write removes
//! whatever this call created, so a broken download never looks finished.

use super::repo::RepoId;
use crate::error::FetchError;
use crate::product::ProductConfig;
use crate::substitute::walker;
use anyhow::{Context, Result};
use std::io::{Cursor, Read};
use std::path::{Component, Path, PathBuf};
use tokio::fs;
use url::Url;
use zip::ZipArchive;

/// Verifies and downloads template repositories
#[allow(async_fn_in_trait)]
pub trait RemoteFetcher {
    /// Succeeds when the repository exists; `FetchError::NotFound` when it does not
    async fn exists(&self, repo: &RepoId) -> Result<(), FetchError>;

    /// Write the repository's files under `dest`, returning how many were written
    async fn materialize(&self, repo: &RepoId, dest: &Path) -> Result<usize, FetchError>;
}

/// Template source - either the forge API or a local directory of `owner/name` folders
#[derive(Debug, Clone)]
pub enum TemplateSource {
    Remote(Url),
    Local(PathBuf),
}

impl TemplateSource {
    /// Create a remote source from a product config, honouring its env override
    pub fn from_config<C: ProductConfig>(config: &C) -> Result<Self> {
        let url_str = std::env::var(config.forge_api_url_env())
            .unwrap_or_else(|_| config.forge_api_url().to_string());
        let url = Url::parse(&url_str)
            .with_context(|| format!("Invalid forge API URL: {}", url_str))?;
        Ok(Self::Remote(url))
    }

    /// Create a local template source from a path
    pub fn local(path: PathBuf) -> Self {
        Self::Local(path)
    }
}

/// A file pulled out of a template archive
#[derive(Debug, Clone)]
struct ArchiveFile {
    path: PathBuf,
    contents: Vec<u8>,
    mode: Option<u32>,
}

/// Template fetcher - handles retrieving templates from remote or local sources
pub struct TemplateFetcher {
    source: TemplateSource,
    client: reqwest::Client,
}

impl TemplateFetcher {
    /// Create a new fetcher with a custom user agent
    pub fn new(source: TemplateSource, user_agent: &str) -> Self {
        Self {
            source,
            client: reqwest::Client::builder()
                .user_agent(user_agent)
                .build()
                .unwrap_or_else(|_| reqwest::Client::new()),
        }
    }

    /// Create a fetcher from a product config
    pub fn from_config<C: ProductConfig>(config: &C) -> Result<Self> {
        let source = TemplateSource::from_config(config)?;
        Ok(Self::new(source, config.user_agent()))
    }

    /// Create a fetcher for local templates
    pub fn from_local(path: PathBuf, user_agent: &str) -> Self {
        Self::new(TemplateSource::local(path), user_agent)
    }

    /// Get the template source
    pub fn source(&self) -> &TemplateSource {
        &self.source
    }

    /// Build a URL by appending path segments, preserving query parameters
    fn build_url(base: &Url, segments: &[&str]) -> Result<Url> {
        let mut url = base.clone();
        url.path_segments_mut()
            .map_err(|_| anyhow::anyhow!("URL cannot have path segments: {}", base))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn repo_url(base: &Url, repo: &RepoId, suffix: Option<&str>) -> Result<Url> {
        let mut segments = vec!["repos", repo.owner(), repo.name()];
        segments.extend(suffix);
        Self::build_url(base, &segments)
    }

    async fn get(&self, url: Url) -> Result<reqwest::Response, FetchError> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .with_context(|| format!("Failed to reach {}", url))?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(FetchError::NotFound);
        }
        if !status.is_success() {
            return Err(FetchError::Other(format!("{}: HTTP {}", url, status)));
        }
        Ok(response)
    }

    async fn download_archive(
        &self,
        base: &Url,
        repo: &RepoId,
    ) -> Result<Vec<ArchiveFile>, FetchError> {
        let url = Self::repo_url(base, repo, Some("zipball"))?;
        tracing::debug!(%url, "downloading template archive");

        let bytes = self
            .get(url)
            .await?
            .bytes()
            .await
            .context("Failed to read template archive")?;

        Ok(extract_archive(&bytes)?)
    }

    fn local_files(root: &Path, repo: &RepoId) -> Result<Vec<ArchiveFile>> {
        let template_dir = local_dir(root, repo);
        let mut files = Vec::new();

        for path in walker::list_files(&template_dir)? {
            let contents = std::fs::read(&path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            let relative = path
                .strip_prefix(&template_dir)
                .map(Path::to_path_buf)
                .with_context(|| {
                    format!("{} is outside {}", path.display(), template_dir.display())
                })?;
            files.push(ArchiveFile {
                path: relative,
                contents,
                mode: None,
            });
        }

        Ok(files)
    }
}

impl RemoteFetcher for TemplateFetcher {
    async fn exists(&self, repo: &RepoId) -> Result<(), FetchError> {
        match &self.source {
            TemplateSource::Remote(base_url) => {
                let url = Self::repo_url(base_url, repo, None)?;
                tracing::debug!(%url, "checking template repository");
                self.get(url).await.map(|_| ())
            }
            TemplateSource::Local(root) => {
                if local_dir(root, repo).is_dir() {
                    Ok(())
                } else {
                    Err(FetchError::NotFound)
                }
            }
        }
    }

    async fn materialize(&self, repo: &RepoId, dest: &Path) -> Result<usize, FetchError> {
        let files = match &self.source {
            TemplateSource::Remote(base_url) => self.download_archive(base_url, repo).await?,
            TemplateSource::Local(root) => Self::local_files(root, repo)?,
        };

        if files.is_empty() {
            return Err(FetchError::Other(format!("template '{}' contains no files", repo)));
        }

        Ok(write_files(dest, &files).await?)
    }
}

fn local_dir(root: &Path, repo: &RepoId) -> PathBuf {
    root.join(repo.owner()).join(repo.name())
}

/// Extract every file of a zip archive into memory
///
/// Forge archives wrap the tree in one top-level directory (`owner-name-sha/`);
/// when every entry shares a single top-level directory it is stripped.
fn extract_archive(zip_bytes: &[u8]) -> Result<Vec<ArchiveFile>> {
    let mut archive = ZipArchive::new(Cursor::new(zip_bytes))
        .context("Failed to read template archive")?;

    let mut files = Vec::new();
    for i in 0..archive.len() {
        let mut file = archive.by_index(i)?;
        if file.is_dir() {
            continue;
        }

        let path = file
            .enclosed_name()
            .ok_or_else(|| anyhow::anyhow!("Archive entry has an unsafe path: {}", file.name()))?;

        let mut contents = Vec::new();
        file.read_to_end(&mut contents)
            .with_context(|| format!("Failed to extract {}", path.display()))?;

        files.push(ArchiveFile {
            path,
            contents,
            mode: file.unix_mode(),
        });
    }

    if let Some(root) = shared_root(&files) {
        for file in &mut files {
            if let Ok(stripped) = file.path.strip_prefix(&root) {
                file.path = stripped.to_path_buf();
            }
        }
    }

    Ok(files)
}

fn shared_root(files: &[ArchiveFile]) -> Option<PathBuf> {
    let mut root: Option<&std::ffi::OsStr> = None;
    for file in files {
        let mut components = file.path.components();
        let first = match components.next() {
            Some(Component::Normal(first)) => first,
            _ => return None,
        };
        // A file at the top level means there is no wrapper directory
        components.next()?;
        match root {
            Some(existing) if existing != first => return None,
            _ => root = Some(first),
        }
    }
    root.map(PathBuf::from)
}

/// Write files under `dest`; on failure remove everything this call created
async fn write_files(dest: &Path, files: &[ArchiveFile]) -> Result<usize> {
    let dest_existed = dest.exists();
    fs::create_dir_all(dest)
        .await
        .with_context(|| format!("Failed to create directory: {}", dest.display()))?;

    let mut created = Vec::new();
    for file in files {
        let target = dest.join(&file.path);
        let is_new = !target.exists();
        if let Err(e) = write_file(&target, file).await {
            rollback(dest, dest_existed, &created).await;
            return Err(e);
        }
        if is_new {
            created.push(target);
        }
    }

    Ok(files.len())
}

async fn write_file(target: &Path, file: &ArchiveFile) -> Result<()> {
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent)
            .await
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    fs::write(target, &file.contents)
        .await
        .with_context(|| format!("Failed to write file: {}", target.display()))?;

    #[cfg(unix)]
    if let Some(mode) = file.mode.map(|m| m & 0o777).filter(|m| *m != 0) {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(target, std::fs::Permissions::from_mode(mode))
            .await
            .with_context(|| format!("Failed to set permissions on {}", target.display()))?;
    }

    Ok(())
}

async fn rollback(dest: &Path, dest_existed: bool, created: &[PathBuf]) {
    if !dest_existed {
        if let Err(e) = fs::remove_dir_all(dest).await {
            tracing::warn!(path = %dest.display(), error = %e, "failed to remove partial download");
        }
        return;
    }
    for path in created {
        if let Err(e) = fs::remove_file(path).await {
            tracing::warn!(path = %path.display(), error = %e, "failed to remove partial download");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    fn build_zip(entries: &[(&str, &str)]) -> Vec<u8> {
        let mut buffer = Vec::new();
        {
            let mut zip = ZipWriter::new(Cursor::new(&mut buffer));
            let options = SimpleFileOptions::default();
            for (name, content) in entries {
                if name.ends_with('/') {
                    zip.add_directory(*name, options).unwrap();
                } else {
                    zip.start_file(*name, options).unwrap();
                    zip.write_all(content.as_bytes()).unwrap();
                }
            }
            zip.finish().unwrap();
        }
        buffer
    }

    fn paths(files: &[ArchiveFile]) -> Vec<String> {
        files
            .iter()
            .map(|f| f.path.to_string_lossy().replace('\\', "/"))
            .collect()
    }

    #[test]
    fn test_extract_strips_wrapper_directory() {
        let zip = build_zip(&[
            ("acme-lib-1a2b3c/", ""),
            ("acme-lib-1a2b3c/package.json", "{}"),
            ("acme-lib-1a2b3c/src/index.ts", "export {}"),
        ]);

        let files = extract_archive(&zip).unwrap();
        assert_eq!(paths(&files), vec!["package.json", "src/index.ts"]);
        assert_eq!(files[1].contents, b"export {}");
    }

    #[test]
    fn test_extract_keeps_flat_archive() {
        let zip = build_zip(&[("README.md", "# hi"), ("src/lib.rs", "")]);
        let files = extract_archive(&zip).unwrap();
        assert_eq!(paths(&files), vec!["README.md", "src/lib.rs"]);
    }

    #[test]
    fn test_build_url_appends_segments() {
        let base = Url::parse("https://api.github.com").unwrap();
        let repo: RepoId = "acme/lib".parse().unwrap();
        let url = TemplateFetcher::repo_url(&base, &repo, Some("zipball")).unwrap();
        assert_eq!(url.as_str(), "https://api.github.com/repos/acme/lib/zipball");
    }

    #[tokio::test]
    async fn test_local_source_exists_and_materializes() {
        let root = tempfile::tempdir().unwrap();
        let template = root.path().join("acme").join("lib");
        std::fs::create_dir_all(template.join("src")).unwrap();
        std::fs::create_dir_all(template.join(".git")).unwrap();
        std::fs::write(template.join("package.json"), "{}").unwrap();
        std::fs::write(template.join("src/index.ts"), "export {}").unwrap();
        std::fs::write(template.join(".git/HEAD"), "ref").unwrap();

        let fetcher = TemplateFetcher::from_local(root.path().to_path_buf(), "test");
        let repo: RepoId = "acme/lib".parse().unwrap();
        let missing: RepoId = "acme/nope".parse().unwrap();

        assert!(fetcher.exists(&repo).await.is_ok());
        assert!(matches!(fetcher.exists(&missing).await, Err(FetchError::NotFound)));

        let out = tempfile::tempdir().unwrap();
        let dest = out.path().join("project");
        let written = fetcher.materialize(&repo, &dest).await.unwrap();

        assert_eq!(written, 2);
        assert!(dest.join("src/index.ts").is_file());
        assert!(!dest.join(".git").exists());
    }

    #[tokio::test]
    async fn test_failed_write_removes_new_destination() {
        let out = tempfile::tempdir().unwrap();
        let dest = out.path().join("project");
        let files = vec![
            ArchiveFile {
                path: PathBuf::from("a.txt"),
                contents: b"a".to_vec(),
                mode: None,
            },
            // Needs a.txt to be a directory
            ArchiveFile {
                path: PathBuf::from("a.txt/b.txt"),
                contents: b"b".to_vec(),
                mode: None,
            },
        ];

        assert!(write_files(&dest, &files).await.is_err());
        assert!(!dest.exists());
    }

    #[tokio::test]
    async fn test_failed_write_keeps_existing_files() {
        let dest = tempfile::tempdir().unwrap();
        std::fs::write(dest.path().join("keep.txt"), "mine").unwrap();
        let files = vec![
            ArchiveFile {
                path: PathBuf::from("new.txt"),
                contents: b"n".to_vec(),
                mode: None,
            },
            ArchiveFile {
                path: PathBuf::from("keep.txt/inner"),
                contents: b"x".to_vec(),
                mode: None,
            },
        ];

        assert!(write_files(dest.path(), &files).await.is_err());
        assert!(dest.path().join("keep.txt").is_file());
        assert!(!dest.path().join("new.txt").exists());
    }
}
