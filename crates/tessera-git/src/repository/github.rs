//! Checkouts through the GitHub REST API.
//!
//! Each checkout lists the branch tree once, then downloads the blobs of
//! supported config files through a [`FetchPool`]. Files land in a fresh
//! snapshot directory named after the commit, so a half-written checkout is
//! never visible to the index builder.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use parking_lot::RwLock;
use serde::Deserialize;
use tempfile::TempDir;
use tessera_core::ConfigFormat;
use tracing::{debug, info, warn};

use super::{RepositoryConfig, StorageMode, VersionControl};
use crate::error::ConfigSourceError;
use crate::pool::FetchPool;

const STAGING_PREFIX: &str = ".staging-";

/// One blob entry of a recursive tree listing.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TreeEntry {
    pub path: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub sha: String,
}

#[derive(Debug, Deserialize)]
struct BranchResponse {
    commit: BranchCommit,
}

#[derive(Debug, Deserialize)]
struct BranchCommit {
    sha: String,
}

#[derive(Debug, Deserialize)]
struct TreeResponse {
    #[serde(default)]
    tree: Vec<TreeEntry>,
    #[serde(default)]
    truncated: bool,
}

#[derive(Debug, Deserialize)]
struct BlobResponse {
    #[serde(default)]
    content: String,
    #[serde(default)]
    encoding: Option<String>,
}

/// [`VersionControl`] client that reads the branch through the GitHub API.
pub struct GitHubTreeClient {
    uri: String,
    branch: String,
    owner: String,
    repo: String,
    api_url: String,
    auth_token: Option<String>,
    working_dir: PathBuf,
    http: reqwest::Client,
    pool: FetchPool,
    head: RwLock<Option<String>>,
    _scratch: Option<TempDir>,
}

impl GitHubTreeClient {
    /// Creates a client for `config`, calling the API at `api_url`.
    ///
    /// # Errors
    ///
    /// Fails if the URI does not name a GitHub `owner/repo`, or if the
    /// temporary directory for in-memory storage cannot be created.
    pub fn new(config: &RepositoryConfig, api_url: impl Into<String>) -> Result<Self, ConfigSourceError> {
        let (owner, repo) = parse_github_slug(config.uri()).ok_or_else(|| {
            ConfigSourceError::InvalidConfig(format!(
                "cannot derive owner/repo from '{}'",
                config.uri()
            ))
        })?;

        let (working_dir, scratch) = match config.storage() {
            StorageMode::Local => (config.local_path().clone(), None),
            StorageMode::InMemory => {
                let scratch = tempfile::Builder::new().prefix("tessera-tree-").tempdir()?;
                (scratch.path().to_path_buf(), Some(scratch))
            },
        };

        let http = reqwest::Client::builder()
            .user_agent("tessera")
            .build()
            .map_err(|e| ConfigSourceError::remote(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            uri: config.uri().to_string(),
            branch: config.branch().to_string(),
            owner,
            repo,
            api_url: api_url.into().trim_end_matches('/').to_string(),
            auth_token: config.auth_token().map(str::to_string),
            working_dir,
            http,
            pool: FetchPool::new(config.fetch_concurrency()),
            head: RwLock::new(None),
            _scratch: scratch,
        })
    }

    fn repo_url(&self, suffix: &str) -> String {
        format!("{}/repos/{}/{}{}", self.api_url, self.owner, self.repo, suffix)
    }

    async fn get_json<T: for<'de> Deserialize<'de>>(
        http: &reqwest::Client,
        token: Option<&str>,
        url: &str,
    ) -> Result<T, ConfigSourceError> {
        let mut request = http.get(url).header("Accept", "application/vnd.github+json");
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| ConfigSourceError::remote(format!("GET {url}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ConfigSourceError::remote(format!("GET {url}: HTTP {status}")));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| ConfigSourceError::remote(format!("GET {url}: invalid body: {e}")))
    }

    fn snapshot_dir(&self, sha: &str) -> PathBuf {
        self.working_dir.join(sha)
    }

    async fn download(&self, sha: &str) -> Result<(), ConfigSourceError> {
        let target = self.snapshot_dir(sha);
        if tokio::fs::try_exists(&target).await? {
            debug!(commit = %sha, "snapshot already present");
            *self.head.write() = Some(sha.to_string());
            return Ok(());
        }

        let listing: TreeResponse = Self::get_json(
            &self.http,
            self.auth_token.as_deref(),
            &self.repo_url(&format!("/git/trees/{sha}?recursive=1")),
        )
        .await?;

        if listing.truncated {
            warn!(owner = %self.owner, repo = %self.repo, "tree listing truncated by the API");
        }

        let entries: Vec<TreeEntry> = listing
            .tree
            .into_iter()
            .filter(|e| e.kind == "blob" && ConfigFormat::from_path(&e.path).is_some())
            .collect();

        let staging = self.working_dir.join(format!("{STAGING_PREFIX}{sha}"));
        if tokio::fs::try_exists(&staging).await? {
            tokio::fs::remove_dir_all(&staging).await?;
        }
        tokio::fs::create_dir_all(&staging).await?;

        let count = entries.len();
        let http = self.http.clone();
        let token = self.auth_token.clone();
        let blob_base = self.repo_url("/git/blobs/");
        let staging_root = staging.clone();

        let written = self
            .pool
            .run(entries, move |entry| {
                let http = http.clone();
                let token = token.clone();
                let url = format!("{blob_base}{}", entry.sha);
                let root = staging_root.clone();
                async move {
                    let blob: BlobResponse = Self::get_json(&http, token.as_deref(), &url).await?;
                    let bytes = decode_blob(&blob.content, blob.encoding.as_deref())?;
                    let target = safe_join(&root, &entry.path)?;
                    if let Some(parent) = target.parent() {
                        tokio::fs::create_dir_all(parent).await?;
                    }
                    tokio::fs::write(&target, bytes).await?;
                    Ok(entry.path)
                }
            })
            .await;

        if let Err(e) = written {
            let _ = tokio::fs::remove_dir_all(&staging).await;
            return Err(e);
        }

        tokio::fs::rename(&staging, &target).await?;
        *self.head.write() = Some(sha.to_string());
        info!(commit = %sha, files = count, "snapshot downloaded");

        self.prune_snapshots(sha).await;
        Ok(())
    }

    /// Keeps the current snapshot and the one before it.
    async fn prune_snapshots(&self, current: &str) {
        let Ok(mut dir) = tokio::fs::read_dir(&self.working_dir).await else {
            return;
        };

        let mut snapshots = Vec::new();
        while let Ok(Some(entry)) = dir.next_entry().await {
            let name = entry.file_name().to_string_lossy().to_string();
            if name == current || name.starts_with(STAGING_PREFIX) {
                continue;
            }
            if let Ok(meta) = entry.metadata().await
                && meta.is_dir()
            {
                snapshots.push((meta.modified().ok(), entry.path()));
            }
        }

        snapshots.sort_by(|a, b| b.0.cmp(&a.0));
        for (_, path) in snapshots.into_iter().skip(1) {
            if let Err(e) = tokio::fs::remove_dir_all(&path).await {
                warn!(path = %path.display(), error = %e, "failed to prune snapshot");
            }
        }
    }
}

#[async_trait]
impl VersionControl for GitHubTreeClient {
    fn name(&self) -> &'static str {
        "github"
    }

    fn remote_url(&self) -> &str {
        &self.uri
    }

    fn branch(&self) -> &str {
        &self.branch
    }

    fn working_dir(&self) -> PathBuf {
        self.working_dir.clone()
    }

    fn content_root(&self) -> PathBuf {
        match self.head.read().as_deref() {
            Some(sha) => self.snapshot_dir(sha),
            None => self.working_dir.clone(),
        }
    }

    fn has_working_copy(&self) -> bool {
        self.head.read().is_some()
    }

    async fn clone_branch(&self) -> Result<(), ConfigSourceError> {
        tokio::fs::create_dir_all(&self.working_dir).await?;
        let sha = self.remote_head().await?;
        self.download(&sha).await
    }

    async fn fetch_and_checkout(&self) -> Result<(), ConfigSourceError> {
        let sha = self.remote_head().await?;
        self.download(&sha).await
    }

    async fn local_head(&self) -> Result<Option<String>, ConfigSourceError> {
        Ok(self.head.read().clone())
    }

    async fn remote_head(&self) -> Result<String, ConfigSourceError> {
        let url = self.repo_url(&format!("/branches/{}", self.branch));
        let branch: BranchResponse =
            Self::get_json(&self.http, self.auth_token.as_deref(), &url).await?;
        Ok(branch.commit.sha)
    }
}

impl std::fmt::Debug for GitHubTreeClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubTreeClient")
            .field("owner", &self.owner)
            .field("repo", &self.repo)
            .field("branch", &self.branch)
            .field("api_url", &self.api_url)
            .finish()
    }
}

/// Extracts `(owner, repo)` from a GitHub HTTPS or SSH remote URL.
pub fn parse_github_slug(uri: &str) -> Option<(String, String)> {
    let path = if let Some(rest) = uri.strip_prefix("git@") {
        rest.split_once(':')?.1
    } else {
        let rest = uri.split_once("://")?.1;
        let (host, path) = rest.split_once('/')?;
        if host.is_empty() {
            return None;
        }
        path
    };

    let mut parts = path.trim_matches('/').split('/');
    let owner = parts.next().filter(|s| !s.is_empty())?;
    let repo = parts.next().filter(|s| !s.is_empty())?;
    let repo = repo.strip_suffix(".git").unwrap_or(repo);

    Some((owner.to_string(), repo.to_string()))
}

/// Decodes the `content` field of a blob response.
///
/// GitHub wraps base64 content at 60 columns; whitespace is stripped first.
pub fn decode_blob(content: &str, encoding: Option<&str>) -> Result<Vec<u8>, ConfigSourceError> {
    match encoding.unwrap_or("base64") {
        "base64" => {
            let compact: String = content.chars().filter(|c| !c.is_whitespace()).collect();
            STANDARD
                .decode(compact)
                .map_err(|e| ConfigSourceError::remote(format!("invalid base64 blob: {e}")))
        },
        _ => Ok(content.as_bytes().to_vec()),
    }
}

/// Joins a tree path below `root`, rejecting absolute paths and `..`.
fn safe_join(root: &Path, relative: &str) -> Result<PathBuf, ConfigSourceError> {
    let candidate = Path::new(relative);
    let escapes = candidate
        .components()
        .any(|c| !matches!(c, std::path::Component::Normal(_)));
    if escapes {
        return Err(ConfigSourceError::remote(format!("refusing tree path '{relative}'")));
    }
    Ok(root.join(candidate))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_github_slug() {
        assert_eq!(
            parse_github_slug("https://github.com/acme/config-repo.git"),
            Some(("acme".into(), "config-repo".into()))
        );
        assert_eq!(
            parse_github_slug("git@github.com:acme/config-repo.git"),
            Some(("acme".into(), "config-repo".into()))
        );
        assert_eq!(
            parse_github_slug("https://github.com/acme/config-repo"),
            Some(("acme".into(), "config-repo".into()))
        );
        assert_eq!(parse_github_slug("https://github.com/acme"), None);
        assert_eq!(parse_github_slug("not a url"), None);
    }

    #[test]
    fn test_decode_blob_strips_line_breaks() {
        let wrapped = "c2VydmVy\nOgogIHBv\ncnQ6IDgw\nODAK\n";
        let decoded = decode_blob(wrapped, Some("base64")).unwrap();
        assert_eq!(String::from_utf8(decoded).unwrap(), "server:\n  port: 8080\n");
    }

    #[test]
    fn test_decode_blob_passes_through_other_encodings() {
        assert_eq!(decode_blob("a: 1", Some("utf-8")).unwrap(), b"a: 1".to_vec());
        assert!(decode_blob("!!!", None).is_err());
    }

    #[test]
    fn test_safe_join_rejects_escapes() {
        let root = Path::new("/srv/snap");
        assert!(safe_join(root, "config/app.yml").is_ok());
        assert!(safe_join(root, "../etc/passwd").is_err());
        assert!(safe_join(root, "/etc/passwd").is_err());
    }

    #[test]
    fn test_tree_entry_deserialization() {
        let json = r#"{"tree":[
            {"path":"app.yml","type":"blob","sha":"a1","mode":"100644"},
            {"path":"dir","type":"tree","sha":"b2","mode":"040000"}
        ],"truncated":false}"#;
        let listing: TreeResponse = serde_json::from_str(json).unwrap();

        assert_eq!(listing.tree.len(), 2);
        assert_eq!(listing.tree[0].kind, "blob");
        assert!(!listing.truncated);
    }

    #[test]
    fn test_client_requires_github_slug() {
        let config = RepositoryConfig::builder()
            .uri("file:///tmp/repo")
            .storage(StorageMode::InMemory)
            .build()
            .unwrap();
        assert!(GitHubTreeClient::new(&config, "https://api.github.com").is_err());
    }

    #[tokio::test]
    async fn test_no_head_before_first_checkout() {
        let config = RepositoryConfig::builder()
            .uri("https://github.com/acme/config-repo.git")
            .storage(StorageMode::InMemory)
            .build()
            .unwrap();
        let client = GitHubTreeClient::new(&config, "https://api.github.com/").unwrap();

        assert!(!client.has_working_copy());
        assert_eq!(client.local_head().await.unwrap(), None);
        assert_eq!(client.content_root(), client.working_dir());
        assert_eq!(
            client.repo_url("/branches/main"),
            "https://api.github.com/repos/acme/config-repo/branches/main"
        );
    }
}
