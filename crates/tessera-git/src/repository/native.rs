//! Serving a plain local directory.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;

use async_trait::async_trait;
use parking_lot::RwLock;

use super::{RepositoryConfig, VersionControl};
use crate::error::ConfigSourceError;

/// [`VersionControl`] over a directory that is edited in place.
///
/// There is no remote: the "commit id" is a fingerprint of every file's
/// path, size and modification time, so polling notices edits.
#[derive(Debug)]
pub struct NativeClient {
    root: PathBuf,
    uri: String,
    branch: String,
    head: RwLock<Option<String>>,
}

impl NativeClient {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            uri: format!("file://{}", root.display()),
            root,
            branch: "main".to_string(),
            head: RwLock::new(None),
        }
    }

    /// Creates a client for the directory named by a `file://` URI or plain path.
    pub fn from_config(config: &RepositoryConfig) -> Self {
        let path = config.uri().strip_prefix("file://").unwrap_or(config.uri());
        Self::new(path).with_branch(config.branch())
    }

    /// Sets the label reported for the served files.
    pub fn with_branch(mut self, branch: impl Into<String>) -> Self {
        self.branch = branch.into();
        self
    }

    async fn fingerprint_root(&self) -> Result<String, ConfigSourceError> {
        let root = self.root.clone();
        tokio::task::spawn_blocking(move || fingerprint(&root))
            .await
            .map_err(|e| ConfigSourceError::remote(format!("task failed: {e}")))?
    }
}

#[async_trait]
impl VersionControl for NativeClient {
    fn name(&self) -> &'static str {
        "native"
    }

    fn remote_url(&self) -> &str {
        &self.uri
    }

    fn branch(&self) -> &str {
        &self.branch
    }

    fn working_dir(&self) -> PathBuf {
        self.root.clone()
    }

    fn has_working_copy(&self) -> bool {
        self.head.read().is_some()
    }

    async fn clone_branch(&self) -> Result<(), ConfigSourceError> {
        self.fetch_and_checkout().await
    }

    async fn fetch_and_checkout(&self) -> Result<(), ConfigSourceError> {
        let print = self.fingerprint_root().await?;
        *self.head.write() = Some(print);
        Ok(())
    }

    async fn local_head(&self) -> Result<Option<String>, ConfigSourceError> {
        Ok(self.head.read().clone())
    }

    async fn remote_head(&self) -> Result<String, ConfigSourceError> {
        self.fingerprint_root().await
    }
}

/// Hashes the path, size and mtime of every file under `root`.
fn fingerprint(root: &Path) -> Result<String, ConfigSourceError> {
    if !root.is_dir() {
        return Err(ConfigSourceError::sync(
            "read",
            format!("{} is not a directory", root.display()),
        ));
    }

    let mut entries = Vec::new();
    collect(root, root, &mut entries)?;
    entries.sort();

    let mut hasher = DefaultHasher::new();
    entries.hash(&mut hasher);
    Ok(format!("{:016x}", hasher.finish()))
}

fn collect(
    root: &Path,
    dir: &Path,
    out: &mut Vec<(String, u64, u128)>,
) -> Result<(), ConfigSourceError> {
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let file_type = entry.file_type()?;
        if file_type.is_dir() {
            if entry.file_name() != ".git" {
                collect(root, &entry.path(), out)?;
            }
        } else if file_type.is_file() {
            let meta = entry.metadata()?;
            let modified = meta
                .modified()
                .ok()
                .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
                .map(|d| d.as_nanos())
                .unwrap_or_default();
            let path = entry.path();
            let relative = path.strip_prefix(root).unwrap_or(&path);
            out.push((relative.to_string_lossy().to_string(), meta.len(), modified));
        }
    }
    Ok(())
}
