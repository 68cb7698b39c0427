//! Git repository operations using gix (pure Rust).
//!
//! The clone under the working directory only holds history. Served files
//! are written per commit into a sibling snapshot directory, so an index
//! built from one commit never sees files of the next.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use gix::bstr::ByteSlice;
use gix::credentials::helper::Action;
use gix::credentials::protocol::Outcome;
use gix::refs::transaction::PreviousValue;
use gix::remote::fetch::Shallow;
use gix::sec::identity::Account;
use parking_lot::RwLock;
use tempfile::TempDir;
use tessera_core::ConfigFormat;
use tracing::{debug, info, warn};

use super::{RepositoryConfig, StorageMode, VersionControl};
use crate::error::ConfigSourceError;

const STAGING_PREFIX: &str = ".staging-";

/// Git client backed by gix. No system `git` is required.
///
/// Clones are shallow (depth 1) and single-branch. Updates fetch the default
/// remote, move the branch to the fetched tip and publish a snapshot of its
/// config files. The access token is handed to the transport on demand and
/// never written into the repository.
pub struct GixClient {
    uri: String,
    branch: String,
    auth_token: Option<String>,
    working_dir: PathBuf,
    snapshots: PathBuf,
    head: RwLock<Option<String>>,
    /// Owns the working copy in [`StorageMode::InMemory`].
    _scratch: Option<TempDir>,
}

impl GixClient {
    /// Creates a client for `config`.
    ///
    /// In [`StorageMode::InMemory`] a temporary directory is created here and
    /// removed when the client is dropped.
    pub fn new(config: &RepositoryConfig) -> Result<Self, ConfigSourceError> {
        let (working_dir, scratch) = match config.storage() {
            StorageMode::Local => (config.local_path().clone(), None),
            StorageMode::InMemory => {
                let scratch = tempfile::Builder::new().prefix("tessera-repo-").tempdir()?;
                (scratch.path().join("repo"), Some(scratch))
            },
        };

        Ok(Self {
            uri: config.uri().to_string(),
            branch: config.branch().to_string(),
            auth_token: config.auth_token().map(str::to_string),
            snapshots: snapshot_root(&working_dir),
            working_dir,
            head: RwLock::new(None),
            _scratch: scratch,
        })
    }

    /// Blocking clone operation using gix. Returns the cloned commit id.
    fn clone_blocking(
        uri: &str,
        branch: &str,
        token: Option<String>,
        local_path: &Path,
    ) -> Result<gix::ObjectId, ConfigSourceError> {
        if let Some(parent) = local_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let url = gix::url::parse(uri.into())
            .map_err(|e| ConfigSourceError::sync("clone", format!("invalid URL: {e}")))?;

        let mut prepare = gix::prepare_clone(url, local_path)
            .map_err(|e| ConfigSourceError::sync("clone", e))?
            .with_ref_name(Some(branch))
            .map_err(|e| ConfigSourceError::sync("clone", e))?;

        if let Some(depth) = std::num::NonZeroU32::new(1) {
            prepare = prepare.with_shallow(Shallow::DepthAtRemote(depth));
        }
        if let Some(token) = token {
            prepare = prepare.configure_connection(move |connection| {
                connection.set_credentials(token_credentials(token.clone()));
                Ok(())
            });
        }

        let (mut checkout, _outcome) = prepare
            .fetch_then_checkout(gix::progress::Discard, &gix::interrupt::IS_INTERRUPTED)
            .map_err(|e| ConfigSourceError::sync("clone", e))?;

        let (repo, _outcome) = checkout
            .main_worktree(gix::progress::Discard, &gix::interrupt::IS_INTERRUPTED)
            .map_err(|e| ConfigSourceError::sync("clone", e))?;

        Self::head_id(&repo)
    }

    /// Blocking fetch that moves the local branch to the remote tip.
    /// Returns the new tip.
    fn fetch_blocking(
        local_path: &Path,
        branch: &str,
        token: Option<String>,
    ) -> Result<gix::ObjectId, ConfigSourceError> {
        let repo = gix::open(local_path).map_err(|e| ConfigSourceError::sync("update", e))?;

        let remote = repo
            .find_default_remote(gix::remote::Direction::Fetch)
            .ok_or_else(|| ConfigSourceError::sync("update", "no default remote"))?
            .map_err(|e| ConfigSourceError::sync("update", e))?;

        let mut connection = remote
            .connect(gix::remote::Direction::Fetch)
            .map_err(|e| ConfigSourceError::sync("update", e))?;
        if let Some(token) = token {
            connection.set_credentials(token_credentials(token));
        }
        connection
            .prepare_fetch(gix::progress::Discard, Default::default())
            .map_err(|e| ConfigSourceError::sync("update", e))?
            .receive(gix::progress::Discard, &gix::interrupt::IS_INTERRUPTED)
            .map_err(|e| ConfigSourceError::sync("update", e))?;

        // Reopen so the updated remote-tracking refs are visible.
        let repo = gix::open(local_path).map_err(|e| ConfigSourceError::sync("update", e))?;
        let tip = repo
            .find_reference(format!("refs/remotes/origin/{branch}").as_str())
            .map_err(|e| ConfigSourceError::sync("update", e))?
            .into_fully_peeled_id()
            .map_err(|e| ConfigSourceError::sync("update", e))?
            .detach();

        repo.reference(
            format!("refs/heads/{branch}").as_str(),
            tip,
            PreviousValue::Any,
            format!("tessera: checkout {tip}"),
        )
        .map_err(|e| ConfigSourceError::sync("update", e))?;

        Ok(tip)
    }

    /// Writes the config files of `commit_id` into a snapshot under
    /// `snapshots` and prunes snapshots other than it and `previous`.
    fn snapshot_blocking(
        local_path: &Path,
        commit_id: gix::ObjectId,
        snapshots: &Path,
        previous: Option<&str>,
    ) -> Result<String, ConfigSourceError> {
        let checkout_err = |e: &dyn std::fmt::Display| ConfigSourceError::sync("checkout", e);

        let repo = gix::open(local_path).map_err(|e| checkout_err(&e))?;
        let tree = repo
            .find_commit(commit_id)
            .map_err(|e| checkout_err(&e))?
            .tree()
            .map_err(|e| checkout_err(&e))?;

        let mut recorder = gix::traverse::tree::Recorder::default();
        tree.traverse()
            .breadthfirst(&mut recorder)
            .map_err(|e| checkout_err(&e))?;

        let files = recorder
            .records
            .into_iter()
            .filter(|entry| entry.mode.is_blob())
            .map(|entry| (entry.filepath.to_str_lossy().into_owned(), entry.oid))
            .filter(|(path, _)| ConfigFormat::from_path(path).is_some())
            .map(|(path, oid)| {
                let blob = repo.find_object(oid).map_err(|e| checkout_err(&e))?;
                Ok::<_, ConfigSourceError>((path, blob.detach().data))
            });

        let commit = commit_id.to_string();
        publish_snapshot(snapshots, &commit, files)?;
        prune_snapshots(snapshots, &[Some(commit.as_str()), previous]);
        Ok(commit)
    }

    /// Lists the remote refs and returns the id the branch points at.
    fn remote_head_blocking(
        local_path: &Path,
        branch: &str,
        token: Option<String>,
    ) -> Result<String, ConfigSourceError> {
        let repo = gix::open(local_path)
            .map_err(|e| ConfigSourceError::git(format!("Failed to open repo: {e}")))?;

        let remote = repo
            .find_default_remote(gix::remote::Direction::Fetch)
            .ok_or_else(|| ConfigSourceError::git("No default remote found"))?
            .map_err(|e| ConfigSourceError::git(format!("Failed to find remote: {e}")))?;

        let mut connection = remote
            .connect(gix::remote::Direction::Fetch)
            .map_err(|e| ConfigSourceError::git(format!("Failed to connect: {e}")))?;
        if let Some(token) = token {
            connection.set_credentials(token_credentials(token));
        }
        let prepare = connection
            .prepare_fetch(gix::progress::Discard, Default::default())
            .map_err(|e| ConfigSourceError::git(format!("Failed to list refs: {e}")))?;

        let wanted = format!("refs/heads/{branch}");
        prepare
            .ref_map()
            .mappings
            .iter()
            .find(|m| m.remote.as_name() == Some(wanted.as_bytes().as_bstr()))
            .and_then(|m| m.remote.as_id())
            .map(|id| id.to_string())
            .ok_or_else(|| ConfigSourceError::git(format!("branch '{branch}' not found on remote")))
    }

    fn head_id(repo: &gix::Repository) -> Result<gix::ObjectId, ConfigSourceError> {
        let mut head = repo
            .head()
            .map_err(|e| ConfigSourceError::git(format!("Failed to get HEAD: {e}")))?;

        let commit = head
            .peel_to_commit_in_place()
            .map_err(|e| ConfigSourceError::git(format!("Failed to peel HEAD: {e}")))?;

        Ok(commit.id)
    }

    /// Gets the HEAD commit SHA.
    fn head_commit_blocking(local_path: &Path) -> Result<String, ConfigSourceError> {
        let repo = gix::open(local_path)
            .map_err(|e| ConfigSourceError::git(format!("Failed to open repo: {e}")))?;

        Self::head_id(&repo).map(|id| id.to_string())
    }
}

#[async_trait]
impl VersionControl for GixClient {
    fn name(&self) -> &'static str {
        "git"
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
            Some(sha) => self.snapshots.join(sha),
            None => self.working_dir.clone(),
        }
    }

    fn has_working_copy(&self) -> bool {
        self.working_dir.join(".git").exists()
    }

    async fn clone_branch(&self) -> Result<(), ConfigSourceError> {
        let uri = self.uri.clone();
        let branch = self.branch.clone();
        let token = self.auth_token.clone();
        let local_path = self.working_dir.clone();
        let snapshots = self.snapshots.clone();
        let previous = self.head.read().clone();

        info!(uri = %self.uri, branch = %self.branch, path = %local_path.display(), "cloning repository");

        let commit = tokio::task::spawn_blocking(move || {
            let tip = Self::clone_blocking(&uri, &branch, token, &local_path)?;
            Self::snapshot_blocking(&local_path, tip, &snapshots, previous.as_deref())
        })
        .await
        .map_err(|e| ConfigSourceError::sync("clone", format!("task failed: {e}")))??;

        *self.head.write() = Some(commit);
        Ok(())
    }

    async fn fetch_and_checkout(&self) -> Result<(), ConfigSourceError> {
        let branch = self.branch.clone();
        let token = self.auth_token.clone();
        let local_path = self.working_dir.clone();
        let snapshots = self.snapshots.clone();
        let previous = self.head.read().clone();

        let commit = tokio::task::spawn_blocking(move || {
            let tip = Self::fetch_blocking(&local_path, &branch, token)?;
            Self::snapshot_blocking(&local_path, tip, &snapshots, previous.as_deref())
        })
        .await
        .map_err(|e| ConfigSourceError::sync("update", format!("task failed: {e}")))??;

        info!(commit = %commit, branch = %self.branch, "repository updated");
        *self.head.write() = Some(commit);
        Ok(())
    }

    async fn local_head(&self) -> Result<Option<String>, ConfigSourceError> {
        if !self.has_working_copy() {
            return Ok(None);
        }
        let local_path = self.working_dir.clone();

        tokio::task::spawn_blocking(move || Self::head_commit_blocking(&local_path))
            .await
            .map_err(|e| ConfigSourceError::git(format!("Task failed: {e}")))?
            .map(Some)
    }

    async fn remote_head(&self) -> Result<String, ConfigSourceError> {
        let branch = self.branch.clone();
        let token = self.auth_token.clone();
        let local_path = self.working_dir.clone();

        tokio::task::spawn_blocking(move || Self::remote_head_blocking(&local_path, &branch, token))
            .await
            .map_err(|e| ConfigSourceError::git(format!("Task failed: {e}")))?
    }
}

impl std::fmt::Debug for GixClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GixClient")
            .field("uri", &self.uri)
            .field("branch", &self.branch)
            .field("working_dir", &self.working_dir)
            .field("head", &*self.head.read())
            .finish()
    }
}

/// Credential helper answering every request with `token` as the username.
fn token_credentials(token: String) -> impl FnMut(Action) -> gix::credentials::protocol::Result {
    move |action| match action {
        Action::Get(context) => Ok(Some(Outcome {
            identity: Account {
                username: token.clone(),
                password: String::new(),
            },
            next: context.into(),
        })),
        Action::Store(_) | Action::Erase(_) => Ok(None),
    }
}

/// Directory next to `working_dir` that holds per-commit snapshots.
fn snapshot_root(working_dir: &Path) -> PathBuf {
    let mut name = working_dir
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "repo".into());
    name.push("-snapshots");
    working_dir.with_file_name(name)
}

/// Writes `files` into `root/commit` through a staging directory.
///
/// An existing snapshot of `commit` is kept as is and `files` is not read.
fn publish_snapshot<I>(root: &Path, commit: &str, files: I) -> Result<PathBuf, ConfigSourceError>
where
    I: IntoIterator<Item = Result<(String, Vec<u8>), ConfigSourceError>>,
{
    let target = root.join(commit);
    if target.exists() {
        debug!(commit, "snapshot already present");
        return Ok(target);
    }

    let staging = root.join(format!("{STAGING_PREFIX}{commit}"));
    if staging.exists() {
        std::fs::remove_dir_all(&staging)?;
    }
    std::fs::create_dir_all(&staging)?;

    let written = write_files(&staging, files);
    let count = match written {
        Ok(count) => count,
        Err(e) => {
            let _ = std::fs::remove_dir_all(&staging);
            return Err(e);
        },
    };

    std::fs::rename(&staging, &target)?;
    debug!(commit, files = count, "snapshot written");
    Ok(target)
}

fn write_files<I>(root: &Path, files: I) -> Result<usize, ConfigSourceError>
where
    I: IntoIterator<Item = Result<(String, Vec<u8>), ConfigSourceError>>,
{
    let mut count = 0;
    for file in files {
        let (relative, data) = file?;
        let escapes = Path::new(&relative)
            .components()
            .any(|c| !matches!(c, std::path::Component::Normal(_)));
        if escapes {
            return Err(ConfigSourceError::sync("checkout", format!("refusing tree path '{relative}'")));
        }

        let target = root.join(&relative);
        if let Some(parent) = target.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&target, data)?;
        count += 1;
    }
    Ok(count)
}

/// Removes every snapshot under `root` not named in `keep`. Staging
/// directories are left for the next attempt at that commit to replace.
fn prune_snapshots(root: &Path, keep: &[Option<&str>]) {
    let Ok(entries) = std::fs::read_dir(root) else {
        return;
    };

    for entry in entries.flatten() {
        let name = entry.file_name().to_string_lossy().to_string();
        if name.starts_with(STAGING_PREFIX) || keep.contains(&Some(name.as_str())) {
            continue;
        }
        if entry.file_type().is_ok_and(|t| t.is_dir())
            && let Err(e) = std::fs::remove_dir_all(entry.path())
        {
            warn!(path = %entry.path().display(), error = %e, "failed to prune snapshot");
        }
    }
}
