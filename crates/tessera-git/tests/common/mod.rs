//! Shared fixtures for tessera-git integration tests.

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;
use tempfile::TempDir;
use tessera_git::{ConfigSourceError, RepositorySynchronizer, VersionControl};

/// In-process stand-in for a remote repository.
///
/// `push` stages files and a new remote head; the next checkout writes
/// them into the working directory. Every checkout is counted.
pub struct FakeVcs {
    dir: TempDir,
    remote: Mutex<String>,
    local: Mutex<Option<String>>,
    staged: Mutex<Vec<(String, String)>>,
    failing: AtomicBool,
    checkout_failing: AtomicBool,
    pub clones: AtomicUsize,
    pub fetches: AtomicUsize,
}

impl FakeVcs {
    pub fn new(commit: &str, files: &[(&str, &str)]) -> Self {
        let vcs = Self {
            dir: TempDir::new().unwrap(),
            remote: Mutex::new(String::new()),
            local: Mutex::new(None),
            staged: Mutex::new(Vec::new()),
            failing: AtomicBool::new(false),
            checkout_failing: AtomicBool::new(false),
            clones: AtomicUsize::new(0),
            fetches: AtomicUsize::new(0),
        };
        vcs.push(commit, files);
        vcs
    }

    /// Publishes a new remote head carrying `files`.
    pub fn push(&self, commit: &str, files: &[(&str, &str)]) {
        *self.remote.lock() = commit.to_string();
        self.staged.lock().extend(
            files
                .iter()
                .map(|(name, content)| (name.to_string(), content.to_string())),
        );
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Keeps the remote reachable but fails every clone and fetch.
    pub fn set_checkout_failing(&self, failing: bool) {
        self.checkout_failing.store(failing, Ordering::SeqCst);
    }

    pub fn checkouts(&self) -> usize {
        self.clones.load(Ordering::SeqCst) + self.fetches.load(Ordering::SeqCst)
    }

    fn check_reachable(&self) -> Result<(), ConfigSourceError> {
        if self.failing.load(Ordering::SeqCst) {
            Err(ConfigSourceError::remote("remote unreachable"))
        } else {
            Ok(())
        }
    }

    fn checkout(&self) -> Result<(), ConfigSourceError> {
        self.check_reachable()?;
        if self.checkout_failing.load(Ordering::SeqCst) {
            return Err(ConfigSourceError::git("checkout failed"));
        }
        for (name, content) in self.staged.lock().drain(..) {
            let path = self.dir.path().join(name);
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(path, content)?;
        }
        *self.local.lock() = Some(self.remote.lock().clone());
        Ok(())
    }
}

#[async_trait]
impl VersionControl for FakeVcs {
    fn name(&self) -> &'static str {
        "fake"
    }

    fn remote_url(&self) -> &str {
        "fake://config"
    }

    fn branch(&self) -> &str {
        "main"
    }

    fn working_dir(&self) -> PathBuf {
        self.dir.path().to_path_buf()
    }

    fn has_working_copy(&self) -> bool {
        self.local.lock().is_some()
    }

    async fn clone_branch(&self) -> Result<(), ConfigSourceError> {
        self.clones.fetch_add(1, Ordering::SeqCst);
        self.checkout()
    }

    async fn fetch_and_checkout(&self) -> Result<(), ConfigSourceError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.checkout()
    }

    async fn local_head(&self) -> Result<Option<String>, ConfigSourceError> {
        Ok(self.local.lock().clone())
    }

    async fn remote_head(&self) -> Result<String, ConfigSourceError> {
        self.check_reachable()?;
        Ok(self.remote.lock().clone())
    }
}

/// The repository used by the precedence examples.
pub const PRECEDENCE_FILES: &[(&str, &str)] = &[
    ("application.yml", "a: 1\n"),
    ("application-dev.yml", "b: 2\n"),
    ("service-x.yml", "a: 10\nc: 3\n"),
    ("service-x-dev.yml", "c: 30\n"),
];

pub fn synchronizer(vcs: &Arc<FakeVcs>) -> Arc<RepositorySynchronizer> {
    let vcs: Arc<dyn VersionControl> = vcs.clone();
    Arc::new(RepositorySynchronizer::new(vcs))
}

pub async fn started(files: &[(&str, &str)]) -> (Arc<FakeVcs>, Arc<RepositorySynchronizer>) {
    let vcs = Arc::new(FakeVcs::new("c1", files));
    let sync = synchronizer(&vcs);
    sync.start().await.unwrap();
    (vcs, sync)
}
