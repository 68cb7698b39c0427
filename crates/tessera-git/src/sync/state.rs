//! Repository state tracking.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::Serialize;

/// State of the tracked repository, owned by the synchronizer.
///
/// `ready` gates resolution. The other fields describe the last
/// synchronization attempt.
#[derive(Debug)]
pub struct RepositoryState {
    local_path: PathBuf,
    remote_url: String,
    branch: String,
    commit: RwLock<Option<String>>,
    ready: AtomicBool,
    last_sync: RwLock<Option<DateTime<Utc>>>,
    last_error: RwLock<Option<String>>,
    failure_count: RwLock<u32>,
}

/// Point-in-time copy of [`RepositoryState`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RepositoryStatus {
    pub local_path: PathBuf,
    pub remote_url: String,
    pub branch: String,
    pub commit: Option<String>,
    pub ready: bool,
    pub last_sync: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
    pub consecutive_failures: u32,
}

impl RepositoryState {
    pub fn new(
        local_path: impl Into<PathBuf>,
        remote_url: impl Into<String>,
        branch: impl Into<String>,
    ) -> Self {
        Self {
            local_path: local_path.into(),
            remote_url: remote_url.into(),
            branch: branch.into(),
            commit: RwLock::new(None),
            ready: AtomicBool::new(false),
            last_sync: RwLock::new(None),
            last_error: RwLock::new(None),
            failure_count: RwLock::new(0),
        }
    }

    pub fn local_path(&self) -> &Path {
        &self.local_path
    }

    pub fn remote_url(&self) -> &str {
        &self.remote_url
    }

    pub fn branch(&self) -> &str {
        &self.branch
    }

    /// The last synchronized commit id.
    pub fn commit(&self) -> Option<String> {
        self.commit.read().clone()
    }

    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }

    pub fn set_ready(&self, ready: bool) {
        self.ready.store(ready, Ordering::Release);
    }

    pub fn last_sync(&self) -> Option<DateTime<Utc>> {
        *self.last_sync.read()
    }

    /// Records a successful synchronization.
    pub fn record_success(&self, commit: Option<String>) {
        let mut commit_lock = self.commit.write();
        let mut last_sync = self.last_sync.write();
        let mut last_error = self.last_error.write();
        let mut failure_count = self.failure_count.write();

        *commit_lock = commit;
        *last_sync = Some(Utc::now());
        *last_error = None;
        *failure_count = 0;
    }

    /// Records a failed synchronization. The commit is left as it was.
    pub fn record_failure(&self, error: impl Into<String>) {
        let mut last_error = self.last_error.write();
        let mut failure_count = self.failure_count.write();

        *last_error = Some(error.into());
        *failure_count += 1;
    }

    pub fn last_error(&self) -> Option<String> {
        self.last_error.read().clone()
    }

    /// Number of consecutive failures.
    pub fn failure_count(&self) -> u32 {
        *self.failure_count.read()
    }

    pub fn snapshot(&self) -> RepositoryStatus {
        RepositoryStatus {
            local_path: self.local_path.clone(),
            remote_url: self.remote_url.clone(),
            branch: self.branch.clone(),
            commit: self.commit(),
            ready: self.is_ready(),
            last_sync: self.last_sync(),
            last_error: self.last_error(),
            consecutive_failures: self.failure_count(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> RepositoryState {
        RepositoryState::new("/var/lib/repo", "https://example.com/repo.git", "main")
    }

    #[test]
    fn test_new_state() {
        let state = state();
        assert!(state.commit().is_none());
        assert!(state.last_sync().is_none());
        assert!(!state.is_ready());
    }

    #[test]
    fn test_record_success() {
        let state = state();
        state.record_success(Some("abc123".into()));

        assert_eq!(state.commit(), Some("abc123".to_string()));
        assert!(state.last_sync().is_some());
        assert_eq!(state.failure_count(), 0);
    }

    #[test]
    fn test_failure_keeps_commit() {
        let state = state();
        state.record_success(Some("abc123".into()));
        state.record_failure("network error");
        state.record_failure("timeout");

        assert_eq!(state.failure_count(), 2);
        assert_eq!(state.last_error(), Some("timeout".to_string()));
        assert_eq!(state.commit(), Some("abc123".to_string()));
    }

    #[test]
    fn test_success_resets_failure() {
        let state = state();
        state.record_failure("error 1");
        state.record_failure("error 2");

        state.record_success(None);
        assert_eq!(state.failure_count(), 0);
        assert!(state.last_error().is_none());
    }

    #[test]
    fn test_snapshot_serializes_camel_case() {
        let state = state();
        state.set_ready(true);

        let json = serde_json::to_value(state.snapshot()).unwrap();
        assert_eq!(json["ready"], true);
        assert_eq!(json["remoteUrl"], "https://example.com/repo.git");
        assert_eq!(json["consecutiveFailures"], 0);
        assert!(json["commit"].is_null());
    }
}
