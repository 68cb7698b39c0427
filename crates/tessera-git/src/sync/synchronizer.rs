use std::sync::Arc;
use std::time::Duration;

use parking_lot::{Mutex, RwLock};
use serde::Serialize;
use tracing::{debug, error, info, instrument, warn};

use super::scheduler::{PollConfig, PollHandle, PollScheduler};
use super::state::{RepositoryState, RepositoryStatus};
use crate::error::ConfigSourceError;
use crate::index::{ConfigIndex, IndexHandle};
use crate::repository::VersionControl;

/// Result of one polling tick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "camelCase")]
pub enum PollOutcome {
    /// Local and remote heads matched; nothing was fetched.
    Unchanged,
    /// The working copy moved and a new index was published.
    Updated { commit: Option<String> },
    /// The tick failed; the previous index stays published.
    Failed { message: String },
}

type Observer = Arc<dyn Fn(&PollOutcome) + Send + Sync>;

/// Owns the working copy, its state and the published [`ConfigIndex`].
///
/// Every synchronization (start or poll tick) rebuilds the index off to the
/// side and publishes it in one swap. Synchronizations never overlap.
pub struct RepositorySynchronizer {
    vcs: Arc<dyn VersionControl>,
    state: RepositoryState,
    index: IndexHandle,
    sync_lock: tokio::sync::Mutex<()>,
    poll_defaults: PollConfig,
    poller: Mutex<Option<PollHandle>>,
    observer: RwLock<Option<Observer>>,
}

impl RepositorySynchronizer {
    pub fn new(vcs: Arc<dyn VersionControl>) -> Self {
        let state = RepositoryState::new(vcs.working_dir(), vcs.remote_url(), vcs.branch());
        let index = IndexHandle::new(ConfigIndex::empty(vcs.content_root()));

        Self {
            vcs,
            state,
            index,
            sync_lock: tokio::sync::Mutex::new(()),
            poll_defaults: PollConfig::default(),
            poller: Mutex::new(None),
            observer: RwLock::new(None),
        }
    }

    /// Sets the backoff used by [`start_polling`](Self::start_polling).
    pub fn with_poll_config(mut self, config: PollConfig) -> Self {
        self.poll_defaults = config;
        self
    }

    /// Registers a callback invoked after every poll tick.
    pub fn set_observer(&self, observer: impl Fn(&PollOutcome) + Send + Sync + 'static) {
        *self.observer.write() = Some(Arc::new(observer));
    }

    /// Clones or updates the working copy and publishes a fresh index.
    ///
    /// Resolution is gated for the duration and reopens only once the new
    /// index is published. On failure the gate stays closed; the previous
    /// index stays published for the next successful attempt to replace.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigSourceError::Sync`] describing the failed step.
    #[instrument(skip_all, fields(backend = self.vcs.name(), branch = %self.state.branch()))]
    pub async fn start(&self) -> Result<(), ConfigSourceError> {
        let _guard = self.sync_lock.lock().await;
        self.state.set_ready(false);

        let result = async {
            if self.vcs.has_working_copy() {
                debug!("working copy present; fetching");
                self.vcs
                    .fetch_and_checkout()
                    .await
                    .map_err(|e| as_sync_error("update", e))?;
            } else {
                self.vcs.clone_branch().await.map_err(|e| as_sync_error("clone", e))?;
            }
            self.rebuild_index().await
        }
        .await;

        match result {
            Ok(commit) => {
                info!(commit = ?commit, files = self.index.load().len(), "repository ready");
                self.state.record_success(commit);
                self.state.set_ready(true);
                Ok(())
            },
            Err(e) => {
                error!(error = %e, "repository synchronization failed");
                self.state.record_failure(e.to_string());
                Err(e)
            },
        }
    }

    /// Runs one polling tick.
    ///
    /// Compares the remote tip to local HEAD and only fetches on mismatch.
    /// A fetch closes the readiness gate until its index is published.
    /// Failures are recorded and returned as [`PollOutcome::Failed`].
    #[instrument(skip_all, fields(backend = self.vcs.name()))]
    pub async fn poll_once(&self) -> PollOutcome {
        let outcome = {
            let _guard = self.sync_lock.lock().await;
            match self.poll_locked().await {
                Ok(outcome) => outcome,
                Err(e) => {
                    warn!(error = %e, "poll failed; keeping current index");
                    self.state.record_failure(e.to_string());
                    PollOutcome::Failed {
                        message: e.to_string(),
                    }
                },
            }
        };

        let observer = self.observer.read().clone();
        if let Some(observer) = observer {
            observer(&outcome);
        }
        outcome
    }

    async fn poll_locked(&self) -> Result<PollOutcome, ConfigSourceError> {
        if !self.vcs.has_working_copy() {
            self.state.set_ready(false);
            self.vcs.clone_branch().await.map_err(|e| as_sync_error("clone", e))?;
        } else {
            let remote = self.vcs.remote_head().await?;
            let local = self.vcs.local_head().await.unwrap_or_else(|e| {
                debug!(error = %e, "local head unavailable");
                None
            });

            if local.as_deref() == Some(remote.as_str()) {
                debug!(commit = %remote, "remote unchanged");
                return Ok(PollOutcome::Unchanged);
            }

            info!(local = ?local, remote = %remote, "remote changed; updating");
            self.state.set_ready(false);
            self.vcs
                .fetch_and_checkout()
                .await
                .map_err(|e| as_sync_error("update", e))?;
        }

        let commit = self.rebuild_index().await?;
        self.state.record_success(commit.clone());
        self.state.set_ready(true);
        Ok(PollOutcome::Updated { commit })
    }

    /// Builds a new index from the current checkout and publishes it.
    async fn rebuild_index(&self) -> Result<Option<String>, ConfigSourceError> {
        let index = ConfigIndex::build_async(self.vcs.content_root()).await?;
        let commit = self.vcs.local_head().await?;
        self.index.publish(index);
        Ok(commit)
    }

    /// Starts the background poller. Returns false, with a warning, if it
    /// is already running.
    pub fn start_polling(self: &Arc<Self>, interval: Duration) -> bool {
        let mut poller = self.poller.lock();
        if poller.is_some() {
            warn!("repository polling already started; ignoring");
            return false;
        }

        let config = PollConfig {
            interval,
            ..self.poll_defaults.clone()
        };
        *poller = Some(PollScheduler::new(Arc::downgrade(self), config).start());
        true
    }

    /// Stops the background poller. Returns false if it was not running.
    pub fn stop_polling(&self) -> bool {
        match self.poller.lock().take() {
            Some(handle) => {
                handle.stop();
                true
            },
            None => false,
        }
    }

    pub fn is_polling(&self) -> bool {
        self.poller.lock().is_some()
    }

    /// The last synchronized commit id.
    pub fn current_version(&self) -> Option<String> {
        self.state.commit()
    }

    pub fn is_ready(&self) -> bool {
        self.state.is_ready()
    }

    pub fn branch(&self) -> &str {
        self.state.branch()
    }

    /// Snapshot of the published index.
    pub fn index(&self) -> Arc<ConfigIndex> {
        self.index.load()
    }

    pub fn state(&self) -> &RepositoryState {
        &self.state
    }

    pub fn status(&self) -> RepositoryStatus {
        self.state.snapshot()
    }

    pub fn backend_name(&self) -> &'static str {
        self.vcs.name()
    }
}

impl std::fmt::Debug for RepositorySynchronizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RepositorySynchronizer")
            .field("backend", &self.vcs.name())
            .field("state", &self.state)
            .field("polling", &self.is_polling())
            .finish()
    }
}

fn as_sync_error(step: &str, error: ConfigSourceError) -> ConfigSourceError {
    match error {
        ConfigSourceError::Sync { .. } => error,
        other => ConfigSourceError::sync(step, other),
    }
}
