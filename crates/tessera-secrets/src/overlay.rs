//! Overlaying secrets onto resolved property sources.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use arc_swap::ArcSwap;
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use parking_lot::{Mutex, RwLock};
use serde::Serialize;
use tessera_core::{ConfigValue, PropertySource};
use tokio::sync::watch;
use tracing::{debug, info, instrument, warn};

use crate::provider::{SecretProvider, SecretQuery};
use crate::store::SecretStore;

/// Status of a refresh request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RefreshStatus {
    /// The store was replaced.
    Ok,
    /// Another refresh was running; nothing was started.
    InProgress,
    /// The provider failed; the previous store was kept.
    Failed,
}

/// Result of [`SecretOverlay::refresh`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshOutcome {
    pub status: RefreshStatus,
    /// Completion time of the last successful load.
    pub loaded_at: Option<DateTime<Utc>>,
}

/// Holds the current [`SecretStore`] and applies it to property sources.
pub struct SecretOverlay {
    provider: Arc<dyn SecretProvider>,
    query: SecretQuery,
    store: ArcSwap<SecretStore>,
    refreshing: AtomicBool,
    loaded_at: RwLock<Option<DateTime<Utc>>>,
    schedule: Mutex<Option<watch::Sender<bool>>>,
    observer: RwLock<Option<Observer>>,
}

type Observer = Arc<dyn Fn(&RefreshOutcome) + Send + Sync>;

/// Clears the in-flight flag when a refresh ends, however it ends.
struct InFlight<'a>(&'a AtomicBool);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl SecretOverlay {
    /// Creates an overlay with an empty store.
    pub fn new(provider: Arc<dyn SecretProvider>, query: SecretQuery) -> Self {
        Self {
            provider,
            query,
            store: ArcSwap::from_pointee(SecretStore::default()),
            refreshing: AtomicBool::new(false),
            loaded_at: RwLock::new(None),
            schedule: Mutex::new(None),
            observer: RwLock::new(None),
        }
    }

    /// Registers a callback invoked with every refresh outcome, scheduled
    /// or manual.
    pub fn set_observer(&self, observer: impl Fn(&RefreshOutcome) + Send + Sync + 'static) {
        *self.observer.write() = Some(Arc::new(observer));
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// The store currently applied.
    pub fn store(&self) -> Arc<SecretStore> {
        self.store.load_full()
    }

    pub fn loaded_at(&self) -> Option<DateTime<Utc>> {
        *self.loaded_at.read()
    }

    /// Loads the full secret set and replaces the store.
    ///
    /// A call made while another refresh runs returns
    /// [`RefreshStatus::InProgress`] at once. Provider failures are logged
    /// and leave the current store untouched.
    #[instrument(skip_all, fields(provider = self.provider.name()))]
    pub async fn refresh(&self) -> RefreshOutcome {
        let outcome = self.refresh_inner().await;

        let observer = self.observer.read().clone();
        if let Some(observer) = observer {
            observer(&outcome);
        }
        outcome
    }

    async fn refresh_inner(&self) -> RefreshOutcome {
        if self
            .refreshing
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!("secret refresh already in progress");
            return self.outcome(RefreshStatus::InProgress);
        }
        let _in_flight = InFlight(&self.refreshing);

        match self.provider.get(&self.query).await {
            Ok(items) => {
                let store = SecretStore::from_items(items);
                let count = store.len();
                self.store.store(Arc::new(store));
                *self.loaded_at.write() = Some(Utc::now());
                info!(count, "secrets loaded");
                self.outcome(RefreshStatus::Ok)
            },
            Err(e) => {
                warn!(error = %e, "secret refresh failed; keeping previous secrets");
                self.outcome(RefreshStatus::Failed)
            },
        }
    }

    fn outcome(&self, status: RefreshStatus) -> RefreshOutcome {
        RefreshOutcome {
            status,
            loaded_at: self.loaded_at(),
        }
    }

    /// Returns copies of `sources` with secret values substituted.
    ///
    /// Each leaf is looked up by its dot path and by its own key (see
    /// [`SecretStore::lookup`]). Only nested mappings are descended into;
    /// arrays are replaced or kept whole.
    pub fn apply(&self, sources: &[PropertySource]) -> Vec<PropertySource> {
        let store = self.store();
        sources
            .iter()
            .map(|source| {
                let mut copy = source.clone();
                if !store.is_empty() {
                    overlay_map(&store, copy.source.as_inner_mut(), "");
                }
                copy
            })
            .collect()
    }

    /// Refreshes every `interval` on a background task. Returns false if a
    /// schedule is already running.
    pub fn start_schedule(self: &Arc<Self>, interval: Duration) -> bool {
        let mut schedule = self.schedule.lock();
        if schedule.is_some() {
            warn!("secret refresh schedule already running; ignoring");
            return false;
        }

        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
        let overlay = Arc::downgrade(self);
        tokio::spawn(async move {
            info!(?interval, "starting secret refresh schedule");
            loop {
                tokio::select! {
                    _ = tokio::time::sleep(interval) => {
                        let Some(overlay) = overlay.upgrade() else { break };
                        overlay.refresh().await;
                    }
                    result = shutdown_rx.changed() => {
                        if result.is_err() || *shutdown_rx.borrow() {
                            break;
                        }
                    }
                }
            }
            debug!("secret refresh schedule stopped");
        });

        *schedule = Some(shutdown_tx);
        true
    }

    /// Stops the background schedule. Returns false if none was running.
    pub fn stop_schedule(&self) -> bool {
        match self.schedule.lock().take() {
            Some(tx) => {
                let _ = tx.send(true);
                true
            },
            None => false,
        }
    }
}

impl Drop for SecretOverlay {
    fn drop(&mut self) {
        self.stop_schedule();
    }
}

impl std::fmt::Debug for SecretOverlay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecretOverlay")
            .field("provider", &self.provider.name())
            .field("query", &self.query)
            .field("secrets", &self.store.load().len())
            .field("loaded_at", &self.loaded_at())
            .finish()
    }
}

fn overlay_map(store: &SecretStore, map: &mut IndexMap<String, ConfigValue>, prefix: &str) {
    for (key, value) in map.iter_mut() {
        let path = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };

        match value {
            ConfigValue::Object(nested) => overlay_map(store, nested, &path),
            leaf => {
                if let Some(secret) = store.lookup(&path, key) {
                    *leaf = ConfigValue::String(secret.to_string());
                }
            },
        }
    }
}
