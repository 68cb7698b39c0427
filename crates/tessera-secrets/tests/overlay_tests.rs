//! Refresh behaviour of the secret overlay against scripted providers.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tessera_secrets::{
    RefreshStatus, SecretError, SecretItem, SecretOverlay, SecretProvider, SecretQuery,
};
use tokio::sync::Notify;

/// Provider whose answers are scripted by the test.
#[derive(Default)]
struct ScriptedProvider {
    failing: AtomicBool,
    calls: AtomicUsize,
    generation: AtomicUsize,
    gate: Option<Arc<Notify>>,
}

impl ScriptedProvider {
    fn gated(gate: Arc<Notify>) -> Self {
        Self {
            gate: Some(gate),
            ..Self::default()
        }
    }
}

#[async_trait]
impl SecretProvider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn get(&self, query: &SecretQuery) -> Result<Vec<SecretItem>, SecretError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        if self.failing.load(Ordering::SeqCst) {
            return Err(SecretError::provider(self.name(), "backend down"));
        }
        let generation = self.generation.fetch_add(1, Ordering::SeqCst);
        Ok(vec![
            SecretItem::new("db.password", format!("pw-{generation}")),
            SecretItem::new("APP", query.app_id.clone()),
        ])
    }
}

fn overlay(provider: Arc<ScriptedProvider>) -> Arc<SecretOverlay> {
    Arc::new(SecretOverlay::new(provider, SecretQuery::new("orders", "production")))
}

#[tokio::test]
async fn failed_refresh_keeps_previous_store() {
    let provider = Arc::new(ScriptedProvider::default());
    let overlay = overlay(Arc::clone(&provider));

    assert_eq!(overlay.refresh().await.status, RefreshStatus::Ok);
    let before = overlay.store();
    let loaded_at = overlay.loaded_at();

    provider.failing.store(true, Ordering::SeqCst);
    let outcome = overlay.refresh().await;

    assert_eq!(outcome.status, RefreshStatus::Failed);
    assert_eq!(outcome.loaded_at, loaded_at);
    assert_eq!(*overlay.store(), *before);
    assert_eq!(overlay.store().get("db.password"), Some("pw-0"));
    assert_eq!(overlay.store().get("APP"), Some("orders"));
}

#[tokio::test]
async fn successful_refresh_replaces_store_wholesale() {
    let provider = Arc::new(ScriptedProvider::default());
    let overlay = overlay(Arc::clone(&provider));

    overlay.refresh().await;
    overlay.refresh().await;

    assert_eq!(overlay.store().get("db.password"), Some("pw-1"));
    assert_eq!(overlay.store().len(), 2);
}

#[tokio::test]
async fn concurrent_refresh_reports_in_progress() {
    let gate = Arc::new(Notify::new());
    let provider = Arc::new(ScriptedProvider::gated(Arc::clone(&gate)));
    let overlay = overlay(Arc::clone(&provider));

    let first = tokio::spawn({
        let overlay = Arc::clone(&overlay);
        async move { overlay.refresh().await }
    });

    while provider.calls.load(Ordering::SeqCst) == 0 {
        tokio::task::yield_now().await;
    }

    let second = overlay.refresh().await;
    assert_eq!(second.status, RefreshStatus::InProgress);
    assert!(second.loaded_at.is_none());

    gate.notify_one();
    let first = first.await.unwrap();
    assert_eq!(first.status, RefreshStatus::Ok);
    assert_eq!(provider.calls.load(Ordering::SeqCst), 1);

    // The flag is released, so a later refresh runs normally.
    gate.notify_one();
    assert_eq!(overlay.refresh().await.status, RefreshStatus::Ok);
}

#[tokio::test]
async fn schedule_start_is_idempotent_and_refreshes() {
    let provider = Arc::new(ScriptedProvider::default());
    let overlay = overlay(Arc::clone(&provider));

    assert!(overlay.start_schedule(Duration::from_millis(10)));
    assert!(!overlay.start_schedule(Duration::from_millis(10)));

    for _ in 0..100 {
        if overlay.loaded_at().is_some() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    assert!(overlay.stop_schedule());
    assert!(!overlay.stop_schedule());
    assert!(overlay.loaded_at().is_some());
}
