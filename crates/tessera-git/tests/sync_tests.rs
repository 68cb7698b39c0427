//! Synchronizer lifecycle, readiness and polling behaviour.

mod common;

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use common::{FakeVcs, PRECEDENCE_FILES, started, synchronizer};
use tessera_git::{ConfigResolver, ConfigSourceError, PollOutcome};

#[tokio::test]
async fn resolution_before_first_sync_is_not_ready() {
    let vcs = Arc::new(FakeVcs::new("c1", PRECEDENCE_FILES));
    let resolver = ConfigResolver::new(synchronizer(&vcs));

    for (app, profiles, label) in [
        ("service-x", "dev", None),
        ("application", "", Some("main")),
        ("unknown", "a,b,c", Some("release")),
    ] {
        let err = resolver.resolve(app, profiles, label).await.unwrap_err();
        assert!(matches!(err, ConfigSourceError::NotReady));
        assert_eq!(err.status_code(), 503);
    }
}

#[tokio::test]
async fn start_clones_then_becomes_ready() {
    let (vcs, sync) = started(PRECEDENCE_FILES).await;

    assert!(sync.is_ready());
    assert_eq!(vcs.clones.load(Ordering::SeqCst), 1);
    assert_eq!(vcs.fetches.load(Ordering::SeqCst), 0);
    assert_eq!(sync.current_version().as_deref(), Some("c1"));
    assert_eq!(sync.index().len(), 4);

    let status = sync.status();
    assert!(status.ready);
    assert!(status.last_sync.is_some());
    assert_eq!(status.branch, "main");
}

#[tokio::test]
async fn second_start_fetches_instead_of_cloning() {
    let (vcs, sync) = started(PRECEDENCE_FILES).await;

    sync.start().await.unwrap();

    assert_eq!(vcs.clones.load(Ordering::SeqCst), 1);
    assert_eq!(vcs.fetches.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn failed_first_start_reports_sync_error() {
    let vcs = Arc::new(FakeVcs::new("c1", PRECEDENCE_FILES));
    vcs.set_failing(true);
    let sync = synchronizer(&vcs);

    let err = sync.start().await.unwrap_err();

    assert!(!sync.is_ready());
    assert_eq!(err.status_code(), 500);
    assert!(err.to_string().starts_with("Failed to clone Git repository"));
    assert_eq!(sync.status().consecutive_failures, 1);
}

#[tokio::test]
async fn failed_restart_closes_gate_but_keeps_index() {
    let (vcs, sync) = started(PRECEDENCE_FILES).await;
    let before = sync.index();

    vcs.set_failing(true);
    assert!(sync.start().await.is_err());

    assert!(!sync.is_ready());
    assert!(Arc::ptr_eq(&before, &sync.index()));
    let err = ConfigResolver::new(Arc::clone(&sync))
        .resolve("service-x", "dev", None)
        .await
        .unwrap_err();
    assert!(matches!(err, ConfigSourceError::NotReady));

    vcs.set_failing(false);
    sync.start().await.unwrap();
    assert!(sync.is_ready());
}

#[tokio::test]
async fn unchanged_poll_does_no_work() {
    let (vcs, sync) = started(PRECEDENCE_FILES).await;
    let before = sync.index();
    let checkouts = vcs.checkouts();

    assert_eq!(sync.poll_once().await, PollOutcome::Unchanged);
    assert_eq!(sync.poll_once().await, PollOutcome::Unchanged);

    assert_eq!(vcs.checkouts(), checkouts);
    assert!(Arc::ptr_eq(&before, &sync.index()));
}

#[tokio::test]
async fn changed_poll_fetches_once_and_rebuilds() {
    let (vcs, sync) = started(PRECEDENCE_FILES).await;
    let before = sync.index();

    vcs.push("c2", &[("service-x-prod.yml", "c: 300\n")]);
    let outcome = sync.poll_once().await;

    assert_eq!(
        outcome,
        PollOutcome::Updated {
            commit: Some("c2".into())
        }
    );
    assert_eq!(vcs.fetches.load(Ordering::SeqCst), 1);
    assert!(!Arc::ptr_eq(&before, &sync.index()));
    assert_eq!(sync.index().files_for("service-x", "prod").len(), 1);
    assert_eq!(sync.current_version().as_deref(), Some("c2"));

    // The new head is now local, so the next tick is a no-op.
    assert_eq!(sync.poll_once().await, PollOutcome::Unchanged);
    assert_eq!(vcs.fetches.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn failed_poll_keeps_index_and_records_error() {
    let (vcs, sync) = started(PRECEDENCE_FILES).await;
    let before = sync.index();

    vcs.set_failing(true);
    let outcome = sync.poll_once().await;

    assert!(matches!(outcome, PollOutcome::Failed { .. }));
    assert!(sync.is_ready());
    assert!(Arc::ptr_eq(&before, &sync.index()));
    assert_eq!(sync.status().consecutive_failures, 1);
    assert!(sync.status().last_error.is_some());

    vcs.set_failing(false);
    assert_eq!(sync.poll_once().await, PollOutcome::Unchanged);
}

#[tokio::test]
async fn failed_poll_checkout_closes_gate_until_next_success() {
    let (vcs, sync) = started(PRECEDENCE_FILES).await;
    let before = sync.index();

    vcs.push("c2", &[("service-x-prod.yml", "c: 300\n")]);
    vcs.set_checkout_failing(true);

    assert!(matches!(sync.poll_once().await, PollOutcome::Failed { .. }));
    assert!(!sync.is_ready());
    assert!(Arc::ptr_eq(&before, &sync.index()));

    vcs.set_checkout_failing(false);
    assert!(matches!(sync.poll_once().await, PollOutcome::Updated { .. }));
    assert!(sync.is_ready());
    assert_eq!(sync.current_version().as_deref(), Some("c2"));
}

#[tokio::test]
async fn poll_recovers_from_failed_start() {
    let vcs = Arc::new(FakeVcs::new("c1", PRECEDENCE_FILES));
    vcs.set_failing(true);
    let sync = synchronizer(&vcs);
    assert!(sync.start().await.is_err());

    vcs.set_failing(false);
    let outcome = sync.poll_once().await;

    assert!(matches!(outcome, PollOutcome::Updated { .. }));
    assert!(sync.is_ready());
}

#[tokio::test]
async fn observer_sees_every_tick() {
    let (vcs, sync) = started(PRECEDENCE_FILES).await;
    let seen = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&seen);
    sync.set_observer(move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    sync.poll_once().await;
    vcs.push("c2", &[]);
    sync.poll_once().await;

    assert_eq!(seen.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn start_polling_is_idempotent() {
    let (_vcs, sync) = started(PRECEDENCE_FILES).await;

    assert!(sync.start_polling(Duration::from_secs(60)));
    assert!(!sync.start_polling(Duration::from_secs(1)));
    assert!(sync.is_polling());

    assert!(sync.stop_polling());
    assert!(!sync.stop_polling());
    assert!(!sync.is_polling());
}

#[tokio::test]
async fn background_poller_picks_up_new_commit() {
    let (vcs, sync) = started(PRECEDENCE_FILES).await;
    sync.start_polling(Duration::from_millis(20));

    vcs.push("c2", &[("application-prod.yml", "d: 4\n")]);

    let mut updated = false;
    for _ in 0..100 {
        if sync.current_version().as_deref() == Some("c2") {
            updated = true;
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }

    sync.stop_polling();
    assert!(updated, "poller never published c2");
    assert_eq!(vcs.fetches.load(Ordering::SeqCst), 1);
}
