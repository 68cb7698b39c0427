//! Counters for background synchronization and secret refreshes.

use metrics::counter;
use tessera_git::PollOutcome;
use tessera_secrets::{RefreshOutcome, RefreshStatus};

pub const CONFIG_SYNC_TOTAL: &str = "config_sync_total";
pub const SECRET_REFRESH_TOTAL: &str = "secret_refresh_total";

/// Poll observer; counts each tick by outcome.
pub fn record_poll_outcome(outcome: &PollOutcome) {
    let label = match outcome {
        PollOutcome::Unchanged => "unchanged",
        PollOutcome::Updated { .. } => "updated",
        PollOutcome::Failed { .. } => "failed",
    };
    counter!(CONFIG_SYNC_TOTAL, "outcome" => label).increment(1);
}

pub fn record_secret_refresh(outcome: &RefreshOutcome) {
    let status = match outcome.status {
        RefreshStatus::Ok => "ok",
        RefreshStatus::InProgress => "in_progress",
        RefreshStatus::Failed => "failed",
    };
    counter!(SECRET_REFRESH_TOTAL, "status" => status).increment(1);
}

pub fn register_event_metrics() {
    metrics::describe_counter!(CONFIG_SYNC_TOTAL, "Repository poll ticks by outcome");
    metrics::describe_counter!(SECRET_REFRESH_TOTAL, "Secret refresh attempts by status");
}
