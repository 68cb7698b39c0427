//! Background poll scheduler.

use std::sync::Weak;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::{Instant, sleep_until};
use tracing::{debug, info};

use super::{PollOutcome, RepositorySynchronizer};

/// Timing of the polling loop.
#[derive(Debug, Clone)]
pub struct PollConfig {
    /// Interval between polls.
    pub interval: Duration,
    /// Consecutive failures tolerated before backing off.
    pub max_failures: u32,
    /// Backoff multiplier per failure past `max_failures`.
    pub backoff_multiplier: f64,
    /// Maximum backoff duration.
    pub max_backoff: Duration,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(30),
            max_failures: 3,
            backoff_multiplier: 2.0,
            max_backoff: Duration::from_secs(300),
        }
    }
}

impl PollConfig {
    pub fn with_interval(interval: Duration) -> Self {
        Self {
            interval,
            ..Self::default()
        }
    }

    /// Wait before the next tick after `failures` consecutive failures.
    pub fn delay_after(&self, failures: u32) -> Duration {
        if failures < self.max_failures {
            return self.interval;
        }
        let exponent = i32::try_from(failures - self.max_failures + 1).unwrap_or(i32::MAX);
        let scaled = self.interval.as_secs_f64() * self.backoff_multiplier.powi(exponent);
        if !scaled.is_finite() || scaled >= self.max_backoff.as_secs_f64() {
            return self.max_backoff.max(self.interval);
        }
        Duration::from_secs_f64(scaled)
    }
}

/// Handle for a running poll loop. Dropping it stops the loop.
#[derive(Debug)]
pub struct PollHandle {
    shutdown_tx: watch::Sender<bool>,
}

impl PollHandle {
    /// Signals the loop to stop after its current tick.
    pub fn stop(&self) {
        let _ = self.shutdown_tx.send(true);
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Drives [`RepositorySynchronizer::poll_once`] on a timer.
pub(crate) struct PollScheduler {
    synchronizer: Weak<RepositorySynchronizer>,
    config: PollConfig,
}

impl PollScheduler {
    pub(crate) fn new(synchronizer: Weak<RepositorySynchronizer>, config: PollConfig) -> Self {
        Self {
            synchronizer,
            config,
        }
    }

    pub(crate) fn start(self) -> PollHandle {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        tokio::spawn(self.run(shutdown_rx));
        PollHandle { shutdown_tx }
    }

    async fn run(self, mut shutdown_rx: watch::Receiver<bool>) {
        info!(interval = ?self.config.interval, "starting repository poller");
        let mut failures = 0u32;
        let mut next_tick = Instant::now() + self.config.interval;

        loop {
            tokio::select! {
                _ = sleep_until(next_tick) => {
                    let Some(synchronizer) = self.synchronizer.upgrade() else {
                        debug!("synchronizer dropped; poller exiting");
                        break;
                    };

                    match synchronizer.poll_once().await {
                        PollOutcome::Failed { .. } => failures = failures.saturating_add(1),
                        _ => failures = 0,
                    }

                    let delay = self.config.delay_after(failures);
                    if delay != self.config.interval {
                        debug!(?delay, failures, "poll backoff");
                    }
                    next_tick = Instant::now() + delay;
                }
                result = shutdown_rx.changed() => {
                    if result.is_err() || *shutdown_rx.borrow() {
                        info!("repository poller shutting down");
                        break;
                    }
                }
            }
        }
    }
}
