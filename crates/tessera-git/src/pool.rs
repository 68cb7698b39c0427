//! Bounded-concurrency fetch pool.

use std::collections::VecDeque;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;
use tokio::task::JoinSet;
use tracing::{debug, error};

use crate::error::ConfigSourceError;

/// Runs async tasks over a list of items with at most `workers` in flight.
///
/// Results come back in input order. The first failing task stops the pool:
/// workers stop picking up new items and its error is returned.
#[derive(Debug, Clone, Copy)]
pub struct FetchPool {
    workers: usize,
}

impl FetchPool {
    /// Creates a pool. A worker count of zero is treated as one.
    pub fn new(workers: usize) -> Self {
        Self {
            workers: workers.max(1),
        }
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Applies `task` to every item.
    ///
    /// # Errors
    ///
    /// Returns the first task error, or a remote error if a worker panicked.
    pub async fn run<T, R, F, Fut>(&self, items: Vec<T>, task: F) -> Result<Vec<R>, ConfigSourceError>
    where
        T: Send + 'static,
        R: Send + 'static,
        F: Fn(T) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<R, ConfigSourceError>> + Send + 'static,
    {
        let total = items.len();
        if total == 0 {
            return Ok(Vec::new());
        }

        let queue: Arc<Mutex<VecDeque<(usize, T)>>> =
            Arc::new(Mutex::new(items.into_iter().enumerate().collect()));
        let failed = Arc::new(AtomicBool::new(false));
        let task = Arc::new(task);

        let mut workers = JoinSet::new();
        for worker_id in 0..self.workers.min(total) {
            let queue = Arc::clone(&queue);
            let failed = Arc::clone(&failed);
            let task = Arc::clone(&task);

            workers.spawn(async move {
                let mut done = Vec::new();
                loop {
                    if failed.load(Ordering::Relaxed) {
                        break;
                    }
                    let Some((index, item)) = queue.lock().pop_front() else {
                        break;
                    };
                    match task(item).await {
                        Ok(result) => done.push((index, result)),
                        Err(e) => {
                            failed.store(true, Ordering::Relaxed);
                            return Err(e);
                        },
                    }
                }
                debug!(worker_id, completed = done.len(), "fetch worker finished");
                Ok(done)
            });
        }

        let mut slots: Vec<Option<R>> = std::iter::repeat_with(|| None).take(total).collect();
        let mut first_error = None;

        while let Some(joined) = workers.join_next().await {
            match joined {
                Ok(Ok(done)) => {
                    for (index, result) in done {
                        slots[index] = Some(result);
                    }
                },
                Ok(Err(e)) => {
                    first_error.get_or_insert(e);
                },
                Err(join_error) => {
                    error!(error = %join_error, "fetch worker panicked");
                    failed.store(true, Ordering::Relaxed);
                    first_error
                        .get_or_insert(ConfigSourceError::remote(format!("fetch worker failed: {join_error}")));
                },
            }
        }

        if let Some(e) = first_error {
            return Err(e);
        }

        slots
            .into_iter()
            .map(|slot| slot.ok_or_else(|| ConfigSourceError::remote("fetch task produced no result")))
            .collect()
    }
}

impl Default for FetchPool {
    fn default() -> Self {
        Self::new(10)
    }
}
