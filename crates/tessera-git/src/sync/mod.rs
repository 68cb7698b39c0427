//! Repository synchronization and background polling.

mod scheduler;
mod state;
mod synchronizer;

pub use scheduler::{PollConfig, PollHandle};
pub use state::{RepositoryState, RepositoryStatus};
pub use synchronizer::{PollOutcome, RepositorySynchronizer};
