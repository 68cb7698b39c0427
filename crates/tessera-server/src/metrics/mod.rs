//! Prometheus metrics.

pub mod events;
pub mod http;
pub mod setup;

pub use events::{record_poll_outcome, record_secret_refresh};
pub use setup::{detached_handle, init_metrics};
