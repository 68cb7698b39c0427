//! # Tessera Server
//!
//! HTTP surface of the configuration server: Spring-compatible
//! `/{application}/{profile}[/{label}]` resolution, merged document
//! rendering (`/{label}/{application}-{profile}.yml` and friends), the secret
//! refresh actuator, health and Prometheus metrics.

pub mod error;
pub mod extractors;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod response;
pub mod server;
pub mod service;
pub mod settings;
pub mod state;

pub use error::AppError;
pub use server::{create_router, run_server};
pub use service::ConfigService;
pub use settings::Settings;
pub use state::AppState;
