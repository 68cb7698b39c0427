//! Request handlers.

pub mod config;
pub mod health;
pub mod metrics;
pub mod render;
pub mod secrets;
