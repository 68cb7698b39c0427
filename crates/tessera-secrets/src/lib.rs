//! # Tessera Secrets
//!
//! Loads secrets from one configured [`SecretProvider`] into a flat
//! [`SecretStore`] and overlays them onto resolved property sources.
//!
//! The store is replaced whole on every successful refresh and kept as-is
//! when the provider fails, so resolution never waits on, or breaks
//! because of, the secret backend.

pub mod error;
pub mod overlay;
pub mod provider;
pub mod store;

pub use error::SecretError;
pub use overlay::{RefreshOutcome, RefreshStatus, SecretOverlay};
pub use provider::{
    EnvSecretProvider, FileSecretProvider, HttpSecretProvider, NoopProvider, SecretItem,
    SecretProvider, SecretQuery, StaticProvider,
};
pub use store::SecretStore;
