//! Tessera Core - domain types, format codecs and rendering
//!
//! This crate holds everything that does not touch a repository or the
//! network: the [`ConfigValue`]/[`ConfigMap`] model, the parsers for JSON,
//! YAML, `.properties` and `.env` files, dot-notation flattening, key-level
//! merging, and the Spring-compatible [`ConfigResponse`] wire model.

pub mod config;
pub mod error;
pub mod format;
pub mod merge;
pub mod render;
pub mod types;

pub use config::{ConfigMap, ConfigValue, ERROR_MARKER_KEY, PropertySource};
pub use error::{Result, TesseraError};
pub use format::spring::ConfigResponse;
pub use format::{ConfigFormat, FormatParser, FormatSerializer};
pub use render::{OutputFormat, ResponseRenderer};
pub use types::{
    Application, ApplicationProfile, DEFAULT_PROFILE, GENERIC_APPLICATION, Label, Profile,
};

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_is_semver() {
        assert_eq!(version().split('.').count(), 3, "Version should be semver");
    }
}
