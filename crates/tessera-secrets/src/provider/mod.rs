//! The secret provider capability and its backends.
//!
//! Exactly one provider is configured per process. The overlay only sees
//! the [`SecretProvider`] trait.

mod env;
mod file;
mod fixed;
mod http;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::SecretError;

pub use env::EnvSecretProvider;
pub use file::FileSecretProvider;
pub use fixed::{NoopProvider, StaticProvider};
pub use http::HttpSecretProvider;

/// Which secrets to load.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecretQuery {
    pub app_id: String,
    pub env_name: String,
    /// Folder within the provider's namespace.
    #[serde(default = "root_path")]
    pub path: String,
}

fn root_path() -> String {
    "/".to_string()
}

impl SecretQuery {
    pub fn new(app_id: impl Into<String>, env_name: impl Into<String>) -> Self {
        Self {
            app_id: app_id.into(),
            env_name: env_name.into(),
            path: root_path(),
        }
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }
}

/// One secret as returned by a provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecretItem {
    pub key: String,
    pub value: String,
}

impl SecretItem {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Capability to fetch the complete secret set.
#[async_trait]
pub trait SecretProvider: Send + Sync {
    /// Short name used in logs and errors.
    fn name(&self) -> &str;

    /// Returns every secret visible for `query`.
    async fn get(&self, query: &SecretQuery) -> Result<Vec<SecretItem>, SecretError>;
}
