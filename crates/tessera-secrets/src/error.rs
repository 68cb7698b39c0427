//! Error types for secret loading.

use thiserror::Error;

/// Errors raised while loading secrets from a provider.
#[derive(Debug, Error)]
pub enum SecretError {
    /// The provider rejected the request or returned an unusable answer.
    #[error("secret provider '{provider}' failed: {message}")]
    Provider { provider: String, message: String },

    /// The HTTP call to the provider failed.
    #[error("secret provider request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The provider response could not be decoded.
    #[error("failed to decode secrets: {0}")]
    Decode(String),

    /// Reading a secrets file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A secrets file could not be parsed.
    #[error(transparent)]
    Format(#[from] tessera_core::TesseraError),
}

impl SecretError {
    pub fn provider(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Provider {
            provider: provider.into(),
            message: message.into(),
        }
    }
}
