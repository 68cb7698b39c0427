//! Error types for repository synchronization and resolution.

use std::path::PathBuf;

/// Errors raised while synchronizing the repository or resolving configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigSourceError {
    /// Resolution was requested before the first successful synchronization.
    #[error("Repository is not ready yet.")]
    NotReady,

    /// Clone, fetch or checkout failed.
    #[error("{message}")]
    Sync { status: u16, message: String },

    /// A Git operation failed.
    #[error("git error: {0}")]
    Git(String),

    /// A remote API call failed.
    #[error("remote error: {0}")]
    Remote(String),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to parse a configuration file.
    #[error("parse error in {path}: {reason}")]
    Parse { path: PathBuf, reason: String },

    /// The configuration format is not supported.
    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Invalid configuration.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Serializing a resolved document failed.
    #[error(transparent)]
    Render(#[from] tessera_core::TesseraError),
}

impl ConfigSourceError {
    /// Creates a new Git error.
    pub fn git(msg: impl Into<String>) -> Self {
        Self::Git(msg.into())
    }

    /// Creates a new remote API error.
    pub fn remote(msg: impl Into<String>) -> Self {
        Self::Remote(msg.into())
    }

    /// Creates a new parse error.
    pub fn parse(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::Parse {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Wraps a failed synchronization step as a 500 sync error.
    pub fn sync(step: &str, cause: impl std::fmt::Display) -> Self {
        Self::Sync {
            status: 500,
            message: format!("Failed to {step} Git repository: {cause}"),
        }
    }

    /// HTTP-style status describing the error.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::NotReady => 503,
            Self::Sync { status, .. } => *status,
            Self::InvalidConfig(_) => 400,
            _ => 500,
        }
    }

    /// Returns true if this is a transient error that might succeed on retry.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::NotReady | Self::Remote(_) | Self::Sync { .. })
    }
}
