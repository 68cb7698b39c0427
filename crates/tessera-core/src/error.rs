//! Error types for Tessera.
//!
//! Every fallible operation in the core crate returns [`Result<T>`]. Errors
//! carry enough context (source name, extension) to be logged where they are
//! handled; parse failures are usually contained by the caller rather than
//! propagated to clients.
//!
//! # Example
//!
//! ```
//! use tessera_core::{Result, TesseraError};
//!
//! fn parse_port(raw: &str) -> Result<u16> {
//!     raw.parse()
//!         .map_err(|_| TesseraError::parse_error("server.port", "not a number"))
//! }
//!
//! assert!(parse_port("8080").is_ok());
//! assert!(parse_port("http").unwrap_err().is_parse_error());
//! ```

use std::io;
use thiserror::Error;

/// Main error type for Tessera core operations.
#[derive(Debug, Error)]
pub enum TesseraError {
    /// Error parsing configuration content.
    #[error("Failed to parse configuration from '{source_name}': {message}")]
    ParseError {
        /// Source of the configuration (filename, format name)
        source_name: String,
        /// Description of the parse error
        message: String,
        /// Underlying error, if any
        #[source]
        cause: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The file extension does not map to any supported format.
    #[error("Unsupported configuration format '{extension}' for '{source_name}'")]
    UnsupportedFormat {
        /// File the format was derived from
        source_name: String,
        /// The offending extension (without dot, may be empty)
        extension: String,
    },

    /// A value could not be written in the requested output format.
    #[error("Failed to serialize configuration as {format}: {message}")]
    Serialization {
        /// Target format name
        format: &'static str,
        /// Description of the failure
        message: String,
    },

    /// I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl TesseraError {
    /// Creates a ParseError without a cause.
    pub fn parse_error(source: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ParseError {
            source_name: source.into(),
            message: message.into(),
            cause: None,
        }
    }

    /// Creates a ParseError with a cause.
    pub fn parse_error_with_cause<E>(
        source: impl Into<String>,
        message: impl Into<String>,
        cause: E,
    ) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::ParseError {
            source_name: source.into(),
            message: message.into(),
            cause: Some(Box::new(cause)),
        }
    }

    /// Creates an UnsupportedFormat error.
    pub fn unsupported_format(source: impl Into<String>, extension: impl Into<String>) -> Self {
        Self::UnsupportedFormat {
            source_name: source.into(),
            extension: extension.into(),
        }
    }

    /// Creates a Serialization error.
    pub fn serialization(format: &'static str, message: impl Into<String>) -> Self {
        Self::Serialization {
            format,
            message: message.into(),
        }
    }

    /// Returns true if this is a parse error. Unsupported formats count as parse errors.
    pub fn is_parse_error(&self) -> bool {
        matches!(self, Self::ParseError { .. } | Self::UnsupportedFormat { .. })
    }

    /// Returns true if this is an I/O error.
    pub fn is_io_error(&self) -> bool {
        matches!(self, Self::Io(_))
    }
}

/// Type alias for Results with TesseraError.
pub type Result<T> = std::result::Result<T, TesseraError>;
