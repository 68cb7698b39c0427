//! Format codecs: parsing file content into [`ConfigMap`] and serializing it back.

use crate::config::ConfigMap;
use crate::error::{Result, TesseraError};
use std::path::Path;

pub mod dotenv;
pub mod flatten;
pub mod json;
pub mod properties;
pub mod spring;
pub mod yaml;

use dotenv::EnvFormat;
use json::JsonFormat;
use properties::PropertiesFormat;
use yaml::YamlFormat;

/// Supported configuration formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigFormat {
    Json,
    Yaml,
    Properties,
    /// Line-delimited `KEY=VALUE`.
    Env,
}

impl ConfigFormat {
    /// Every supported format.
    pub const ALL: [ConfigFormat; 4] = [
        ConfigFormat::Yaml,
        ConfigFormat::Json,
        ConfigFormat::Properties,
        ConfigFormat::Env,
    ];

    /// Returns the file extensions associated with this format.
    pub fn extensions(&self) -> &'static [&'static str] {
        match self {
            ConfigFormat::Json => &["json"],
            ConfigFormat::Yaml => &["yml", "yaml"],
            ConfigFormat::Properties => &["properties"],
            ConfigFormat::Env => &["env"],
        }
    }

    /// Guesses the format from a file extension (without dot).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "json" => Some(ConfigFormat::Json),
            "yaml" | "yml" => Some(ConfigFormat::Yaml),
            "properties" => Some(ConfigFormat::Properties),
            "env" => Some(ConfigFormat::Env),
            _ => None,
        }
    }

    /// Detects the format from a path's extension.
    pub fn from_path(path: impl AsRef<Path>) -> Option<Self> {
        path.as_ref()
            .extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
    }

    /// Returns true if `ext` (without dot) belongs to a supported format.
    pub fn is_supported_extension(ext: &str) -> bool {
        Self::from_extension(ext).is_some()
    }

    /// Parses `input` with this format's parser.
    pub fn parse(&self, input: &str) -> Result<ConfigMap> {
        match self {
            ConfigFormat::Json => JsonFormat.parse(input),
            ConfigFormat::Yaml => YamlFormat.parse(input),
            ConfigFormat::Properties => PropertiesFormat.parse(input),
            ConfigFormat::Env => EnvFormat.parse(input),
        }
    }
}

/// Parses the content of a file, choosing the format from its extension.
///
/// The returned parse error names `source_name` so the caller can log it
/// as-is.
pub fn parse_file_content(path: &Path, source_name: &str, content: &str) -> Result<ConfigMap> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default();
    let format = ConfigFormat::from_extension(extension)
        .ok_or_else(|| TesseraError::unsupported_format(source_name, extension))?;

    format.parse(content).map_err(|e| match e {
        TesseraError::ParseError { message, cause, .. } => TesseraError::ParseError {
            source_name: source_name.to_string(),
            message,
            cause,
        },
        other => other,
    })
}

/// A trait for parsing configuration from a string.
pub trait FormatParser: Send + Sync {
    /// Parses the input string into a ConfigMap.
    fn parse(&self, input: &str) -> Result<ConfigMap>;
}

/// A trait for serializing configuration to a string.
pub trait FormatSerializer: Send + Sync {
    /// Serializes the ConfigMap into a string.
    fn serialize(&self, config: &ConfigMap) -> Result<String>;
}
