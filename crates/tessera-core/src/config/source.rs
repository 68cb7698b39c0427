use crate::config::map::ConfigMap;
use serde::{Deserialize, Serialize};

/// Key of the single entry carried by a property source whose file failed to parse.
pub const ERROR_MARKER_KEY: &str = "error";

/// One parsed configuration file: its identifying name plus nested content.
///
/// Serializes as `{"name": ..., "source": {...}}`, the shape clients of the
/// config-server protocol expect inside `propertySources`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertySource {
    /// Identifying name (e.g. `git:main:config/application.yml`).
    pub name: String,

    /// Parsed content, nested as in the file.
    pub source: ConfigMap,
}

impl PropertySource {
    pub fn new(name: impl Into<String>, source: ConfigMap) -> Self {
        Self {
            name: name.into(),
            source,
        }
    }

    /// A source standing in for a file that could not be parsed.
    ///
    /// Its content is the single entry `{"error": "Failed to parse <file>"}`.
    pub fn parse_failure(name: impl Into<String>, file: &str) -> Self {
        let mut source = ConfigMap::new();
        source.insert(ERROR_MARKER_KEY, format!("Failed to parse {file}"));
        Self::new(name, source)
    }
}
