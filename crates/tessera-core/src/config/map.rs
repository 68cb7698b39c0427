use crate::config::value::ConfigValue;
use crate::error::{Result, TesseraError};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A nested configuration mapping, the parsed content of one file.
///
/// Wraps an `IndexMap<String, ConfigValue>` so iteration follows insertion
/// order, which keeps rendered output stable across calls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ConfigMap {
    #[serde(flatten)]
    inner: IndexMap<String, ConfigValue>,
}

impl ConfigMap {
    pub fn new() -> Self {
        Self {
            inner: IndexMap::new(),
        }
    }

    pub fn from_inner(inner: IndexMap<String, ConfigValue>) -> Self {
        Self { inner }
    }

    pub fn as_inner(&self) -> &IndexMap<String, ConfigValue> {
        &self.inner
    }

    pub fn as_inner_mut(&mut self) -> &mut IndexMap<String, ConfigValue> {
        &mut self.inner
    }

    pub fn into_inner(self) -> IndexMap<String, ConfigValue> {
        self.inner
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<ConfigValue>) {
        self.inner.insert(key.into(), value.into());
    }

    pub fn iter(&self) -> indexmap::map::Iter<'_, String, ConfigValue> {
        self.inner.iter()
    }

    /// Retrieves a value by key, supporting dot notation for nested access.
    ///
    /// A top-level key that itself contains dots (as parsed from
    /// `.properties` or `.env` files) is matched before nested lookup.
    ///
    /// # Example
    /// ```
    /// # use tessera_core::ConfigMap;
    /// let map = ConfigMap::from_json(r#"{"server": {"port": 8080}}"#).unwrap();
    /// assert_eq!(map.get("server.port").and_then(|v| v.as_i64()), Some(8080));
    /// ```
    pub fn get(&self, path: &str) -> Option<&ConfigValue> {
        if path.is_empty() {
            return None;
        }
        if let Some(value) = self.inner.get(path) {
            return Some(value);
        }

        let mut parts = path.split('.');
        let mut current = self.inner.get(parts.next()?)?;
        for part in parts {
            current = current.as_object()?.get(part)?;
        }
        Some(current)
    }

    /// Parses a JSON document whose top level is an object.
    pub fn from_json(json: &str) -> Result<Self> {
        let value: ConfigValue = serde_json::from_str(json)
            .map_err(|e| TesseraError::parse_error_with_cause("json", e.to_string(), e))?;
        match value {
            ConfigValue::Object(map) => Ok(Self::from_inner(map)),
            _ => Err(TesseraError::parse_error(
                "json",
                "top-level JSON value must be an object",
            )),
        }
    }

    /// Serializes the map to a JSON string (pretty printed).
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| TesseraError::serialization("json", e.to_string()))
    }

    /// Parses the first YAML document. An empty document yields an empty map.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let document: serde_yaml::Value = serde_yaml::from_str(yaml)
            .map_err(|e| TesseraError::parse_error_with_cause("yaml", e.to_string(), e))?;
        match document {
            serde_yaml::Value::Null => Ok(Self::new()),
            serde_yaml::Value::Mapping(_) => serde_yaml::from_value(document)
                .map_err(|e| TesseraError::parse_error_with_cause("yaml", e.to_string(), e)),
            _ => Err(TesseraError::parse_error(
                "yaml",
                "top-level YAML document must be a mapping",
            )),
        }
    }

    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(|e| TesseraError::serialization("yaml", e.to_string()))
    }
}

impl From<IndexMap<String, ConfigValue>> for ConfigMap {
    fn from(map: IndexMap<String, ConfigValue>) -> Self {
        ConfigMap { inner: map }
    }
}

impl<'a> IntoIterator for &'a ConfigMap {
    type Item = (&'a String, &'a ConfigValue);
    type IntoIter = indexmap::map::Iter<'a, String, ConfigValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.inner.iter()
    }
}
