use indexmap::IndexMap;
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

/// A configuration value as parsed from JSON, YAML, `.properties` or `.env` text.
///
/// Objects keep insertion order (`IndexMap`) so that rendering the same input
/// twice produces identical bytes.
///
/// # Example
///
/// ```
/// use tessera_core::ConfigValue;
///
/// let val: ConfigValue = "hello".into();
/// assert_eq!(val.as_str(), Some("hello"));
///
/// let arr: ConfigValue = vec![1, 2, 3].into();
/// assert!(arr.as_array().is_some());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConfigValue {
    Null,
    Bool(bool),
    Integer(i64),
    /// Wrapped in OrderedFloat for Eq support
    Float(OrderedFloat<f64>),
    String(String),
    Array(Vec<ConfigValue>),
    Object(IndexMap<String, ConfigValue>),
}

impl ConfigValue {
    pub fn is_null(&self) -> bool {
        matches!(self, ConfigValue::Null)
    }

    /// Returns true for nested mappings. Arrays are not objects.
    pub fn is_object(&self) -> bool {
        matches!(self, ConfigValue::Object(_))
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ConfigValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            ConfigValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ConfigValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[ConfigValue]> {
        match self {
            ConfigValue::Array(arr) => Some(arr),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&IndexMap<String, ConfigValue>> {
        match self {
            ConfigValue::Object(map) => Some(map),
            _ => None,
        }
    }

    /// Text form of the value as it appears on the right-hand side of a
    /// `key=value` line, before escaping.
    ///
    /// Arrays become comma-separated lists; objects inside arrays fall back to
    /// compact JSON.
    pub fn to_plain_string(&self) -> String {
        match self {
            ConfigValue::Null => String::new(),
            ConfigValue::Bool(b) => b.to_string(),
            ConfigValue::Integer(i) => i.to_string(),
            ConfigValue::Float(f) => f.to_string(),
            ConfigValue::String(s) => s.clone(),
            ConfigValue::Array(items) => items
                .iter()
                .map(|item| match item {
                    ConfigValue::Object(_) | ConfigValue::Array(_) => {
                        serde_json::to_string(item).unwrap_or_default()
                    },
                    scalar => scalar.to_plain_string(),
                })
                .collect::<Vec<_>>()
                .join(","),
            ConfigValue::Object(_) => serde_json::to_string(self).unwrap_or_default(),
        }
    }
}

impl From<bool> for ConfigValue {
    fn from(v: bool) -> Self {
        ConfigValue::Bool(v)
    }
}

impl From<i64> for ConfigValue {
    fn from(v: i64) -> Self {
        ConfigValue::Integer(v)
    }
}

impl From<i32> for ConfigValue {
    fn from(v: i32) -> Self {
        ConfigValue::Integer(v as i64)
    }
}

impl From<f64> for ConfigValue {
    fn from(v: f64) -> Self {
        ConfigValue::Float(OrderedFloat(v))
    }
}

impl From<String> for ConfigValue {
    fn from(v: String) -> Self {
        ConfigValue::String(v)
    }
}

impl From<&str> for ConfigValue {
    fn from(v: &str) -> Self {
        ConfigValue::String(v.to_string())
    }
}

impl<T: Into<ConfigValue>> From<Vec<T>> for ConfigValue {
    fn from(v: Vec<T>) -> Self {
        ConfigValue::Array(v.into_iter().map(Into::into).collect())
    }
}

impl From<IndexMap<String, ConfigValue>> for ConfigValue {
    fn from(map: IndexMap<String, ConfigValue>) -> Self {
        ConfigValue::Object(map)
    }
}
