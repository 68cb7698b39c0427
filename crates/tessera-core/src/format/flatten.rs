//! Conversions between nested mappings and dot-notation flat maps.

use crate::config::{ConfigMap, ConfigValue};
use indexmap::IndexMap;

/// Flat `dotted.key -> value` map. The only object values are empty ones,
/// kept as leaves so that empty sections survive a round trip.
pub type FlatMap = IndexMap<String, ConfigValue>;

/// Flattens a nested mapping into dot-notation keys.
///
/// Nested objects are walked recursively; arrays and scalars are leaves, so
/// an array is kept whole under its key rather than split per element. An
/// empty object is a leaf too.
///
/// # Example
///
/// ```
/// use tessera_core::ConfigMap;
/// use tessera_core::format::flatten::flatten;
///
/// let nested = ConfigMap::from_json(r#"{"server": {"port": 80, "hosts": ["a", "b"]}}"#).unwrap();
/// let flat = flatten(&nested, "");
///
/// assert_eq!(flat["server.port"].as_i64(), Some(80));
/// assert_eq!(flat["server.hosts"].as_array().map(|a| a.len()), Some(2));
/// ```
pub fn flatten(nested: &ConfigMap, prefix: &str) -> FlatMap {
    let mut flat = IndexMap::new();
    for (key, value) in nested {
        flatten_value(&join_key(prefix, key), value, &mut flat);
    }
    flat
}

fn flatten_value(path: &str, value: &ConfigValue, target: &mut FlatMap) {
    match value {
        ConfigValue::Object(map) if !map.is_empty() => {
            for (key, child) in map {
                flatten_value(&join_key(path, key), child, target);
            }
        },
        leaf => {
            target.insert(path.to_string(), leaf.clone());
        },
    }
}

fn join_key(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{prefix}.{key}")
    }
}

/// Rebuilds a nested mapping from dot-notation keys.
///
/// Intermediate mappings are created as needed. When a key needs an
/// intermediate mapping where a scalar already sits, the scalar is replaced.
pub fn unflatten(flat: &FlatMap) -> ConfigMap {
    let mut root = IndexMap::new();
    for (key, value) in flat {
        insert_path(&mut root, key, value.clone());
    }
    ConfigMap::from_inner(root)
}

/// Inserts `value` at the dot-separated `path`, creating intermediate objects.
fn insert_path(root: &mut IndexMap<String, ConfigValue>, path: &str, value: ConfigValue) {
    let mut segments = path.split('.').peekable();
    let mut current = root;

    while let Some(segment) = segments.next() {
        if segments.peek().is_none() {
            current.insert(segment.to_string(), value);
            return;
        }

        let slot = current
            .entry(segment.to_string())
            .or_insert_with(|| ConfigValue::Object(IndexMap::new()));
        if !slot.is_object() {
            *slot = ConfigValue::Object(IndexMap::new());
        }
        current = match slot {
            ConfigValue::Object(next) => next,
            _ => return,
        };
    }
}

/// Escapes a value for the right-hand side of a `.properties` line.
///
/// Backslash, newline, carriage return and tab are escaped; everything else
/// is emitted verbatim.
///
/// ```
/// use tessera_core::format::flatten::escape_for_properties;
///
/// assert_eq!(escape_for_properties("a\\b\nc"), "a\\\\b\\nc");
/// ```
pub fn escape_for_properties(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            '\t' => escaped.push_str("\\t"),
            other => escaped.push(other),
        }
    }
    escaped
}

/// Escapes the separators a `.properties` reader would split a key on.
pub fn escape_properties_key(key: &str) -> String {
    escape_for_properties(key)
        .replace(':', "\\:")
        .replace('=', "\\=")
        .replace(' ', "\\ ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(json: &str) -> ConfigMap {
        ConfigMap::from_json(json).unwrap()
    }

    #[test]
    fn test_flatten_only_emits_leaves() {
        let flat = flatten(
            &map(r#"{"server": {"port": 8080, "ssl": {"enabled": true}}, "app": "test"}"#),
            "",
        );

        assert_eq!(flat.len(), 3);
        assert_eq!(flat["server.ssl.enabled"].as_bool(), Some(true));
        assert!(!flat.contains_key("server"));
    }

    #[test]
    fn test_flatten_with_prefix() {
        let flat = flatten(&map(r#"{"port": 1}"#), "server");
        assert!(flat.contains_key("server.port"));
    }

    #[test]
    fn test_array_of_objects_is_a_leaf() {
        let flat = flatten(&map(r#"{"routes": [{"id": "a"}, {"id": "b"}]}"#), "");

        assert_eq!(flat.len(), 1);
        assert_eq!(flat["routes"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_unflatten_creates_intermediates() {
        let mut flat = FlatMap::new();
        flat.insert("a.b.c".into(), ConfigValue::from(1));
        flat.insert("a.d".into(), ConfigValue::from("x"));

        let nested = unflatten(&flat);
        assert_eq!(nested, map(r#"{"a": {"b": {"c": 1}, "d": "x"}}"#));
    }

    #[test]
    fn test_empty_object_survives_round_trip() {
        let nested = map(r#"{"a": {}, "b": {"c": 1, "d": {}}}"#);
        let flat = flatten(&nested, "");

        assert_eq!(flat.len(), 3);
        assert_eq!(flat["a"], ConfigValue::Object(IndexMap::new()));
        assert_eq!(unflatten(&flat), nested);
    }

    #[test]
    fn test_unflatten_scalar_then_child_becomes_object() {
        let mut flat = FlatMap::new();
        flat.insert("a".into(), ConfigValue::from("scalar"));
        flat.insert("a.b".into(), ConfigValue::from(2));

        assert_eq!(unflatten(&flat), map(r#"{"a": {"b": 2}}"#));
    }

    #[test]
    fn test_escape_all_control_characters() {
        assert_eq!(escape_for_properties("x\ty\r\n"), "x\\ty\\r\\n");
        assert_eq!(escape_for_properties("C:\\temp"), "C:\\\\temp");
    }

    #[test]
    fn test_escape_key_separators() {
        assert_eq!(escape_properties_key("a b=c:d"), "a\\ b\\=c\\:d");
    }
}
