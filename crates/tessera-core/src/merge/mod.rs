//! Key-level merging of flattened property sources.

use crate::config::{ConfigMap, ConfigValue, PropertySource};
use crate::format::flatten::{FlatMap, flatten, unflatten};

/// Applies `sources` to an empty accumulator in list order.
///
/// Later entries overwrite earlier ones key by key; values are never
/// deep-merged, so pass the lowest-precedence source first. A key that turns
/// a path into a leaf evicts the earlier keys below it, and a key below a
/// path evicts an earlier leaf at that path, so the shape of the later source
/// always wins.
///
/// # Example
///
/// ```
/// use tessera_core::ConfigValue;
/// use tessera_core::format::flatten::FlatMap;
/// use tessera_core::merge::merge_in_precedence_order;
///
/// let mut low = FlatMap::new();
/// low.insert("a".into(), ConfigValue::from(1));
/// low.insert("b".into(), ConfigValue::from(2));
/// let mut high = FlatMap::new();
/// high.insert("a".into(), ConfigValue::from(10));
///
/// let merged = merge_in_precedence_order([&low, &high]);
/// assert_eq!(merged["a"].as_i64(), Some(10));
/// assert_eq!(merged["b"].as_i64(), Some(2));
/// ```
pub fn merge_in_precedence_order<'a>(sources: impl IntoIterator<Item = &'a FlatMap>) -> FlatMap {
    let mut merged = FlatMap::new();
    for source in sources {
        for (key, value) in source {
            overwrite(&mut merged, key, value);
        }
    }
    merged
}

fn overwrite(merged: &mut FlatMap, key: &str, value: &ConfigValue) {
    for (at, _) in key.match_indices('.') {
        merged.shift_remove(&key[..at]);
    }

    let child_prefix = format!("{key}.");
    let has_children = merged.keys().any(|k| k.starts_with(&child_prefix));
    if has_children {
        // An empty section adds nothing to a path that already has keys.
        if is_empty_object(value) {
            return;
        }
        merged.retain(|k, _| !k.starts_with(&child_prefix));
    }

    merged.shift_remove(key);
    merged.insert(key.to_string(), value.clone());
}

fn is_empty_object(value: &ConfigValue) -> bool {
    matches!(value, ConfigValue::Object(map) if map.is_empty())
}

/// Collapses response-ordered property sources (most specific first) into one
/// nested mapping in which the most specific source wins per key.
pub fn merge_property_sources(sources: &[PropertySource]) -> ConfigMap {
    let flattened: Vec<FlatMap> = sources
        .iter()
        .rev()
        .map(|ps| flatten(&ps.source, ""))
        .collect();

    unflatten(&merge_in_precedence_order(&flattened))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(name: &str, json: &str) -> PropertySource {
        PropertySource::new(name, ConfigMap::from_json(json).unwrap())
    }

    #[test]
    fn test_key_level_overwrite_not_deep_merge() {
        let low = flatten(&ConfigMap::from_json(r#"{"db": {"url": "a", "pool": 5}}"#).unwrap(), "");
        let high = flatten(&ConfigMap::from_json(r#"{"db": {"url": "b"}}"#).unwrap(), "");

        let merged = merge_in_precedence_order([&low, &high]);

        assert_eq!(merged["db.url"].as_str(), Some("b"));
        assert_eq!(merged["db.pool"].as_i64(), Some(5));
    }

    #[test]
    fn test_arrays_replace_whole() {
        let merged = merge_property_sources(&[
            source("high", r#"{"hosts": ["c"]}"#),
            source("low", r#"{"hosts": ["a", "b"]}"#),
        ]);

        assert_eq!(merged.get("hosts").unwrap().as_array().unwrap().len(), 1);
    }

    #[test]
    fn test_most_specific_first_wins() {
        let merged = merge_property_sources(&[
            source("app-dev", r#"{"c": 30}"#),
            source("app", r#"{"a": 10, "c": 3}"#),
            source("application-dev", r#"{"b": 2}"#),
            source("application", r#"{"a": 1}"#),
        ]);

        assert_eq!(merged, ConfigMap::from_json(r#"{"a": 10, "b": 2, "c": 30}"#).unwrap());
    }

    #[test]
    fn test_specific_scalar_beats_generic_object() {
        let merged = merge_property_sources(&[
            source("app-dev", r#"{"a": 1}"#),
            source("app", r#"{"a": {"b": 2}}"#),
            source("application", r#"{"a": 0}"#),
        ]);

        assert_eq!(merged, ConfigMap::from_json(r#"{"a": 1}"#).unwrap());
    }

    #[test]
    fn test_specific_object_beats_generic_scalar() {
        let merged = merge_property_sources(&[
            source("app-dev", r#"{"a": {"b": 2}}"#),
            source("app", r#"{"a": 1}"#),
            source("application", r#"{"a": {"c": 3}}"#),
        ]);

        assert_eq!(merged, ConfigMap::from_json(r#"{"a": {"b": 2}}"#).unwrap());
    }

    #[test]
    fn test_empty_section_keeps_generic_keys() {
        let merged = merge_property_sources(&[
            source("app", r#"{"feature": {}}"#),
            source("application", r#"{"feature": {"on": true}, "other": {}}"#),
        ]);

        assert_eq!(
            merged,
            ConfigMap::from_json(r#"{"feature": {"on": true}, "other": {}}"#).unwrap()
        );
    }

    #[test]
    fn test_empty_input() {
        assert!(merge_property_sources(&[]).is_empty());
    }
}
