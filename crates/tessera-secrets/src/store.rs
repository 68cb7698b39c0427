//! The flat secret store.

use std::collections::HashMap;

use crate::provider::SecretItem;

/// Flat mapping from a dot path or bare key to a secret value.
///
/// Built whole from one provider answer; never updated in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SecretStore {
    values: HashMap<String, String>,
}

impl SecretStore {
    /// Builds a store. When a key repeats, the later item wins.
    pub fn from_items(items: impl IntoIterator<Item = SecretItem>) -> Self {
        Self {
            values: items.into_iter().map(|item| (item.key, item.value)).collect(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Finds the replacement for the leaf at `path` whose own key is `key`.
    ///
    /// Tries, in order: `path`, `path` upper-cased, `key`, `key`
    /// upper-cased. Empty values are skipped, so they fall through to the
    /// next candidate.
    pub fn lookup(&self, path: &str, key: &str) -> Option<&str> {
        self.non_empty(path)
            .or_else(|| self.non_empty(&path.to_uppercase()))
            .or_else(|| self.non_empty(key))
            .or_else(|| self.non_empty(&key.to_uppercase()))
    }

    fn non_empty(&self, key: &str) -> Option<&str> {
        self.get(key).filter(|value| !value.is_empty())
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Keys in sorted order.
    pub fn keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.values.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }
}
