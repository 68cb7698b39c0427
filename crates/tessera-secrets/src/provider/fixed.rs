use async_trait::async_trait;

use super::{SecretItem, SecretProvider, SecretQuery};
use crate::error::SecretError;

/// Serves a fixed list of secrets.
#[derive(Debug, Clone, Default)]
pub struct StaticProvider {
    items: Vec<SecretItem>,
}

impl StaticProvider {
    pub fn new(items: Vec<SecretItem>) -> Self {
        Self { items }
    }

    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self::new(pairs.into_iter().map(|(k, v)| SecretItem::new(k, v)).collect())
    }
}

#[async_trait]
impl SecretProvider for StaticProvider {
    fn name(&self) -> &str {
        "static"
    }

    async fn get(&self, _query: &SecretQuery) -> Result<Vec<SecretItem>, SecretError> {
        Ok(self.items.clone())
    }
}

/// Provider used when no secret backend is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopProvider;

#[async_trait]
impl SecretProvider for NoopProvider {
    fn name(&self) -> &str {
        "none"
    }

    async fn get(&self, _query: &SecretQuery) -> Result<Vec<SecretItem>, SecretError> {
        Ok(Vec::new())
    }
}
