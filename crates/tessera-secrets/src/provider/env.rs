use async_trait::async_trait;

use super::{SecretItem, SecretProvider, SecretQuery};
use crate::error::SecretError;

/// Reads secrets from process environment variables sharing a prefix.
///
/// With prefix `SECRET_`, `SECRET_DB_PASSWORD=x` becomes the secret
/// `DB_PASSWORD`. Variables with non-UTF-8 names or values are skipped.
#[derive(Debug, Clone)]
pub struct EnvSecretProvider {
    prefix: String,
}

impl EnvSecretProvider {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// Collects matching pairs from `vars`.
    pub fn collect<I>(&self, vars: I) -> Vec<SecretItem>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut items: Vec<SecretItem> = vars
            .into_iter()
            .filter_map(|(name, value)| {
                let key = name.strip_prefix(&self.prefix)?;
                (!key.is_empty()).then(|| SecretItem::new(key, value))
            })
            .collect();
        items.sort_by(|a, b| a.key.cmp(&b.key));
        items
    }
}

impl Default for EnvSecretProvider {
    fn default() -> Self {
        Self::new("SECRET_")
    }
}

#[async_trait]
impl SecretProvider for EnvSecretProvider {
    fn name(&self) -> &str {
        "env"
    }

    async fn get(&self, _query: &SecretQuery) -> Result<Vec<SecretItem>, SecretError> {
        Ok(self.collect(std::env::vars_os().filter_map(|(k, v)| {
            Some((k.into_string().ok()?, v.into_string().ok()?))
        })))
    }
}
