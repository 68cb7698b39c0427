use std::path::PathBuf;

use async_trait::async_trait;
use tessera_core::ConfigValue;
use tessera_core::format::flatten::flatten;
use tessera_core::format::parse_file_content;

use super::{SecretItem, SecretProvider, SecretQuery};
use crate::error::SecretError;

/// Loads secrets from a local `.env`, `.json`, `.yml` or `.properties` file.
///
/// Nested documents are flattened, so `db: {password: x}` yields the
/// secret `db.password`.
#[derive(Debug, Clone)]
pub struct FileSecretProvider {
    path: PathBuf,
}

impl FileSecretProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl SecretProvider for FileSecretProvider {
    fn name(&self) -> &str {
        "file"
    }

    async fn get(&self, _query: &SecretQuery) -> Result<Vec<SecretItem>, SecretError> {
        let content = tokio::fs::read_to_string(&self.path).await?;
        let name = self.path.display().to_string();
        let map = parse_file_content(&self.path, &name, &content)?;

        Ok(flatten(&map, "")
            .into_iter()
            .filter(|(_, value)| !value.is_null() && !value.is_object())
            .map(|(key, value)| {
                let value = match value {
                    ConfigValue::String(s) => s,
                    other => other.to_plain_string(),
                };
                SecretItem::new(key, value)
            })
            .collect())
    }
}
