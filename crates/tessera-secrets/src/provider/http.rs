use async_trait::async_trait;
use tracing::debug;

use super::{SecretItem, SecretProvider, SecretQuery};
use crate::error::SecretError;

/// Fetches secrets from an HTTP endpoint.
///
/// Sends `GET {url}?app_id=..&env=..&path=..`, optionally with a bearer
/// token, and expects a JSON array of `{"key", "value"}` objects.
#[derive(Debug, Clone)]
pub struct HttpSecretProvider {
    url: String,
    token: Option<String>,
    client: reqwest::Client,
}

impl HttpSecretProvider {
    pub fn new(url: impl Into<String>, token: Option<String>) -> Result<Self, SecretError> {
        let client = reqwest::Client::builder().user_agent("tessera").build()?;
        Ok(Self {
            url: url.into(),
            token: token.filter(|t| !t.trim().is_empty()),
            client,
        })
    }
}

#[async_trait]
impl SecretProvider for HttpSecretProvider {
    fn name(&self) -> &str {
        "http"
    }

    async fn get(&self, query: &SecretQuery) -> Result<Vec<SecretItem>, SecretError> {
        let mut request = self.client.get(&self.url).query(&[
            ("app_id", query.app_id.as_str()),
            ("env", query.env_name.as_str()),
            ("path", query.path.as_str()),
        ]);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(SecretError::provider(self.name(), format!("HTTP {status}")));
        }

        let body = response.bytes().await?;
        let items: Vec<SecretItem> =
            serde_json::from_slice(&body).map_err(|e| SecretError::Decode(e.to_string()))?;
        debug!(count = items.len(), "secrets fetched");
        Ok(items)
    }
}
