//! Resolution with secrets applied.

use std::sync::Arc;

use tessera_core::{ConfigResponse, OutputFormat, ResponseRenderer};
use tessera_git::{ConfigResolver, ConfigSourceError};
use tessera_secrets::{RefreshOutcome, SecretOverlay};
use tracing::instrument;

/// Resolves configuration, overlays the current secrets and renders it.
#[derive(Debug, Clone)]
pub struct ConfigService {
    resolver: ConfigResolver,
    overlay: Arc<SecretOverlay>,
    renderer: ResponseRenderer,
}

impl ConfigService {
    pub fn new(resolver: ConfigResolver, overlay: Arc<SecretOverlay>) -> Self {
        Self {
            resolver,
            overlay,
            renderer: ResponseRenderer,
        }
    }

    /// Resolves `application` and substitutes secret values into its sources.
    #[instrument(skip(self))]
    pub async fn resolve(
        &self,
        application: &str,
        profiles: &str,
        label: Option<&str>,
    ) -> Result<ConfigResponse, ConfigSourceError> {
        let mut response = self.resolver.resolve(application, profiles, label).await?;
        response.property_sources = self.overlay.apply(&response.property_sources);
        Ok(response)
    }

    /// Resolves and merges into one document in `format`.
    pub async fn render(
        &self,
        application: &str,
        profiles: &str,
        label: Option<&str>,
        format: OutputFormat,
    ) -> Result<String, ConfigSourceError> {
        let response = self.resolve(application, profiles, label).await?;
        Ok(self.renderer.render(&response.property_sources, format)?)
    }

    pub async fn refresh_secrets(&self) -> RefreshOutcome {
        self.overlay.refresh().await
    }
}
