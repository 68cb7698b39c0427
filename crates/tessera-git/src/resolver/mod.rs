//! Resolving a query into ordered property sources.

mod discovery;

use std::path::Path;
use std::sync::Arc;

use tessera_core::format::parse_file_content;
use tessera_core::{ConfigResponse, OutputFormat, PropertySource, ResponseRenderer};
use tracing::{debug, instrument, warn};

use crate::error::ConfigSourceError;
use crate::source::ConfigQuery;
use crate::sync::RepositorySynchronizer;

pub use discovery::discover;

/// Resolves queries against the synchronizer's published index.
///
/// Each call works on one index snapshot, so a rebuild published mid-request
/// does not mix files from two checkouts.
#[derive(Debug, Clone)]
pub struct ConfigResolver {
    synchronizer: Arc<RepositorySynchronizer>,
    renderer: ResponseRenderer,
}

impl ConfigResolver {
    pub fn new(synchronizer: Arc<RepositorySynchronizer>) -> Self {
        Self {
            synchronizer,
            renderer: ResponseRenderer,
        }
    }

    pub fn synchronizer(&self) -> &Arc<RepositorySynchronizer> {
        &self.synchronizer
    }

    /// Resolves `application` for a comma-separated profile list.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigSourceError::NotReady`] before the first successful
    /// synchronization. Unreadable or malformed files do not fail the call.
    pub async fn resolve(
        &self,
        application: &str,
        profiles: &str,
        label: Option<&str>,
    ) -> Result<ConfigResponse, ConfigSourceError> {
        self.resolve_query(&ConfigQuery::parse(application, profiles, label)).await
    }

    #[instrument(skip_all, fields(query = %query))]
    pub async fn resolve_query(&self, query: &ConfigQuery) -> Result<ConfigResponse, ConfigSourceError> {
        if !self.synchronizer.is_ready() {
            return Err(ConfigSourceError::NotReady);
        }

        let index = self.synchronizer.index();
        let label = query.effective_label(self.synchronizer.branch()).to_string();

        let mut files = discover(&index, query.application(), query.profiles());
        files.reverse();
        debug!(files = files.len(), "resolved file list");

        let mut sources = Vec::with_capacity(files.len());
        for relative in &files {
            sources.push(load_source(index.root(), relative, &label).await);
        }

        Ok(ConfigResponse::new(query.application().as_str(), query.profile_names())
            .with_label(label)
            .with_version(self.synchronizer.current_version())
            .with_sources(sources))
    }

    /// Resolves and renders the merged document.
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

    pub async fn render_as_yaml(
        &self,
        application: &str,
        profiles: &str,
        label: Option<&str>,
    ) -> Result<String, ConfigSourceError> {
        self.render(application, profiles, label, OutputFormat::Yaml).await
    }

    pub async fn render_as_properties(
        &self,
        application: &str,
        profiles: &str,
        label: Option<&str>,
    ) -> Result<String, ConfigSourceError> {
        self.render(application, profiles, label, OutputFormat::Properties).await
    }

    pub async fn render_as_json(
        &self,
        application: &str,
        profiles: &str,
        label: Option<&str>,
    ) -> Result<String, ConfigSourceError> {
        self.render(application, profiles, label, OutputFormat::Json).await
    }
}

/// Property source name: `git:{label}:{path relative to the root}`.
pub fn source_name(label: &str, relative: &Path) -> String {
    format!("git:{}:{}", label, relative.to_string_lossy().replace('\\', "/"))
}

/// Reads and parses one file. Failures become an error-marker source.
async fn load_source(root: &Path, relative: &Path, label: &str) -> PropertySource {
    let name = source_name(label, relative);
    let file = relative.to_string_lossy();

    let content = match tokio::fs::read_to_string(root.join(relative)).await {
        Ok(content) => content,
        Err(e) => {
            warn!(file = %file, error = %e, "failed to read config file");
            return PropertySource::parse_failure(name, &file);
        },
    };

    match parse_file_content(relative, &name, &content) {
        Ok(map) => PropertySource::new(name, map),
        Err(e) => {
            warn!(file = %file, error = %e, "failed to parse config file");
            PropertySource::parse_failure(name, &file)
        },
    }
}
