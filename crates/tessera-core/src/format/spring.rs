use crate::config::PropertySource;
use serde::{Deserialize, Serialize};

/// Response body compatible with the Spring Cloud Config Server
/// `/{application}/{profile}[/{label}]` endpoint.
///
/// `propertySources` is ordered most specific first; a client merging them
/// lets earlier entries override later ones. `version` and `state` are
/// always serialized, as `null` when absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigResponse {
    pub name: String,
    pub profiles: Vec<String>,
    pub label: Option<String>,
    pub version: Option<String>,
    pub state: Option<String>,
    pub property_sources: Vec<PropertySource>,
}

impl ConfigResponse {
    pub fn new(name: impl Into<String>, profiles: Vec<String>) -> Self {
        Self {
            name: name.into(),
            profiles,
            label: None,
            version: None,
            state: None,
            property_sources: Vec::new(),
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_version(mut self, version: Option<String>) -> Self {
        self.version = version;
        self
    }

    pub fn with_sources(mut self, sources: Vec<PropertySource>) -> Self {
        self.property_sources = sources;
        self
    }
}
