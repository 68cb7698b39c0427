//! Rendering resolved property sources as a single document.

use crate::config::{ConfigMap, PropertySource};
use crate::error::Result;
use crate::format::json::JsonFormat;
use crate::format::properties::PropertiesFormat;
use crate::format::yaml::YamlFormat;
use crate::format::FormatSerializer;
use crate::merge::merge_property_sources;

/// Output formats of the rendering endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Yaml,
    Properties,
}

impl OutputFormat {
    /// Maps a requested file extension (`yml`, `yaml`, `properties`, `json`).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext {
            "yml" | "yaml" => Some(Self::Yaml),
            "properties" => Some(Self::Properties),
            "json" => Some(Self::Json),
            _ => None,
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            Self::Json => "application/json",
            Self::Yaml => "text/yaml; charset=utf-8",
            Self::Properties => "text/plain; charset=utf-8",
        }
    }

    fn serializer(&self) -> &'static dyn FormatSerializer {
        match self {
            Self::Json => &JsonFormat,
            Self::Yaml => &YamlFormat,
            Self::Properties => &PropertiesFormat,
        }
    }
}

/// Merges property sources and serializes the result.
///
/// Sources are expected most specific first, as they appear in a
/// `ConfigResponse`. Each is flattened, the flat maps are applied lowest
/// precedence first, and the merged map is unflattened before serializing.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResponseRenderer;

impl ResponseRenderer {
    /// The merged nested document.
    pub fn merge(&self, sources: &[PropertySource]) -> ConfigMap {
        merge_property_sources(sources)
    }

    pub fn render(&self, sources: &[PropertySource], format: OutputFormat) -> Result<String> {
        format.serializer().serialize(&self.merge(sources))
    }

    pub fn render_yaml(&self, sources: &[PropertySource]) -> Result<String> {
        self.render(sources, OutputFormat::Yaml)
    }

    pub fn render_properties(&self, sources: &[PropertySource]) -> Result<String> {
        self.render(sources, OutputFormat::Properties)
    }

    pub fn render_json(&self, sources: &[PropertySource]) -> Result<String> {
        self.render(sources, OutputFormat::Json)
    }
}
