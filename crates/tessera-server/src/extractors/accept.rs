//! `Accept` header negotiation for ConfigResponse endpoints.

use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use tessera_core::OutputFormat;

/// Content type of a YAML-encoded ConfigResponse.
pub const YAML_CONTENT_TYPE: &str = "application/x-yaml";

/// Picks the response format for an `Accept` header.
///
/// YAML media types select YAML, `text/plain` selects flattened properties,
/// anything else (including `*/*` and no header) selects JSON.
pub fn negotiate(accept: Option<&str>) -> OutputFormat {
    let Some(accept) = accept else {
        return OutputFormat::Json;
    };
    let accept = accept.to_ascii_lowercase();

    if accept.contains("application/x-yaml")
        || accept.contains("text/yaml")
        || accept.contains("application/yaml")
    {
        OutputFormat::Yaml
    } else if accept.contains("text/plain") {
        OutputFormat::Properties
    } else {
        OutputFormat::Json
    }
}

/// Extractor yielding the negotiated [`OutputFormat`].
pub struct AcceptFormat(pub OutputFormat);

impl<S> FromRequestParts<S> for AcceptFormat
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let accept = parts
            .headers
            .get(header::ACCEPT)
            .and_then(|v| v.to_str().ok());

        Ok(AcceptFormat(negotiate(accept)))
    }
}
