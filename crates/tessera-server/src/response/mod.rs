//! Serializing responses.
//!
//! A `ConfigResponse` is sent as JSON (default), as YAML, or as the merged
//! flat properties of its sources. Rendered documents are sent as-is with
//! their format's content type.

pub mod json;
pub mod properties;
pub mod yaml;

use axum::{
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use tessera_core::{ConfigResponse, OutputFormat};

use crate::error::AppError;

#[derive(Debug, thiserror::Error)]
pub enum SerializeError {
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML serialization error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Render(#[from] tessera_core::TesseraError),
}

impl From<SerializeError> for AppError {
    fn from(err: SerializeError) -> Self {
        AppError::Internal(err.to_string())
    }
}

/// Converts a ConfigResponse to the negotiated format.
pub fn to_format(config: &ConfigResponse, format: OutputFormat) -> Result<Response, SerializeError> {
    match format {
        OutputFormat::Json => json::to_response(config),
        OutputFormat::Yaml => yaml::to_response(config),
        OutputFormat::Properties => properties::to_response(config),
    }
}

/// Wraps an already rendered document.
pub fn document(body: String, format: OutputFormat) -> Response {
    (StatusCode::OK, [(header::CONTENT_TYPE, format.content_type())], body).into_response()
}
