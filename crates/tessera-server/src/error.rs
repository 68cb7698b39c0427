//! Error responses.
//!
//! Handlers return [`AppError`]; its response carries the status and message
//! only. [`error_envelope`] then rewrites it into the JSON envelope
//! `{timestamp, status, error, message, path}` once the request path is known.

use axum::{
    Json,
    body::Body,
    http::{Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use tessera_git::ConfigSourceError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("configuration repository is not ready")]
    NotReady,

    /// A synchronization failure surfaced with its own status.
    #[error("{message}")]
    Sync { status: StatusCode, message: String },

    #[error("{0}")]
    Internal(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotReady => StatusCode::SERVICE_UNAVAILABLE,
            Self::Sync { status, .. } => *status,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ConfigSourceError> for AppError {
    fn from(err: ConfigSourceError) -> Self {
        match err {
            ConfigSourceError::NotReady => Self::NotReady,
            ConfigSourceError::InvalidConfig(message) => Self::BadRequest(message),
            ConfigSourceError::Sync { status, message } => Self::Sync {
                status: StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
                message,
            },
            other => Self::Internal(other.to_string()),
        }
    }
}

impl From<tessera_core::TesseraError> for AppError {
    fn from(err: tessera_core::TesseraError) -> Self {
        Self::Internal(err.to_string())
    }
}

/// Message of a failed request, stashed in the response extensions.
#[derive(Debug, Clone)]
pub struct ErrorDetail {
    pub message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.to_string();
        let mut response = (status, Json(ErrorEnvelope::new(status, message.clone(), ""))).into_response();
        response.extensions_mut().insert(ErrorDetail { message });
        response
    }
}

/// Body of every error response.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorEnvelope {
    pub timestamp: String,
    pub status: u16,
    pub error: String,
    pub message: String,
    pub path: String,
}

impl ErrorEnvelope {
    pub fn new(status: StatusCode, message: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            status: status.as_u16(),
            error: status.canonical_reason().unwrap_or("Unknown").to_string(),
            message: message.into(),
            path: path.into(),
        }
    }
}

/// Fills the request path into error envelopes produced by handlers.
pub async fn error_envelope(request: Request<Body>, next: Next) -> Response {
    let path = request.uri().path().to_string();
    let response = next.run(request).await;

    let Some(detail) = response.extensions().get::<ErrorDetail>().cloned() else {
        return response;
    };

    let status = response.status();
    let (mut parts, _) = response.into_parts();
    parts.headers.remove(axum::http::header::CONTENT_LENGTH);
    let body = Json(ErrorEnvelope::new(status, detail.message, path)).into_response();
    Response::from_parts(parts, body.into_body())
}

/// Fallback for unmatched routes.
pub async fn not_found() -> AppError {
    AppError::NotFound("no handler for this path".to_string())
}
