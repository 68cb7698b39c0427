//! ConfigResponse endpoints.

use axum::{
    extract::{Path, State},
    response::Response,
};
use tracing::{debug, instrument};

use crate::error::AppError;
use crate::extractors::{
    AcceptFormat, AppProfileLabelPath, AppProfilePath, DocumentName, validate_label,
};
use crate::extractors::path::sanitize_label;
use crate::handlers::render::render_document;
use crate::response::to_format;
use crate::state::AppState;

/// Handler for `GET /{app}/{profile}`.
///
/// A second segment naming a document (`orders-dev.yml`) makes this the
/// labelled document route `/{label}/{application}-{profile}.{ext}`.
#[instrument(skip_all, fields(app = %path.app, profile = %path.profile))]
pub async fn get_config(
    State(state): State<AppState>,
    Path(path): Path<AppProfilePath>,
    AcceptFormat(format): AcceptFormat,
) -> Result<Response, AppError> {
    if let Some(document) = DocumentName::parse(&path.profile) {
        let label = sanitize_label(&path.app);
        validate_label(&label).map_err(AppError::BadRequest)?;
        return render_document(&state, &document, Some(&label)).await;
    }

    path.validate().map_err(AppError::BadRequest)?;

    let response = state
        .service()
        .resolve(&path.app, &path.profile, None)
        .await?;
    debug!(sources = response.property_sources.len(), "resolved");

    Ok(to_format(&response, format)?)
}

/// Handler for `GET /{app}/{profile}/{label}`.
#[instrument(skip_all, fields(app = %path.app, profile = %path.profile, label = %path.label))]
pub async fn get_config_with_label(
    State(state): State<AppState>,
    Path(path): Path<AppProfileLabelPath>,
    AcceptFormat(format): AcceptFormat,
) -> Result<Response, AppError> {
    path.validate().map_err(AppError::BadRequest)?;

    let label = path.sanitized_label();
    validate_label(&label).map_err(AppError::BadRequest)?;

    let response = state
        .service()
        .resolve(&path.app, &path.profile, Some(&label))
        .await?;
    debug!(sources = response.property_sources.len(), "resolved");

    Ok(to_format(&response, format)?)
}
