//! Merged-document endpoints (`.yml`, `.yaml`, `.properties`, `.json`).

use axum::{
    extract::{Path, State},
    response::Response,
};
use tracing::instrument;

use crate::error::AppError;
use crate::extractors::DocumentName;
use crate::response::document;
use crate::state::AppState;

/// Handler for `GET /{name}`, e.g. `/orders-prod.yml`. The label is the
/// tracked branch.
#[instrument(skip_all, fields(name = %name))]
pub async fn get_document(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Response, AppError> {
    let document = DocumentName::parse(&name).ok_or_else(|| {
        AppError::NotFound(format!(
            "'{name}' is not an {{application}}-{{profile}}.yml|yaml|properties|json document"
        ))
    })?;

    render_document(&state, &document, None).await
}

pub(crate) async fn render_document(
    state: &AppState,
    doc: &DocumentName,
    label: Option<&str>,
) -> Result<Response, AppError> {
    let body = state
        .service()
        .render(&doc.application, &doc.profile, label, doc.format)
        .await?;

    Ok(document(body, doc.format))
}
