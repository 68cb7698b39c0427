//! Secret refresh endpoint.

use axum::{Json, extract::State};
use tessera_secrets::RefreshOutcome;

use crate::state::AppState;

/// Handler for `POST /actuator/secrets/refresh`.
///
/// Always answers 200; a failed provider call reports `FAILED` and keeps
/// the previous secrets.
pub async fn refresh_secrets(State(state): State<AppState>) -> Json<RefreshOutcome> {
    Json(state.service().refresh_secrets().await)
}
