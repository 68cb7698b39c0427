use axum::{
    Json,
    extract::State,
    http::StatusCode,
};
use serde::Serialize;
use tessera_git::RepositoryStatus;

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub ready: bool,
    pub version: Option<String>,
    pub branch: String,
}

/// `UP` with 200 once the repository is synchronized, `DOWN` with 503 before.
pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let synchronizer = state.synchronizer();
    let ready = synchronizer.is_ready();

    let body = HealthResponse {
        status: if ready { "UP" } else { "DOWN" },
        ready,
        version: synchronizer.current_version(),
        branch: synchronizer.branch().to_string(),
    };
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status, Json(body))
}

/// Repository synchronization details.
pub async fn repository_status(State(state): State<AppState>) -> Json<RepositoryStatus> {
    Json(state.synchronizer().status())
}
