//! Health endpoint.

use axum::extract::State;
use axum::Json;
use llmedge_runtime::health::{check_health, HealthStatus};

use crate::state::AppState;

/// `GET /health` — liveness of the local inference process.
pub async fn status(State(state): State<AppState>) -> Json<HealthStatus> {
    Json(check_health(state.inference.as_ref()).await)
}
