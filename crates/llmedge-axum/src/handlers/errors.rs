//! Error ledger inspection endpoints.

use axum::extract::State;
use axum::Json;
use llmedge_core::ledger::ErrorEntry;
use serde_json::{json, Value};

use crate::state::AppState;

/// `GET /errors` — all recorded failures since the last clear.
pub async fn list(State(state): State<AppState>) -> Json<Vec<ErrorEntry>> {
    Json(state.ledger.list())
}

/// `POST /errors/clear`
pub async fn clear(State(state): State<AppState>) -> Json<Value> {
    state.ledger.clear();
    Json(json!({ "success": true, "message": "Errors cleared" }))
}
