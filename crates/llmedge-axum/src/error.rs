//! HTTP error types and response mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

/// Adapter-level error type.
#[derive(Debug, Error)]
pub enum HttpError {
    /// Upstream transport failure while proxying. The detail is logged
    /// and ledgered by the handler; clients get a fixed body.
    #[error("proxy error: {0}")]
    Proxy(String),
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        match self {
            // Fixed body: clients never see upstream details or stack traces.
            HttpError::Proxy(_) => (
                StatusCode::BAD_GATEWAY,
                axum::Json(json!({ "error": "Proxy error" })),
            )
                .into_response(),
        }
    }
}
