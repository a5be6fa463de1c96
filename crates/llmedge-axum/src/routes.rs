//! Route definitions and router construction.

use std::sync::Arc;

use axum::routing::{any, get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::{AppContext, AppState};

/// Build the public router.
///
/// `/llm/*` is registered with `any` so every method the inference
/// server understands passes through with the method preserved.
pub fn create_router(ctx: AppContext) -> Router {
    let state: AppState = Arc::new(ctx);

    Router::new()
        .route("/", get(handlers::ui::index))
        .route("/favicon.ico", get(handlers::ui::favicon))
        .route("/health", get(handlers::health::status))
        .route("/errors", get(handlers::errors::list))
        .route("/errors/clear", post(handlers::errors::clear))
        .route("/llm/*path", any(handlers::llm_proxy::forward))
        // The API is reachable from arbitrary web origins through the tunnel.
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
