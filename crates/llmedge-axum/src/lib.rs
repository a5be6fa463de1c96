//! Axum web adapter for llmedge.
//!
//! The single public listener: chat UI at `/`, health and error-ledger
//! inspection, and the `/llm/*` reverse proxy in front of the local
//! inference server.

#![deny(unused_crate_dependencies)]

// Dev-dependencies exercised only by the integration suite under tests/
#[cfg(test)]
use async_trait as _;
#[cfg(test)]
use tokio as _;

pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;

// Re-export primary types
pub use error::HttpError;
pub use routes::create_router;
pub use state::{AppContext, AppState};
