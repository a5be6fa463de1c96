//! Shared application state.

use std::sync::Arc;

use llmedge_core::chat::TransformConfig;
use llmedge_core::ledger::ErrorLedger;
use llmedge_core::ports::InferenceProcess;

/// Services and configuration shared by all handlers.
pub struct AppContext {
    /// Error ledger for per-request and background failures.
    pub ledger: Arc<dyn ErrorLedger>,
    /// Liveness capability of the local inference process.
    pub inference: Arc<dyn InferenceProcess>,
    /// Transformer configuration (system prompt).
    pub transform: TransformConfig,
    /// Upstream base for the reverse proxy, e.g. `http://127.0.0.1:8080`.
    pub inference_base: String,
    /// Shared client for upstream proxy requests.
    pub client: reqwest::Client,
    /// Pre-rendered chat UI page.
    pub index_html: String,
}

impl AppContext {
    pub fn new(
        ledger: Arc<dyn ErrorLedger>,
        inference: Arc<dyn InferenceProcess>,
        transform: TransformConfig,
        inference_base: impl Into<String>,
        index_html: impl Into<String>,
    ) -> Self {
        Self {
            ledger,
            inference,
            transform,
            inference_base: inference_base.into(),
            client: reqwest::Client::new(),
            index_html: index_html.into(),
        }
    }
}

/// Application state shared across all handlers.
pub type AppState = Arc<AppContext>;
