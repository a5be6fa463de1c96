//! Gateway settings and fixed defaults.
//!
//! Values arrive from the environment through the CLI layer; this struct
//! is the validated form the orchestrator consumes.

use std::path::PathBuf;

/// Port the public-facing listener binds to.
pub const DEFAULT_PUBLIC_PORT: u16 = 3000;
/// Port the local inference server listens on.
pub const DEFAULT_INFERENCE_PORT: u16 = 8080;
/// Delay between tunnel acquisition attempts.
pub const DEFAULT_RETRY_DELAY_MS: u64 = 10_000;

/// Environment-driven gateway configuration.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Where to fetch the model artifact from.
    pub model_url: String,
    /// File name of the model artifact inside `storage_dir`.
    pub model_name: String,
    /// Directory the model artifact is stored in.
    pub storage_dir: PathBuf,
    /// System prompt prepended to non-empty conversations.
    pub system_prompt: Option<String>,
    /// Custom suffix for the chat UI `<title>`.
    pub website_title: Option<String>,
    /// Endpoint the acquired public URL is reported to.
    pub report_url: Option<String>,
}

impl Settings {
    /// Absolute path of the model artifact.
    pub fn model_file(&self) -> PathBuf {
        self.storage_dir.join(&self.model_name)
    }
}
