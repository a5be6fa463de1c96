//! Inference process lifecycle port.

use std::path::PathBuf;

use async_trait::async_trait;
use thiserror::Error;

/// Launch arguments for the local inference server.
#[derive(Debug, Clone)]
pub struct InferenceLaunchSpec {
    /// Path to the model artifact.
    pub model_path: PathBuf,
    /// Context window size passed to the server.
    pub context_size: u32,
    /// Worker thread count passed to the server.
    pub threads: u32,
}

impl InferenceLaunchSpec {
    pub fn new(model_path: impl Into<PathBuf>) -> Self {
        Self {
            model_path: model_path.into(),
            context_size: 2048,
            threads: 8,
        }
    }
}

/// Error from inference process control.
#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("failed to spawn inference server: {0}")]
    Spawn(String),

    #[error("inference server was never started")]
    NotStarted,

    #[error("liveness query failed: {0}")]
    Liveness(String),
}

/// Lifecycle control for the single local inference process.
///
/// `start` returns once the child is spawned, not once the model is
/// loaded; `is_running` is the liveness signal the health reporter
/// queries.
#[async_trait]
pub trait InferenceProcess: Send + Sync {
    async fn start(&self, spec: InferenceLaunchSpec) -> Result<(), ProcessError>;

    async fn is_running(&self) -> Result<bool, ProcessError>;
}
