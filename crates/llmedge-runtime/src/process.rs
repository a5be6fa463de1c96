//! Local llama-server child process.
//!
//! Implements the [`InferenceProcess`] port by spawning the llama-server
//! binary and watching it until exit. An unexpected exit is recorded in
//! the error ledger but does not take the public listener down.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use llmedge_core::ledger::ErrorLedger;
use llmedge_core::ports::{InferenceLaunchSpec, InferenceProcess, ProcessError};
use tokio::process::Command;
use tokio::sync::Mutex;
use tracing::{error, info, warn};

/// llama-server process owner.
pub struct LlamaServerProcess {
    binary: PathBuf,
    port: u16,
    ledger: Arc<dyn ErrorLedger>,
    running: Mutex<Option<Arc<AtomicBool>>>,
}

impl LlamaServerProcess {
    pub fn new(binary: impl Into<PathBuf>, port: u16, ledger: Arc<dyn ErrorLedger>) -> Self {
        Self {
            binary: binary.into(),
            port,
            ledger,
            running: Mutex::new(None),
        }
    }
}

#[async_trait]
impl InferenceProcess for LlamaServerProcess {
    async fn start(&self, spec: InferenceLaunchSpec) -> Result<(), ProcessError> {
        let mut child = Command::new(&self.binary)
            .arg("--model")
            .arg(&spec.model_path)
            .arg("--ctx-size")
            .arg(spec.context_size.to_string())
            .arg("--threads")
            .arg(spec.threads.to_string())
            .arg("--host")
            .arg("127.0.0.1")
            .arg("--port")
            .arg(self.port.to_string())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| ProcessError::Spawn(e.to_string()))?;

        info!(
            binary = %self.binary.display(),
            model = %spec.model_path.display(),
            port = self.port,
            "llama-server started"
        );

        let flag = Arc::new(AtomicBool::new(true));
        *self.running.lock().await = Some(Arc::clone(&flag));

        // Watch the child; an exit here is always unexpected since the
        // gateway never stops the server on purpose.
        let ledger = Arc::clone(&self.ledger);
        tokio::spawn(async move {
            match child.wait().await {
                Ok(status) => {
                    warn!("llama-server exited with {status}");
                    ledger.record("Llama server closed unexpectedly", "Llama Server");
                }
                Err(e) => {
                    error!("failed waiting on llama-server: {e}");
                    ledger.record(&format!("Llama server wait failed: {e}"), "Llama Server");
                }
            }
            flag.store(false, Ordering::SeqCst);
        });

        Ok(())
    }

    async fn is_running(&self) -> Result<bool, ProcessError> {
        match self.running.lock().await.as_ref() {
            Some(flag) => Ok(flag.load(Ordering::SeqCst)),
            None => Err(ProcessError::NotStarted),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use llmedge_core::ledger::MemoryLedger;

    #[tokio::test]
    async fn liveness_before_start_is_an_error() {
        let ledger: Arc<dyn ErrorLedger> = Arc::new(MemoryLedger::new());
        let process = LlamaServerProcess::new("/nonexistent/llama-server", 8080, ledger);
        assert!(matches!(
            process.is_running().await,
            Err(ProcessError::NotStarted)
        ));
    }

    #[tokio::test]
    async fn spawn_failure_surfaces_as_process_error() {
        let ledger: Arc<dyn ErrorLedger> = Arc::new(MemoryLedger::new());
        let process = LlamaServerProcess::new("/nonexistent/llama-server", 8080, ledger);
        let err = process
            .start(InferenceLaunchSpec::new("/tmp/model.gguf"))
            .await
            .unwrap_err();
        assert!(matches!(err, ProcessError::Spawn(_)));
    }

    #[tokio::test]
    async fn unexpected_exit_lands_in_the_ledger() {
        let ledger = Arc::new(MemoryLedger::new());
        // `true` exits immediately, standing in for a crashing server.
        let process = LlamaServerProcess::new(
            "true",
            8080,
            Arc::clone(&ledger) as Arc<dyn ErrorLedger>,
        );
        process
            .start(InferenceLaunchSpec::new("/tmp/model.gguf"))
            .await
            .unwrap();

        // Give the watcher a moment to observe the exit.
        for _ in 0..50 {
            if !process.is_running().await.unwrap() {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }

        assert!(!process.is_running().await.unwrap());
        let entries = ledger.list();
        assert_eq!(entries.len(), 1);
        assert!(entries[0].message.contains("closed unexpectedly"));
        assert_eq!(entries[0].context.as_deref(), Some("Llama Server"));
    }
}
