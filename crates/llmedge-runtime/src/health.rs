//! Health reporting for the inference process.

use llmedge_core::ports::InferenceProcess;
use serde::Serialize;

/// JSON health payload served on `/health`.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct HealthStatus {
    pub status: String,
}

impl HealthStatus {
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: message.into(),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == "ok"
    }
}

/// Query the inference process's liveness signal.
///
/// Never fails: a failed query is folded into the status message so the
/// endpoint always answers.
pub async fn check_health(process: &dyn InferenceProcess) -> HealthStatus {
    match process.is_running().await {
        Ok(true) => HealthStatus::ok(),
        Ok(false) => HealthStatus::error(
            "Error: LLM server not running. Give it some time and try again.",
        ),
        Err(e) => HealthStatus::error(format!("Error: {e}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use async_trait::async_trait;
    use llmedge_core::ports::{InferenceLaunchSpec, ProcessError};

    struct StubProcess {
        result: Result<bool, ProcessError>,
    }

    #[async_trait]
    impl InferenceProcess for StubProcess {
        async fn start(&self, _: InferenceLaunchSpec) -> Result<(), ProcessError> {
            Ok(())
        }

        async fn is_running(&self) -> Result<bool, ProcessError> {
            match &self.result {
                Ok(v) => Ok(*v),
                Err(ProcessError::NotStarted) => Err(ProcessError::NotStarted),
                Err(ProcessError::Spawn(m)) => Err(ProcessError::Spawn(m.clone())),
                Err(ProcessError::Liveness(m)) => Err(ProcessError::Liveness(m.clone())),
            }
        }
    }

    #[tokio::test]
    async fn running_process_reports_ok() {
        let status = check_health(&StubProcess { result: Ok(true) }).await;
        assert!(status.is_ok());
        assert_eq!(serde_json::to_string(&status).unwrap(), r#"{"status":"ok"}"#);
    }

    #[tokio::test]
    async fn stopped_process_reports_diagnostic() {
        let status = check_health(&StubProcess { result: Ok(false) }).await;
        assert!(!status.is_ok());
        assert!(status.status.contains("not running"));
    }

    #[tokio::test]
    async fn probe_failure_is_embedded_not_raised() {
        let status = check_health(&StubProcess {
            result: Err(ProcessError::Liveness("probe exploded".to_string())),
        })
        .await;
        assert!(status.status.contains("probe exploded"));
    }
}
