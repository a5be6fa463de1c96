//! Best-effort deployment reporting.
//!
//! Once a tunnel is up, the public URL is announced to a configured
//! endpoint. Failure here only loses discoverability, so the caller logs
//! and moves on.

use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DeploymentReport<'a> {
    deployment_url: &'a str,
    address: &'a str,
    timestamp: DateTime<Utc>,
}

/// POST the acquired public URL and device identity to `report_url`.
pub async fn report_deployment(
    report_url: &str,
    deployment_url: &str,
    address: &str,
) -> Result<(), reqwest::Error> {
    let body = DeploymentReport {
        deployment_url,
        address,
        timestamp: Utc::now(),
    };

    reqwest::Client::new()
        .post(report_url)
        .json(&body)
        .send()
        .await?
        .error_for_status()?;

    tracing::info!("deployment URL reported");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Arc;

    use axum::extract::State;
    use axum::routing::post;
    use axum::{Json, Router};
    use tokio::sync::Mutex;

    #[tokio::test]
    async fn posts_camel_case_report_body() {
        let received: Arc<Mutex<Option<serde_json::Value>>> = Arc::new(Mutex::new(None));
        let sink = Arc::clone(&received);

        let app = Router::new()
            .route(
                "/deployments",
                post(
                    |State(sink): State<Arc<Mutex<Option<serde_json::Value>>>>,
                     Json(body): Json<serde_json::Value>| async move {
                        *sink.lock().await = Some(body);
                        "ok"
                    },
                ),
            )
            .with_state(sink);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        report_deployment(
            &format!("http://{addr}/deployments"),
            "https://edge.acu.run",
            "0xabc",
        )
        .await
        .unwrap();

        let body = received.lock().await.take().unwrap();
        assert_eq!(body["deploymentUrl"], "https://edge.acu.run");
        assert_eq!(body["address"], "0xabc");
        assert!(body["timestamp"].is_string());
    }

    #[tokio::test]
    async fn error_status_propagates() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, Router::new()).await.unwrap();
        });

        let result = report_deployment(&format!("http://{addr}/nowhere"), "u", "a").await;
        assert!(result.is_err());
    }
}
