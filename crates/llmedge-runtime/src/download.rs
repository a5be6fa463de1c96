//! Model artifact download.
//!
//! The model file is fetched once and reused across restarts. The body is
//! streamed to disk chunk by chunk so multi-gigabyte artifacts never sit
//! in memory.

use std::path::Path;

use futures_util::StreamExt;
use thiserror::Error;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tracing::info;

/// Error fetching or persisting the model artifact.
#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("model request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("model download failed with status {0}")]
    Status(u16),

    #[error("failed to write model file: {0}")]
    Io(#[from] std::io::Error),
}

/// Make sure the model artifact exists at `destination`.
///
/// Returns `true` when a download was performed, `false` when the file
/// was already present. A failed download is fatal to startup: without a
/// model there is no service.
pub async fn ensure_model(url: &str, destination: &Path) -> Result<bool, DownloadError> {
    if destination.exists() {
        info!("using already downloaded model: {}", destination.display());
        return Ok(false);
    }
    download_model(url, destination).await?;
    Ok(true)
}

async fn download_model(url: &str, destination: &Path) -> Result<(), DownloadError> {
    info!("downloading model to {}", destination.display());

    let response = reqwest::get(url).await?;
    if !response.status().is_success() {
        return Err(DownloadError::Status(response.status().as_u16()));
    }

    if let Some(parent) = destination.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }

    let mut file = File::create(destination).await?;
    let mut stream = response.bytes_stream();
    let mut written: u64 = 0;
    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        written += chunk.len() as u64;
        file.write_all(&chunk).await?;
    }
    file.flush().await?;

    info!("model download complete ({written} bytes)");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use axum::routing::get;
    use axum::Router;

    async fn spawn_file_server(body: &'static str) -> String {
        let app = Router::new().route("/model.gguf", get(move || async move { body }));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}/model.gguf")
    }

    #[tokio::test]
    async fn skips_download_when_artifact_present() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("model.gguf");
        tokio::fs::write(&dest, b"weights").await.unwrap();

        let downloaded = ensure_model("http://127.0.0.1:1/unreachable", &dest)
            .await
            .unwrap();

        assert!(!downloaded);
        assert_eq!(tokio::fs::read(&dest).await.unwrap(), b"weights");
    }

    #[tokio::test]
    async fn streams_artifact_to_disk() {
        let url = spawn_file_server("fake gguf bytes").await;
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("model.gguf");

        let downloaded = ensure_model(&url, &dest).await.unwrap();

        assert!(downloaded);
        assert_eq!(tokio::fs::read(&dest).await.unwrap(), b"fake gguf bytes");
    }

    #[tokio::test]
    async fn non_success_status_is_an_error() {
        let app = Router::new();
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("model.gguf");
        let err = ensure_model(&format!("http://{addr}/missing"), &dest)
            .await
            .unwrap_err();

        assert!(matches!(err, DownloadError::Status(404)));
        assert!(!dest.exists());
    }
}
