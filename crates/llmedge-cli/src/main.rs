//! Gateway entry point - the composition root.
//!
//! This is the only place where infrastructure is wired together: model
//! download, the llama-server child process, tunnel acquisition, optional
//! deployment reporting, and the public axum listener.

#![deny(unused_crate_dependencies)]

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use llmedge_axum::handlers::ui::render_index;
use llmedge_axum::{create_router, AppContext};
use llmedge_core::chat::TransformConfig;
use llmedge_core::ledger::{ErrorLedger, MemoryLedger};
use llmedge_core::ports::{DeviceIdentity, InferenceLaunchSpec, InferenceProcess};
use llmedge_core::settings::{
    Settings, DEFAULT_INFERENCE_PORT, DEFAULT_PUBLIC_PORT, DEFAULT_RETRY_DELAY_MS,
};
use llmedge_runtime::{ensure_model, report_deployment, LlamaServerProcess, StaticDeviceIdentity};
use llmedge_tunnel::broker::HttpBroker;
use llmedge_tunnel::client::{acquire_tunnel, TunnelConfig};
use llmedge_tunnel::session::TunnelSession;

/// Expose a local llama-server to the internet through a reverse tunnel.
#[derive(Parser, Debug)]
#[command(name = "llmedge", version)]
struct Cli {
    /// URL of the GGUF model artifact to download and serve
    #[arg(long, env = "MODEL_URL")]
    model_url: String,

    /// File name the model artifact is stored under
    #[arg(long, env = "MODEL_NAME")]
    model_name: String,

    /// Directory model artifacts are stored in
    #[arg(long, env = "STORAGE_DIR", default_value = ".")]
    storage_dir: PathBuf,

    /// System prompt prepended to every non-empty conversation
    #[arg(long, env = "CUSTOM_SYSTEM_PROMPT")]
    system_prompt: Option<String>,

    /// Custom suffix for the chat page title
    #[arg(long, env = "CUSTOM_WEBSITE_TITLE")]
    website_title: Option<String>,

    /// Endpoint the public URL is reported to once the tunnel is up
    #[arg(long, env = "REPORT_URL")]
    report_url: Option<String>,

    /// Device address, used (lowercased) as the tunnel subdomain
    #[arg(long, env = "DEVICE_ADDRESS")]
    device_address: String,

    /// Tunnel broker endpoint
    #[arg(long, env = "TUNNEL_ENDPOINT", default_value = "https://proxy.acu.run/")]
    tunnel_endpoint: String,

    /// llama-server binary to spawn
    #[arg(long, env = "LLAMA_SERVER_BIN", default_value = "llama-server")]
    llama_server_bin: PathBuf,

    /// Port the public listener binds to
    #[arg(long, env = "PORT", default_value_t = DEFAULT_PUBLIC_PORT)]
    port: u16,

    /// Port the local inference server listens on
    #[arg(long, env = "INFERENCE_PORT", default_value_t = DEFAULT_INFERENCE_PORT)]
    inference_port: u16,

    /// Milliseconds between tunnel acquisition attempts
    #[arg(long, env = "TUNNEL_RETRY_MS", default_value_t = DEFAULT_RETRY_DELAY_MS)]
    tunnel_retry_ms: u64,
}

/// Negotiate the tunnel and report the public URL.
///
/// Returns the live session (dropped sessions tear the relays down) and
/// the public URL, or `None` when the broker endpoint itself is unusable
/// and the gateway stays local-only.
async fn establish_tunnel(cli: &Cli, ledger: &Arc<dyn ErrorLedger>) -> Option<TunnelSession> {
    let broker = match HttpBroker::new(&cli.tunnel_endpoint) {
        Ok(broker) => broker,
        Err(e) => {
            error!("tunnel broker unusable, staying local-only: {e}");
            ledger.record(&format!("Error creating tunnel: {e}"), "Tunnel Creation");
            return None;
        }
    };

    let subdomain = StaticDeviceIdentity::new(&cli.device_address).address();
    let config = TunnelConfig {
        port: cli.port,
        retry_delay: Duration::from_millis(cli.tunnel_retry_ms),
    };
    let session = acquire_tunnel(&broker, &subdomain, &config).await;

    if let Some(report_url) = &cli.report_url {
        // Discoverability only; a failed report never blocks serving.
        if let Err(e) = report_deployment(report_url, session.public_url(), &subdomain).await {
            warn!("failed to report deployment URL: {e}");
            ledger.record(
                &format!("Error reporting deployment URL: {e}"),
                "Deployment Report",
            );
        }
    }

    Some(session)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let settings = Settings {
        model_url: cli.model_url.clone(),
        model_name: cli.model_name.clone(),
        storage_dir: cli.storage_dir.clone(),
        system_prompt: cli.system_prompt.clone(),
        website_title: cli.website_title.clone(),
        report_url: cli.report_url.clone(),
    };

    tokio::fs::create_dir_all(&settings.storage_dir)
        .await
        .with_context(|| format!("creating storage dir {}", settings.storage_dir.display()))?;

    let model_file = settings.model_file();
    let downloaded = ensure_model(&settings.model_url, &model_file)
        .await
        .with_context(|| format!("fetching model from {}", settings.model_url))?;
    info!(
        model = %model_file.display(),
        downloaded,
        "model artifact ready"
    );

    let ledger: Arc<dyn ErrorLedger> = Arc::new(MemoryLedger::new());

    let inference = Arc::new(LlamaServerProcess::new(
        cli.llama_server_bin.clone(),
        cli.inference_port,
        Arc::clone(&ledger),
    ));
    inference
        .start(InferenceLaunchSpec::new(&model_file))
        .await
        .context("starting llama-server")?;

    let session = establish_tunnel(&cli, &ledger).await;
    let public_llm_url = match &session {
        Some(session) => format!("{}/llm", session.public_url()),
        None => format!("http://localhost:{}/llm", cli.port),
    };

    let ctx = AppContext::new(
        ledger,
        inference,
        TransformConfig {
            system_prompt: settings.system_prompt.clone(),
        },
        format!("http://127.0.0.1:{}", cli.inference_port),
        render_index(&public_llm_url, settings.website_title.as_deref()),
    );

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", cli.port))
        .await
        .with_context(|| format!("binding public listener on port {}", cli.port))?;
    info!(port = cli.port, url = %public_llm_url, "gateway listening");

    axum::serve(listener, create_router(ctx))
        .await
        .context("public listener failed")?;

    // The session outlives the listener; relays close when it drops.
    drop(session);
    Ok(())
}
