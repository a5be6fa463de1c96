//! Infrastructure adapters for llmedge.
//!
//! Concrete implementations of the core ports plus the outward-facing
//! collaborators the orchestrator drives: model artifact download, local
//! llama-server process control, health reporting, and best-effort
//! deployment reporting.

#![deny(unused_crate_dependencies)]

pub mod download;
pub mod health;
pub mod identity;
pub mod process;
pub mod report;

pub use download::{ensure_model, DownloadError};
pub use health::{check_health, HealthStatus};
pub use identity::StaticDeviceIdentity;
pub use process::LlamaServerProcess;
pub use report::report_deployment;
