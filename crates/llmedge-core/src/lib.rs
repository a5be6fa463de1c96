//! Core domain types and port definitions for llmedge.
//!
//! This crate holds the pieces that every adapter shares: the
//! chat-completion request model and its canonicalization, the error
//! ledger contract, the platform capability ports, and settings.
//!
//! # Design Rules
//!
//! - No HTTP, process, or filesystem implementation details in signatures
//! - Ports are minimal and intent-based
//! - The transformer is a pure function

#![deny(unused_crate_dependencies)]

pub mod chat;
pub mod ledger;
pub mod ports;
pub mod settings;

// Re-export commonly used types for convenience
pub use chat::{
    CanonicalCompletionRequest, RawCompletionRequest, TransformConfig, transform,
    DEFAULT_FREQUENCY_PENALTY, DEFAULT_MAX_TOKENS, DEFAULT_PRESENCE_PENALTY, DEFAULT_TEMPERATURE,
    DEFAULT_TOP_P,
};
pub use ledger::{ErrorEntry, ErrorLedger, MemoryLedger};
pub use ports::{DeviceIdentity, InferenceLaunchSpec, InferenceProcess, ProcessError};
pub use settings::{
    Settings, DEFAULT_INFERENCE_PORT, DEFAULT_PUBLIC_PORT, DEFAULT_RETRY_DELAY_MS,
};
