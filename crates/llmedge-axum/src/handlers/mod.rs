//! HTTP handlers.

pub mod errors;
pub mod health;
pub mod llm_proxy;
pub mod ui;
