//! Chat-completion request model and canonicalization.
//!
//! Inbound bodies are untrusted: every field is optional and `messages`
//! may not even be an array. [`transform`] normalizes a raw request into
//! the exact schema llama-server expects, filling documented defaults and
//! optionally prepending a configured system prompt. It is a pure
//! function and never fails.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Default sampling temperature when the client omits one.
pub const DEFAULT_TEMPERATURE: f64 = 0.7;
/// Default completion token budget.
pub const DEFAULT_MAX_TOKENS: u64 = 2048;
/// Default frequency penalty.
pub const DEFAULT_FREQUENCY_PENALTY: f64 = 0.0;
/// Default presence penalty.
pub const DEFAULT_PRESENCE_PENALTY: f64 = 0.0;
/// Default nucleus-sampling cutoff.
pub const DEFAULT_TOP_P: f64 = 1.0;

/// Inbound chat-completion request as received from the public side.
///
/// Deserialization is deliberately loose: unknown fields are ignored and
/// `messages` is kept as a raw [`Value`] so that a non-array payload is
/// handled by coercion instead of a parse error.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawCompletionRequest {
    #[serde(default)]
    pub messages: Option<Value>,
    pub temperature: Option<f64>,
    pub stream: Option<bool>,
    pub model: Option<String>,
    pub max_tokens: Option<u64>,
    #[serde(default)]
    pub stop: Option<Value>,
    pub frequency_penalty: Option<f64>,
    pub presence_penalty: Option<f64>,
    pub top_p: Option<f64>,
}

impl RawCompletionRequest {
    /// Parse a raw body, degrading to an empty request on malformed JSON.
    ///
    /// The transformer contract is "never fails"; a body we cannot parse
    /// behaves like an empty one (all defaults, no messages).
    pub fn from_body(body: &[u8]) -> Self {
        match serde_json::from_slice(body) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::debug!("unparseable request body, using defaults: {e}");
                Self::default()
            }
        }
    }
}

/// Fully populated request in the schema the local inference server accepts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CanonicalCompletionRequest {
    pub messages: Vec<Value>,
    pub temperature: f64,
    pub stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    pub max_tokens: u64,
    pub stop: Value,
    pub frequency_penalty: f64,
    pub presence_penalty: f64,
    pub top_p: f64,
}

/// Configuration consulted by [`transform`].
#[derive(Debug, Clone, Default)]
pub struct TransformConfig {
    /// System prompt to prepend to non-empty conversations.
    pub system_prompt: Option<String>,
}

/// Normalize a raw request into the canonical llama-server schema.
///
/// Guarantees:
/// - `messages` is always a well-typed sequence; non-array input becomes
///   an empty sequence
/// - every optional numeric/boolean field carries its documented default
///   when omitted; an explicit `0` or `false` is kept as-is
/// - the system prompt is injected only when it is non-empty AND the
///   message sequence is non-empty
pub fn transform(raw: &RawCompletionRequest, cfg: &TransformConfig) -> CanonicalCompletionRequest {
    let mut messages = match &raw.messages {
        Some(Value::Array(items)) => items.clone(),
        _ => Vec::new(),
    };

    if let Some(prompt) = cfg.system_prompt.as_deref() {
        if !prompt.is_empty() && !messages.is_empty() {
            messages.insert(0, json!({ "role": "system", "content": prompt }));
        }
    }

    CanonicalCompletionRequest {
        messages,
        temperature: raw.temperature.unwrap_or(DEFAULT_TEMPERATURE),
        stream: raw.stream.unwrap_or(false),
        model: raw.model.clone(),
        max_tokens: raw.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
        stop: raw.stop.clone().unwrap_or(Value::Null),
        frequency_penalty: raw.frequency_penalty.unwrap_or(DEFAULT_FREQUENCY_PENALTY),
        presence_penalty: raw.presence_penalty.unwrap_or(DEFAULT_PRESENCE_PENALTY),
        top_p: raw.top_p.unwrap_or(DEFAULT_TOP_P),
    }
}
