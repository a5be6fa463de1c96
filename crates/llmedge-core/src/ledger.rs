//! In-memory error ledger.
//!
//! Per-request and background failures are appended here instead of
//! crashing the listener; the HTTP surface exposes them for inspection
//! and reset. The ledger is an explicitly owned, injectable sink rather
//! than process-global state.

use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single recorded failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorEntry {
    pub message: String,
    pub timestamp: DateTime<Utc>,
    /// Full error chain, when the source carried one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stack: Option<String>,
    /// Where the failure occurred (e.g. "LLM Proxy Route").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

impl ErrorEntry {
    pub fn new(message: impl Into<String>, context: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            timestamp: Utc::now(),
            stack: None,
            context: Some(context.into()),
        }
    }

    /// Attach the full error chain as the stack field.
    #[must_use]
    pub fn with_stack(mut self, stack: impl Into<String>) -> Self {
        self.stack = Some(stack.into());
        self
    }
}

/// Append/list/clear contract for the error ledger.
///
/// Append-only until cleared. Implementations must be safe to share
/// across handlers.
pub trait ErrorLedger: Send + Sync {
    fn append(&self, entry: ErrorEntry);
    fn list(&self) -> Vec<ErrorEntry>;
    fn clear(&self);

    /// Record a failure and emit it to the log in one step.
    fn record(&self, message: &str, context: &str) {
        tracing::error!("[ERROR] {message} ({context})");
        self.append(ErrorEntry::new(message, context));
    }
}

/// Default in-memory ledger.
#[derive(Debug, Default)]
pub struct MemoryLedger {
    entries: Mutex<Vec<ErrorEntry>>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }
}

impl MemoryLedger {
    /// A poisoned lock only means some other task panicked mid-append;
    /// the entries are still usable and recording must keep working.
    fn entries(&self) -> std::sync::MutexGuard<'_, Vec<ErrorEntry>> {
        self.entries
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl ErrorLedger for MemoryLedger {
    fn append(&self, entry: ErrorEntry) {
        self.entries().push(entry);
    }

    fn list(&self) -> Vec<ErrorEntry> {
        self.entries().clone()
    }

    fn clear(&self) {
        self.entries().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_list_clear_roundtrip() {
        let ledger = MemoryLedger::new();
        assert!(ledger.list().is_empty());

        ledger.append(ErrorEntry::new("boom", "Tunnel Creation"));
        ledger.record("also boom", "LLM Proxy Route");

        let entries = ledger.list();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].message, "boom");
        assert_eq!(entries[0].context.as_deref(), Some("Tunnel Creation"));
        assert_eq!(entries[1].message, "also boom");

        ledger.clear();
        assert!(ledger.list().is_empty());
    }

    #[test]
    fn keeps_recording_after_a_poisoning_panic() {
        let ledger = MemoryLedger::new();
        ledger.append(ErrorEntry::new("boom", "Tunnel Creation"));

        // Panic while holding the lock, as a crashing handler task would.
        let _ = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _guard = ledger.entries.lock().unwrap();
            panic!("handler died mid-append");
        }));
        assert!(ledger.entries.lock().is_err());

        ledger.record("still alive", "LLM Proxy Route");
        let entries = ledger.list();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].message, "still alive");

        ledger.clear();
        assert!(ledger.list().is_empty());
    }

    #[test]
    fn stack_is_omitted_from_json_when_absent() {
        let entry = ErrorEntry::new("boom", "Model Download");
        let json = serde_json::to_value(&entry).unwrap();
        assert!(json.get("stack").is_none());

        let entry = entry.with_stack("caused by: connection refused");
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["stack"], "caused by: connection refused");
    }
}
