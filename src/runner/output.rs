//! # Task Output Log
//!
//! Persisted, append-only output of one background run, split into four
//! channels. The background unit of work appends; the poller reads snapshots.
//! Reads never consume entries, so the log can be inspected any number of times
//! before and after the run finishes.

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;

/// A recorded error with where it came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorRecord {
    pub message: String,
    pub location: String,
}

/// Everything a background run produced, in production order per channel
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskResult {
    /// Primary return values
    pub output: Vec<Value>,
    pub errors: Vec<ErrorRecord>,
    pub warnings: Vec<String>,
    /// Diagnostic trace records
    pub traces: Vec<String>,
}

impl TaskResult {
    pub fn is_empty(&self) -> bool {
        self.output.is_empty()
            && self.errors.is_empty()
            && self.warnings.is_empty()
            && self.traces.is_empty()
    }

    /// True when the primary channel carries a failed-result record
    pub fn has_failure(&self) -> bool {
        self.output.iter().any(is_failure_record)
    }
}

/// Build the structured failed-result value placed on the primary channel
pub fn failure_record(message: &str, location: &str) -> Value {
    json!({
        "failed": true,
        "error": message,
        "location": location,
    })
}

/// Whether a primary-channel value is a failed-result record
pub fn is_failure_record(value: &Value) -> bool {
    value.get("failed").and_then(Value::as_bool).unwrap_or(false)
}

/// Shared append-only log handed to a unit of work
#[derive(Debug, Clone, Default)]
pub struct OutputLog {
    inner: Arc<RwLock<TaskResult>>,
}

impl OutputLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn write_output(&self, value: Value) {
        self.inner.write().output.push(value);
    }

    pub fn write_error(&self, message: impl Into<String>, location: impl Into<String>) {
        self.inner.write().errors.push(ErrorRecord {
            message: message.into(),
            location: location.into(),
        });
    }

    pub fn write_warning(&self, message: impl Into<String>) {
        self.inner.write().warnings.push(message.into());
    }

    pub fn write_trace(&self, message: impl Into<String>) {
        self.inner.write().traces.push(message.into());
    }

    /// Record a failure on both the primary and the error channel
    pub fn write_failure(&self, message: &str, location: &str) {
        let mut log = self.inner.write();
        log.output.push(failure_record(message, location));
        log.errors.push(ErrorRecord {
            message: message.to_string(),
            location: location.to_string(),
        });
    }

    /// Non-destructive read of every channel
    pub fn snapshot(&self) -> TaskResult {
        self.inner.read().clone()
    }

    /// Number of entries across all channels
    pub fn len(&self) -> usize {
        let log = self.inner.read();
        log.output.len() + log.errors.len() + log.warnings.len() + log.traces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
