//! Diagnostic sinks.
//!
//! The invoking harness usually hands over a trace log that ends up next to
//! the invocation result. Batch execution and action invocation write their
//! per-item diagnostics here in addition to `tracing`.

use parking_lot::Mutex;

/// Receives human-readable diagnostic lines.
pub trait DiagnosticSink {
    fn trace(&self, message: &str);
}

/// Forwards every line to `tracing` at WARN level.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn trace(&self, message: &str) {
        tracing::warn!(target: "record_tracker::diagnostics", "{}", message);
    }
}

/// Collects lines in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    lines: Mutex<Vec<String>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.lines.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.lock().is_empty()
    }
}

impl DiagnosticSink for MemorySink {
    fn trace(&self, message: &str) {
        self.lines.lock().push(message.to_string());
    }
}
