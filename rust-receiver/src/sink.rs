//! Event sink used by the webhook core.
//!
//! Handlers report outcomes as `(severity, message)` pairs. The server wires
//! in [`TracingSink`]; tests use [`MemorySink`] to inspect what was reported.

use std::fmt;
use std::sync::Mutex;

use tracing::{error, info, warn};

/// Severity of a reported event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Warn,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Severity::Info => "info",
            Severity::Warn => "warn",
            Severity::Error => "error",
        };
        f.write_str(s)
    }
}

/// Destination for events emitted by the webhook core.
pub trait EventSink: Send + Sync {
    fn emit(&self, severity: Severity, message: &str);
}

/// Forwards events to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn emit(&self, severity: Severity, message: &str) {
        match severity {
            Severity::Info => info!(message = %message, "webhook_event"),
            Severity::Warn => warn!(message = %message, "webhook_event"),
            Severity::Error => error!(message = %message, "webhook_error"),
        }
    }
}

/// Keeps events in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    events: Mutex<Vec<(Severity, String)>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything emitted so far.
    pub fn events(&self) -> Vec<(Severity, String)> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }

    /// Messages emitted at the given severity.
    pub fn messages(&self, severity: Severity) -> Vec<String> {
        self.events()
            .into_iter()
            .filter(|(s, _)| *s == severity)
            .map(|(_, m)| m)
            .collect()
    }
}

impl EventSink for MemorySink {
    fn emit(&self, severity: Severity, message: &str) {
        if let Ok(mut events) = self.events.lock() {
            events.push((severity, message.to_string()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_sink_filters_by_severity() {
        let sink = MemorySink::new();
        sink.emit(Severity::Info, "saved");
        sink.emit(Severity::Error, "broken");
        sink.emit(Severity::Error, "still broken");

        assert_eq!(sink.events().len(), 3);
        assert_eq!(sink.messages(Severity::Info), vec!["saved".to_string()]);
        assert_eq!(sink.messages(Severity::Error).len(), 2);
        assert!(sink.messages(Severity::Warn).is_empty());
    }

    #[test]
    fn test_severity_display() {
        assert_eq!(Severity::Error.to_string(), "error");
    }
}
