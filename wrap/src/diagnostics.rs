//! Where internal error diagnostics go
//!
//! Error helpers on [`crate::Ctx`] log the internal diagnostic of every error
//! they build. The sink is handed to the context rather than looked up
//! globally, so tests can assert on what was logged.

use std::sync::{Mutex, PoisonError};

/// Receives one formatted diagnostic per call
pub trait DiagnosticSink: Send + Sync {
    fn error(&self, diagnostic: &str);
}

/// Forwards diagnostics to `tracing` at error level
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn error(&self, diagnostic: &str) {
        tracing::error!(target: "wrap::diagnostics", "{}", diagnostic);
    }
}

/// Keeps diagnostics in memory
#[derive(Debug, Default)]
pub struct MemorySink {
    entries: Mutex<Vec<String>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything logged so far
    pub fn entries(&self) -> Vec<String> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// True if any entry contains `needle`
    pub fn contains(&self, needle: &str) -> bool {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .any(|entry| entry.contains(needle))
    }
}

impl DiagnosticSink for MemorySink {
    fn error(&self, diagnostic: &str) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(diagnostic.to_string());
    }
}
