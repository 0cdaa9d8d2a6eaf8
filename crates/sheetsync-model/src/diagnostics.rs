//! Explicit diagnostic sink passed into each pipeline component.
//!
//! Components never reach for a global logger when reporting recoverable
//! conditions (skipped files, missing columns, refresh failures). They
//! receive a `&dyn Diagnostics` instead, so the CLI can forward to
//! `tracing` while tests record the messages and assert on them.

use std::sync::Mutex;

use tracing::{error, info, warn};

/// Severity of a recorded diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum DiagnosticLevel {
    Info,
    Warn,
    Error,
}

/// A recorded diagnostic message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub level: DiagnosticLevel,
    pub message: String,
}

/// Sink for recoverable conditions reported by pipeline components.
pub trait Diagnostics: Send + Sync {
    fn info(&self, message: &str);
    fn warn(&self, message: &str);
    fn error(&self, message: &str);
}

/// Forwards diagnostics to `tracing` events.
#[derive(Debug, Clone, Copy)]
pub struct TracingDiagnostics {
    component: &'static str,
}

impl TracingDiagnostics {
    pub const fn new(component: &'static str) -> Self {
        Self { component }
    }
}

impl Default for TracingDiagnostics {
    fn default() -> Self {
        Self::new("pipeline")
    }
}

impl Diagnostics for TracingDiagnostics {
    fn info(&self, message: &str) {
        info!(component = self.component, "{message}");
    }

    fn warn(&self, message: &str) {
        warn!(component = self.component, "{message}");
    }

    fn error(&self, message: &str) {
        error!(component = self.component, "{message}");
    }
}

/// Collects diagnostics in memory.
#[derive(Debug, Default)]
pub struct RecordingDiagnostics {
    entries: Mutex<Vec<Diagnostic>>,
}

impl RecordingDiagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// All recorded diagnostics in emission order.
    pub fn entries(&self) -> Vec<Diagnostic> {
        self.lock().clone()
    }

    /// Messages recorded at the given level.
    pub fn messages(&self, level: DiagnosticLevel) -> Vec<String> {
        self.lock()
            .iter()
            .filter(|entry| entry.level == level)
            .map(|entry| entry.message.clone())
            .collect()
    }

    pub fn warnings(&self) -> Vec<String> {
        self.messages(DiagnosticLevel::Warn)
    }

    pub fn errors(&self) -> Vec<String> {
        self.messages(DiagnosticLevel::Error)
    }

    fn record(&self, level: DiagnosticLevel, message: &str) {
        self.lock().push(Diagnostic {
            level,
            message: message.to_string(),
        });
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Diagnostic>> {
        // A poisoned lock only means another test thread panicked mid-push.
        self.entries
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl Diagnostics for RecordingDiagnostics {
    fn info(&self, message: &str) {
        self.record(DiagnosticLevel::Info, message);
    }

    fn warn(&self, message: &str) {
        self.record(DiagnosticLevel::Warn, message);
    }

    fn error(&self, message: &str) {
        self.record(DiagnosticLevel::Error, message);
    }
}
