//! Non-fatal notices raised during pre-flight checks.
//!
//! Advisories never fail a call. They leave the registry through an
//! [`AdvisorySink`], so the embedder decides where they land: the default
//! sink forwards to `tracing`, and tests swap in [`MemorySink`] to assert on
//! advisories without scraping log output.

use std::sync::{Mutex, MutexGuard};

/// A single advisory notice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Advisory {
    pub kind: AdvisoryKind,
    /// Model the notice is about.
    pub model: String,
    /// Human-readable text, ready to display.
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdvisoryKind {
    /// The model still works but is scheduled for removal.
    DeprecatedModel,
}

impl Advisory {
    /// Notice that `model` is deprecated, naming a replacement when one exists.
    pub fn deprecated_model(model: &str, replacement: Option<&str>) -> Self {
        let message = match replacement {
            Some(replacement) => format!(
                "model '{model}' is deprecated and will be removed in a future release, use '{replacement}' instead"
            ),
            None => format!("model '{model}' is deprecated and will be removed in a future release"),
        };
        Self {
            kind: AdvisoryKind::DeprecatedModel,
            model: model.to_string(),
            message,
        }
    }
}

/// Destination for advisories.
pub trait AdvisorySink: Send + Sync {
    fn emit(&self, advisory: Advisory);
}

/// Default sink: forwards advisories to `tracing` at WARN.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl AdvisorySink for LogSink {
    fn emit(&self, advisory: Advisory) {
        tracing::warn!(model = %advisory.model, "{}", advisory.message);
    }
}

/// Buffers advisories in memory for later inspection.
#[derive(Debug, Default)]
pub struct MemorySink {
    buffered: Mutex<Vec<Advisory>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Advisory>> {
        match self.buffered.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Advisories emitted so far, oldest first.
    pub fn advisories(&self) -> Vec<Advisory> {
        self.lock().clone()
    }

    /// Drain the buffer, returning everything emitted since the last call.
    pub fn take(&self) -> Vec<Advisory> {
        std::mem::take(&mut *self.lock())
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

impl AdvisorySink for MemorySink {
    fn emit(&self, advisory: Advisory) {
        self.lock().push(advisory);
    }
}
