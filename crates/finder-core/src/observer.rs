//! Outbound signals from a search session.
//!
//! The session never renders anything. Errors, selections and close requests
//! are handed to a [`SessionObserver`] supplied by whoever owns the surface.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use finder_types::CanonicalRecord;

/// Receiver of session signals. All methods default to no-ops.
pub trait SessionObserver: Send + Sync {
    /// A page fetch failed; `message` is meant for an inline error display.
    fn on_error(&self, _message: &str) {}

    /// The user picked a record.
    fn on_selected(&self, _record: &CanonicalRecord) {}

    /// The search surface should close.
    fn on_close_requested(&self) {}
}

/// Observer that ignores every signal.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl SessionObserver for NoopObserver {}

/// Observer that records every signal, for tests and the CLI.
#[derive(Debug, Default)]
pub struct RecordingObserver {
    errors: Mutex<Vec<String>>,
    selections: Mutex<Vec<CanonicalRecord>>,
    close_requests: AtomicUsize,
}

impl RecordingObserver {
    pub fn errors(&self) -> Vec<String> {
        self.errors.lock().map(|e| e.clone()).unwrap_or_default()
    }

    pub fn selections(&self) -> Vec<CanonicalRecord> {
        self.selections.lock().map(|s| s.clone()).unwrap_or_default()
    }

    pub fn close_requests(&self) -> usize {
        self.close_requests.load(Ordering::SeqCst)
    }
}

impl SessionObserver for RecordingObserver {
    fn on_error(&self, message: &str) {
        if let Ok(mut errors) = self.errors.lock() {
            errors.push(message.to_string());
        }
    }

    fn on_selected(&self, record: &CanonicalRecord) {
        if let Ok(mut selections) = self.selections.lock() {
            selections.push(record.clone());
        }
    }

    fn on_close_requested(&self) {
        self.close_requests.fetch_add(1, Ordering::SeqCst);
    }
}
