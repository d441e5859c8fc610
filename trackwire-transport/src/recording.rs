//! In-memory transport that records instead of sending.

use crate::{Credentials, Transport};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};
use trackwire_types::Event;

/// One captured delivery attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct SentEvent {
    pub credentials: Credentials,
    pub event: Event,
}

/// A [`Transport`] that keeps every event it is handed.
///
/// Attempts are recorded even while failing, so callers can assert that a
/// send was attempted and that its failure was swallowed.
#[derive(Debug, Default)]
pub struct RecordingTransport {
    sent: Mutex<Vec<SentEvent>>,
    failing: AtomicBool,
}

impl RecordingTransport {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes subsequent sends report failure.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Returns every recorded attempt, oldest first.
    pub fn sent(&self) -> Vec<SentEvent> {
        self.sent.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Returns just the events, oldest first.
    pub fn events(&self) -> Vec<Event> {
        self.sent().into_iter().map(|s| s.event).collect()
    }

    /// Returns the most recent event, if any.
    pub fn last_event(&self) -> Option<Event> {
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .last()
            .map(|s| s.event.clone())
    }

    pub fn len(&self) -> usize {
        self.sent.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.sent.lock().unwrap_or_else(PoisonError::into_inner).clear();
    }
}

impl Transport for RecordingTransport {
    fn send(&self, credentials: &Credentials, event: &Event) -> bool {
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(SentEvent {
                credentials: credentials.clone(),
                event: event.clone(),
            });
        !self.failing.load(Ordering::SeqCst)
    }
}
