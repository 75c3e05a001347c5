//! Per-node record of payloads already processed.

use std::collections::HashSet;

use parking_lot::Mutex;

use crate::event::EventKind;

/// Set of processed payloads.
///
/// Grows for the life of the node and is never pruned.
#[derive(Debug, Default)]
pub struct SeenMessages {
    payloads: Mutex<HashSet<String>>,
}

impl SeenMessages {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Classifies an arrival and records the payload, atomically.
    ///
    /// Self-sent messages are always `Initiate`. Otherwise the first arrival
    /// of a payload is `Received` and every later one `Duplicate`, even when
    /// arrivals race.
    pub fn observe(&self, payload: &str, from_self: bool) -> EventKind {
        let mut payloads = self.payloads.lock();
        if from_self {
            payloads.insert(payload.to_string());
            EventKind::Initiate
        } else if payloads.contains(payload) {
            EventKind::Duplicate
        } else {
            payloads.insert(payload.to_string());
            EventKind::Received
        }
    }

    /// Returns true if `payload` has been processed.
    #[must_use]
    pub fn contains(&self, payload: &str) -> bool {
        self.payloads.lock().contains(payload)
    }

    /// Number of distinct payloads processed.
    #[must_use]
    pub fn len(&self) -> usize {
        self.payloads.lock().len()
    }

    /// Returns true if nothing has been processed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.payloads.lock().is_empty()
    }
}
