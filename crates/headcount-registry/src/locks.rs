//! Per-event lock arena.
//!
//! Mutating operations on the same event must serialize; operations on
//! different events must proceed independently. Rather than embedding a
//! lock in each [`Event`] record (which ties the guard's lifetime to the
//! record's), the arena keeps a map of detached lock handles keyed by
//! [`EventId`]. Handles are created lazily on first mutation and removed
//! when the event is deleted.
//!
//! The outer map lock is a `std::sync::Mutex` because it is only ever
//! held for a map lookup, never across an `.await`. The per-event handle
//! is a `tokio::sync::Mutex` because mutators hold it across the
//! write-through to storage.
//!
//! [`Event`]: headcount_types::Event

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, PoisonError};

use headcount_types::EventId;

/// Arena of per-event mutual-exclusion handles.
#[derive(Debug, Default)]
pub struct LockArena {
    handles: Mutex<BTreeMap<EventId, Arc<tokio::sync::Mutex<()>>>>,
}

impl LockArena {
    /// Create an empty arena.
    pub const fn new() -> Self {
        Self {
            handles: Mutex::new(BTreeMap::new()),
        }
    }

    /// Return the lock handle for `event_id`, creating it if absent.
    ///
    /// The returned `Arc` stays valid even if the entry is later removed,
    /// so a task already waiting on the handle wakes normally and can
    /// re-check whether its event still exists.
    pub fn handle(&self, event_id: EventId) -> Arc<tokio::sync::Mutex<()>> {
        let mut handles = self
            .handles
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        Arc::clone(
            handles
                .entry(event_id)
                .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(()))),
        )
    }

    /// Drop the handle for a deleted event.
    ///
    /// Waiters holding the old `Arc` still acquire it in turn; they then
    /// observe the event's absence and fail with `NotFound`.
    pub fn remove(&self, event_id: EventId) {
        let mut handles = self
            .handles
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        handles.remove(&event_id);
    }

    /// Number of live handles (for tests and diagnostics).
    pub fn len(&self) -> usize {
        self.handles
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether the arena holds no handles.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
