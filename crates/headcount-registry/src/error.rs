//! Error types for the registry and registration engine.
//!
//! Every variant is recoverable and reportable to the caller; none is
//! fatal to the process. A rejected mutation always leaves both the
//! in-memory registry and the backing store unchanged.

use headcount_types::{AttendeeId, EventId};

/// Errors surfaced by registry and registration-engine operations.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// The referenced event does not exist (or was deleted).
    #[error("event {event_id} not found")]
    NotFound {
        /// The identifier that failed to resolve.
        event_id: EventId,
    },

    /// The creation or update payload failed validation.
    #[error("invalid input: {reason}")]
    InvalidInput {
        /// Description of the violated rule.
        reason: String,
    },

    /// An update would shrink capacity below the current registration count.
    #[error(
        "cannot shrink capacity of event {event_id} to {requested}: {registered} attendees registered"
    )]
    CapacityViolation {
        /// The event being updated.
        event_id: EventId,
        /// The capacity requested by the patch.
        requested: u32,
        /// The current registration count.
        registered: u32,
    },

    /// The event has no seats left.
    #[error("event {event_id} is full (capacity {capacity})")]
    EventFull {
        /// The full event.
        event_id: EventId,
        /// Its capacity.
        capacity: u32,
    },

    /// The attendee already holds a registration for this event.
    #[error("attendee {attendee_id} is already registered for event {event_id}")]
    AlreadyRegistered {
        /// The event in question.
        event_id: EventId,
        /// The duplicate registrant.
        attendee_id: AttendeeId,
    },

    /// The attendee holds no registration for this event.
    #[error("attendee {attendee_id} is not registered for event {event_id}")]
    NotRegistered {
        /// The event in question.
        event_id: EventId,
        /// The unknown registrant.
        attendee_id: AttendeeId,
    },

    /// The backing store failed after exhausting the retry budget.
    #[error("storage failure: {source}")]
    Storage {
        /// The final store error.
        #[from]
        source: StoreError,
    },
}

/// Errors reported by an [`EventStore`] implementation.
///
/// The registry retries [`StoreError::Unavailable`] failures a bounded
/// number of times before surfacing them; [`StoreError::Rejected`]
/// failures are permanent and surface immediately.
///
/// [`EventStore`]: crate::store::EventStore
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The backend could not be reached or timed out. Transient.
    #[error("storage backend unavailable: {reason}")]
    Unavailable {
        /// What went wrong.
        reason: String,
    },

    /// The backend refused the operation. Permanent.
    #[error("storage backend rejected the operation: {reason}")]
    Rejected {
        /// What went wrong.
        reason: String,
    },
}

impl StoreError {
    /// Whether a retry could plausibly succeed.
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::Unavailable { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transience_classification() {
        let unavailable = StoreError::Unavailable {
            reason: "pool timed out".to_owned(),
        };
        let rejected = StoreError::Rejected {
            reason: "constraint violated".to_owned(),
        };
        assert!(unavailable.is_transient());
        assert!(!rejected.is_transient());
    }

    #[test]
    fn errors_render_their_context() {
        let event_id = EventId::new();
        let err = RegistryError::EventFull {
            event_id,
            capacity: 12,
        };
        let rendered = err.to_string();
        assert!(rendered.contains("full"));
        assert!(rendered.contains(&event_id.to_string()));
    }
}
