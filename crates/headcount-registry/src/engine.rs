//! The registration engine: the sole mutator of attendee membership.
//!
//! All changes to an event's attendee list flow through [`register`] and
//! [`cancel`]. Each mutation runs inside the event's exclusive section
//! (see [`crate::locks`]), re-reads current state after acquisition, and
//! follows the registry's persist-then-publish discipline, so:
//!
//! - `registered_attendees.len() <= capacity` always holds;
//! - no attendee id ever appears twice in one event's list;
//! - when two requests race for the last seat, exactly one wins and the
//!   other observes `EventFull` (first-come-first-served, no overbooking,
//!   no silent drop).
//!
//! Read-only queries ([`available_seats`], [`attendees`], ...) take only
//! the registry's read lock and never contend on the per-event handle.
//!
//! [`register`]: RegistrationEngine::register
//! [`cancel`]: RegistrationEngine::cancel
//! [`available_seats`]: RegistrationEngine::available_seats
//! [`attendees`]: RegistrationEngine::attendees

use std::sync::Arc;

use chrono::Utc;
use tracing::debug;

use headcount_types::{Attendee, AttendeeId, AttendeeSignup, EventId};

use crate::error::RegistryError;
use crate::registry::EventRegistry;
use crate::store::EventStore;

/// Mediates attendee registration and cancellation against event capacity.
#[derive(Debug)]
pub struct RegistrationEngine<S> {
    registry: Arc<EventRegistry<S>>,
}

impl<S> Clone for RegistrationEngine<S> {
    fn clone(&self) -> Self {
        Self {
            registry: Arc::clone(&self.registry),
        }
    }
}

impl<S: EventStore> RegistrationEngine<S> {
    /// Create an engine over the given registry.
    pub const fn new(registry: Arc<EventRegistry<S>>) -> Self {
        Self { registry }
    }

    /// The registry this engine mutates.
    pub const fn registry(&self) -> &Arc<EventRegistry<S>> {
        &self.registry
    }

    /// Register an attendee for an event.
    ///
    /// Acquires the event's exclusive section, re-reads current state,
    /// rejects duplicates and full events, then appends the attendee with
    /// the current timestamp and writes through to storage.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::NotFound`], [`RegistryError::AlreadyRegistered`],
    /// [`RegistryError::EventFull`], or [`RegistryError::Storage`]. The
    /// attendee list is unchanged on every error path.
    pub async fn register(
        &self,
        event_id: EventId,
        signup: AttendeeSignup,
    ) -> Result<Attendee, RegistryError> {
        let _guard = self.registry.exclusive(event_id).await?;

        let mut event = self.registry.get(event_id).await?;
        let attendee_id = signup.attendee_id;

        if event.is_registered(attendee_id) {
            return Err(RegistryError::AlreadyRegistered {
                event_id,
                attendee_id,
            });
        }
        if event.is_full() {
            return Err(RegistryError::EventFull {
                event_id,
                capacity: event.capacity,
            });
        }

        let attendee = signup.into_attendee(Utc::now());
        event.registered_attendees.push(attendee.clone());
        event.updated_at = attendee.registered_at;

        let seats_left = event.seats_left();
        self.registry.persist_and_publish(event).await?;

        debug!(%event_id, %attendee_id, seats_left, "registration accepted");
        Ok(attendee)
    }

    /// Cancel an attendee's registration.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::NotFound`] if the event is absent,
    /// [`RegistryError::NotRegistered`] if the attendee holds no
    /// registration, or [`RegistryError::Storage`]. The attendee list is
    /// unchanged on every error path.
    pub async fn cancel(
        &self,
        event_id: EventId,
        attendee_id: AttendeeId,
    ) -> Result<(), RegistryError> {
        let _guard = self.registry.exclusive(event_id).await?;

        let mut event = self.registry.get(event_id).await?;
        let before = event.registered_attendees.len();
        event.registered_attendees.retain(|a| a.id != attendee_id);

        if event.registered_attendees.len() == before {
            return Err(RegistryError::NotRegistered {
                event_id,
                attendee_id,
            });
        }

        event.updated_at = Utc::now();
        let seats_left = event.seats_left();
        self.registry.persist_and_publish(event).await?;

        debug!(%event_id, %attendee_id, seats_left, "registration cancelled");
        Ok(())
    }

    /// Remaining seats for an event: `capacity - registered`, never
    /// negative.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::NotFound`] if the event is absent.
    pub async fn available_seats(&self, event_id: EventId) -> Result<u32, RegistryError> {
        Ok(self.registry.get(event_id).await?.seats_left())
    }

    /// Whether the attendee currently holds a registration.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::NotFound`] if the event is absent.
    pub async fn is_registered(
        &self,
        event_id: EventId,
        attendee_id: AttendeeId,
    ) -> Result<bool, RegistryError> {
        Ok(self.registry.get(event_id).await?.is_registered(attendee_id))
    }

    /// The event's attendees in registration order.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::NotFound`] if the event is absent.
    pub async fn attendees(&self, event_id: EventId) -> Result<Vec<Attendee>, RegistryError> {
        Ok(self.registry.get(event_id).await?.registered_attendees)
    }
}
