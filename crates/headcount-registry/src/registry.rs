//! The event registry: the authoritative owner of event records.
//!
//! The registry holds every [`Event`] in an in-memory map guarded by a
//! [`RwLock`], writes through to the [`EventStore`] on every mutation, and
//! owns the per-event [`LockArena`] that serializes mutators. On cold
//! start the store is the source of truth ([`EventRegistry::bootstrap`]).
//!
//! # Write discipline
//!
//! Every mutation follows persist-then-publish: the updated record is
//! written to the store first (with bounded retry of transient failures)
//! and only then swapped into the map. A failed write-through therefore
//! leaves the registry exactly as it was; readers never observe a state
//! the store has not accepted.
//!
//! The attendee list is never mutated here. The registration engine in
//! [`crate::engine`] is its only writer and reaches the map through the
//! `pub(crate)` accessors at the bottom of this file.

use std::collections::BTreeMap;

use chrono::Utc;
use tokio::sync::{OwnedMutexGuard, RwLock};
use tracing::{debug, info, warn};

use headcount_types::{AttendeeId, Event, EventDraft, EventId, EventPatch, VendorId};

use crate::config::RetryConfig;
use crate::error::RegistryError;
use crate::locks::LockArena;
use crate::store::EventStore;

/// The authoritative registry of event records.
///
/// Generic over the storage backend so tests run against the in-memory
/// store while deployments use the `PostgreSQL` implementation.
#[derive(Debug)]
pub struct EventRegistry<S> {
    events: RwLock<BTreeMap<EventId, Event>>,
    locks: LockArena,
    store: S,
    retry: RetryConfig,
}

impl<S: EventStore> EventRegistry<S> {
    /// Create an empty registry on top of `store`.
    pub const fn new(store: S, retry: RetryConfig) -> Self {
        Self {
            events: RwLock::const_new(BTreeMap::new()),
            locks: LockArena::new(),
            store,
            retry,
        }
    }

    /// Build a registry from everything the store holds (cold start).
    ///
    /// Transient load failures are retried per the retry policy.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Storage`] if the store cannot be read
    /// after exhausting the retry budget.
    pub async fn bootstrap(store: S, retry: RetryConfig) -> Result<Self, RegistryError> {
        let mut attempt: u32 = 1;
        let records = loop {
            match store.load_all().await {
                Ok(records) => break records,
                Err(err) if err.is_transient() && attempt < retry.max_attempts => {
                    warn!(attempt, error = %err, "cold-start load failed, retrying");
                    tokio::time::sleep(retry.backoff()).await;
                    attempt = attempt.saturating_add(1);
                }
                Err(source) => return Err(RegistryError::Storage { source }),
            }
        };

        let events: BTreeMap<EventId, Event> =
            records.into_iter().map(|event| (event.id, event)).collect();
        info!(count = events.len(), "registry bootstrapped from store");

        Ok(Self {
            events: RwLock::new(events),
            locks: LockArena::new(),
            store,
            retry,
        })
    }

    // -----------------------------------------------------------------------
    // CRUD
    // -----------------------------------------------------------------------

    /// Create a new event from a draft and return its allocated id.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::InvalidInput`] if the draft fails
    /// validation, or [`RegistryError::Storage`] if the write-through
    /// fails; in both cases the registry is unchanged.
    pub async fn create(&self, draft: EventDraft) -> Result<EventId, RegistryError> {
        draft
            .check()
            .map_err(|reason| RegistryError::InvalidInput { reason })?;

        let event_id = EventId::new();
        let event = draft.into_event(event_id, Utc::now());

        self.save_with_retry(&event).await?;
        self.events.write().await.insert(event_id, event);

        info!(%event_id, "created event");
        Ok(event_id)
    }

    /// Return a consistent snapshot of one event.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::NotFound`] if the event does not exist.
    pub async fn get(&self, event_id: EventId) -> Result<Event, RegistryError> {
        self.events
            .read()
            .await
            .get(&event_id)
            .cloned()
            .ok_or(RegistryError::NotFound { event_id })
    }

    /// Apply a partial update to an event and return the updated record.
    ///
    /// Serialized against other mutations of the same event. Populated
    /// patch fields obey the creation rules (non-empty text, non-negative
    /// price); a patch that would shrink capacity below the current
    /// registration count is rejected. An empty patch still refreshes
    /// `updated_at`.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::InvalidInput`], [`RegistryError::NotFound`],
    /// [`RegistryError::CapacityViolation`], or [`RegistryError::Storage`];
    /// the registry is unchanged on error.
    pub async fn update(
        &self,
        event_id: EventId,
        patch: &EventPatch,
    ) -> Result<Event, RegistryError> {
        patch
            .check()
            .map_err(|reason| RegistryError::InvalidInput { reason })?;

        let _guard = self.exclusive(event_id).await?;

        let mut event = self.get(event_id).await?;
        if let Some(requested) = patch.capacity {
            let registered = event.registration_count();
            if requested < registered {
                return Err(RegistryError::CapacityViolation {
                    event_id,
                    requested,
                    registered,
                });
            }
        }

        patch.apply(&mut event);
        event.updated_at = Utc::now();

        let updated = event.clone();
        self.persist_and_publish(event).await?;

        debug!(%event_id, "updated event");
        Ok(updated)
    }

    /// Delete an event. Subsequent operations observe `NotFound`.
    ///
    /// Serialized against other mutations of the same event; the event's
    /// lock-arena handle is garbage-collected on success.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::NotFound`] or [`RegistryError::Storage`].
    pub async fn delete(&self, event_id: EventId) -> Result<(), RegistryError> {
        let _guard = self.exclusive(event_id).await?;

        self.delete_with_retry(event_id).await?;
        self.events.write().await.remove(&event_id);
        self.locks.remove(event_id);

        info!(%event_id, "deleted event");
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// Return snapshots of all events, ordered by id (v7 ids sort by
    /// creation time).
    pub async fn list(&self) -> Vec<Event> {
        self.events.read().await.values().cloned().collect()
    }

    /// Return all events owned by the given vendor.
    pub async fn list_by_vendor(&self, vendor_id: VendorId) -> Vec<Event> {
        self.events
            .read()
            .await
            .values()
            .filter(|event| event.vendor_id == Some(vendor_id))
            .cloned()
            .collect()
    }

    /// Return all events the given attendee is registered for.
    pub async fn events_for_attendee(&self, attendee_id: AttendeeId) -> Vec<Event> {
        self.events
            .read()
            .await
            .values()
            .filter(|event| event.is_registered(attendee_id))
            .cloned()
            .collect()
    }

    /// Number of registered events.
    pub async fn len(&self) -> usize {
        self.events.read().await.len()
    }

    /// Whether the registry holds no events.
    pub async fn is_empty(&self) -> bool {
        self.events.read().await.is_empty()
    }

    /// Number of live per-event lock handles (diagnostics).
    pub fn lock_handle_count(&self) -> usize {
        self.locks.len()
    }

    // -----------------------------------------------------------------------
    // Crate-internal mutation plumbing (used by the registration engine)
    // -----------------------------------------------------------------------

    /// Acquire the per-event mutation lock.
    ///
    /// Fails fast with `NotFound` if the event is absent, and re-checks
    /// existence after acquisition because the event may have been deleted
    /// while this task waited on the handle.
    pub(crate) async fn exclusive(
        &self,
        event_id: EventId,
    ) -> Result<OwnedMutexGuard<()>, RegistryError> {
        if !self.events.read().await.contains_key(&event_id) {
            return Err(RegistryError::NotFound { event_id });
        }

        let handle = self.locks.handle(event_id);
        let guard = handle.lock_owned().await;

        if self.events.read().await.contains_key(&event_id) {
            Ok(guard)
        } else {
            // Deleted while we waited; drop the stale handle we created.
            self.locks.remove(event_id);
            Err(RegistryError::NotFound { event_id })
        }
    }

    /// Write the record through to the store, then swap it into the map.
    ///
    /// Callers must hold the event's [`exclusive`](Self::exclusive) guard.
    pub(crate) async fn persist_and_publish(&self, event: Event) -> Result<(), RegistryError> {
        self.save_with_retry(&event).await?;
        self.events.write().await.insert(event.id, event);
        Ok(())
    }

    /// Save with bounded retry of transient store failures.
    async fn save_with_retry(&self, event: &Event) -> Result<(), RegistryError> {
        let mut attempt: u32 = 1;
        loop {
            match self.store.save(event).await {
                Ok(()) => return Ok(()),
                Err(err) if err.is_transient() && attempt < self.retry.max_attempts => {
                    warn!(
                        event_id = %event.id,
                        attempt,
                        error = %err,
                        "write-through failed, retrying"
                    );
                    tokio::time::sleep(self.retry.backoff()).await;
                    attempt = attempt.saturating_add(1);
                }
                Err(source) => return Err(RegistryError::Storage { source }),
            }
        }
    }

    /// Delete with bounded retry of transient store failures.
    async fn delete_with_retry(&self, event_id: EventId) -> Result<(), RegistryError> {
        let mut attempt: u32 = 1;
        loop {
            match self.store.delete(event_id).await {
                Ok(()) => return Ok(()),
                Err(err) if err.is_transient() && attempt < self.retry.max_attempts => {
                    warn!(%event_id, attempt, error = %err, "store delete failed, retrying");
                    tokio::time::sleep(self.retry.backoff()).await;
                    attempt = attempt.saturating_add(1);
                }
                Err(source) => return Err(RegistryError::Storage { source }),
            }
        }
    }

}
