//! The storage collaborator consumed by the registry.
//!
//! The registry treats the store as the source of truth on cold start
//! ([`EventStore::load_all`]) and writes through on every mutation. The
//! production implementation lives in the `headcount-db` crate; this
//! module provides the trait plus an in-memory implementation that backs
//! tests and single-process runs.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use tokio::sync::RwLock;

use headcount_types::{Event, EventId};

use crate::error::StoreError;

/// Durable persistence for event records.
///
/// Implementations must be safe for concurrent calls; the registry
/// serializes writes per event but issues reads and writes for different
/// events concurrently.
#[allow(async_fn_in_trait)] // the registry is generic over a concrete store type
pub trait EventStore {
    /// Load one event by id. `Ok(None)` means the record is absent.
    async fn load(&self, event_id: EventId) -> Result<Option<Event>, StoreError>;

    /// Persist the full event record, replacing any previous version.
    async fn save(&self, event: &Event) -> Result<(), StoreError>;

    /// Remove the record for `event_id`. Deleting an absent record is not
    /// an error; the registry performs its own existence check first.
    async fn delete(&self, event_id: EventId) -> Result<(), StoreError>;

    /// Load every stored event, used by the registry on cold start.
    async fn load_all(&self) -> Result<Vec<Event>, StoreError>;
}

// ---------------------------------------------------------------------------
// In-memory store
// ---------------------------------------------------------------------------

/// An [`EventStore`] backed by a process-local map.
///
/// Used by tests and by deployments that accept losing state on restart.
#[derive(Debug, Default)]
pub struct InMemoryEventStore {
    records: RwLock<BTreeMap<EventId, Event>>,
}

impl InMemoryEventStore {
    /// Create an empty store.
    pub const fn new() -> Self {
        Self {
            records: RwLock::const_new(BTreeMap::new()),
        }
    }

    /// Create a store pre-seeded with events (cold-start fixtures).
    pub async fn seeded(events: impl IntoIterator<Item = Event>) -> Self {
        let store = Self::new();
        {
            let mut records = store.records.write().await;
            for event in events {
                records.insert(event.id, event);
            }
        }
        store
    }

    /// Number of stored records.
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    /// Whether the store holds no records.
    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

impl EventStore for InMemoryEventStore {
    async fn load(&self, event_id: EventId) -> Result<Option<Event>, StoreError> {
        Ok(self.records.read().await.get(&event_id).cloned())
    }

    async fn save(&self, event: &Event) -> Result<(), StoreError> {
        self.records.write().await.insert(event.id, event.clone());
        Ok(())
    }

    async fn delete(&self, event_id: EventId) -> Result<(), StoreError> {
        self.records.write().await.remove(&event_id);
        Ok(())
    }

    async fn load_all(&self) -> Result<Vec<Event>, StoreError> {
        Ok(self.records.read().await.values().cloned().collect())
    }
}

// ---------------------------------------------------------------------------
// Fault-injecting store
// ---------------------------------------------------------------------------

/// An [`EventStore`] wrapper that fails a budget of operations before
/// delegating to an [`InMemoryEventStore`]. For testing the registry's
/// retry and rollback behavior.
///
/// Clones share the same backing state and fault budget, so a test can
/// keep one handle as a control plane while the registry owns the other.
#[derive(Debug, Clone, Default)]
pub struct FlakyEventStore {
    shared: std::sync::Arc<FlakyShared>,
}

#[derive(Debug, Default)]
struct FlakyShared {
    inner: InMemoryEventStore,
    failures_remaining: AtomicU32,
    transient: AtomicBool,
}

impl FlakyEventStore {
    /// Create a store whose next `failures` operations fail as transient
    /// ([`StoreError::Unavailable`]).
    pub fn transient(failures: u32) -> Self {
        let store = Self::default();
        store.inject_transient(failures);
        store
    }

    /// Create a store whose next `failures` operations fail as permanent
    /// ([`StoreError::Rejected`]).
    pub fn rejecting(failures: u32) -> Self {
        let store = Self::default();
        store.inject_rejections(failures);
        store
    }

    /// Arm `failures` transient faults for subsequent operations.
    pub fn inject_transient(&self, failures: u32) {
        self.shared.transient.store(true, Ordering::Release);
        self.shared
            .failures_remaining
            .store(failures, Ordering::Release);
    }

    /// Arm `failures` permanent faults for subsequent operations.
    pub fn inject_rejections(&self, failures: u32) {
        self.shared.transient.store(false, Ordering::Release);
        self.shared
            .failures_remaining
            .store(failures, Ordering::Release);
    }

    /// Consume one failure from the budget, if any remains.
    ///
    /// The decrement is a single atomic update so concurrent operations
    /// never share a budget slot.
    fn trip(&self) -> Result<(), StoreError> {
        let armed = self
            .shared
            .failures_remaining
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| n.checked_sub(1))
            .is_ok();
        if !armed {
            return Ok(());
        }
        if self.shared.transient.load(Ordering::Acquire) {
            Err(StoreError::Unavailable {
                reason: "injected transient fault".to_owned(),
            })
        } else {
            Err(StoreError::Rejected {
                reason: "injected permanent fault".to_owned(),
            })
        }
    }
}

impl EventStore for FlakyEventStore {
    async fn load(&self, event_id: EventId) -> Result<Option<Event>, StoreError> {
        self.trip()?;
        self.shared.inner.load(event_id).await
    }

    async fn save(&self, event: &Event) -> Result<(), StoreError> {
        self.trip()?;
        self.shared.inner.save(event).await
    }

    async fn delete(&self, event_id: EventId) -> Result<(), StoreError> {
        self.trip()?;
        self.shared.inner.delete(event_id).await
    }

    async fn load_all(&self) -> Result<Vec<Event>, StoreError> {
        self.trip()?;
        self.shared.inner.load_all().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use headcount_types::{EventDraft, EventStatus};
    use rust_decimal::Decimal;

    fn sample_event() -> Event {
        EventDraft {
            title: "Pottery Workshop".to_owned(),
            description: "Hands-on wheel throwing".to_owned(),
            date: chrono::NaiveDate::from_ymd_opt(2026, 9, 12).unwrap_or_default(),
            location: "Studio 4".to_owned(),
            capacity: 8,
            price: Decimal::new(1800, 2),
            vendor_id: None,
            status: EventStatus::Upcoming,
        }
        .into_event(EventId::new(), Utc::now())
    }

    #[tokio::test]
    async fn save_load_roundtrip() {
        let store = InMemoryEventStore::new();
        let event = sample_event();

        assert!(store.save(&event).await.is_ok());
        let loaded = store.load(event.id).await.ok().flatten();
        assert_eq!(loaded, Some(event));
    }

    #[tokio::test]
    async fn load_absent_returns_none() {
        let store = InMemoryEventStore::new();
        let loaded = store.load(EventId::new()).await.ok().flatten();
        assert_eq!(loaded, None);
    }

    #[tokio::test]
    async fn delete_removes_the_record() {
        let store = InMemoryEventStore::new();
        let event = sample_event();
        let id = event.id;

        assert!(store.save(&event).await.is_ok());
        assert!(store.delete(id).await.is_ok());
        assert_eq!(store.load(id).await.ok().flatten(), None);
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn load_all_returns_every_record() {
        let a = sample_event();
        let b = sample_event();
        let store = InMemoryEventStore::seeded([a, b]).await;

        let all = store.load_all().await.unwrap_or_default();
        assert_eq!(all.len(), 2);
    }

    #[tokio::test]
    async fn flaky_store_recovers_after_budget() {
        let store = FlakyEventStore::transient(2);
        let event = sample_event();

        assert!(store.save(&event).await.is_err());
        assert!(store.save(&event).await.is_err());
        assert!(store.save(&event).await.is_ok());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_operations_consume_the_fault_budget_exactly() {
        let store = FlakyEventStore::transient(3);

        let mut tasks = Vec::new();
        for _ in 0..8_usize {
            let store = store.clone();
            let event = sample_event();
            tasks.push(tokio::spawn(async move { store.save(&event).await }));
        }

        let failures = futures::future::join_all(tasks)
            .await
            .into_iter()
            .filter(|outcome| matches!(outcome, Ok(Err(_))))
            .count();
        assert_eq!(failures, 3);
    }

    #[tokio::test]
    async fn rejecting_store_fails_permanently() {
        let store = FlakyEventStore::rejecting(1);
        let event = sample_event();

        let err = store.save(&event).await.err();
        assert!(matches!(err, Some(StoreError::Rejected { .. })));
    }
}
