//! Event registry and capacity-enforcing registration engine.
//!
//! This crate is the invariant-owning core of the Headcount system. The
//! [`EventRegistry`] is the sole owner of event records; the
//! [`RegistrationEngine`] is the sole writer of attendee membership. For
//! every event, at all times:
//!
//! - `registered_attendees.len() <= capacity`
//! - no attendee identifier appears twice in the list
//!
//! # Concurrency
//!
//! Mutations on the same event serialize on a per-event lock handle from
//! the [`LockArena`]; mutations on different events proceed independently
//! and no global lock exists. Reads take only the registry's `RwLock` and
//! always observe a fully committed record.
//!
//! # Persistence
//!
//! Every mutation writes through to an [`EventStore`] before becoming
//! visible (persist-then-publish), and the store is the source of truth
//! on cold start. Transient store failures are retried per
//! [`RetryConfig`]; invariant violations are never retried.
//!
//! # Modules
//!
//! - [`registry`] -- Event CRUD, queries, write-through plumbing
//! - [`engine`] -- register / cancel / seat accounting
//! - [`locks`] -- the per-event lock arena
//! - [`store`] -- the storage trait plus in-memory implementations
//! - [`config`] -- typed YAML configuration
//! - [`error`] -- error taxonomy

pub mod config;
pub mod engine;
pub mod error;
pub mod locks;
pub mod registry;
pub mod store;

// Re-export primary types at crate root.
pub use config::{ConfigError, HeadcountConfig, LoggingConfig, RetryConfig, StorageConfig};
pub use engine::RegistrationEngine;
pub use error::{RegistryError, StoreError};
pub use locks::LockArena;
pub use registry::EventRegistry;
pub use store::{EventStore, FlakyEventStore, InMemoryEventStore};
