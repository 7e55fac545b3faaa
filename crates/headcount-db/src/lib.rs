//! `PostgreSQL` data layer for the Headcount event-registration system.
//!
//! Provides the durable backing for the in-memory registry: a connection
//! pool, schema migrations, an explicit field-to-column mapping table,
//! and a [`PgEventStore`] implementing the registry's `EventStore` trait.

pub mod error;
pub mod event_store;
pub mod mapping;
pub mod postgres;

pub use error::DbError;
pub use event_store::{EventRow, PgEventStore};
pub use mapping::{EventColumnMap, FieldColumn};
pub use postgres::{PostgresConfig, PostgresPool};
