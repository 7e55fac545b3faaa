//! `PostgreSQL` implementation of the registry's `EventStore` trait.
//!
//! One row per event in the `events` table; the attendee list is stored
//! as a JSONB column since it is always read and written as a unit (the
//! registry holds the authoritative copy and writes whole records
//! through). Saves are idempotent upserts keyed on the event id.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use headcount_registry::{EventStore, StoreError};
use headcount_types::{Attendee, Event, EventId, EventStatus};

use crate::error::DbError;
use crate::mapping::EventColumnMap;
use crate::postgres::PostgresPool;

/// Row shape of the `events` table.
///
/// Column names follow [`EventColumnMap::standard`]; `date` becomes
/// `event_date` because `date` is a reserved word in SQL.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct EventRow {
    /// Primary key.
    pub id: Uuid,
    /// Event title.
    pub title: String,
    /// Event description.
    pub description: String,
    /// Calendar date of the event.
    pub event_date: NaiveDate,
    /// Event location.
    pub location: String,
    /// Capacity as stored (BIGINT, constrained non-negative).
    pub capacity: i64,
    /// Ticket price.
    pub price: Decimal,
    /// Owning vendor, if any.
    pub vendor_id: Option<Uuid>,
    /// Attendee list as JSONB.
    pub attendees: serde_json::Value,
    /// Lifecycle status string.
    pub status: String,
    /// Record creation time.
    pub created_at: DateTime<Utc>,
    /// Last mutation time.
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<EventRow> for Event {
    type Error = DbError;

    fn try_from(row: EventRow) -> Result<Self, Self::Error> {
        let capacity = u32::try_from(row.capacity).map_err(|_| DbError::Corrupt {
            reason: format!("capacity {} out of range", row.capacity),
        })?;
        let status: EventStatus = row.status.parse().map_err(|_| DbError::Corrupt {
            reason: format!("unknown status '{}'", row.status),
        })?;
        let registered_attendees: Vec<Attendee> = serde_json::from_value(row.attendees)?;

        Ok(Self {
            id: EventId::from(row.id),
            title: row.title,
            description: row.description,
            date: row.event_date,
            location: row.location,
            capacity,
            price: row.price,
            vendor_id: row.vendor_id.map(Into::into),
            registered_attendees,
            status,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Event persistence backed by `PostgreSQL`.
///
/// The SQL text is assembled once at construction from the
/// [`EventColumnMap`], so the mapping table is the single place where
/// fields and columns are tied together.
#[derive(Debug, Clone)]
pub struct PgEventStore {
    pool: PgPool,
    select_sql: String,
    select_all_sql: String,
    upsert_sql: String,
    delete_sql: String,
}

impl PgEventStore {
    /// Create a store over the given pool using the standard mapping.
    pub fn new(pool: &PostgresPool) -> Self {
        let map = EventColumnMap::standard();
        let columns = map.column_list();
        let table = map.table();

        Self {
            pool: pool.pool().clone(),
            select_sql: format!("SELECT {columns} FROM {table} WHERE id = $1"),
            select_all_sql: format!("SELECT {columns} FROM {table} ORDER BY id"),
            upsert_sql: format!(
                "INSERT INTO {table} ({columns}) VALUES ({placeholders}) \
                 ON CONFLICT (id) DO UPDATE SET {assignments}",
                placeholders = map.placeholders(),
                assignments = map.upsert_assignments(),
            ),
            delete_sql: format!("DELETE FROM {table} WHERE id = $1"),
        }
    }

    async fn load_row(&self, event_id: EventId) -> Result<Option<Event>, DbError> {
        let row = sqlx::query_as::<_, EventRow>(&self.select_sql)
            .bind(event_id.into_inner())
            .fetch_optional(&self.pool)
            .await?;

        row.map(Event::try_from).transpose()
    }

    async fn upsert(&self, event: &Event) -> Result<(), DbError> {
        let attendees = serde_json::to_value(&event.registered_attendees)?;

        // Bind order follows EventColumnMap::standard().
        sqlx::query(&self.upsert_sql)
            .bind(event.id.into_inner())
            .bind(&event.title)
            .bind(&event.description)
            .bind(event.date)
            .bind(&event.location)
            .bind(i64::from(event.capacity))
            .bind(event.price)
            .bind(event.vendor_id.map(headcount_types::VendorId::into_inner))
            .bind(attendees)
            .bind(event.status.as_str())
            .bind(event.created_at)
            .bind(event.updated_at)
            .execute(&self.pool)
            .await?;

        tracing::debug!(event_id = %event.id, "Upserted event row");
        Ok(())
    }

    async fn remove(&self, event_id: EventId) -> Result<(), DbError> {
        sqlx::query(&self.delete_sql)
            .bind(event_id.into_inner())
            .execute(&self.pool)
            .await?;

        tracing::debug!(%event_id, "Deleted event row");
        Ok(())
    }

    async fn load_all_rows(&self) -> Result<Vec<Event>, DbError> {
        let rows = sqlx::query_as::<_, EventRow>(&self.select_all_sql)
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(Event::try_from).collect()
    }
}

impl EventStore for PgEventStore {
    async fn load(&self, event_id: EventId) -> Result<Option<Event>, StoreError> {
        self.load_row(event_id).await.map_err(StoreError::from)
    }

    async fn save(&self, event: &Event) -> Result<(), StoreError> {
        self.upsert(event).await.map_err(StoreError::from)
    }

    async fn delete(&self, event_id: EventId) -> Result<(), StoreError> {
        self.remove(event_id).await.map_err(StoreError::from)
    }

    async fn load_all(&self) -> Result<Vec<Event>, StoreError> {
        self.load_all_rows().await.map_err(StoreError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row() -> EventRow {
        EventRow {
            id: Uuid::now_v7(),
            title: "Harvest Market".to_owned(),
            description: "Seasonal produce and crafts".to_owned(),
            event_date: NaiveDate::from_ymd_opt(2026, 10, 17).unwrap_or_default(),
            location: "Town Square".to_owned(),
            capacity: 120,
            price: Decimal::ZERO,
            vendor_id: Some(Uuid::now_v7()),
            attendees: serde_json::json!([]),
            status: "upcoming".to_owned(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn row_converts_to_event() {
        let r = row();
        let id = r.id;
        let event = Event::try_from(r).ok();

        assert_eq!(event.as_ref().map(|e| e.id.into_inner()), Some(id));
        assert_eq!(event.as_ref().map(|e| e.capacity), Some(120));
        assert_eq!(event.map(|e| e.status), Some(EventStatus::Upcoming));
    }

    #[test]
    fn negative_capacity_is_corrupt() {
        let mut r = row();
        r.capacity = -1;
        let result = Event::try_from(r);
        assert!(matches!(result, Err(DbError::Corrupt { .. })));
    }

    #[test]
    fn unknown_status_is_corrupt() {
        let mut r = row();
        r.status = "postponed".to_owned();
        let result = Event::try_from(r);
        assert!(matches!(result, Err(DbError::Corrupt { .. })));
    }

    #[test]
    fn malformed_attendees_json_is_rejected() {
        let mut r = row();
        r.attendees = serde_json::json!({"not": "a list"});
        let result = Event::try_from(r);
        assert!(matches!(result, Err(DbError::Serialization(_))));
    }

    #[test]
    fn attendee_list_roundtrips_through_json() {
        let mut r = row();
        let attendee = Attendee {
            id: headcount_types::AttendeeId::new(),
            name: "ada".to_owned(),
            email: "ada@example.com".to_owned(),
            registered_at: Utc::now(),
        };
        r.attendees = serde_json::json!([attendee.clone()]);

        let event = Event::try_from(r).ok();
        assert_eq!(
            event.map(|e| e.registered_attendees),
            Some(vec![attendee])
        );
    }
}
