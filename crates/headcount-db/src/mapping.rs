//! Explicit field-to-column mapping for the `events` table.
//!
//! The system this replaces bound its document fields to storage keys
//! through mapping annotations scattered across the model class. Here the
//! binding is a single table built at store construction: every entity
//! field is listed once, next to the column it lands in, and the SQL
//! fragments are assembled from that table. Renaming a column means
//! editing one row here and one migration.

/// One entity-field-to-column binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldColumn {
    /// The entity field name as it appears on the Rust struct.
    pub field: &'static str,
    /// The column the field is stored in.
    pub column: &'static str,
}

/// The full mapping between [`Event`] fields and `events` table columns.
///
/// The order of entries is the bind order used by the store's queries;
/// `standard()` is the only constructor so the two cannot drift.
///
/// [`Event`]: headcount_types::Event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventColumnMap {
    table: &'static str,
    fields: Vec<FieldColumn>,
}

impl EventColumnMap {
    /// The canonical mapping matching `migrations/0001_create_events.sql`.
    pub fn standard() -> Self {
        Self {
            table: "events",
            fields: vec![
                FieldColumn { field: "id", column: "id" },
                FieldColumn { field: "title", column: "title" },
                FieldColumn { field: "description", column: "description" },
                FieldColumn { field: "date", column: "event_date" },
                FieldColumn { field: "location", column: "location" },
                FieldColumn { field: "capacity", column: "capacity" },
                FieldColumn { field: "price", column: "price" },
                FieldColumn { field: "vendor_id", column: "vendor_id" },
                FieldColumn { field: "registered_attendees", column: "attendees" },
                FieldColumn { field: "status", column: "status" },
                FieldColumn { field: "created_at", column: "created_at" },
                FieldColumn { field: "updated_at", column: "updated_at" },
            ],
        }
    }

    /// The mapped table name.
    pub const fn table(&self) -> &'static str {
        self.table
    }

    /// Look up the column for an entity field.
    pub fn column_for(&self, field: &str) -> Option<&'static str> {
        self.fields
            .iter()
            .find(|fc| fc.field == field)
            .map(|fc| fc.column)
    }

    /// Comma-separated column list, in bind order.
    pub fn column_list(&self) -> String {
        self.fields
            .iter()
            .map(|fc| fc.column)
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Positional placeholder list (`$1, $2, ...`), in bind order.
    pub fn placeholders(&self) -> String {
        (1..=self.fields.len())
            .map(|n| format!("${n}"))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// `column = EXCLUDED.column` assignments for every non-key column.
    pub fn upsert_assignments(&self) -> String {
        self.fields
            .iter()
            .filter(|fc| fc.column != "id")
            .map(|fc| format!("{col} = EXCLUDED.{col}", col = fc.column))
            .collect::<Vec<_>>()
            .join(", ")
    }
}
