//! Error types for the data layer.
//!
//! All errors are propagated via [`DbError`], which wraps the underlying
//! [`sqlx`] errors with context about which operation failed. The
//! conversion into the registry's `StoreError` classifies connection and
//! pool failures as transient (retryable) and everything else as
//! permanent.

use headcount_registry::StoreError;

/// Errors that can occur in the data layer.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    /// A `PostgreSQL` operation failed.
    #[error("PostgreSQL error: {0}")]
    Postgres(#[from] sqlx::Error),

    /// A `PostgreSQL` migration failed.
    #[error("PostgreSQL migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// A serialization or deserialization error (attendee list JSON).
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A stored row could not be converted back into an event record.
    #[error("Corrupt row: {reason}")]
    Corrupt {
        /// What part of the row failed to decode.
        reason: String,
    },

    /// A configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<DbError> for StoreError {
    fn from(err: DbError) -> Self {
        let transient = matches!(
            &err,
            DbError::Postgres(
                sqlx::Error::Io(_)
                    | sqlx::Error::PoolTimedOut
                    | sqlx::Error::PoolClosed
                    | sqlx::Error::WorkerCrashed
            )
        );
        if transient {
            Self::Unavailable {
                reason: err.to_string(),
            }
        } else {
            Self::Rejected {
                reason: err.to_string(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pool_timeout_maps_to_transient() {
        let err = DbError::Postgres(sqlx::Error::PoolTimedOut);
        let store_err: StoreError = err.into();
        assert!(store_err.is_transient());
    }

    #[test]
    fn corrupt_row_maps_to_permanent() {
        let err = DbError::Corrupt {
            reason: "bad status".to_owned(),
        };
        let store_err: StoreError = err.into();
        assert!(!store_err.is_transient());
    }

    #[test]
    fn row_not_found_maps_to_permanent() {
        let err = DbError::Postgres(sqlx::Error::RowNotFound);
        let store_err: StoreError = err.into();
        assert!(!store_err.is_transient());
    }
}
