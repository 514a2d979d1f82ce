//! Storage-specific error type wrapping sqlx errors.

use quotebook_domain::error::QuotebookError;

/// Errors originating from the `SQLite` storage layer.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// A query, connection or transaction failed.
    #[error("database error")]
    Database(#[from] sqlx::Error),

    /// Failed to run migrations.
    #[error("migration error")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// A stored timestamp is not valid RFC 3339.
    #[error("invalid stored timestamp")]
    Timestamp(#[from] chrono::ParseError),
}

impl From<StorageError> for QuotebookError {
    fn from(err: StorageError) -> Self {
        Self::Storage(Box::new(err))
    }
}
