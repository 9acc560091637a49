//! Database error types.

use thiserror::Error;

/// Failures of the SQLite store.
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("sqlite: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("schema migration failed: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

pub type Result<T> = std::result::Result<T, DatabaseError>;
