//! Repository Module
//!
//! Free async functions over `&SqlitePool` (or a transaction connection)
//! for the `reservations` and `tables` tables.

pub mod dining_table;
pub mod reservation;

use shared::ErrorCode;
use thiserror::Error;

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Not found: {0}")]
    NotFound(String),

    /// A conditional write lost against the current row state
    #[error("Conflict: {1}")]
    Conflict(ErrorCode, String),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<sqlx::Error> for RepoError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => RepoError::NotFound("Row not found".into()),
            other => RepoError::Database(other.to_string()),
        }
    }
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;
