//! Tile store errors.

use thiserror::Error;

/// Errors from tile lookups.
///
/// Callers surface every variant as not-found; `Storage` exists so the
/// underlying cause still reaches the logs.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Archive missing, row missing, or archive failed to open.
    #[error("tile not found")]
    NotFound,

    /// SQLite-level failure.
    #[error("tile storage error: {0}")]
    Storage(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => Self::NotFound,
            other => Self::Storage(other.to_string()),
        }
    }
}
