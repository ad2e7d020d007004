//! Synchronizer errors.

use thiserror::Error;

use luxtile_catalog::RecordError;
use luxtile_core::{PathError, RemoteError};

/// Errors from synchronizer operations.
#[derive(Debug, Error)]
pub enum SyncError {
    /// A job for this resource is already in progress.
    #[error("a download for '{name}' is already in progress")]
    Conflict { name: String },

    /// The resource is not known (absent from the catalog, or no local
    /// version record on delete).
    #[error("unknown resource '{name}'")]
    UnknownResource { name: String },

    /// Remote catalog or source host failure.
    #[error(transparent)]
    Remote(#[from] RemoteError),

    /// Version record I/O failure.
    #[error(transparent)]
    Record(#[from] RecordError),

    /// A source URL could not be mapped onto the tree.
    #[error(transparent)]
    Path(#[from] PathError),

    /// Filesystem failure while staging or promoting files.
    #[error("I/O error during synchronization: {0}")]
    Io(#[from] std::io::Error),
}

impl SyncError {
    /// Create a conflict error.
    pub fn conflict(name: impl Into<String>) -> Self {
        Self::Conflict { name: name.into() }
    }

    /// Create an unknown-resource error.
    pub fn unknown(name: impl Into<String>) -> Self {
        Self::UnknownResource { name: name.into() }
    }
}
