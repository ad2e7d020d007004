//! Error taxonomy for remote access.
//!
//! `RemoteError` is the error surface of the [`RemoteCatalog`] port. It keeps
//! the host-unreachable condition distinct from an ordinary not-found so the
//! facade can answer 504 instead of pretending the data does not exist.
//!
//! [`RemoteCatalog`]: crate::ports::RemoteCatalog

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while talking to the remote catalog or CDN.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum RemoteError {
    /// Host cannot be resolved or reached (DNS, connect, timeout).
    #[error("remote host unreachable: {message}")]
    Unreachable { message: String },

    /// The remote answered with a non-success status.
    #[error("remote request failed with status {status}: {url}")]
    Status { status: u16, url: String },

    /// The remote answered 404 for the requested document.
    #[error("remote document not found: {url}")]
    NotFound { url: String },

    /// The remote answered, but the body could not be interpreted.
    #[error("invalid remote response: {message}")]
    InvalidResponse { message: String },

    /// Local I/O failed while persisting fetched bytes.
    #[error("I/O error while storing fetched data: {message}")]
    Io { message: String },
}

impl RemoteError {
    /// Create an unreachable-host error.
    pub fn unreachable(message: impl Into<String>) -> Self {
        Self::Unreachable {
            message: message.into(),
        }
    }

    /// Create a status error.
    pub fn status(status: u16, url: impl Into<String>) -> Self {
        Self::Status {
            status,
            url: url.into(),
        }
    }

    /// Create a not-found error.
    pub fn not_found(url: impl Into<String>) -> Self {
        Self::NotFound { url: url.into() }
    }

    /// Create an invalid-response error.
    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::InvalidResponse {
            message: message.into(),
        }
    }

    /// Create an I/O error from a `std::io::Error`.
    #[must_use]
    pub fn from_io_error(err: &std::io::Error) -> Self {
        Self::Io {
            message: err.to_string(),
        }
    }

    /// True when the remote host itself could not be reached.
    #[must_use]
    pub const fn is_unreachable(&self) -> bool {
        matches!(self, Self::Unreachable { .. })
    }
}
