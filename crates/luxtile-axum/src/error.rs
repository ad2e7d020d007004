//! HTTP error types and mappings.
//!
//! Maps the domain error taxonomy onto status codes: expected absences are
//! 404, the one-job-per-resource rule is 409, and an unreachable remote is
//! 504 so the client can tell "offline" apart from "does not exist".

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;

use luxtile_assets::AssetError;
use luxtile_core::RemoteError;
use luxtile_store::StoreError;
use luxtile_sync::SyncError;

/// Axum-facing error type.
#[derive(Debug, Error)]
pub enum HttpError {
    /// Resource, tile or file not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// A download for the resource is already in progress.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// The remote catalog or CDN could not be reached.
    #[error("Remote unavailable: {0}")]
    RemoteUnavailable(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// JSON error response body.
#[derive(Serialize)]
struct ErrorBody {
    error: String,
    status: u16,
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            Self::Conflict(msg) => (StatusCode::CONFLICT, msg),
            Self::RemoteUnavailable(msg) => (StatusCode::GATEWAY_TIMEOUT, msg),
            Self::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = ErrorBody {
            error: message,
            status: status.as_u16(),
        };

        (status, axum::Json(body)).into_response()
    }
}

impl From<SyncError> for HttpError {
    fn from(err: SyncError) -> Self {
        match err {
            SyncError::Conflict { .. } => Self::Conflict(err.to_string()),
            SyncError::UnknownResource { .. } => Self::NotFound(err.to_string()),
            SyncError::Remote(remote) => remote.into(),
            SyncError::Record(_) | SyncError::Path(_) | SyncError::Io(_) => {
                Self::Internal(err.to_string())
            }
        }
    }
}

impl From<RemoteError> for HttpError {
    fn from(err: RemoteError) -> Self {
        Self::RemoteUnavailable(err.to_string())
    }
}

impl From<StoreError> for HttpError {
    fn from(err: StoreError) -> Self {
        // Storage-level failures still read as a missing tile to the client.
        if let StoreError::Storage(msg) = &err {
            tracing::warn!(error = %msg, "tile lookup failed");
        }
        Self::NotFound("tile not found".to_string())
    }
}

impl From<AssetError> for HttpError {
    fn from(err: AssetError) -> Self {
        match err {
            AssetError::NotFound => Self::NotFound("asset not found".to_string()),
        }
    }
}
