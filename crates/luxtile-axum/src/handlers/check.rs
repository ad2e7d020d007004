//! Resource status report.

use std::collections::BTreeMap;

use axum::Json;
use axum::extract::State;

use luxtile_core::ResourceReport;

use crate::error::HttpError;
use crate::state::AppState;

/// `GET /check`: per-resource status, size and version pair.
///
/// Fails with 504 when the remote catalog is unreachable, so the client can
/// distinguish "offline" from "nothing available".
pub async fn report(
    State(state): State<AppState>,
) -> Result<Json<BTreeMap<String, ResourceReport>>, HttpError> {
    let catalog = state.remote.fetch_catalog().await?;
    Ok(Json(state.sync.report(&catalog)))
}
