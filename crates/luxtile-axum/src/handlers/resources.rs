//! Resource management: start downloads, delete local resources.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::http::header::ALLOW;
use axum::response::IntoResponse;
use serde::Deserialize;

use crate::error::HttpError;
use crate::state::AppState;

/// Query parameters of the legacy `POST /update?map=` / `POST /delete?map=`.
#[derive(Debug, Deserialize)]
pub struct MapQuery {
    pub map: String,
}

/// `PUT /map/{name}`: start a background download.
///
/// Answers 202 immediately; completion is observable through `/check`.
pub async fn update(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<StatusCode, HttpError> {
    state.sync.update(&name).await?;
    Ok(StatusCode::ACCEPTED)
}

/// `DELETE /map/{name}`: remove a downloaded resource.
pub async fn delete(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<StatusCode, HttpError> {
    state.sync.delete(&name)?;
    Ok(StatusCode::OK)
}

/// `OPTIONS /map/{name}`: preflight with the allowed methods and no body.
pub async fn preflight() -> impl IntoResponse {
    ([(ALLOW, "OPTIONS, PUT, DELETE")], StatusCode::OK)
}

/// Legacy `POST /update?map=`: same operation as the REST route.
pub async fn legacy_update(
    State(state): State<AppState>,
    Query(query): Query<MapQuery>,
) -> Result<StatusCode, HttpError> {
    state.sync.update(&query.map).await?;
    Ok(StatusCode::ACCEPTED)
}

/// Legacy `POST /delete?map=`: same operation as the REST route.
pub async fn legacy_delete(
    State(state): State<AppState>,
    Query(query): Query<MapQuery>,
) -> Result<StatusCode, HttpError> {
    state.sync.delete(&query.map)?;
    Ok(StatusCode::OK)
}
