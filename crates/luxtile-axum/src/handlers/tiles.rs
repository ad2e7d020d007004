//! Tile fetch handler.

use axum::extract::{Query, State};
use axum::http::header::{CONTENT_ENCODING, CONTENT_TYPE};
use axum::response::{IntoResponse, Response};
use serde::Deserialize;

use luxtile_core::DEFAULT_LAYER;
use luxtile_store::TileFormat;

use crate::error::HttpError;
use crate::state::AppState;

/// Query parameters of `GET /mbtiles`.
#[derive(Debug, Deserialize)]
pub struct TileQuery {
    /// Layer name; defaults to the road layer like the original client.
    pub layer: Option<String>,
    pub z: u8,
    pub x: i64,
    /// Row in either sign convention (positive XYZ, non-positive TMS).
    pub y: i64,
    /// `pbf` (default) or `png`.
    pub format: Option<String>,
}

/// Fetch one tile as raw bytes.
pub async fn get_tile(
    State(state): State<AppState>,
    Query(query): Query<TileQuery>,
) -> Result<Response, HttpError> {
    let layer = query.layer.as_deref().unwrap_or(DEFAULT_LAYER);
    let format = TileFormat::from_param(query.format.as_deref());

    let tile = state
        .store
        .get_tile(layer, query.z, query.x, query.y, format)
        .await?;

    let mut response = ([(CONTENT_TYPE, format.content_type())], tile.bytes).into_response();
    if let Some(encoding) = format.content_encoding() {
        response
            .headers_mut()
            .insert(CONTENT_ENCODING, encoding.parse().expect("static header"));
    }
    Ok(response)
}
