//! Static asset handler.

use axum::extract::{Path, State};
use axum::http::header::{CACHE_CONTROL, CONTENT_TYPE};
use axum::response::{IntoResponse, Response};

use crate::error::HttpError;
use crate::state::AppState;

/// `GET /static/{*path}`: serve a live-tree file, rewriting documents.
pub async fn serve(
    State(state): State<AppState>,
    Path(path): Path<String>,
) -> Result<Response, HttpError> {
    let asset = state.assets.serve(&path).await?;

    let mut response = ([(CONTENT_TYPE, asset.content_type)], asset.bytes).into_response();
    if asset.no_store {
        // Rewritten documents depend on the current offline state.
        response
            .headers_mut()
            .insert(CACHE_CONTROL, "no-store".parse().expect("static header"));
    }
    Ok(response)
}
