//! Route definitions and router construction.

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post, put};
use tower_http::cors::{Any, CorsLayer};

use crate::bootstrap::{AppContext, CorsConfig};
use crate::handlers;
use crate::state::AppState;

/// Build CORS layer from configuration.
fn build_cors_layer(config: &CorsConfig) -> CorsLayer {
    match config {
        CorsConfig::AllowAll => CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any),
        CorsConfig::AllowOrigins(origins) => {
            use axum::http::HeaderValue;
            let allowed: Vec<HeaderValue> = origins.iter().filter_map(|o| o.parse().ok()).collect();
            CorsLayer::new()
                .allow_origin(allowed)
                .allow_methods(Any)
                .allow_headers(Any)
        }
    }
}

/// Create the main router with all routes.
///
/// Both the REST-style resource routes (`/map/{name}`) and the legacy
/// query-parameter endpoints (`POST /update?map=`, `POST /delete?map=`)
/// dispatch to the same synchronizer operations.
pub fn create_router(ctx: AppContext, cors_config: &CorsConfig) -> Router {
    let state: AppState = Arc::new(ctx);
    let cors = build_cors_layer(cors_config);

    Router::new()
        .route("/", get(hello))
        .route("/hello", get(hello))
        .route("/check", get(handlers::check::report))
        .route("/mbtiles", get(handlers::tiles::get_tile))
        .route("/static/{*path}", get(handlers::static_files::serve))
        .route(
            "/map/{name}",
            put(handlers::resources::update)
                .delete(handlers::resources::delete)
                .options(handlers::resources::preflight),
        )
        .route("/update", post(handlers::resources::legacy_update))
        .route("/delete", post(handlers::resources::legacy_delete))
        .layer(cors)
        .with_state(state)
}

/// Liveness probe.
async fn hello() -> &'static str {
    "Hello!!!"
}
