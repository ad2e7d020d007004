//! Integration tests for the web server routes.
//!
//! Each test drives the real router over an in-memory remote and a temp
//! base directory; no network, no fixed ports.

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use tokio::sync::Semaphore;
use tower::ServiceExt;

use luxtile_assets::RewriteContext;
use luxtile_axum::bootstrap::{AppContext, CorsConfig};
use luxtile_axum::routes::create_router;
use luxtile_core::{BasePaths, Catalog, RemoteCatalog, RemoteError, ResourceEntry};
use luxtile_sync::Synchronizer;

// ============================================================================
// Fixtures
// ============================================================================

/// In-memory stand-in for the catalog and CDN.
struct FakeRemote {
    catalog: Mutex<Catalog>,
    files: HashMap<String, Vec<u8>>,
    documents: HashMap<String, Vec<u8>>,
    gate: Option<Arc<Semaphore>>,
    unreachable: bool,
}

impl Default for FakeRemote {
    fn default() -> Self {
        Self {
            catalog: Mutex::new(Catalog::new()),
            files: HashMap::new(),
            documents: HashMap::new(),
            gate: None,
            unreachable: false,
        }
    }
}

#[async_trait::async_trait]
impl RemoteCatalog for FakeRemote {
    async fn fetch_catalog(&self) -> Result<Catalog, RemoteError> {
        if self.unreachable {
            return Err(RemoteError::unreachable("no route to host"));
        }
        Ok(self.catalog.lock().unwrap().clone())
    }

    async fn fetch_source(&self, url: &str, dest: &Path) -> Result<u64, RemoteError> {
        if let Some(gate) = &self.gate {
            gate.acquire().await.expect("gate closed").forget();
        }
        let body = self
            .files
            .get(url)
            .ok_or_else(|| RemoteError::not_found(url))?;
        if let Some(parent) = dest.parent() {
            std::fs::create_dir_all(parent).map_err(|e| RemoteError::from_io_error(&e))?;
        }
        std::fs::write(dest, body).map_err(|e| RemoteError::from_io_error(&e))?;
        Ok(body.len() as u64)
    }

    async fn fetch_document(&self, rel: &str) -> Result<Vec<u8>, RemoteError> {
        self.documents
            .get(rel)
            .cloned()
            .ok_or_else(|| RemoteError::not_found(rel))
    }
}

fn fonts_remote() -> FakeRemote {
    let url = "https://cdn.test/fonts/noto/0-255.pbf";
    FakeRemote {
        catalog: Mutex::new(Catalog::from([(
            "fonts".to_string(),
            ResourceEntry {
                version: "1.1.0".to_string(),
                sources: vec![url.to_string()],
            },
        )])),
        files: HashMap::from([(url.to_string(), b"glyphs".to_vec())]),
        ..FakeRemote::default()
    }
}

/// Build a router (and a handle on its synchronizer) over a temp tree.
fn app_with(
    dir: &tempfile::TempDir,
    remote: FakeRemote,
) -> (Router, Arc<Synchronizer>, BasePaths) {
    let paths = BasePaths::new(dir.path());
    paths.ensure_layout().unwrap();
    let ctx = AppContext::new(
        paths.clone(),
        Arc::new(remote),
        RewriteContext::new("http://127.0.0.1:8766", "https://vectortiles.geoportail.lu"),
    );
    let sync = Arc::clone(&ctx.sync);
    (create_router(ctx, &CorsConfig::AllowAll), sync, paths)
}

async fn send(app: &Router, method: &str, uri: &str) -> axum::response::Response {
    app.clone()
        .oneshot(
            Request::builder()
                .method(method)
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap()
}

async fn body_bytes(response: axum::response::Response) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .unwrap()
        .to_bytes()
        .to_vec()
}

/// Create a tile archive with the given rows.
async fn create_archive(path: &Path, rows: &[(i64, i64, i64, &[u8])]) {
    use sqlx::sqlite::SqliteConnectOptions;

    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    let pool = sqlx::SqlitePool::connect_with(
        SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true),
    )
    .await
    .unwrap();

    sqlx::query(
        "CREATE TABLE tiles (\
         zoom_level INTEGER, tile_column INTEGER, tile_row INTEGER, tile_data BLOB)",
    )
    .execute(&pool)
    .await
    .unwrap();

    for (z, x, row, data) in rows {
        sqlx::query("INSERT INTO tiles VALUES (?, ?, ?, ?)")
            .bind(z)
            .bind(x)
            .bind(row)
            .bind(*data)
            .execute(&pool)
            .await
            .unwrap();
    }
    pool.close().await;
}

// ============================================================================
// Liveness and CORS
// ============================================================================

#[tokio::test]
async fn hello_endpoints_greet() {
    let dir = tempfile::tempdir().unwrap();
    let (app, _, _) = app_with(&dir, FakeRemote::default());

    for uri in ["/", "/hello"] {
        let response = send(&app, "GET", uri).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_bytes(response).await, b"Hello!!!");
    }
}

#[tokio::test]
async fn responses_carry_permissive_cors() {
    let dir = tempfile::tempdir().unwrap();
    let (app, _, _) = app_with(&dir, FakeRemote::default());

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/hello")
                .header("Origin", "https://map.geoportail.lu")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(
        response
            .headers()
            .get("access-control-allow-origin")
            .map(|v| v.to_str().unwrap()),
        Some("*")
    );
}

#[tokio::test]
async fn preflight_announces_allowed_methods() {
    let dir = tempfile::tempdir().unwrap();
    let (app, _, _) = app_with(&dir, FakeRemote::default());

    let response = send(&app, "OPTIONS", "/map/fonts").await;
    assert_eq!(response.status(), StatusCode::OK);

    let allow = response
        .headers()
        .get("allow")
        .map(|v| v.to_str().unwrap().to_string())
        .unwrap_or_default();
    assert!(allow.contains("PUT"), "allow header was: {allow}");
    assert!(allow.contains("DELETE"));

    assert!(body_bytes(response).await.is_empty());
}

// ============================================================================
// Tiles
// ============================================================================

#[tokio::test]
async fn tile_fetch_returns_exact_blob_with_gzip_encoding() {
    let dir = tempfile::tempdir().unwrap();
    let (app, _, paths) = app_with(&dir, FakeRemote::default());

    let blob = b"stored vector tile";
    create_archive(
        &paths.archive_path("tiles_luxembourg"),
        &[(9, 264, 174, blob)],
    )
    .await;

    let response = send(&app, "GET", "/mbtiles?layer=road&z=9&x=264&y=-174&format=pbf").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get("content-type").unwrap(),
        "application/x-protobuf"
    );
    assert_eq!(response.headers().get("content-encoding").unwrap(), "gzip");
    assert_eq!(body_bytes(response).await, blob);
}

#[tokio::test]
async fn tile_defaults_to_road_layer_and_pbf() {
    let dir = tempfile::tempdir().unwrap();
    let (app, _, paths) = app_with(&dir, FakeRemote::default());
    create_archive(&paths.archive_path("tiles_luxembourg"), &[(4, 8, 5, b"t")]).await;

    let response = send(&app, "GET", "/mbtiles?z=4&x=8&y=-5").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_bytes(response).await, b"t");
}

#[tokio::test]
async fn raster_tiles_are_served_as_png() {
    let dir = tempfile::tempdir().unwrap();
    let (app, _, paths) = app_with(&dir, FakeRemote::default());
    create_archive(
        &paths.archive_path("topo_tiles_luxembourg"),
        &[(4, 8, 5, b"png-bytes")],
    )
    .await;

    let response = send(&app, "GET", "/mbtiles?layer=topo&z=4&x=8&y=-5&format=png").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers().get("content-type").unwrap(), "image/png");
    assert!(response.headers().get("content-encoding").is_none());
}

#[tokio::test]
async fn missing_tiles_and_layers_are_404() {
    let dir = tempfile::tempdir().unwrap();
    let (app, _, paths) = app_with(&dir, FakeRemote::default());
    create_archive(&paths.archive_path("tiles_luxembourg"), &[(4, 8, 5, b"t")]).await;

    let response = send(&app, "GET", "/mbtiles?z=4&x=9&y=-5").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = send(&app, "GET", "/mbtiles?layer=nowhere&z=4&x=8&y=-5").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ============================================================================
// Status report
// ============================================================================

#[tokio::test]
async fn check_reports_catalog_resources() {
    let dir = tempfile::tempdir().unwrap();
    let (app, _, _) = app_with(&dir, fonts_remote());

    let response = send(&app, "GET", "/check").await;
    assert_eq!(response.status(), StatusCode::OK);

    let report: serde_json::Value =
        serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert_eq!(report["fonts"]["status"], "UNKNOWN");
    assert_eq!(report["fonts"]["available"], "1.1.0");
    assert_eq!(report["fonts"]["current"], serde_json::Value::Null);
    assert_eq!(report["fonts"]["filesize"], 0);
}

#[tokio::test]
async fn check_fails_distinctly_when_catalog_unreachable() {
    let dir = tempfile::tempdir().unwrap();
    let remote = FakeRemote {
        unreachable: true,
        ..FakeRemote::default()
    };
    let (app, _, _) = app_with(&dir, remote);

    let response = send(&app, "GET", "/check").await;
    assert_eq!(response.status(), StatusCode::GATEWAY_TIMEOUT);
}

// ============================================================================
// Resource management
// ============================================================================

#[tokio::test]
async fn update_lifecycle_is_observable_through_check() {
    let dir = tempfile::tempdir().unwrap();
    let gate = Arc::new(Semaphore::new(0));
    let remote = FakeRemote {
        gate: Some(Arc::clone(&gate)),
        ..fonts_remote()
    };
    let (app, sync, _) = app_with(&dir, remote);

    // Accepted immediately, without blocking on the download.
    let response = send(&app, "PUT", "/map/fonts").await;
    assert_eq!(response.status(), StatusCode::ACCEPTED);

    // The job shows up in the report while the download is parked.
    let response = send(&app, "GET", "/check").await;
    let report: serde_json::Value =
        serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert_eq!(report["fonts"]["status"], "IN_PROGRESS");

    // A second update for the same resource conflicts.
    let response = send(&app, "PUT", "/map/fonts").await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    gate.add_permits(16);
    sync.wait("fonts").await;

    let response = send(&app, "GET", "/check").await;
    let report: serde_json::Value =
        serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert_eq!(report["fonts"]["status"], "DONE");
    assert_eq!(report["fonts"]["current"], "1.1.0");
    assert_eq!(report["fonts"]["filesize"], 6);
}

#[tokio::test]
async fn update_of_unknown_resource_is_404() {
    let dir = tempfile::tempdir().unwrap();
    let (app, _, _) = app_with(&dir, fonts_remote());

    let response = send(&app, "PUT", "/map/no-such-map").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn legacy_endpoints_drive_the_same_operations() {
    let dir = tempfile::tempdir().unwrap();
    let (app, sync, paths) = app_with(&dir, fonts_remote());

    let response = send(&app, "POST", "/update?map=fonts").await;
    assert_eq!(response.status(), StatusCode::ACCEPTED);
    sync.wait("fonts").await;
    assert!(paths.version_file("fonts").is_file());

    let response = send(&app, "POST", "/delete?map=fonts").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(!paths.version_file("fonts").exists());

    let response = send(&app, "POST", "/delete?map=fonts").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delete_of_unknown_resource_names_it_in_the_body() {
    let dir = tempfile::tempdir().unwrap();
    let (app, _, _) = app_with(&dir, FakeRemote::default());

    let response = send(&app, "DELETE", "/map/unknown-resource").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let body = String::from_utf8(body_bytes(response).await).unwrap();
    assert!(body.contains("unknown-resource"), "body was: {body}");
}

// ============================================================================
// Static assets
// ============================================================================

#[tokio::test]
async fn static_style_is_rewritten_and_marked_no_store() {
    let dir = tempfile::tempdir().unwrap();
    let (app, _, paths) = app_with(&dir, FakeRemote::default());

    let style_path = paths.live_file(Path::new("styles/roadmap.json"));
    std::fs::create_dir_all(style_path.parent().unwrap()).unwrap();
    std::fs::write(&style_path, br#"{"url":"mbtiles://{omt-geoportail}"}"#).unwrap();
    let data_path = paths.live_file(Path::new("data/omt-geoportail.json"));
    std::fs::create_dir_all(data_path.parent().unwrap()).unwrap();
    std::fs::write(&data_path, b"{}").unwrap();

    let response = send(&app, "GET", "/static/styles/roadmap/style.json").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get("cache-control").unwrap(),
        "no-store"
    );

    let body = String::from_utf8(body_bytes(response).await).unwrap();
    assert!(body.contains("http://127.0.0.1:8766/static/data/omt-geoportail.json"));
}

#[tokio::test]
async fn static_binary_files_are_cacheable() {
    let dir = tempfile::tempdir().unwrap();
    let (app, _, paths) = app_with(&dir, FakeRemote::default());

    let font = paths.live_file(Path::new("fonts/noto/0-255.pbf"));
    std::fs::create_dir_all(font.parent().unwrap()).unwrap();
    std::fs::write(&font, b"glyphs").unwrap();

    let response = send(&app, "GET", "/static/fonts/noto/0-255.pbf").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().get("cache-control").is_none());
    assert_eq!(body_bytes(response).await, b"glyphs");
}

#[tokio::test]
async fn static_absent_everywhere_is_404() {
    let dir = tempfile::tempdir().unwrap();
    let (app, _, _) = app_with(&dir, FakeRemote::default());

    let response = send(&app, "GET", "/static/fonts/absent.pbf").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn missing_style_is_relayed_from_the_remote() {
    let dir = tempfile::tempdir().unwrap();
    let remote = FakeRemote {
        documents: HashMap::from([(
            "styles/topomap.json".to_string(),
            br#"{"name":"topo"}"#.to_vec(),
        )]),
        ..FakeRemote::default()
    };
    let (app, _, _) = app_with(&dir, remote);

    let response = send(&app, "GET", "/static/styles/topomap/style.json").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_bytes(response).await, br#"{"name":"topo"}"#);
}
