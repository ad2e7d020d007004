//! Server bootstrap - the composition root.
//!
//! This module is the ONLY place where infrastructure is wired together for
//! the web adapter. All concrete implementations are instantiated here.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};

use luxtile_assets::{AssetServer, RewriteContext};
use luxtile_catalog::{CatalogConfig, DefaultCatalogClient};
use luxtile_core::{BasePaths, RemoteCatalog, default_base_dir};
use luxtile_store::TileStore;
use luxtile_sync::Synchronizer;

/// Port the original map client expects the backend on.
pub const DEFAULT_PORT: u16 = 8766;

/// CORS configuration for the web server.
#[derive(Debug, Clone, Default)]
pub enum CorsConfig {
    /// Allow all origins; the embedded web map runs on a foreign origin.
    #[default]
    AllowAll,
    /// Allow specific origins.
    AllowOrigins(Vec<String>),
}

/// Server configuration for the web adapter.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Port for the HTTP server.
    pub port: u16,
    /// App-private base directory holding the live and staging trees.
    pub base_dir: PathBuf,
    /// Remote catalog / CDN configuration.
    pub catalog: CatalogConfig,
    /// CORS configuration.
    pub cors: CorsConfig,
}

impl ServerConfig {
    /// Create config with default paths and endpoints.
    pub fn with_defaults() -> Result<Self> {
        Ok(Self {
            port: DEFAULT_PORT,
            base_dir: default_base_dir().context("no platform data directory available")?,
            catalog: CatalogConfig::default(),
            cors: CorsConfig::default(),
        })
    }

    /// Set the listen port.
    #[must_use]
    pub const fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Set the base directory.
    #[must_use]
    pub fn with_base_dir(mut self, base_dir: impl Into<PathBuf>) -> Self {
        self.base_dir = base_dir.into();
        self
    }

    /// Set the catalog configuration.
    #[must_use]
    pub fn with_catalog(mut self, catalog: CatalogConfig) -> Self {
        self.catalog = catalog;
        self
    }

    /// Set CORS to allow specific origins.
    #[must_use]
    pub fn with_allowed_origins(mut self, origins: Vec<String>) -> Self {
        self.cors = CorsConfig::AllowOrigins(origins);
        self
    }
}

/// Application context for the web adapter.
///
/// Holds every initialized service the handlers touch.
pub struct AppContext {
    /// Resolved directory layout.
    pub paths: BasePaths,
    /// Tile archive access.
    pub store: TileStore,
    /// Download/synchronization pipeline.
    pub sync: Arc<Synchronizer>,
    /// Static asset serving with rewriting.
    pub assets: AssetServer,
    /// Remote catalog access, shared by synchronizer and status reporting.
    pub remote: Arc<dyn RemoteCatalog>,
}

impl AppContext {
    /// Compose the services over one base directory and remote client.
    ///
    /// Tests inject an in-memory `remote`; production uses [`bootstrap`].
    pub fn new(paths: BasePaths, remote: Arc<dyn RemoteCatalog>, rewrite: RewriteContext) -> Self {
        Self {
            store: TileStore::new(paths.clone()),
            sync: Arc::new(Synchronizer::new(paths.clone(), Arc::clone(&remote))),
            assets: AssetServer::new(paths.clone(), Arc::clone(&remote), rewrite),
            remote,
            paths,
        }
    }
}

/// Bootstrap the web server context from configuration.
pub fn bootstrap(config: &ServerConfig) -> Result<AppContext> {
    let paths = BasePaths::new(&config.base_dir);
    paths
        .ensure_layout()
        .with_context(|| format!("cannot create layout under {}", config.base_dir.display()))?;

    tracing::info!(
        base_dir = %config.base_dir.display(),
        live_root = %paths.live_root().display(),
        staging_root = %paths.staging_root().display(),
        cdn = config.catalog.cdn_base(),
        "bootstrap resolved paths"
    );

    let remote: Arc<dyn RemoteCatalog> = Arc::new(DefaultCatalogClient::new(&config.catalog));
    let rewrite = RewriteContext::new(
        format!("http://127.0.0.1:{}", config.port),
        config.catalog.cdn_base(),
    );

    Ok(AppContext::new(paths, remote, rewrite))
}

/// Start the web server on the configured port.
pub async fn start_server(config: ServerConfig) -> Result<()> {
    use tokio::net::TcpListener;

    let ctx = bootstrap(&config)?;
    let app = crate::routes::create_router(ctx, &config.cors);

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("offline map backend listening on http://{addr}");

    axum::serve(listener, app).await?;
    Ok(())
}
