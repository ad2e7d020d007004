//! Catalog client implementing the `RemoteCatalog` port.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use url::Url;

use luxtile_core::{Catalog, RemoteCatalog, RemoteError};

use crate::config::CatalogConfig;
use crate::http::{HttpBackend, ReqwestBackend};

/// Production catalog client over an injected HTTP backend.
pub struct DefaultCatalogClient {
    backend: Arc<dyn HttpBackend>,
    config: CatalogConfig,
}

impl DefaultCatalogClient {
    /// Create a client backed by reqwest.
    pub fn new(config: &CatalogConfig) -> Self {
        Self {
            backend: Arc::new(ReqwestBackend::new(config)),
            config: config.clone(),
        }
    }

    #[cfg(test)]
    fn with_backend(config: &CatalogConfig, backend: Arc<dyn HttpBackend>) -> Self {
        Self {
            backend,
            config: config.clone(),
        }
    }

    fn parse_url(raw: &str) -> Result<Url, RemoteError> {
        Url::parse(raw).map_err(|e| RemoteError::invalid_response(format!("bad URL {raw}: {e}")))
    }

    /// Join a CDN-relative document path onto the configured base.
    fn cdn_url(&self, rel: &str) -> Result<Url, RemoteError> {
        let joined = format!(
            "{}/{}",
            self.config.cdn_base.trim_end_matches('/'),
            rel.trim_start_matches('/')
        );
        Self::parse_url(&joined)
    }
}

#[async_trait]
impl RemoteCatalog for DefaultCatalogClient {
    async fn fetch_catalog(&self) -> Result<Catalog, RemoteError> {
        let url = Self::parse_url(&self.config.catalog_url)?;
        let body = self.backend.get(&url).await?;
        serde_json::from_slice(&body).map_err(|e| {
            RemoteError::invalid_response(format!("catalog document is not valid JSON: {e}"))
        })
    }

    async fn fetch_source(&self, source: &str, dest: &Path) -> Result<u64, RemoteError> {
        let url = Self::parse_url(source)?;
        let written = self.backend.get_to_file(&url, dest).await?;
        tracing::debug!(url = %url, dest = %dest.display(), written, "fetched source file");
        Ok(written)
    }

    async fn fetch_document(&self, rel: &str) -> Result<Vec<u8>, RemoteError> {
        let url = self.cdn_url(rel)?;
        self.backend.get(&url).await
    }
}
