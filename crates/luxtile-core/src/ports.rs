//! Ports implemented by adapter crates.

use std::path::Path;

use async_trait::async_trait;

use crate::error::RemoteError;
use crate::resource::Catalog;

/// Access to the remote catalog and CDN.
///
/// The production implementation lives in the catalog adapter crate; tests
/// inject in-memory fakes.
#[async_trait]
pub trait RemoteCatalog: Send + Sync {
    /// Fetch and parse the remote catalog document.
    async fn fetch_catalog(&self) -> Result<Catalog, RemoteError>;

    /// Download one source URL to `dest`, creating parent directories.
    ///
    /// Returns the number of bytes written. Not retried: a failed source
    /// download fails the surrounding job.
    async fn fetch_source(&self, url: &str, dest: &Path) -> Result<u64, RemoteError>;

    /// Fetch a document addressed relative to the CDN root, returning its
    /// bytes without persisting them.
    async fn fetch_document(&self, rel: &str) -> Result<Vec<u8>, RemoteError>;
}
