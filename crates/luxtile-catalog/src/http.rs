//! HTTP backend abstraction for catalog and CDN access.
//!
//! The backend trait allows dependency injection for testing. The production
//! implementation uses reqwest with a bounded timeout and automatic retry
//! for transient catalog-fetch errors; source downloads run exactly once.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use futures_util::StreamExt;
use tokio::io::AsyncWriteExt;
use url::Url;

use luxtile_core::RemoteError;

use crate::config::CatalogConfig;

// ============================================================================
// HTTP Backend Trait
// ============================================================================

/// Object-safe HTTP backend used by the catalog client.
#[async_trait]
pub(crate) trait HttpBackend: Send + Sync {
    /// Fetch a URL and return the response body, retrying transient errors.
    async fn get(&self, url: &Url) -> Result<Vec<u8>, RemoteError>;

    /// Stream a URL to `dest`, returning the number of bytes written.
    ///
    /// Runs exactly once; the caller decides what a failure means.
    async fn get_to_file(&self, url: &Url, dest: &Path) -> Result<u64, RemoteError>;
}

// ============================================================================
// Reqwest Backend
// ============================================================================

/// Production backend with retry for transient errors on `get`.
pub(crate) struct ReqwestBackend {
    client: reqwest::Client,
    max_retries: u8,
    retry_base_delay: Duration,
}

impl ReqwestBackend {
    /// Create a backend from the catalog configuration.
    pub(crate) fn new(config: &CatalogConfig) -> Self {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(config.timeout)
            .build()
            .expect("failed to create HTTP client");

        Self {
            client,
            max_retries: config.max_retries,
            retry_base_delay: config.retry_base_delay,
        }
    }

    /// Send one GET and classify the outcome.
    async fn send(&self, url: &Url) -> Result<reqwest::Response, RemoteError> {
        let response = self
            .client
            .get(url.as_str())
            .send()
            .await
            .map_err(|e| classify_transport_error(&e, url))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        if status.as_u16() == 404 {
            return Err(RemoteError::not_found(url.as_str()));
        }
        Err(RemoteError::status(status.as_u16(), url.as_str()))
    }

    /// Fetch with exponential backoff for 5xx and unreachable-host errors.
    async fn fetch_with_retry(&self, url: &Url) -> Result<reqwest::Response, RemoteError> {
        let mut last_error = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                let delay = self.retry_base_delay * 2u32.pow(u32::from(attempt) - 1);
                tokio::time::sleep(delay).await;
            }

            match self.send(url).await {
                Ok(response) => return Ok(response),
                Err(err) if attempt < self.max_retries && is_transient(&err) => {
                    tracing::debug!(url = %url, attempt, error = %err, "retrying catalog fetch");
                    last_error = Some(err);
                }
                Err(err) => return Err(err),
            }
        }

        Err(last_error
            .unwrap_or_else(|| RemoteError::invalid_response("unknown error during fetch")))
    }
}

/// True for errors worth retrying: server-side failures and unreachable hosts.
fn is_transient(err: &RemoteError) -> bool {
    match err {
        RemoteError::Status { status, .. } => *status >= 500,
        RemoteError::Unreachable { .. } => true,
        _ => false,
    }
}

/// Map a reqwest transport error to the taxonomy.
///
/// Connect, DNS and timeout failures mean the host is unreachable; anything
/// else is a malformed exchange.
fn classify_transport_error(err: &reqwest::Error, url: &Url) -> RemoteError {
    if err.is_connect() || err.is_timeout() || err.is_request() {
        RemoteError::unreachable(format!("{url}: {err}"))
    } else {
        RemoteError::invalid_response(err.to_string())
    }
}

#[async_trait]
impl HttpBackend for ReqwestBackend {
    async fn get(&self, url: &Url) -> Result<Vec<u8>, RemoteError> {
        let response = self.fetch_with_retry(url).await?;
        let bytes = response
            .bytes()
            .await
            .map_err(|e| RemoteError::invalid_response(e.to_string()))?;
        Ok(bytes.to_vec())
    }

    async fn get_to_file(&self, url: &Url, dest: &Path) -> Result<u64, RemoteError> {
        let response = self.send(url).await?;

        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| RemoteError::from_io_error(&e))?;
        }

        let mut file = tokio::fs::File::create(dest)
            .await
            .map_err(|e| RemoteError::from_io_error(&e))?;

        let mut written = 0u64;
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| classify_transport_error(&e, url))?;
            file.write_all(&chunk)
                .await
                .map_err(|e| RemoteError::from_io_error(&e))?;
            written += chunk.len() as u64;
        }
        file.flush()
            .await
            .map_err(|e| RemoteError::from_io_error(&e))?;

        Ok(written)
    }
}

// ============================================================================
// Fake Backend for Testing
// ============================================================================
