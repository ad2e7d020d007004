//! Configuration for the catalog client.

use std::time::Duration;

/// Configuration for the remote catalog client.
///
/// # Example
///
/// ```
/// use luxtile_catalog::CatalogConfig;
/// use std::time::Duration;
///
/// let config = CatalogConfig::new()
///     .with_catalog_url("https://mirror.example/versions.json")
///     .with_timeout(Duration::from_secs(60));
/// ```
#[derive(Debug, Clone)]
pub struct CatalogConfig {
    /// Absolute URL of the catalog document.
    pub(crate) catalog_url: String,
    /// Base URL of the CDN that hosts source files and style documents.
    pub(crate) cdn_base: String,
    /// User agent string for HTTP requests.
    pub(crate) user_agent: String,
    /// Request timeout, applied to catalog fetches and source downloads.
    pub(crate) timeout: Duration,
    /// Maximum number of retry attempts for transient catalog-fetch errors.
    pub(crate) max_retries: u8,
    /// Base delay for exponential backoff.
    pub(crate) retry_base_delay: Duration,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            catalog_url: "https://vectortiles.geoportail.lu/versions.json".to_string(),
            cdn_base: "https://vectortiles.geoportail.lu".to_string(),
            user_agent: concat!("luxtile/", env!("CARGO_PKG_VERSION")).to_string(),
            timeout: Duration::from_secs(30),
            max_retries: 3,
            retry_base_delay: Duration::from_millis(500),
        }
    }
}

impl CatalogConfig {
    /// Create a configuration with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the catalog document URL.
    #[must_use]
    pub fn with_catalog_url(mut self, url: impl Into<String>) -> Self {
        self.catalog_url = url.into();
        self
    }

    /// Set the CDN base URL.
    #[must_use]
    pub fn with_cdn_base(mut self, url: impl Into<String>) -> Self {
        self.cdn_base = url.into();
        self
    }

    /// Set the user agent string.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Set the request timeout.
    ///
    /// Defaults to 30 seconds.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the maximum number of retry attempts for catalog fetches.
    ///
    /// Defaults to 3 retries. Source downloads are never retried.
    #[must_use]
    pub const fn with_max_retries(mut self, retries: u8) -> Self {
        self.max_retries = retries;
        self
    }

    /// Set the base delay for exponential backoff retries.
    #[must_use]
    pub const fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_base_delay = delay;
        self
    }

    /// The CDN base URL.
    pub fn cdn_base(&self) -> &str {
        &self.cdn_base
    }
}
