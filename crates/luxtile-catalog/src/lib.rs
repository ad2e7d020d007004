//! Resource manifest client.
//!
//! Two halves, matching the two places version data lives:
//!
//! - [`DefaultCatalogClient`] talks to the remote catalog and CDN over HTTP
//!   and implements the [`luxtile_core::RemoteCatalog`] port.
//! - [`VersionStore`] reads and writes the local per-resource version
//!   records; a missing record is an expected condition, not an error.

pub mod client;
pub mod config;
mod http;
pub mod records;

pub use client::DefaultCatalogClient;
pub use config::CatalogConfig;
pub use records::{RecordError, VersionStore};
