//! Core domain types and port definitions for the offline map backend.
//!
//! This crate holds everything the adapter crates share: the resource and
//! version-record model, the job state machine, the on-disk layout under the
//! app-private base directory, the legacy layer-name alias table, and the
//! `RemoteCatalog` port implemented by the catalog adapter.

pub mod alias;
pub mod error;
pub mod paths;
pub mod ports;
pub mod resource;

// Re-export commonly used types for convenience
pub use alias::{DEFAULT_LAYER, archive_stem};
pub use error::RemoteError;
pub use paths::{BasePaths, PathError, default_base_dir, source_rel_path};
pub use ports::RemoteCatalog;
pub use resource::{Catalog, JobState, ResourceEntry, ResourceReport, VersionRecord};
