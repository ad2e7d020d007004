//! Resource, version-record and job-state types.
//!
//! A *resource* is a named, versioned package of map data (tile archives,
//! styles, fonts, sprites). The remote catalog lists every resource with its
//! current version and the URLs of its constituent files; a local version
//! record exists exactly when a resource has been fully downloaded once.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One resource as described by the remote catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceEntry {
    /// Version string, opaque to this backend.
    pub version: String,
    /// URLs of every file belonging to this version.
    pub sources: Vec<String>,
}

/// The remote catalog: resource name → entry.
///
/// `BTreeMap` keeps reports deterministic.
pub type Catalog = BTreeMap<String, ResourceEntry>;

/// Locally persisted record of the last fully applied version of a resource.
///
/// Written only after every source file has been moved into the live tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionRecord {
    pub version: String,
    pub sources: Vec<String>,
}

impl From<&ResourceEntry> for VersionRecord {
    fn from(entry: &ResourceEntry) -> Self {
        Self {
            version: entry.version.clone(),
            sources: entry.sources.clone(),
        }
    }
}

/// State of the per-resource download job.
///
/// In-memory only: every resource reverts to `Unknown` on restart. The
/// existence of a live version record is the durable completion signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobState {
    Unknown,
    InProgress,
    Failed,
    Done,
}

impl JobState {
    /// Stable string form, matching the serialized representation.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unknown => "UNKNOWN",
            Self::InProgress => "IN_PROGRESS",
            Self::Failed => "FAILED",
            Self::Done => "DONE",
        }
    }
}

/// One row of the status report served by the facade.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceReport {
    /// Job state for this resource.
    pub status: JobState,
    /// Byte total of the staged (while in progress) or live files.
    pub filesize: u64,
    /// Locally applied version, if the resource was ever downloaded.
    pub current: Option<String>,
    /// Version offered by the remote catalog, if listed there.
    pub available: Option<String>,
}
