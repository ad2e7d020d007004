//! On-disk layout under the app-private base directory.
//!
//! Two disjoint roots live under the base path:
//!
//! - `dl/` — the live tree, the only directory readers ever serve from
//! - `tmp/` — the staging area, mirroring the live layout while a resource
//!   downloads
//!
//! Version records sit at `dl/versions/<name>.meta`, tile archives at
//! `dl/mbtiles/<stem>.mbtiles`; every other file mirrors the path component
//! of the source URL it was fetched from.

use std::path::{Path, PathBuf};

use thiserror::Error;
use url::Url;

/// Errors from path resolution.
#[derive(Debug, Error)]
pub enum PathError {
    /// A source URL could not be mapped to a relative file path.
    #[error("source URL has no usable path: {url}")]
    InvalidSourceUrl { url: String },
}

/// Resolved directory layout rooted at one base path.
#[derive(Debug, Clone)]
pub struct BasePaths {
    base: PathBuf,
}

impl BasePaths {
    /// Create a layout rooted at `base`.
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    /// The base directory itself.
    pub fn base(&self) -> &Path {
        &self.base
    }

    /// Live tree served to clients: `<base>/dl`.
    pub fn live_root(&self) -> PathBuf {
        self.base.join("dl")
    }

    /// Staging area for in-flight downloads: `<base>/tmp`.
    pub fn staging_root(&self) -> PathBuf {
        self.base.join("tmp")
    }

    /// Directory holding live version records.
    pub fn versions_dir(&self) -> PathBuf {
        self.live_root().join("versions")
    }

    /// Directory holding staged version records.
    pub fn staging_versions_dir(&self) -> PathBuf {
        self.staging_root().join("versions")
    }

    /// Live version record for one resource.
    pub fn version_file(&self, name: &str) -> PathBuf {
        self.versions_dir().join(format!("{name}.meta"))
    }

    /// Staged version record for one resource.
    pub fn staging_version_file(&self, name: &str) -> PathBuf {
        self.staging_versions_dir().join(format!("{name}.meta"))
    }

    /// Directory holding tile archives.
    pub fn mbtiles_dir(&self) -> PathBuf {
        self.live_root().join("mbtiles")
    }

    /// Tile archive path for a resolved archive file stem.
    pub fn archive_path(&self, stem: &str) -> PathBuf {
        self.mbtiles_dir().join(format!("{stem}.mbtiles"))
    }

    /// A file inside the live tree, addressed by its mirrored relative path.
    pub fn live_file(&self, rel: &Path) -> PathBuf {
        self.live_root().join(rel)
    }

    /// A file inside the staging area, addressed by its mirrored relative path.
    pub fn staging_file(&self, rel: &Path) -> PathBuf {
        self.staging_root().join(rel)
    }

    /// Create the directory skeleton (idempotent).
    pub fn ensure_layout(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(self.versions_dir())?;
        std::fs::create_dir_all(self.mbtiles_dir())?;
        std::fs::create_dir_all(self.staging_root())?;
        Ok(())
    }
}

/// Default base directory in the platform data dir.
///
/// `None` when the platform offers no data directory at all.
pub fn default_base_dir() -> Option<PathBuf> {
    dirs::data_dir().map(|dir| dir.join("luxtile"))
}

/// Map a source URL to the relative path it is mirrored at.
///
/// `https://host/data/omt-geoportail-lu.json` → `data/omt-geoportail-lu.json`.
/// Query strings and fragments are discarded.
pub fn source_rel_path(source: &str) -> Result<PathBuf, PathError> {
    let url = Url::parse(source).map_err(|_| PathError::InvalidSourceUrl {
        url: source.to_string(),
    })?;
    let rel = url.path().trim_start_matches('/');
    if rel.is_empty() {
        return Err(PathError::InvalidSourceUrl {
            url: source.to_string(),
        });
    }
    Ok(PathBuf::from(rel))
}
