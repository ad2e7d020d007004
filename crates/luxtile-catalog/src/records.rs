//! Local version records.
//!
//! One JSON file per resource (`<name>.meta`) holding the last fully applied
//! version and its source list. The synchronizer is the only writer; a
//! record exists if and only if the resource completed a download at least
//! once. Absence of a record is an expected condition, never an error.

use std::io::ErrorKind;
use std::path::PathBuf;

use thiserror::Error;

use luxtile_core::{BasePaths, VersionRecord};

/// Errors from reading or writing version records.
#[derive(Debug, Error)]
pub enum RecordError {
    /// Filesystem failure other than not-found.
    #[error("version record I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A record file exists but does not parse.
    #[error("version record for '{name}' is malformed: {message}")]
    Malformed { name: String, message: String },
}

/// Reads and writes the version records under one directory.
#[derive(Debug, Clone)]
pub struct VersionStore {
    dir: PathBuf,
}

impl VersionStore {
    /// Store over the live tree records (`dl/versions/`).
    pub fn live(paths: &BasePaths) -> Self {
        Self {
            dir: paths.versions_dir(),
        }
    }

    /// Store over the staging records (`tmp/versions/`).
    pub fn staging(paths: &BasePaths) -> Self {
        Self {
            dir: paths.staging_versions_dir(),
        }
    }

    fn record_path(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{name}.meta"))
    }

    /// Read the record for `name`; `None` when no record exists.
    pub fn read(&self, name: &str) -> Result<Option<VersionRecord>, RecordError> {
        let bytes = match std::fs::read(self.record_path(name)) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        serde_json::from_slice(&bytes).map_err(|e| RecordError::Malformed {
            name: name.to_string(),
            message: e.to_string(),
        })
    }

    /// The locally applied version string, if any.
    pub fn version(&self, name: &str) -> Result<Option<String>, RecordError> {
        Ok(self.read(name)?.map(|record| record.version))
    }

    /// The recorded source list; empty when no record exists.
    pub fn sources(&self, name: &str) -> Result<Vec<String>, RecordError> {
        Ok(self
            .read(name)?
            .map(|record| record.sources)
            .unwrap_or_default())
    }

    /// Serialize and write the record, creating parent directories.
    pub fn write(&self, name: &str, record: &VersionRecord) -> Result<(), RecordError> {
        std::fs::create_dir_all(&self.dir)?;
        let json = serde_json::to_vec_pretty(record).map_err(|e| RecordError::Malformed {
            name: name.to_string(),
            message: e.to_string(),
        })?;
        std::fs::write(self.record_path(name), json)?;
        Ok(())
    }

    /// Remove the record. Returns `false` when no record existed.
    pub fn remove(&self, name: &str) -> Result<bool, RecordError> {
        match std::fs::remove_file(self.record_path(name)) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// Names of every resource with a record, sorted.
    pub fn list(&self) -> Result<Vec<String>, RecordError> {
        let entries = match std::fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut names = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if path.extension().is_some_and(|ext| ext == "meta") {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    names.push(stem.to_string());
                }
            }
        }
        names.sort();
        Ok(names)
    }
}
