//! Job registry and download pipeline.
//!
//! # Concurrency model
//!
//! One entry per resource name in the job map; at most one job per name may
//! be in progress. The check-and-set on the map is the only mutual-exclusion
//! guarantee: unrelated resources download concurrently, each in its own
//! spawned task. Job state is in-memory only and reverts to `Unknown` on
//! restart; the live version record is the durable completion signal.
//!
//! # Promotion order
//!
//! Stale live files are all deleted before any new file moves in, never
//! interleaved, so a client mid-update sees old-version files or gaps but
//! not a mix of old and new. The version record moves last.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use tokio::task::JoinHandle;

use luxtile_catalog::VersionStore;
use luxtile_core::{
    BasePaths, Catalog, JobState, RemoteCatalog, ResourceEntry, ResourceReport, VersionRecord,
    source_rel_path,
};

use crate::error::SyncError;

/// One tracked job. Retained after completion for status queries until a new
/// job for the same name overwrites it.
struct Job {
    state: JobState,
    handle: Option<JoinHandle<()>>,
}

/// The asset synchronizer: sole writer of the live tree and version records.
pub struct Synchronizer {
    paths: BasePaths,
    catalog: Arc<dyn RemoteCatalog>,
    jobs: Mutex<HashMap<String, Job>>,
}

impl Synchronizer {
    /// Create a synchronizer over `paths`, fetching through `catalog`.
    pub fn new(paths: BasePaths, catalog: Arc<dyn RemoteCatalog>) -> Self {
        Self {
            paths,
            catalog,
            jobs: Mutex::new(HashMap::new()),
        }
    }

    /// Start a background download of `name`.
    ///
    /// Returns as soon as the job is spawned; poll [`status`] for the
    /// outcome. Fails with `Conflict` when a job for `name` is already in
    /// progress and `UnknownResource` when the catalog does not list `name`.
    ///
    /// [`status`]: Self::status
    pub async fn update(self: &Arc<Self>, name: &str) -> Result<(), SyncError> {
        // Cheap early rejection before touching the network.
        if self.status(name) == JobState::InProgress {
            return Err(SyncError::conflict(name));
        }

        let catalog = self.catalog.fetch_catalog().await?;
        let entry = catalog
            .get(name)
            .cloned()
            .ok_or_else(|| SyncError::unknown(name))?;

        // Atomic check-and-set: the map lock serializes near-simultaneous
        // requests that both passed the early check.
        {
            let mut jobs = self.jobs.lock().expect("job registry poisoned");
            if jobs
                .get(name)
                .is_some_and(|job| job.state == JobState::InProgress)
            {
                return Err(SyncError::conflict(name));
            }
            jobs.insert(
                name.to_string(),
                Job {
                    state: JobState::InProgress,
                    handle: None,
                },
            );
        }

        let sync = Arc::clone(self);
        let task_name = name.to_string();
        let handle = tokio::spawn(async move {
            let outcome = run_job(&sync.paths, sync.catalog.as_ref(), &task_name, &entry).await;

            let next = match outcome {
                Ok(()) => {
                    tracing::info!(resource = %task_name, version = %entry.version, "resource synchronized");
                    JobState::Done
                }
                Err(e) => {
                    // Lenient by design: the failure ends the job, the live
                    // tree keeps its prior consistent state, no retry.
                    tracing::warn!(resource = %task_name, error = %e, "resource synchronization failed");
                    JobState::Failed
                }
            };

            let mut jobs = sync.jobs.lock().expect("job registry poisoned");
            if let Some(job) = jobs.get_mut(&task_name) {
                job.state = next;
            }
        });

        // Keep the handle so the job is supervised, not fire-and-forget.
        let mut jobs = self.jobs.lock().expect("job registry poisoned");
        if let Some(job) = jobs.get_mut(name) {
            job.handle = Some(handle);
        }

        Ok(())
    }

    /// Remove a resource from the live tree.
    ///
    /// Rejected with `Conflict` while a job for `name` is in progress; a
    /// delete racing an in-flight update could tear the live tree.
    pub fn delete(&self, name: &str) -> Result<(), SyncError> {
        if self.status(name) == JobState::InProgress {
            return Err(SyncError::conflict(name));
        }

        let live = VersionStore::live(&self.paths);
        let record = live.read(name)?.ok_or_else(|| SyncError::unknown(name))?;

        for source in &record.sources {
            match source_rel_path(source) {
                Ok(rel) => remove_quietly(&self.paths.live_file(&rel)),
                Err(e) => {
                    tracing::warn!(resource = %name, source = %source, error = %e, "skipping unmappable source")
                }
            }
        }
        live.remove(name)?;

        tracing::info!(resource = %name, "resource deleted");
        Ok(())
    }

    /// Current job state for `name`; `Unknown` when no job ran this process.
    pub fn status(&self, name: &str) -> JobState {
        self.jobs
            .lock()
            .expect("job registry poisoned")
            .get(name)
            .map_or(JobState::Unknown, |job| job.state)
    }

    /// Byte total of the resource's files.
    ///
    /// While a job is in progress the staged files are summed, otherwise the
    /// live ones. Individually missing files count as zero.
    pub fn size(&self, name: &str) -> u64 {
        let staging = self.status(name) == JobState::InProgress;
        let store = if staging {
            VersionStore::staging(&self.paths)
        } else {
            VersionStore::live(&self.paths)
        };

        let Ok(sources) = store.sources(name) else {
            return 0;
        };

        sources
            .iter()
            .filter_map(|source| source_rel_path(source).ok())
            .map(|rel| {
                let path = if staging {
                    self.paths.staging_file(&rel)
                } else {
                    self.paths.live_file(&rel)
                };
                std::fs::metadata(path).map_or(0, |meta| meta.len())
            })
            .sum()
    }

    /// Status report over the union of catalog names and local records.
    pub fn report(&self, catalog: &Catalog) -> BTreeMap<String, ResourceReport> {
        let live = VersionStore::live(&self.paths);

        let mut names: BTreeSet<String> = catalog.keys().cloned().collect();
        names.extend(live.list().unwrap_or_default());

        names
            .into_iter()
            .map(|name| {
                let report = ResourceReport {
                    status: self.status(&name),
                    filesize: self.size(&name),
                    current: live.version(&name).ok().flatten(),
                    available: catalog.get(&name).map(|entry| entry.version.clone()),
                };
                (name, report)
            })
            .collect()
    }

    /// Wait for the job for `name`, if any, to finish.
    ///
    /// Used by shutdown paths and tests; status queries never block on this.
    pub async fn wait(&self, name: &str) {
        let handle = {
            let mut jobs = self.jobs.lock().expect("job registry poisoned");
            jobs.get_mut(name).and_then(|job| job.handle.take())
        };
        if let Some(handle) = handle {
            handle.await.ok();
        }
    }
}

/// Download and promote one resource. Runs inside the spawned job task,
/// with no access to the registry lock.
async fn run_job(
    paths: &BasePaths,
    catalog: &dyn RemoteCatalog,
    name: &str,
    entry: &ResourceEntry,
) -> Result<(), SyncError> {
    let result = stage_and_promote(paths, catalog, name, entry).await;

    if result.is_err() {
        discard_staged(paths, name, entry);
    }
    result
}

async fn stage_and_promote(
    paths: &BasePaths,
    catalog: &dyn RemoteCatalog,
    name: &str,
    entry: &ResourceEntry,
) -> Result<(), SyncError> {
    let record = VersionRecord::from(entry);
    VersionStore::staging(paths).write(name, &record)?;

    // Resolve every source up front so a bad URL fails before any download.
    let mut files = Vec::with_capacity(entry.sources.len());
    for source in &entry.sources {
        files.push((source.as_str(), source_rel_path(source)?));
    }

    for (source, rel) in &files {
        let dest = paths.staging_file(rel);
        let written = catalog.fetch_source(source, &dest).await?;
        tracing::debug!(resource = %name, source = %source, written, "staged source file");
    }

    // Delete the entire stale file set before moving anything in.
    let live = VersionStore::live(paths);
    if let Some(prior) = live.read(name)? {
        for source in &prior.sources {
            if let Ok(rel) = source_rel_path(source) {
                remove_quietly(&paths.live_file(&rel));
            }
        }
    }

    for (_, rel) in &files {
        promote_file(&paths.staging_file(rel), &paths.live_file(rel))?;
    }

    // Record last: its existence asserts the whole file set is live.
    live.write(name, &record)?;
    VersionStore::staging(paths).remove(name)?;

    Ok(())
}

/// Best-effort cleanup of the staging set after a failed job.
fn discard_staged(paths: &BasePaths, name: &str, entry: &ResourceEntry) {
    for source in &entry.sources {
        if let Ok(rel) = source_rel_path(source) {
            remove_quietly(&paths.staging_file(&rel));
        }
    }
    if let Err(e) = VersionStore::staging(paths).remove(name) {
        tracing::debug!(resource = %name, error = %e, "could not discard staged record");
    }
}

/// Move one staged file into the live tree, creating parent directories.
fn promote_file(from: &Path, to: &Path) -> std::io::Result<()> {
    if let Some(parent) = to.parent() {
        std::fs::create_dir_all(parent)?;
    }
    match std::fs::rename(from, to) {
        Ok(()) => Ok(()),
        // Rename can fail across filesystems; fall back to copy + remove.
        Err(_) => {
            std::fs::copy(from, to)?;
            std::fs::remove_file(from)
        }
    }
}

/// Remove a file, tolerating absence.
fn remove_quietly(path: &PathBuf) {
    if let Err(e) = std::fs::remove_file(path) {
        if e.kind() != std::io::ErrorKind::NotFound {
            tracing::debug!(path = %path.display(), error = %e, "could not remove file");
        }
    }
}
