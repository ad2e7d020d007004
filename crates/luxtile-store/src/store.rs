//! The tile store.
//!
//! One read-only `SqlitePool` per archive, opened on first use. Pools are
//! keyed by resolved archive path so every alias of a layer shares one
//! handle. A failed open is not cached: the `OnceCell` stays empty and the
//! next request retries, which is cheap and idempotent.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use sqlx::SqlitePool;
use sqlx::sqlite::SqliteConnectOptions;
use tokio::sync::OnceCell;

use luxtile_core::{BasePaths, archive_stem};

use crate::error::StoreError;
use crate::format::TileFormat;

/// Largest blob fetched in a single query. Bigger rows fall back to chunked
/// reads, bounding per-query materialization and matching the behavior the
/// existing archives were produced against.
const MAX_DIRECT_READ_BYTES: i64 = 2_000_000;

/// Chunk size for the fallback path. SQLite `substr` is 1-based inclusive:
/// chunk `i` covers bytes `[i·1e6 + 1, (i+1)·1e6]`.
const CHUNK_BYTES: i64 = 1_000_000;

/// Zoom levels above this cannot address any stored row.
const MAX_ZOOM: u8 = 30;

/// One tile payload with the headers it should be served with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tile {
    pub bytes: Vec<u8>,
    pub format: TileFormat,
}

/// Lazily opened, per-archive read-only tile database handles.
pub struct TileStore {
    paths: BasePaths,
    // Keyed by archive path; the per-entry OnceCell serializes first-time
    // opens of the same archive without blocking unrelated layers.
    pools: Mutex<HashMap<PathBuf, Arc<OnceCell<SqlitePool>>>>,
}

impl TileStore {
    /// Create a store over the live tree.
    pub fn new(paths: BasePaths) -> Self {
        Self {
            paths,
            pools: Mutex::new(HashMap::new()),
        }
    }

    /// Fetch one tile.
    ///
    /// `y` may use either row-numbering convention: a positive value is
    /// interpreted as XYZ and flipped to TMS, a non-positive value is the
    /// TMS row directly. Missing archive, missing row and open failures all
    /// come back as [`StoreError::NotFound`].
    pub async fn get_tile(
        &self,
        layer: &str,
        z: u8,
        x: i64,
        y: i64,
        format: TileFormat,
    ) -> Result<Tile, StoreError> {
        if z > MAX_ZOOM {
            return Err(StoreError::NotFound);
        }

        let pool = self.pool_for(layer).await?;
        let row = tms_row(z, y);

        let length: Option<(i64,)> = sqlx::query_as(
            "SELECT length(tile_data) FROM tiles \
             WHERE zoom_level = ? AND tile_column = ? AND tile_row = ?",
        )
        .bind(i64::from(z))
        .bind(x)
        .bind(row)
        .fetch_optional(&pool)
        .await?;

        let Some((length,)) = length else {
            return Err(StoreError::NotFound);
        };

        let bytes = if length <= MAX_DIRECT_READ_BYTES {
            read_direct(&pool, z, x, row).await?
        } else {
            tracing::debug!(layer, z, x, row, length, "assembling oversized tile from chunks");
            read_chunked(&pool, z, x, row, length).await?
        };

        Ok(Tile { bytes, format })
    }

    /// Resolve a layer name to an existing archive path.
    ///
    /// An archive matching the name directly wins; otherwise the legacy
    /// alias table is consulted.
    fn resolve_archive(&self, layer: &str) -> Option<PathBuf> {
        let direct = self.paths.archive_path(layer);
        if direct.is_file() {
            return Some(direct);
        }
        let aliased = self.paths.archive_path(archive_stem(layer)?);
        aliased.is_file().then_some(aliased)
    }

    /// Get or open the pool for a layer's archive.
    async fn pool_for(&self, layer: &str) -> Result<SqlitePool, StoreError> {
        let path = self.resolve_archive(layer).ok_or(StoreError::NotFound)?;

        let cell = {
            let mut pools = self.pools.lock().expect("tile pool registry poisoned");
            Arc::clone(pools.entry(path.clone()).or_default())
        };

        let pool = cell
            .get_or_try_init(|| open_archive(&path))
            .await
            .map_err(|e| {
                tracing::warn!(path = %path.display(), error = %e, "failed to open tile archive");
                StoreError::NotFound
            })?;

        Ok(pool.clone())
    }
}

async fn read_direct(pool: &SqlitePool, z: u8, x: i64, row: i64) -> Result<Vec<u8>, StoreError> {
    let bytes: Option<Vec<u8>> = sqlx::query_scalar(
        "SELECT tile_data FROM tiles \
         WHERE zoom_level = ? AND tile_column = ? AND tile_row = ?",
    )
    .bind(i64::from(z))
    .bind(x)
    .bind(row)
    .fetch_optional(pool)
    .await?;

    bytes.ok_or(StoreError::NotFound)
}

async fn read_chunked(
    pool: &SqlitePool,
    z: u8,
    x: i64,
    row: i64,
    length: i64,
) -> Result<Vec<u8>, StoreError> {
    let mut buf = Vec::with_capacity(usize::try_from(length).unwrap_or(0));

    for start in chunk_starts(length) {
        let chunk: Vec<u8> = sqlx::query_scalar(
            "SELECT substr(tile_data, ?, ?) FROM tiles \
             WHERE zoom_level = ? AND tile_column = ? AND tile_row = ?",
        )
        .bind(start)
        .bind(CHUNK_BYTES)
        .bind(i64::from(z))
        .bind(x)
        .bind(row)
        .fetch_one(pool)
        .await?;
        buf.extend_from_slice(&chunk);
    }

    Ok(buf)
}

/// Open one archive read-only.
async fn open_archive(path: &Path) -> Result<SqlitePool, sqlx::Error> {
    SqlitePool::connect_with(SqliteConnectOptions::new().filename(path).read_only(true)).await
}

/// Convert the caller's row coordinate to the archive's TMS row.
///
/// Archives number rows bottom-up (TMS) while the map client sends top-down
/// XYZ rows. A positive `y` is treated as XYZ and flipped; a non-positive
/// `y` already encodes the TMS row as its magnitude.
fn tms_row(z: u8, y: i64) -> i64 {
    if y > 0 { (1i64 << z) - y - 1 } else { -y }
}

/// 1-based start offsets of the substr chunks covering `length` bytes.
fn chunk_starts(length: i64) -> impl Iterator<Item = i64> {
    let chunks = (length + CHUNK_BYTES - 1) / CHUNK_BYTES;
    (0..chunks).map(|i| i * CHUNK_BYTES + 1)
}
