//! Read-only access to per-layer SQLite tile archives.
//!
//! Archives live under `dl/mbtiles/` and are opened lazily on first request,
//! then cached for the process lifetime. Row addressing accepts both the XYZ
//! and TMS sign conventions; blobs above the single-read ceiling are
//! assembled from 1MB `substr` chunks.

pub mod error;
pub mod format;
pub mod store;

pub use error::StoreError;
pub use format::TileFormat;
pub use store::{Tile, TileStore};
