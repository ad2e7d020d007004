//! Asset synchronizer.
//!
//! Downloads a resource's file set into the staging area, promotes it
//! atomically-per-file into the live tree, and tracks one job per resource
//! name. The live tree never sees a partially downloaded resource: the
//! version record is written only after every file has moved.

pub mod error;
pub mod synchronizer;

pub use error::SyncError;
pub use synchronizer::Synchronizer;
