//! Static asset server.
//!
//! Serves files from the live tree, rewriting the URL templates embedded in
//! style and tile-source documents so the map client talks to the local
//! backend for everything available offline and falls back to the remote CDN
//! for the rest.

pub mod rewrite;
pub mod server;

pub use rewrite::RewriteContext;
pub use server::{Asset, AssetError, AssetServer};
