//! Live-tree file resolution and serving.

use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;

use luxtile_core::{BasePaths, RemoteCatalog, archive_stem};

use crate::rewrite::{RewriteContext, rewrite_style, rewrite_tile_source};

/// Errors from asset resolution.
///
/// Everything collapses to not-found at the HTTP boundary; the cause only
/// reaches the logs.
#[derive(Debug, Error)]
pub enum AssetError {
    #[error("asset not found")]
    NotFound,
}

/// One servable asset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Asset {
    pub bytes: Vec<u8>,
    pub content_type: &'static str,
    /// Rewritten documents must not be cached by the client: their content
    /// depends on what happens to be offline right now.
    pub no_store: bool,
}

/// Serves files from the live tree with URL-template rewriting.
pub struct AssetServer {
    paths: BasePaths,
    remote: Arc<dyn RemoteCatalog>,
    rewrite: RewriteContext,
}

impl AssetServer {
    /// Create a server over the live tree.
    pub fn new(paths: BasePaths, remote: Arc<dyn RemoteCatalog>, rewrite: RewriteContext) -> Self {
        Self {
            paths,
            remote,
            rewrite,
        }
    }

    /// Serve the asset at `request_path` (the part after the static prefix).
    pub async fn serve(&self, request_path: &str) -> Result<Asset, AssetError> {
        let rel = normalize(request_path).ok_or(AssetError::NotFound)?;
        let path = self.paths.live_file(&rel);

        match std::fs::read(&path) {
            Ok(bytes) => Ok(self.render(&rel, bytes)),
            Err(e) if is_style_doc(&rel) => {
                tracing::debug!(
                    path = %path.display(),
                    error = %e,
                    "style document missing locally, relaying from remote"
                );
                self.relay_remote(&rel).await
            }
            Err(e) => {
                tracing::debug!(path = %path.display(), error = %e, "asset read failed");
                Err(AssetError::NotFound)
            }
        }
    }

    /// Apply the rewrite rules that match the document kind.
    fn render(&self, rel: &Path, bytes: Vec<u8>) -> Asset {
        let content_type = content_type_for(rel);

        // Binary payloads (fonts, sprites) are never rewritten.
        if rel.extension().is_some_and(|ext| ext == "json") {
            match String::from_utf8(bytes) {
                Ok(text) => return self.render_document(rel, &text, content_type),
                Err(e) => {
                    tracing::warn!(path = %rel.display(), "json asset is not valid UTF-8, serving raw");
                    return Asset {
                        bytes: e.into_bytes(),
                        content_type,
                        no_store: false,
                    };
                }
            }
        }

        Asset {
            bytes,
            content_type,
            no_store: false,
        }
    }

    fn render_document(&self, rel: &Path, text: &str, content_type: &'static str) -> Asset {
        if is_style_doc(rel) {
            let live_root = self.paths.live_root();
            let exists = |id: &str| live_root.join("data").join(format!("{id}.json")).is_file();
            let rewritten = rewrite_style(text, &self.rewrite, &exists);
            return Asset {
                bytes: rewritten.into_bytes(),
                content_type,
                no_store: true,
            };
        }

        if is_tile_source_doc(rel) {
            let doc_id = rel
                .file_stem()
                .and_then(|stem| stem.to_str())
                .unwrap_or_default();
            let rewritten =
                rewrite_tile_source(text, &self.rewrite, doc_id, self.archive_exists(doc_id));
            return Asset {
                bytes: rewritten.into_bytes(),
                content_type,
                no_store: true,
            };
        }

        Asset {
            bytes: text.as_bytes().to_vec(),
            content_type,
            no_store: false,
        }
    }

    /// Whether the archive behind a tile-source document is offline.
    fn archive_exists(&self, doc_id: &str) -> bool {
        let stem = archive_stem(doc_id).unwrap_or(doc_id);
        self.paths.archive_path(stem).is_file()
    }

    /// Relay a style document straight from the CDN, without persisting it.
    async fn relay_remote(&self, rel: &Path) -> Result<Asset, AssetError> {
        let rel_str = rel.to_str().ok_or(AssetError::NotFound)?;
        match self.remote.fetch_document(rel_str).await {
            Ok(bytes) => Ok(Asset {
                bytes,
                content_type: content_type_for(rel),
                no_store: true,
            }),
            Err(e) => {
                tracing::debug!(path = %rel.display(), error = %e, "remote relay failed");
                Err(AssetError::NotFound)
            }
        }
    }
}

/// Normalize a request path to a safe relative path in the live tree.
///
/// The legacy `/style.json` suffix maps onto the flat file naming the live
/// tree actually uses (`roadmap/style.json` → `roadmap.json`). Absolute and
/// parent-traversing paths are rejected.
fn normalize(request_path: &str) -> Option<PathBuf> {
    let repaired = request_path.trim_start_matches('/').replace("/style.json", ".json");
    if repaired.is_empty() {
        return None;
    }

    let rel = PathBuf::from(&repaired);
    let safe = rel
        .components()
        .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
    safe.then_some(rel)
}

fn is_style_doc(rel: &Path) -> bool {
    rel.to_str().is_some_and(|s| s.contains("styles/"))
}

fn is_tile_source_doc(rel: &Path) -> bool {
    rel.to_str()
        .is_some_and(|s| s.starts_with("data/") && s.ends_with(".json"))
}

fn content_type_for(rel: &Path) -> &'static str {
    match rel.extension().and_then(|ext| ext.to_str()) {
        Some("json") => "application/json",
        Some("pbf") => "application/x-protobuf",
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        _ => "application/octet-stream",
    }
}
