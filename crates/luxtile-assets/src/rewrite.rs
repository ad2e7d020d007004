//! Substitution rules for embedded URL templates.
//!
//! Three named rules for style documents and one for tile-source documents.
//! All are literal replacements except the `mbtiles://{id}` placeholder,
//! which is the single parameterized pattern. The rules are pure: callers
//! inject existence predicates, so no rule touches the filesystem.

use std::sync::LazyLock;

use regex::{Captures, Regex};

/// Source-archive placeholder in style documents: `mbtiles://{id}`.
static MBTILES_PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"mbtiles://\{([^{}]+)\}").expect("placeholder pattern"));

/// Base URLs substituted into rewritten documents.
#[derive(Debug, Clone)]
pub struct RewriteContext {
    local_base: String,
    remote_base: String,
}

impl RewriteContext {
    /// Create a context; trailing slashes on either base are dropped.
    pub fn new(local_base: impl Into<String>, remote_base: impl Into<String>) -> Self {
        let local_base: String = local_base.into();
        let remote_base: String = remote_base.into();
        Self {
            local_base: local_base.trim_end_matches('/').to_string(),
            remote_base: remote_base.trim_end_matches('/').to_string(),
        }
    }

    /// The local server base, e.g. `http://127.0.0.1:8766`.
    pub fn local_base(&self) -> &str {
        &self.local_base
    }

    /// The remote CDN base.
    pub fn remote_base(&self) -> &str {
        &self.remote_base
    }
}

/// Rewrite a style document.
///
/// - `mbtiles://{id}` becomes the local data-document URL when
///   `data_doc_exists(id)` holds, the canonical remote URL otherwise.
/// - The glyphs template and remote sprite URLs become local equivalents
///   unconditionally.
pub fn rewrite_style(
    text: &str,
    ctx: &RewriteContext,
    data_doc_exists: &dyn Fn(&str) -> bool,
) -> String {
    let text = MBTILES_PLACEHOLDER.replace_all(text, |caps: &Captures<'_>| {
        let id = &caps[1];
        if data_doc_exists(id) {
            format!("{}/static/data/{id}.json", ctx.local_base)
        } else {
            format!("{}/data/{id}.json", ctx.remote_base)
        }
    });

    // Glyphs: the template is relative in the stored style, absolute locally.
    let text = text.replace(
        "\"{fontstack}/{range}.pbf",
        &format!("\"{}/static/fonts/{{fontstack}}/{{range}}.pbf", ctx.local_base),
    );

    // Sprites: point the remote prefix at the local static tree.
    text.replace(
        &format!("{}/sprites/", ctx.remote_base),
        &format!("{}/static/sprites/", ctx.local_base),
    )
}

/// Rewrite a tile-source document.
///
/// The remote tile template for `doc_id` is redirected to the local tile
/// endpoint only when the corresponding archive is present; otherwise the
/// document keeps pointing at the remote service.
pub fn rewrite_tile_source(
    text: &str,
    ctx: &RewriteContext,
    doc_id: &str,
    archive_exists: bool,
) -> String {
    if !archive_exists {
        return text.to_string();
    }

    let template = format!("{}/data/{doc_id}/{{z}}/{{x}}/{{y}}.pbf", ctx.remote_base);
    let local = format!(
        "{}/mbtiles?layer={doc_id}&z={{z}}&x={{x}}&y={{y}}&format=pbf",
        ctx.local_base
    );
    text.replace(&template, &local)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> RewriteContext {
        RewriteContext::new("http://127.0.0.1:8766", "https://vectortiles.geoportail.lu/")
    }

    #[test]
    fn trailing_slash_is_normalized() {
        let ctx = ctx();
        assert_eq!(ctx.remote_base(), "https://vectortiles.geoportail.lu");
        assert_eq!(ctx.local_base(), "http://127.0.0.1:8766");
    }

    #[test]
    fn placeholder_resolves_locally_when_data_doc_exists() {
        let style = r#"{"sources":{"omt":{"url":"mbtiles://{omt-geoportail}"}}}"#;
        let out = rewrite_style(style, &ctx(), &|id| id == "omt-geoportail");
        assert!(out.contains("http://127.0.0.1:8766/static/data/omt-geoportail.json"));
        assert!(!out.contains("mbtiles://"));
    }

    #[test]
    fn placeholder_falls_back_to_remote_when_absent() {
        let style = r#"{"url":"mbtiles://{omt-geoportail}"}"#;
        let out = rewrite_style(style, &ctx(), &|_| false);
        assert!(out.contains("https://vectortiles.geoportail.lu/data/omt-geoportail.json"));
    }

    #[test]
    fn each_placeholder_is_resolved_independently() {
        let style = "mbtiles://{a} mbtiles://{b}";
        let out = rewrite_style(style, &ctx(), &|id| id == "a");
        assert!(out.contains("http://127.0.0.1:8766/static/data/a.json"));
        assert!(out.contains("https://vectortiles.geoportail.lu/data/b.json"));
    }

    #[test]
    fn glyphs_template_is_localized_unconditionally() {
        let style = r#"{"glyphs":"{fontstack}/{range}.pbf"}"#;
        let out = rewrite_style(style, &ctx(), &|_| false);
        assert!(out.contains(
            r#""glyphs":"http://127.0.0.1:8766/static/fonts/{fontstack}/{range}.pbf"#
        ));
    }

    #[test]
    fn sprite_urls_are_localized_unconditionally() {
        let style = r#"{"sprite":"https://vectortiles.geoportail.lu/sprites/roadmap"}"#;
        let out = rewrite_style(style, &ctx(), &|_| false);
        assert!(out.contains(r#""sprite":"http://127.0.0.1:8766/static/sprites/roadmap"#));
    }

    #[test]
    fn tile_template_is_localized_only_with_an_archive() {
        let doc = r#"{"tiles":["https://vectortiles.geoportail.lu/data/omt-geoportail-lu/{z}/{x}/{y}.pbf"]}"#;

        let offline = rewrite_tile_source(doc, &ctx(), "omt-geoportail-lu", true);
        assert!(offline.contains(
            "http://127.0.0.1:8766/mbtiles?layer=omt-geoportail-lu&z={z}&x={x}&y={y}&format=pbf"
        ));

        let online = rewrite_tile_source(doc, &ctx(), "omt-geoportail-lu", false);
        assert_eq!(online, doc);
    }
}
