//! Stylesheet import.
//!
//! Same-origin stylesheets are downloaded, their background images are
//! localized, and the rewritten text is saved under
//! `<static_root>/page_<slug>/css/`. Cross-origin stylesheets are kept as
//! absolute URLs.

use std::path::PathBuf;
use std::sync::LazyLock;

use scraper::{Html, Selector};
use url::Url;

use crate::models::{media_image_url, page_dir};
use crate::services::assets::AssetLocalizer;
use crate::utils::css::rewrite_background_urls;
use crate::utils::fs::write_atomic;
use crate::utils::{file_name, resolve, same_host};

/// Subdirectory for stylesheets under the page's static directory.
pub const CSS_DIR: &str = "css";

/// Subdirectory for images under the page's static and media directories.
pub const IMAGES_DIR: &str = "images";

static STYLESHEET_LINKS: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("link[rel][href]").expect("link selector is valid"));

/// Imports the stylesheets linked from a page.
pub struct StylesheetImporter<'a> {
    assets: &'a AssetLocalizer<'a>,
    static_root: PathBuf,
}

impl<'a> StylesheetImporter<'a> {
    pub fn new(assets: &'a AssetLocalizer<'a>, static_root: impl Into<PathBuf>) -> Self {
        Self {
            assets,
            static_root: static_root.into(),
        }
    }

    /// Import every `<link rel="stylesheet">` of `document`, in document order.
    ///
    /// Returns page-relative paths for localized stylesheets interleaved with
    /// absolute URLs of cross-origin ones. Stylesheets that fail to download
    /// or save are left out.
    pub fn import(&self, document: &Html, page_url: &Url, slug: &str) -> Vec<String> {
        let mut css_files = Vec::new();

        for link in document.select(&STYLESHEET_LINKS) {
            let is_stylesheet = link
                .value()
                .attr("rel")
                .is_some_and(|rel| {
                    rel.split_ascii_whitespace()
                        .any(|token| token.eq_ignore_ascii_case("stylesheet"))
                });
            if !is_stylesheet {
                continue;
            }

            let href = link.value().attr("href").unwrap_or_default().trim();
            if href.is_empty() {
                continue;
            }

            let Some(css_url) = resolve(page_url, href) else {
                log::warn!("Skipping stylesheet with unresolvable href {href:?}");
                continue;
            };

            if !same_host(page_url, &css_url) {
                log::debug!("Keeping external stylesheet {css_url}");
                css_files.push(css_url.to_string());
                continue;
            }

            if let Some(reference) = self.import_stylesheet(&css_url, slug, css_files.len()) {
                css_files.push(reference);
            }
        }

        log::info!("Imported {} stylesheet reference(s)", css_files.len());
        css_files
    }

    fn import_stylesheet(&self, css_url: &Url, slug: &str, index: usize) -> Option<String> {
        let text = match self.assets.fetcher().fetch_text(css_url) {
            Ok(text) => text,
            Err(failure) => {
                log::warn!("Skipping stylesheet: {failure}");
                return None;
            }
        };

        let rewritten = self.rewrite(&text, css_url, slug);

        let mut name = file_name(css_url);
        if name.is_empty() {
            name = format!("style_{index}.css");
        }

        let path = self
            .static_root
            .join(page_dir(slug))
            .join(CSS_DIR)
            .join(&name);
        if let Err(e) = write_atomic(&path, rewritten.as_bytes()) {
            log::warn!("Failed to save stylesheet {css_url}: {e}");
            return None;
        }

        log::debug!("Saved stylesheet {} -> {}", css_url, path.display());
        Some(format!("{}/{}/{}", page_dir(slug), CSS_DIR, name))
    }

    /// Localize background images referenced by `css` and point the
    /// declarations at the media copies. References that cannot be
    /// localized are left as written.
    pub fn rewrite(&self, css: &str, css_url: &Url, slug: &str) -> String {
        rewrite_background_urls(css, |raw| {
            if raw.is_empty() || raw.starts_with("data:") {
                return None;
            }
            let asset_url = resolve(css_url, raw)?;
            let asset = self.assets.download(&asset_url, slug, IMAGES_DIR)?;
            let local = media_image_url(slug, &asset.file_name);
            log::debug!("Rewrote url({raw}) -> url({local})");
            Some(local)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::fetcher::MemoryFetcher;
    use std::fs;
    use tempfile::TempDir;

    const PAGE: &str = "https://example.com/index.html";

    fn document(head: &str) -> Html {
        Html::parse_document(&format!("<html><head>{head}</head><body></body></html>"))
    }

    #[test]
    fn test_same_origin_stylesheet_is_localized() {
        let tmp = TempDir::new().unwrap();
        let fetcher = MemoryFetcher::new()
            .with(
                "https://example.com/css/site.css",
                ".hero { background-image: url(bg.png); }",
            )
            .with("https://example.com/css/bg.png", b"PNG".to_vec());
        let assets = AssetLocalizer::new(&fetcher, tmp.path().join("media"));
        let importer = StylesheetImporter::new(&assets, tmp.path().join("static"));

        let doc = document(r#"<link rel="stylesheet" href="/css/site.css">"#);
        let page_url = Url::parse(PAGE).unwrap();
        let css_files = importer.import(&doc, &page_url, "home");

        assert_eq!(css_files, vec!["page_home/css/site.css".to_string()]);

        let saved = fs::read_to_string(tmp.path().join("static/page_home/css/site.css")).unwrap();
        assert!(saved.contains("url(/media/page_home/images/bg.png)"));
        assert!(tmp.path().join("media/page_home/images/bg.png").exists());
    }

    #[test]
    fn test_cross_origin_stylesheet_passes_through() {
        let tmp = TempDir::new().unwrap();
        let fetcher = MemoryFetcher::new();
        let assets = AssetLocalizer::new(&fetcher, tmp.path().join("media"));
        let importer = StylesheetImporter::new(&assets, tmp.path().join("static"));

        let doc = document(r#"<link rel="stylesheet" href="https://cdn.other.com/s.css">"#);
        let css_files = importer.import(&doc, &Url::parse(PAGE).unwrap(), "home");

        assert_eq!(css_files, vec!["https://cdn.other.com/s.css".to_string()]);
        assert!(fetcher.requests().is_empty());
    }

    #[test]
    fn test_order_and_failures() {
        let tmp = TempDir::new().unwrap();
        let fetcher = MemoryFetcher::new()
            .with("https://example.com/a.css", "p { color: red }")
            .with("https://example.com/styles/", "body { margin: 0 }");
        let assets = AssetLocalizer::new(&fetcher, tmp.path().join("media"));
        let importer = StylesheetImporter::new(&assets, tmp.path().join("static"));

        let doc = document(
            r#"
            <link rel="stylesheet" href="a.css">
            <link rel="icon" href="favicon.ico">
            <link rel="stylesheet" href="https://fonts.example.net/f.css">
            <link rel="stylesheet" href="missing.css">
            <link rel="alternate stylesheet" href="/styles/">
            "#,
        );
        let css_files = importer.import(&doc, &Url::parse(PAGE).unwrap(), "home");

        assert_eq!(
            css_files,
            vec![
                "page_home/css/a.css".to_string(),
                "https://fonts.example.net/f.css".to_string(),
                "page_home/css/style_2.css".to_string(),
            ]
        );
        assert!(tmp.path().join("static/page_home/css/style_2.css").exists());
    }

    #[test]
    fn test_unreachable_background_keeps_reference() {
        let tmp = TempDir::new().unwrap();
        let fetcher = MemoryFetcher::new();
        let assets = AssetLocalizer::new(&fetcher, tmp.path().join("media"));
        let importer = StylesheetImporter::new(&assets, tmp.path().join("static"));

        let css_url = Url::parse("https://example.com/css/site.css").unwrap();
        let css = ".a { background: url('../img/gone.png') }";
        assert_eq!(importer.rewrite(css, &css_url, "home"), css);
        assert_eq!(
            fetcher.requests(),
            vec!["https://example.com/img/gone.png".to_string()]
        );
    }
}
