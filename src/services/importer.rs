//! Page import orchestration.
//!
//! Fetches a page, derives its identity, replaces any earlier import with
//! the same slug, then imports stylesheets and the element tree.
//!
//! A failure after the page row is created leaves that row and any files
//! written so far in place. Re-running the import cleans them up through
//! the normal eviction step.

use std::path::Path;
use std::sync::LazyLock;

use scraper::{Html, Selector};
use url::Url;

use crate::error::{AppError, Result};
use crate::models::{Config, NewPage, Page, page_dir};
use crate::services::assets::AssetLocalizer;
use crate::services::classifier::Classifier;
use crate::services::fetcher::AssetFetcher;
use crate::services::stylesheets::{CSS_DIR, IMAGES_DIR, StylesheetImporter};
use crate::services::tree::TreeBuilder;
use crate::storage::PageStore;
use crate::utils::fs::{ensure_dir, remove_dir_if_exists};
use crate::utils::host;
use crate::utils::slug::{slug_for, slugify};

static TITLE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("title").expect("title selector is valid"));

static BODY: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("body").expect("body selector is valid"));

/// Slug used when neither the title nor the host yields one.
const FALLBACK_SLUG: &str = "page";

/// Title and slug derived from a fetched document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageIdentity {
    pub title: String,
    pub slug: String,
}

/// Derive the page identity from `<title>`, falling back to the URL host.
pub fn page_identity(document: &Html, url: &Url, max_slug_length: usize) -> PageIdentity {
    let fallback = host(url).unwrap_or_else(|| url.to_string());

    let title = document
        .select(&TITLE)
        .next()
        .map(|t| t.text().collect::<String>().trim().to_string())
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| fallback.clone());

    let mut slug = slug_for(&title, max_slug_length);
    if slug.is_empty() {
        slug = slug_for(&slugify(&fallback), max_slug_length);
    }
    if slug.is_empty() {
        slug = FALLBACK_SLUG.to_string();
    }

    PageIdentity { title, slug }
}

/// Imports external pages into a [`PageStore`].
pub struct PageImporter<'a, S: PageStore + ?Sized> {
    config: &'a Config,
    fetcher: &'a dyn AssetFetcher,
    store: &'a mut S,
}

impl<'a, S: PageStore + ?Sized> PageImporter<'a, S> {
    pub fn new(config: &'a Config, fetcher: &'a dyn AssetFetcher, store: &'a mut S) -> Self {
        Self {
            config,
            fetcher,
            store,
        }
    }

    /// Import the page at `url`, replacing any earlier import of the same
    /// slug.
    pub fn import(&mut self, url: &str) -> Result<Page> {
        let url = Url::parse(url.trim())?;

        log::info!("Fetching {url}");
        let bytes = self.fetcher.fetch_page(&url)?;
        let document = Html::parse_document(&String::from_utf8_lossy(&bytes));

        let identity = page_identity(&document, &url, self.config.page.max_slug_length);
        log::info!("Importing {:?} as {}", identity.title, identity.slug);

        self.evict(&identity.slug)?;

        let mut page = self.store.insert_page(NewPage {
            title: identity.title,
            slug: identity.slug,
            template: self.config.page.default_template.clone(),
            external_url: Some(url.to_string()),
        })?;
        self.store.commit()?;

        let static_dir = self.config.paths.static_root.join(page.static_dir());
        ensure_dir(&static_dir.join(CSS_DIR))?;
        ensure_dir(&static_dir.join(IMAGES_DIR))?;

        let assets = AssetLocalizer::new(self.fetcher, &self.config.paths.media_root);

        let stylesheets = StylesheetImporter::new(&assets, &self.config.paths.static_root);
        page.css_files = stylesheets.import(&document, &url, &page.slug);
        let page = self.store.update_page(&page)?;

        let body = document
            .select(&BODY)
            .next()
            .ok_or_else(|| AppError::MissingBody(url.to_string()))?;

        let classifier = Classifier::new(&assets, &url, &page.slug);
        let mut builder = TreeBuilder::new(&mut *self.store, classifier, page.id);
        builder.build(body)?;
        let created = builder.created();

        self.store.commit()?;
        log::info!("Imported page {} ({}) with {created} element(s)", page.title, page.slug);
        Ok(page)
    }

    /// Delete the page stored under `slug`, its elements, and its files.
    fn evict(&mut self, slug: &str) -> Result<()> {
        let Some(existing) = self.store.page_by_slug(slug)? else {
            return Ok(());
        };

        log::info!("Replacing existing page {} ({})", existing.title, slug);
        let dir = page_dir(slug);
        remove_tree(&self.config.paths.static_root.join(&dir))?;
        remove_tree(&self.config.paths.media_root.join(&dir))?;

        let removed = self.store.delete_elements(existing.id)?;
        self.store.delete_page(existing.id)?;
        self.store.commit()?;
        log::debug!("Evicted page {} and {removed} element(s)", existing.id);
        Ok(())
    }
}

fn remove_tree(path: &Path) -> Result<()> {
    if remove_dir_if_exists(path)? {
        log::debug!("Removed {}", path.display());
    }
    Ok(())
}
