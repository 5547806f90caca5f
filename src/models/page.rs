//! Imported page record.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Page identifier assigned by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PageId(pub u64);

impl fmt::Display for PageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// An imported page.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Page {
    pub id: PageId,

    /// Display title
    pub title: String,

    /// Unique, URL-safe identity derived from the title
    pub slug: String,

    /// Name of the rendering template
    pub template: String,

    /// Source page URL
    pub external_url: Option<String>,

    /// Stylesheet references in document order. Either a path relative to
    /// the static root (`page_<slug>/css/<file>`) or an absolute external URL.
    #[serde(default)]
    pub css_files: Vec<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Page {
    /// Directory name shared by the page's static and media trees.
    pub fn static_dir(&self) -> String {
        page_dir(&self.slug)
    }
}

impl fmt::Display for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.title)
    }
}

/// Fields supplied when creating a page row.
#[derive(Debug, Clone)]
pub struct NewPage {
    pub title: String,
    pub slug: String,
    pub template: String,
    pub external_url: Option<String>,
}

/// `page_<slug>`
pub fn page_dir(slug: &str) -> String {
    format!("page_{slug}")
}

/// Servable URL of an image localized for `slug`.
pub fn media_image_url(slug: &str, file_name: &str) -> String {
    format!("/media/{}/images/{}", page_dir(slug), file_name)
}
