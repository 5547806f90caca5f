//! Asset localization.
//!
//! Downloads remotely referenced assets into the page-scoped media tree
//! `<media_root>/page_<slug>/<subdir>/<file>`. Failures are soft: they are
//! logged and reported as `None`, and the caller carries on without the
//! asset.

use std::fs;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use url::Url;

use crate::error::Result;
use crate::models::page_dir;
use crate::services::fetcher::AssetFetcher;
use crate::utils::file_name;

/// Extension given to assets whose URL has no file name.
const DEFAULT_EXTENSION: &str = "jpg";

/// An asset written to local storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalAsset {
    pub file_name: String,

    /// Location on disk
    pub path: PathBuf,

    /// Path relative to the media root, e.g. `page_home/images/logo.png`
    pub relative_path: String,
}

impl LocalAsset {
    /// Servable URL, e.g. `/media/page_home/images/logo.png`.
    pub fn url(&self) -> String {
        format!("/media/{}", self.relative_path)
    }
}

/// Downloads assets into the media tree.
pub struct AssetLocalizer<'a> {
    fetcher: &'a dyn AssetFetcher,
    media_root: PathBuf,
}

impl<'a> AssetLocalizer<'a> {
    pub fn new(fetcher: &'a dyn AssetFetcher, media_root: impl Into<PathBuf>) -> Self {
        Self {
            fetcher,
            media_root: media_root.into(),
        }
    }

    pub fn fetcher(&self) -> &'a dyn AssetFetcher {
        self.fetcher
    }

    /// Fetch `url` and store it for the page `slug`.
    pub fn download(&self, url: &Url, slug: &str, subdir: &str) -> Option<LocalAsset> {
        match self.fetcher.fetch(url) {
            Ok(bytes) => self.localize(url, &bytes, slug, subdir),
            Err(failure) => {
                log::warn!("Skipping asset: {failure}");
                None
            }
        }
    }

    /// Store already-fetched bytes for the page `slug`.
    pub fn localize(&self, url: &Url, bytes: &[u8], slug: &str, subdir: &str) -> Option<LocalAsset> {
        let name = asset_file_name(url);
        let dir = self.media_root.join(page_dir(slug)).join(subdir);

        match write_asset(&dir, &name, bytes) {
            Ok(path) => {
                log::debug!("Localized {} -> {}", url, path.display());
                Some(LocalAsset {
                    relative_path: format!("{}/{}/{}", page_dir(slug), subdir, name),
                    file_name: name,
                    path,
                })
            }
            Err(e) => {
                log::warn!("Failed to store asset {url}: {e}");
                None
            }
        }
    }
}

fn write_asset(dir: &Path, name: &str, bytes: &[u8]) -> Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join(name);
    fs::write(&path, bytes)?;
    Ok(path)
}

/// File name for an asset: the URL's final path segment, or a name derived
/// from a hash of the URL when that segment is empty.
pub fn asset_file_name(url: &Url) -> String {
    let name = file_name(url);
    if !name.is_empty() {
        return name;
    }
    let digest = hex::encode(Sha256::digest(url.as_str().as_bytes()));
    format!("asset_{}.{}", &digest[..12], DEFAULT_EXTENSION)
}
