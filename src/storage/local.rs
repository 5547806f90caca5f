//! Local filesystem storage implementation.
//!
//! Keeps a [`MemoryStore`] in memory and persists it as a single JSON
//! snapshot. Writes are buffered until [`PageStore::commit`], which
//! replaces the file atomically.
//!
//! ## Storage Layout
//!
//! ```text
//! {data_dir}/
//! └── pages.json
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::models::{ElementId, NewElement, NewPage, Page, PageElement, PageId};
use crate::storage::PageStore;
use crate::storage::memory::{MemoryStore, Snapshot};
use crate::utils::fs::save_json;

/// Snapshot file name inside the data directory.
pub const SNAPSHOT_FILE: &str = "pages.json";

/// Local filesystem storage backend.
pub struct LocalStorage {
    path: PathBuf,
    inner: MemoryStore,
    dirty: bool,
}

impl LocalStorage {
    /// Open the store in `data_dir`, starting empty if no snapshot exists.
    pub fn open(data_dir: impl AsRef<Path>) -> Result<Self> {
        let path = data_dir.as_ref().join(SNAPSHOT_FILE);
        let inner = match fs::read(&path) {
            Ok(bytes) => {
                let snapshot: Snapshot = serde_json::from_slice(&bytes)?;
                log::debug!(
                    "Loaded {} page(s), {} element(s) from {}",
                    snapshot.pages.len(),
                    snapshot.elements.len(),
                    path.display()
                );
                MemoryStore::from_snapshot(snapshot)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => MemoryStore::new(),
            Err(e) => return Err(e.into()),
        };

        Ok(Self {
            path,
            inner,
            dirty: false,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn touched<T>(&mut self, result: Result<T>) -> Result<T> {
        if result.is_ok() {
            self.dirty = true;
        }
        result
    }
}

impl PageStore for LocalStorage {
    fn insert_page(&mut self, page: NewPage) -> Result<Page> {
        let result = self.inner.insert_page(page);
        self.touched(result)
    }

    fn page(&self, id: PageId) -> Result<Option<Page>> {
        self.inner.page(id)
    }

    fn page_by_slug(&self, slug: &str) -> Result<Option<Page>> {
        self.inner.page_by_slug(slug)
    }

    fn pages(&self) -> Result<Vec<Page>> {
        self.inner.pages()
    }

    fn update_page(&mut self, page: &Page) -> Result<Page> {
        let result = self.inner.update_page(page);
        self.touched(result)
    }

    fn delete_page(&mut self, id: PageId) -> Result<()> {
        let result = self.inner.delete_page(id);
        self.touched(result)
    }

    fn insert_element(&mut self, element: NewElement) -> Result<PageElement> {
        let result = self.inner.insert_element(element);
        self.touched(result)
    }

    fn element(&self, id: ElementId) -> Result<Option<PageElement>> {
        self.inner.element(id)
    }

    fn update_element(&mut self, element: &PageElement) -> Result<PageElement> {
        let result = self.inner.update_element(element);
        self.touched(result)
    }

    fn children(&self, page_id: PageId, parent: Option<ElementId>) -> Result<Vec<PageElement>> {
        self.inner.children(page_id, parent)
    }

    fn delete_subtree(&mut self, id: ElementId) -> Result<usize> {
        let result = self.inner.delete_subtree(id);
        self.touched(result)
    }

    fn delete_elements(&mut self, page_id: PageId) -> Result<usize> {
        let result = self.inner.delete_elements(page_id);
        self.touched(result)
    }

    fn element_count(&self, page_id: PageId) -> Result<usize> {
        self.inner.element_count(page_id)
    }

    fn commit(&mut self) -> Result<()> {
        if !self.dirty {
            return Ok(());
        }
        save_json(&self.path, &self.inner.snapshot())?;
        self.dirty = false;
        log::debug!("Committed page store to {}", self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ElementProps, ElementType};
    use tempfile::TempDir;

    fn new_page(slug: &str) -> NewPage {
        NewPage {
            title: "Home".to_string(),
            slug: slug.to_string(),
            template: "landing_basic.html".to_string(),
            external_url: Some("https://example.com/".to_string()),
        }
    }

    #[test]
    fn test_open_empty_dir() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::open(tmp.path()).unwrap();
        assert!(storage.pages().unwrap().is_empty());
        assert!(!storage.path().exists());
    }

    #[test]
    fn test_commit_and_reopen() {
        let tmp = TempDir::new().unwrap();
        let mut storage = LocalStorage::open(tmp.path()).unwrap();
        let page = storage.insert_page(new_page("home")).unwrap();
        storage
            .insert_element(NewElement {
                page_id: page.id,
                element_type: ElementType::Grid,
                content: String::new(),
                props: ElementProps::Grid { columns: 2 },
                html_attrs: Default::default(),
                image: None,
                css_classes: "row".to_string(),
                order: 0,
                parent: None,
            })
            .unwrap();
        storage.commit().unwrap();

        let reopened = LocalStorage::open(tmp.path()).unwrap();
        let page = reopened.page_by_slug("home").unwrap().unwrap();
        let roots = reopened.roots(page.id).unwrap();
        assert_eq!(roots.len(), 1);
        assert_eq!(roots[0].props, ElementProps::Grid { columns: 2 });
    }

    #[test]
    fn test_uncommitted_writes_are_not_persisted() {
        let tmp = TempDir::new().unwrap();
        let mut storage = LocalStorage::open(tmp.path()).unwrap();
        storage.insert_page(new_page("home")).unwrap();
        drop(storage);

        let reopened = LocalStorage::open(tmp.path()).unwrap();
        assert!(reopened.page_by_slug("home").unwrap().is_none());
    }

    #[test]
    fn test_ids_continue_after_reopen() {
        let tmp = TempDir::new().unwrap();
        let mut storage = LocalStorage::open(tmp.path()).unwrap();
        let first = storage.insert_page(new_page("a")).unwrap();
        storage.commit().unwrap();

        let mut reopened = LocalStorage::open(tmp.path()).unwrap();
        let second = reopened.insert_page(new_page("b")).unwrap();
        assert!(second.id > first.id);
    }
}
