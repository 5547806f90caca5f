//! Storage abstractions for pages and their element trees.
//!
//! Elements form a forest per page: each element points at its parent (or
//! at nothing, for roots) and siblings are ordered by an explicit `order`
//! field.
//!
//! ## Local layout
//!
//! ```text
//! {data_dir}/
//! └── pages.json    # pages + elements snapshot
//! ```

pub mod local;
pub mod memory;

use crate::error::Result;
use crate::models::{ElementId, NewElement, NewPage, Page, PageElement, PageId};

// Re-export for convenience
pub use local::LocalStorage;
pub use memory::MemoryStore;

/// Trait for page/element storage backends.
pub trait PageStore {
    /// Create a page row. Fails if the slug is taken.
    fn insert_page(&mut self, page: NewPage) -> Result<Page>;

    fn page(&self, id: PageId) -> Result<Option<Page>>;

    fn page_by_slug(&self, slug: &str) -> Result<Option<Page>>;

    fn pages(&self) -> Result<Vec<Page>>;

    /// Replace a page row, keeping slugs unique.
    fn update_page(&mut self, page: &Page) -> Result<Page>;

    /// Delete a page row together with its element forest.
    fn delete_page(&mut self, id: PageId) -> Result<()>;

    /// Attach a new element. The parent must already exist on the same
    /// page and `order` must be free among its siblings.
    fn insert_element(&mut self, element: NewElement) -> Result<PageElement>;

    fn element(&self, id: ElementId) -> Result<Option<PageElement>>;

    /// Update the editable fields of an element. Tree position is fixed.
    fn update_element(&mut self, element: &PageElement) -> Result<PageElement>;

    /// Children of `parent` (roots when `None`) in ascending `order`.
    fn children(&self, page_id: PageId, parent: Option<ElementId>) -> Result<Vec<PageElement>>;

    /// Delete an element and all of its descendants.
    fn delete_subtree(&mut self, id: ElementId) -> Result<usize>;

    /// Delete every element of a page.
    fn delete_elements(&mut self, page_id: PageId) -> Result<usize>;

    fn element_count(&self, page_id: PageId) -> Result<usize>;

    /// Make preceding writes durable.
    fn commit(&mut self) -> Result<()> {
        Ok(())
    }

    /// Root elements of a page in ascending `order`.
    fn roots(&self, page_id: PageId) -> Result<Vec<PageElement>> {
        self.children(page_id, None)
    }
}
