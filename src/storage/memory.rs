//! In-memory page store.
//!
//! Elements are kept as an adjacency list keyed by id, with an index of
//! children by parent. The index is derived data: it is not serialized and
//! is rebuilt when a snapshot is loaded.

use std::collections::{BTreeMap, HashMap};

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::models::{ElementId, NewElement, NewPage, Page, PageElement, PageId};
use crate::storage::PageStore;

/// Where an element hangs in its page's forest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum ParentKey {
    Root(PageId),
    Element(ElementId),
}

impl ParentKey {
    fn of(page_id: PageId, parent: Option<ElementId>) -> Self {
        match parent {
            Some(id) => ParentKey::Element(id),
            None => ParentKey::Root(page_id),
        }
    }
}

/// Serialized form of a store.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Snapshot {
    pub next_page_id: u64,
    pub next_element_id: u64,
    pub pages: Vec<Page>,
    pub elements: Vec<PageElement>,
}

/// In-memory page store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    next_page_id: u64,
    next_element_id: u64,
    pages: BTreeMap<PageId, Page>,
    elements: BTreeMap<ElementId, PageElement>,
    children: HashMap<ParentKey, Vec<ElementId>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a store from a snapshot.
    pub fn from_snapshot(snapshot: Snapshot) -> Self {
        let mut store = Self {
            next_page_id: snapshot.next_page_id,
            next_element_id: snapshot.next_element_id,
            pages: snapshot.pages.into_iter().map(|p| (p.id, p)).collect(),
            elements: snapshot.elements.into_iter().map(|e| (e.id, e)).collect(),
            children: HashMap::new(),
        };
        // Guard against hand-edited snapshots with stale counters.
        let max_page = store.pages.keys().map(|id| id.0).max().unwrap_or(0);
        let max_element = store.elements.keys().map(|id| id.0).max().unwrap_or(0);
        store.next_page_id = store.next_page_id.max(max_page);
        store.next_element_id = store.next_element_id.max(max_element);
        store.reindex();
        store
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            next_page_id: self.next_page_id,
            next_element_id: self.next_element_id,
            pages: self.pages.values().cloned().collect(),
            elements: self.elements.values().cloned().collect(),
        }
    }

    fn reindex(&mut self) {
        self.children.clear();
        for element in self.elements.values() {
            self.children
                .entry(ParentKey::of(element.page_id, element.parent))
                .or_default()
                .push(element.id);
        }
    }

    fn ensure_unique_slug(&self, slug: &str, except: Option<PageId>) -> Result<()> {
        let taken = self
            .pages
            .values()
            .any(|p| p.slug == slug && Some(p.id) != except);
        if taken {
            return Err(AppError::storage(format!(
                "a page with slug '{slug}' already exists"
            )));
        }
        Ok(())
    }

    fn descendants(&self, id: ElementId) -> Vec<ElementId> {
        let mut found = vec![id];
        let mut cursor = 0;
        while cursor < found.len() {
            if let Some(kids) = self.children.get(&ParentKey::Element(found[cursor])) {
                found.extend(kids.iter().copied());
            }
            cursor += 1;
        }
        found
    }
}

impl PageStore for MemoryStore {
    fn insert_page(&mut self, page: NewPage) -> Result<Page> {
        self.ensure_unique_slug(&page.slug, None)?;

        self.next_page_id += 1;
        let now = Utc::now();
        let record = Page {
            id: PageId(self.next_page_id),
            title: page.title,
            slug: page.slug,
            template: page.template,
            external_url: page.external_url,
            css_files: Vec::new(),
            created_at: now,
            updated_at: now,
        };
        self.pages.insert(record.id, record.clone());
        Ok(record)
    }

    fn page(&self, id: PageId) -> Result<Option<Page>> {
        Ok(self.pages.get(&id).cloned())
    }

    fn page_by_slug(&self, slug: &str) -> Result<Option<Page>> {
        Ok(self.pages.values().find(|p| p.slug == slug).cloned())
    }

    fn pages(&self) -> Result<Vec<Page>> {
        Ok(self.pages.values().cloned().collect())
    }

    fn update_page(&mut self, page: &Page) -> Result<Page> {
        self.ensure_unique_slug(&page.slug, Some(page.id))?;
        let stored = self
            .pages
            .get_mut(&page.id)
            .ok_or_else(|| AppError::not_found(format!("page {}", page.id)))?;

        let created_at = stored.created_at;
        *stored = Page {
            created_at,
            updated_at: Utc::now(),
            ..page.clone()
        };
        Ok(stored.clone())
    }

    fn delete_page(&mut self, id: PageId) -> Result<()> {
        if !self.pages.contains_key(&id) {
            return Err(AppError::not_found(format!("page {id}")));
        }
        self.delete_elements(id)?;
        self.pages.remove(&id);
        Ok(())
    }

    fn insert_element(&mut self, element: NewElement) -> Result<PageElement> {
        if !self.pages.contains_key(&element.page_id) {
            return Err(AppError::not_found(format!("page {}", element.page_id)));
        }

        if let Some(parent_id) = element.parent {
            match self.elements.get(&parent_id) {
                Some(parent) if parent.page_id == element.page_id => {}
                Some(_) => {
                    return Err(AppError::storage(format!(
                        "parent {parent_id} belongs to another page"
                    )));
                }
                None => return Err(AppError::not_found(format!("parent element {parent_id}"))),
            }
        }

        let key = ParentKey::of(element.page_id, element.parent);
        let order_taken = self.children.get(&key).is_some_and(|siblings| {
            siblings
                .iter()
                .filter_map(|id| self.elements.get(id))
                .any(|sibling| sibling.order == element.order)
        });
        if order_taken {
            return Err(AppError::storage(format!(
                "order {} is already used among siblings",
                element.order
            )));
        }

        self.next_element_id += 1;
        let now = Utc::now();
        let record = PageElement {
            id: ElementId(self.next_element_id),
            page_id: element.page_id,
            element_type: element.element_type,
            content: element.content,
            props: element.props,
            html_attrs: element.html_attrs,
            image: element.image,
            css_classes: element.css_classes,
            order: element.order,
            parent: element.parent,
            created_at: now,
            updated_at: now,
        };

        self.children.entry(key).or_default().push(record.id);
        self.elements.insert(record.id, record.clone());
        Ok(record)
    }

    fn element(&self, id: ElementId) -> Result<Option<PageElement>> {
        Ok(self.elements.get(&id).cloned())
    }

    fn update_element(&mut self, element: &PageElement) -> Result<PageElement> {
        let stored = self
            .elements
            .get_mut(&element.id)
            .ok_or_else(|| AppError::not_found(format!("element {}", element.id)))?;

        stored.element_type = element.element_type;
        stored.content = element.content.clone();
        stored.props = element.props.clone();
        stored.html_attrs = element.html_attrs.clone();
        stored.image = element.image.clone();
        stored.css_classes = element.css_classes.clone();
        stored.updated_at = Utc::now();
        Ok(stored.clone())
    }

    fn children(&self, page_id: PageId, parent: Option<ElementId>) -> Result<Vec<PageElement>> {
        let mut kids: Vec<PageElement> = self
            .children
            .get(&ParentKey::of(page_id, parent))
            .map(|ids| {
                ids.iter()
                    .filter_map(|id| self.elements.get(id))
                    .filter(|e| e.page_id == page_id)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        kids.sort_by_key(|e| (e.order, e.id));
        Ok(kids)
    }

    fn delete_subtree(&mut self, id: ElementId) -> Result<usize> {
        let Some(root) = self.elements.get(&id) else {
            return Err(AppError::not_found(format!("element {id}")));
        };

        let key = ParentKey::of(root.page_id, root.parent);
        if let Some(siblings) = self.children.get_mut(&key) {
            siblings.retain(|sibling| *sibling != id);
        }

        let doomed = self.descendants(id);
        for element_id in &doomed {
            self.elements.remove(element_id);
            self.children.remove(&ParentKey::Element(*element_id));
        }
        Ok(doomed.len())
    }

    fn delete_elements(&mut self, page_id: PageId) -> Result<usize> {
        let before = self.elements.len();
        self.elements.retain(|_, e| e.page_id != page_id);
        let removed = before - self.elements.len();
        if removed > 0 {
            self.reindex();
        }
        Ok(removed)
    }

    fn element_count(&self, page_id: PageId) -> Result<usize> {
        Ok(self
            .elements
            .values()
            .filter(|e| e.page_id == page_id)
            .count())
    }
}
