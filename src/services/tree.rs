//! Element tree construction.
//!
//! Walks the DOM below `<body>` in document order and persists one element
//! per non-inline node. `<body>` itself is never stored: its children attach
//! to whatever parent the walk was handed.

use scraper::ElementRef;

use crate::error::Result;
use crate::models::{ElementId, ElementType, NewElement, PageElement, PageId};
use crate::services::classifier::{
    Classification, Classifier, extract_content, is_inline, split_attributes,
};
use crate::storage::PageStore;

/// Builds the element forest of one page.
pub struct TreeBuilder<'a, S: PageStore + ?Sized> {
    store: &'a mut S,
    classifier: Classifier<'a>,
    page_id: PageId,
    created: usize,
}

impl<'a, S: PageStore + ?Sized> TreeBuilder<'a, S> {
    pub fn new(store: &'a mut S, classifier: Classifier<'a>, page_id: PageId) -> Self {
        Self {
            store,
            classifier,
            page_id,
            created: 0,
        }
    }

    /// Number of elements persisted so far.
    pub fn created(&self) -> usize {
        self.created
    }

    /// Persist the tree rooted at `root` and return the page's new roots.
    ///
    /// When `root` is `<body>` its children become the roots.
    pub fn build(&mut self, root: ElementRef<'_>) -> Result<Vec<PageElement>> {
        let mut roots = Vec::new();
        let mut order = 0;
        self.attach(root, None, None, &mut order, Some(&mut roots))?;
        log::info!("Created {} element(s) for page {}", self.created, self.page_id);
        Ok(roots)
    }

    /// Attach every eligible child of `node` under `parent`.
    ///
    /// Elements created at this level are pushed to `roots` when given.
    fn attach_children(
        &mut self,
        node: ElementRef<'_>,
        parent: Option<ElementId>,
        parent_type: Option<ElementType>,
        order: &mut u32,
        mut roots: Option<&mut Vec<PageElement>>,
    ) -> Result<()> {
        for child in node.children().filter_map(ElementRef::wrap) {
            if is_inline(child) {
                continue;
            }
            let level = roots.as_mut().map(|r| &mut **r);
            self.attach(child, parent, parent_type, order, level)?;
        }
        Ok(())
    }

    fn attach(
        &mut self,
        node: ElementRef<'_>,
        parent: Option<ElementId>,
        parent_type: Option<ElementType>,
        order: &mut u32,
        roots: Option<&mut Vec<PageElement>>,
    ) -> Result<()> {
        let classification = self.classifier.classify(node, parent_type);

        if classification.element_type == ElementType::Body {
            // Pass-through: children continue the caller's sibling sequence.
            return self.attach_children(node, parent, Some(ElementType::Body), order, roots);
        }

        let element = self.persist(node, classification, parent, *order)?;
        *order += 1;

        let mut child_order = 0;
        self.attach_children(
            node,
            Some(element.id),
            Some(element.element_type),
            &mut child_order,
            None,
        )?;

        if let Some(roots) = roots {
            roots.push(element);
        }
        Ok(())
    }

    fn persist(
        &mut self,
        node: ElementRef<'_>,
        classification: Classification,
        parent: Option<ElementId>,
        order: u32,
    ) -> Result<PageElement> {
        let Classification {
            element_type,
            props,
        } = classification;
        let (mut html_attrs, css_classes) = split_attributes(node);

        let image = if element_type == ElementType::Image {
            self.classifier
                .localize_image(&mut html_attrs)
                .map(|asset| asset.relative_path)
        } else {
            None
        };

        let element = self.store.insert_element(NewElement {
            page_id: self.page_id,
            element_type,
            content: extract_content(node),
            props,
            html_attrs,
            image,
            css_classes,
            order,
            parent,
        })?;
        self.created += 1;
        log::debug!("Created {element} at order {order}");
        Ok(element)
    }
}
