//! Element editing operations.
//!
//! Each operation is keyed by element id and answers with a small
//! serializable envelope, ready to be returned as JSON by a web layer.

use serde::Serialize;

use crate::error::{AppError, Result};
use crate::models::{ElementId, ElementType, PageElement};
use crate::services::render::escape;
use crate::storage::PageStore;

/// Raw content of an element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContentEnvelope {
    pub has_content: bool,
    pub content: String,
}

/// Outcome of a mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SuccessEnvelope {
    pub success: bool,
}

impl SuccessEnvelope {
    fn ok() -> Self {
        Self { success: true }
    }
}

/// Configuration form of an element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfigEnvelope {
    pub id: ElementId,
    #[serde(rename = "type")]
    pub element_type: ElementType,
    pub form_html: String,
}

/// Editing surface over a [`PageStore`].
pub struct ElementEditor<'a, S: PageStore + ?Sized> {
    store: &'a mut S,
}

impl<'a, S: PageStore + ?Sized> ElementEditor<'a, S> {
    pub fn new(store: &'a mut S) -> Self {
        Self { store }
    }

    fn load(&self, id: ElementId) -> Result<PageElement> {
        self.store
            .element(id)?
            .ok_or_else(|| AppError::not_found(format!("element {id}")))
    }

    /// Raw content of the element. Any non-empty content counts as present,
    /// whitespace included.
    pub fn content(&self, id: ElementId) -> Result<ContentEnvelope> {
        let element = self.load(id)?;
        Ok(ContentEnvelope {
            has_content: !element.content.is_empty(),
            content: element.content,
        })
    }

    pub fn update_content(&mut self, id: ElementId, content: &str) -> Result<SuccessEnvelope> {
        let mut element = self.load(id)?;
        element.content = content.to_string();
        self.store.update_element(&element)?;
        self.store.commit()?;
        log::info!("Updated content of element {id}");
        Ok(SuccessEnvelope::ok())
    }

    pub fn config(&self, id: ElementId) -> Result<ConfigEnvelope> {
        let element = self.load(id)?;
        Ok(ConfigEnvelope {
            id: element.id,
            element_type: element.element_type,
            form_html: config_form(&element),
        })
    }

    pub fn update_config(&mut self, id: ElementId, css_classes: &str) -> Result<SuccessEnvelope> {
        let mut element = self.load(id)?;
        element.css_classes = css_classes.split_whitespace().collect::<Vec<_>>().join(" ");
        self.store.update_element(&element)?;
        self.store.commit()?;
        log::info!("Updated classes of element {id}");
        Ok(SuccessEnvelope::ok())
    }

    /// Delete the element together with its descendants.
    pub fn delete(&mut self, id: ElementId) -> Result<SuccessEnvelope> {
        self.load(id)?;
        let removed = self.store.delete_subtree(id)?;
        self.store.commit()?;
        log::info!("Deleted element {id} ({removed} element(s))");
        Ok(SuccessEnvelope::ok())
    }
}

fn config_form(element: &PageElement) -> String {
    format!(
        concat!(
            "<form class=\"element-config\" data-element-id=\"{id}\">",
            "<p class=\"element-type\">{label}</p>",
            "<label for=\"css_classes_{id}\">CSS classes</label>",
            "<input type=\"text\" id=\"css_classes_{id}\" name=\"css_classes\" value=\"{classes}\">",
            "</form>"
        ),
        id = element.id,
        label = escape(element.element_type.label()),
        classes = escape(&element.css_classes),
    )
}
