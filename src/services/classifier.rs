//! Element classification.
//!
//! Decides the semantic type of a DOM element and extracts its typed
//! properties, content, and residual attributes.

use std::collections::BTreeMap;

use scraper::{ElementRef, Node};
use url::Url;

use crate::models::{ElementProps, ElementType, media_image_url};
use crate::services::assets::{AssetLocalizer, LocalAsset};
use crate::services::stylesheets::IMAGES_DIR;
use crate::utils::css::inline_background_image;
use crate::utils::resolve;

/// Inline tags folded into their parent's content instead of becoming
/// elements.
pub const INLINE_TAGS: &[&str] = &["span", "strong", "em", "b", "input"];

const HEADING_TAGS: &[&str] = &["h1", "h2", "h3", "h4"];

/// Class fragments marking a card-like block.
const CARD_MARKERS: &[&str] = &["card", "block", "service", "feature"];

/// Class fragments marking a grid row.
const GRID_MARKERS: &[&str] = &["row", "grid"];

/// Class fragment marking a grid column.
const COLUMN_MARKER: &str = "col";

/// Outcome of classifying one node.
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub element_type: ElementType,
    pub props: ElementProps,
}

/// Classifies nodes of one page, localizing the assets their properties
/// reference.
pub struct Classifier<'a> {
    assets: &'a AssetLocalizer<'a>,
    base_url: &'a Url,
    slug: &'a str,
}

impl<'a> Classifier<'a> {
    pub fn new(assets: &'a AssetLocalizer<'a>, base_url: &'a Url, slug: &'a str) -> Self {
        Self {
            assets,
            base_url,
            slug,
        }
    }

    /// Classify `node` given the type its parent was classified as.
    pub fn classify(&self, node: ElementRef<'_>, parent: Option<ElementType>) -> Classification {
        let element_type = element_type(node, parent);
        let props = self.extract_props(node, element_type);
        Classification {
            element_type,
            props,
        }
    }

    fn extract_props(&self, node: ElementRef<'_>, element_type: ElementType) -> ElementProps {
        let tag = node.value().name();
        let attr = |name: &str| node.value().attr(name).unwrap_or_default().to_string();

        match element_type {
            ElementType::Header => ElementProps::Header {
                level: heading_level(tag),
            },
            ElementType::PageHeader => ElementProps::PageHeader {
                background_image: self.header_background(node),
            },
            ElementType::Form => ElementProps::Form {
                action: attr("action"),
                method: node
                    .value()
                    .attr("method")
                    .unwrap_or("get")
                    .to_uppercase(),
            },
            ElementType::Label => ElementProps::Label {
                for_id: attr("for"),
            },
            ElementType::Input => ElementProps::Input {
                input_type: node.value().attr("type").unwrap_or("text").to_string(),
                id: attr("id"),
                name: attr("name"),
            },
            ElementType::Textarea => ElementProps::Textarea {
                id: attr("id"),
                name: attr("name"),
            },
            ElementType::Grid => ElementProps::Grid {
                columns: column_count(node),
            },
            ElementType::Card => ElementProps::Card {
                layout: "vertical".to_string(),
            },
            ElementType::List => ElementProps::List {
                ordered: tag == "ol",
            },
            ElementType::Button if tag == "a" => ElementProps::Button {
                href: Some(attr("href")),
            },
            _ => ElementProps::Empty,
        }
    }

    /// Localize the inline `background-image` of a page header.
    fn header_background(&self, node: ElementRef<'_>) -> Option<String> {
        let style = node.value().attr("style")?;
        let raw = inline_background_image(style)?;
        let url = resolve(self.base_url, &raw)?;
        let asset = self.assets.download(&url, self.slug, IMAGES_DIR)?;
        Some(media_image_url(self.slug, &asset.file_name))
    }

    /// Download an image's `src` and point the attribute at the local copy.
    ///
    /// On failure the attributes are left untouched.
    pub fn localize_image(&self, html_attrs: &mut BTreeMap<String, String>) -> Option<LocalAsset> {
        let src = html_attrs.get("src")?;
        let url = resolve(self.base_url, src)?;
        let asset = self.assets.download(&url, self.slug, IMAGES_DIR)?;
        html_attrs.insert(
            "src".to_string(),
            media_image_url(self.slug, &asset.file_name),
        );
        Some(asset)
    }
}

/// Decide the element type of `node`. First matching rule wins.
pub fn element_type(node: ElementRef<'_>, parent: Option<ElementType>) -> ElementType {
    let tag = node.value().name();
    if tag == "body" {
        return ElementType::Body;
    }

    let classes = class_list(node).to_lowercase();
    if GRID_MARKERS.iter().any(|marker| classes.contains(marker)) {
        return ElementType::Grid;
    }

    if CARD_MARKERS.iter().any(|marker| classes.contains(marker))
        || (tag == "div" && has_heading_and_paragraph(node))
    {
        return ElementType::Card;
    }

    if tag == "div" && parent == Some(ElementType::PageHeader) {
        return ElementType::Container;
    }

    ElementType::from_tag(tag)
}

/// Space-joined class list, in document order with repeats kept.
pub fn class_list(node: ElementRef<'_>) -> String {
    node.value()
        .attr("class")
        .map(|classes| classes.split_ascii_whitespace().collect::<Vec<_>>().join(" "))
        .unwrap_or_default()
}

/// Whether `node` is folded into its parent's content.
pub fn is_inline(node: ElementRef<'_>) -> bool {
    INLINE_TAGS.contains(&node.value().name())
}

/// Concatenate direct text children and inline-tag children, trimmed.
///
/// Text is re-escaped so the result is valid markup; comments are dropped.
pub fn extract_content(node: ElementRef<'_>) -> String {
    let mut content = String::new();
    for child in node.children() {
        match child.value() {
            Node::Text(text) => content.push_str(&escape_text(text)),
            Node::Element(_) => {
                if let Some(el) = ElementRef::wrap(child).filter(|el| is_inline(*el)) {
                    content.push_str(&el.html());
                }
            }
            _ => {}
        }
    }
    content.trim().to_string()
}

/// Split DOM attributes into residual attributes and the class string.
pub fn split_attributes(node: ElementRef<'_>) -> (BTreeMap<String, String>, String) {
    let html_attrs = node
        .value()
        .attrs()
        .filter(|(name, _)| *name != "class")
        .map(|(name, value)| (name.to_string(), value.to_string()))
        .collect();
    (html_attrs, class_list(node))
}

fn heading_level(tag: &str) -> u8 {
    tag.strip_prefix('h')
        .and_then(|level| level.parse().ok())
        .unwrap_or(2)
}

fn child_elements<'b>(node: ElementRef<'b>) -> impl Iterator<Item = ElementRef<'b>> {
    node.children().filter_map(ElementRef::wrap)
}

fn has_heading_and_paragraph(node: ElementRef<'_>) -> bool {
    let mut has_heading = false;
    let mut has_paragraph = false;
    for child in child_elements(node) {
        let tag = child.value().name();
        has_heading |= HEADING_TAGS.contains(&tag);
        has_paragraph |= tag == "p";
    }
    has_heading && has_paragraph
}

fn column_count(node: ElementRef<'_>) -> usize {
    child_elements(node)
        .filter(|child| class_list(*child).to_lowercase().contains(COLUMN_MARKER))
        .count()
        .max(1)
}

fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
