//! Page element records and their typed property bags.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::page::PageId;

/// Element identifier assigned by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementId(pub u64);

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// The closed classification vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementType {
    Body,
    #[serde(rename = "pageheader")]
    PageHeader,
    Header,
    Text,
    Image,
    Container,
    Grid,
    Card,
    List,
    ListItem,
    Button,
    Section,
    Form,
    Label,
    Input,
    Textarea,
}

impl ElementType {
    pub const ALL: [ElementType; 16] = [
        ElementType::Body,
        ElementType::PageHeader,
        ElementType::Header,
        ElementType::Text,
        ElementType::Image,
        ElementType::Container,
        ElementType::Grid,
        ElementType::Card,
        ElementType::List,
        ElementType::ListItem,
        ElementType::Button,
        ElementType::Section,
        ElementType::Form,
        ElementType::Label,
        ElementType::Input,
        ElementType::Textarea,
    ];

    /// Map a lowercase tag name. Unmapped tags are containers.
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "body" => ElementType::Body,
            "header" => ElementType::PageHeader,
            "h1" | "h2" | "h3" | "h4" => ElementType::Header,
            "p" | "span" => ElementType::Text,
            "img" => ElementType::Image,
            "section" => ElementType::Section,
            "ul" | "ol" => ElementType::List,
            "li" => ElementType::ListItem,
            "a" | "button" => ElementType::Button,
            "form" => ElementType::Form,
            "label" => ElementType::Label,
            "input" => ElementType::Input,
            "textarea" => ElementType::Textarea,
            _ => ElementType::Container,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ElementType::Body => "body",
            ElementType::PageHeader => "pageheader",
            ElementType::Header => "header",
            ElementType::Text => "text",
            ElementType::Image => "image",
            ElementType::Container => "container",
            ElementType::Grid => "grid",
            ElementType::Card => "card",
            ElementType::List => "list",
            ElementType::ListItem => "list_item",
            ElementType::Button => "button",
            ElementType::Section => "section",
            ElementType::Form => "form",
            ElementType::Label => "label",
            ElementType::Input => "input",
            ElementType::Textarea => "textarea",
        }
    }

    /// Human-readable label shown by the editor.
    pub fn label(&self) -> &'static str {
        match self {
            ElementType::Body => "Body (page)",
            ElementType::PageHeader => "Header (page)",
            ElementType::Header => "Header (h1-h6)",
            ElementType::Text => "Text/Paragraph",
            ElementType::Image => "Image",
            ElementType::Container => "Simple Container",
            ElementType::Grid => "Grid Container",
            ElementType::Card => "Card/Block",
            ElementType::List => "List (ul/ol)",
            ElementType::ListItem => "List Item",
            ElementType::Button => "Button/Link",
            ElementType::Section => "Section",
            ElementType::Form => "Form",
            ElementType::Label => "Label",
            ElementType::Input => "Input",
            ElementType::Textarea => "Textarea",
        }
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Type-specific properties.
///
/// One variant per element type that carries data; types without
/// properties use `Empty`. `Unstructured` holds a free-form map for records
/// written by other tools.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ElementProps {
    #[default]
    Empty,
    Header {
        level: u8,
    },
    #[serde(rename = "pageheader")]
    PageHeader {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        background_image: Option<String>,
    },
    Form {
        action: String,
        method: String,
    },
    Label {
        #[serde(rename = "for")]
        for_id: String,
    },
    Input {
        #[serde(rename = "type")]
        input_type: String,
        id: String,
        name: String,
    },
    Textarea {
        id: String,
        name: String,
    },
    Grid {
        columns: usize,
    },
    Card {
        layout: String,
    },
    List {
        ordered: bool,
    },
    Button {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        href: Option<String>,
    },
    Unstructured(Map<String, Value>),
}

impl ElementProps {
    /// Flatten to the plain key/value map consumed by templates.
    pub fn to_map(&self) -> Map<String, Value> {
        match serde_json::to_value(self) {
            Ok(Value::Object(mut map)) => {
                map.remove("kind");
                map
            }
            _ => Map::new(),
        }
    }

    /// Heading level, if these are header props.
    pub fn level(&self) -> Option<u8> {
        match self {
            ElementProps::Header { level } => Some(*level),
            ElementProps::Unstructured(map) => map
                .get("level")
                .and_then(Value::as_u64)
                .and_then(|l| u8::try_from(l).ok()),
            _ => None,
        }
    }

    /// Link target, if these are button props with a non-empty href.
    pub fn href(&self) -> Option<&str> {
        let href = match self {
            ElementProps::Button { href } => href.as_deref(),
            ElementProps::Unstructured(map) => map.get("href").and_then(Value::as_str),
            _ => None,
        };
        href.filter(|h| !h.is_empty())
    }

    pub fn ordered(&self) -> bool {
        match self {
            ElementProps::List { ordered } => *ordered,
            ElementProps::Unstructured(map) => {
                map.get("ordered").and_then(Value::as_bool).unwrap_or(false)
            }
            _ => false,
        }
    }
}

/// A stored page element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageElement {
    pub id: ElementId,
    pub page_id: PageId,
    #[serde(rename = "type")]
    pub element_type: ElementType,

    /// Raw inline markup and text
    #[serde(default)]
    pub content: String,

    #[serde(default)]
    pub props: ElementProps,

    /// DOM attributes other than `class`
    #[serde(default)]
    pub html_attrs: BTreeMap<String, String>,

    /// Localized image, relative to the media root
    #[serde(default)]
    pub image: Option<String>,

    /// Space-joined class list
    #[serde(default)]
    pub css_classes: String,

    /// Position among siblings
    pub order: u32,

    /// `None` for root elements
    pub parent: Option<ElementId>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PageElement {
    /// HTML tag used when rendering this element.
    pub fn tag(&self) -> String {
        match self.element_type {
            ElementType::Header => format!("h{}", self.props.level().unwrap_or(2)),
            ElementType::Text => "p".into(),
            ElementType::Image => "img".into(),
            ElementType::List => {
                if self.props.ordered() {
                    "ol".into()
                } else {
                    "ul".into()
                }
            }
            ElementType::Button => {
                if self.props.href().is_some() {
                    "a".into()
                } else {
                    "button".into()
                }
            }
            ElementType::Section => "section".into(),
            ElementType::PageHeader => "header".into(),
            ElementType::ListItem => "li".into(),
            ElementType::Form => "form".into(),
            ElementType::Label => "label".into(),
            ElementType::Input => "input".into(),
            ElementType::Textarea => "textarea".into(),
            _ => "div".into(),
        }
    }

    /// Public URL of the localized image.
    pub fn image_url(&self) -> Option<String> {
        self.image.as_ref().map(|path| format!("/media/{path}"))
    }

    /// Props with per-type defaults filled in for rendering.
    pub fn render_props(&self) -> Map<String, Value> {
        let mut props = self.props.to_map();
        match self.element_type {
            ElementType::Image => {
                let src = self
                    .image_url()
                    .or_else(|| self.html_attrs.get("src").cloned())
                    .unwrap_or_default();
                let alt = self.html_attrs.get("alt").cloned().unwrap_or_default();
                props.insert("src".into(), Value::String(src));
                props.insert("alt".into(), Value::String(alt));
            }
            ElementType::List => {
                props.insert("ordered".into(), Value::Bool(self.props.ordered()));
            }
            ElementType::Grid => {
                props.entry("columns").or_insert(Value::from(1));
            }
            ElementType::Card => {
                props
                    .entry("layout")
                    .or_insert(Value::String("vertical".into()));
            }
            _ => {}
        }
        props
    }
}

impl fmt::Display for PageElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}) id {}", self.tag(), self.element_type, self.id)
    }
}

/// Fields supplied when creating an element.
#[derive(Debug, Clone)]
pub struct NewElement {
    pub page_id: PageId,
    pub element_type: ElementType,
    pub content: String,
    pub props: ElementProps,
    pub html_attrs: BTreeMap<String, String>,
    pub image: Option<String>,
    pub css_classes: String,
    pub order: u32,
    pub parent: Option<ElementId>,
}
