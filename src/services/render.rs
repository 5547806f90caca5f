//! Rendering of stored pages back to HTML.

use std::collections::BTreeMap;

use serde_json::Value;

use crate::error::Result;
use crate::models::{ElementType, Page, PageElement};
use crate::storage::PageStore;

/// Tags rendered without a closing tag.
const VOID_TAGS: &[&str] = &["img", "input"];

/// Render `page` and its element forest as a complete HTML document.
pub fn render_page<S: PageStore + ?Sized>(store: &S, page: &Page) -> Result<String> {
    let mut html = String::from("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n");
    html.push_str(&format!("<title>{}</title>\n", escape(&page.title)));
    for css in &page.css_files {
        html.push_str(&format!(
            "<link rel=\"stylesheet\" href=\"{}\">\n",
            escape(&stylesheet_href(css))
        ));
    }
    html.push_str("</head>\n");
    html.push_str(&format!(
        "<body data-template=\"{}\">\n",
        escape(&page.template)
    ));

    for root in store.roots(page.id)? {
        render_element(store, &root, &mut html)?;
        html.push('\n');
    }

    html.push_str("</body>\n</html>\n");
    Ok(html)
}

/// Render one element and its descendants.
pub fn render_element<S: PageStore + ?Sized>(
    store: &S,
    element: &PageElement,
    out: &mut String,
) -> Result<()> {
    let tag = element.tag();
    out.push('<');
    out.push_str(&tag);
    for (name, value) in attributes(element) {
        out.push_str(&format!(" {}=\"{}\"", name, escape(&value)));
    }
    out.push('>');

    if VOID_TAGS.contains(&tag.as_str()) {
        return Ok(());
    }

    out.push_str(&element.content);
    for child in store.children(element.page_id, Some(element.id))? {
        render_element(store, &child, out)?;
    }
    out.push_str(&format!("</{tag}>"));
    Ok(())
}

/// Stored stylesheet reference to a servable href.
fn stylesheet_href(reference: &str) -> String {
    let absolute = ["http://", "https://", "//"]
        .iter()
        .any(|scheme| reference.starts_with(scheme));
    if absolute {
        reference.to_string()
    } else {
        format!("/static/{}", reference.trim_start_matches('/'))
    }
}

/// Attributes emitted on the element's tag, `class` first.
fn attributes(element: &PageElement) -> Vec<(String, String)> {
    let mut attrs: BTreeMap<String, String> = element.html_attrs.clone();
    let props = element.render_props();
    let prop = |key: &str| props.get(key).and_then(Value::as_str).map(str::to_string);

    match element.element_type {
        ElementType::Image => {
            attrs.insert("src".into(), prop("src").unwrap_or_default());
            attrs.insert("alt".into(), prop("alt").unwrap_or_default());
        }
        ElementType::Button => {
            if let Some(href) = element.props.href() {
                attrs.insert("href".into(), href.to_string());
            }
        }
        ElementType::PageHeader => {
            if let Some(background) = prop("background_image") {
                let rule = format!("background-image: url('{background}')");
                let style = match attrs.get("style").map(|s| s.trim().trim_end_matches(';')) {
                    Some(existing) if !existing.is_empty() => format!("{existing}; {rule}"),
                    _ => rule,
                };
                attrs.insert("style".into(), style);
            }
        }
        _ => {}
    }

    let mut out = Vec::with_capacity(attrs.len() + 1);
    if !element.css_classes.is_empty() {
        out.push(("class".to_string(), element.css_classes.clone()));
    }
    out.extend(attrs);
    out
}

/// Escape text for use in HTML text and attribute values.
pub fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ElementProps, NewElement, NewPage};
    use crate::storage::MemoryStore;

    fn setup() -> (MemoryStore, Page) {
        let mut store = MemoryStore::new();
        let mut page = store
            .insert_page(NewPage {
                title: "Acme & Co".into(),
                slug: "acme-co".into(),
                template: "landing_basic.html".into(),
                external_url: None,
            })
            .unwrap();
        page.css_files = vec![
            "page_acme-co/css/site.css".into(),
            "https://cdn.other.com/s.css".into(),
        ];
        let page = store.update_page(&page).unwrap();
        (store, page)
    }

    fn element(page: &Page, element_type: ElementType, props: ElementProps, order: u32) -> NewElement {
        NewElement {
            page_id: page.id,
            element_type,
            content: String::new(),
            props,
            html_attrs: BTreeMap::new(),
            image: None,
            css_classes: String::new(),
            order,
            parent: None,
        }
    }

    #[test]
    fn test_document_head() {
        let (store, page) = setup();
        let html = render_page(&store, &page).unwrap();

        assert!(html.contains("<title>Acme &amp; Co</title>"));
        assert!(html.contains(r#"<link rel="stylesheet" href="/static/page_acme-co/css/site.css">"#));
        assert!(html.contains(r#"<link rel="stylesheet" href="https://cdn.other.com/s.css">"#));
        assert!(html.contains(r#"<body data-template="landing_basic.html">"#));
    }

    #[test]
    fn test_nested_elements_in_order() {
        let (mut store, page) = setup();
        let grid = store
            .insert_element(NewElement {
                css_classes: "row".into(),
                ..element(&page, ElementType::Grid, ElementProps::Grid { columns: 2 }, 0)
            })
            .unwrap();
        for (order, text) in [(1, "B"), (0, "A")] {
            store
                .insert_element(NewElement {
                    content: text.into(),
                    parent: Some(grid.id),
                    ..element(&page, ElementType::Container, ElementProps::Empty, order)
                })
                .unwrap();
        }
        store
            .insert_element(NewElement {
                content: "Title <em>here</em>".into(),
                ..element(&page, ElementType::Header, ElementProps::Header { level: 3 }, 1)
            })
            .unwrap();

        let html = render_page(&store, &page).unwrap();
        assert!(html.contains(r#"<div class="row"><div>A</div><div>B</div></div>"#));
        assert!(html.contains("<h3>Title <em>here</em></h3>"));
        assert!(html.find("class=\"row\"").unwrap() < html.find("<h3>").unwrap());
    }

    #[test]
    fn test_void_and_special_tags() {
        let (mut store, page) = setup();
        store
            .insert_element(NewElement {
                image: Some("page_acme-co/images/logo.png".into()),
                html_attrs: BTreeMap::from([
                    ("src".into(), "https://acme.example/logo.png".into()),
                    ("alt".into(), "Logo \"A\"".into()),
                ]),
                ..element(&page, ElementType::Image, ElementProps::Empty, 0)
            })
            .unwrap();
        store
            .insert_element(NewElement {
                content: "About".into(),
                ..element(
                    &page,
                    ElementType::Button,
                    ElementProps::Button {
                        href: Some("/about".into()),
                    },
                    1,
                )
            })
            .unwrap();
        store
            .insert_element(element(
                &page,
                ElementType::PageHeader,
                ElementProps::PageHeader {
                    background_image: Some("/media/page_acme-co/images/hero.jpg".into()),
                },
                2,
            ))
            .unwrap();

        let html = render_page(&store, &page).unwrap();
        assert!(html.contains(
            r#"<img alt="Logo &quot;A&quot;" src="/media/page_acme-co/images/logo.png">"#
        ));
        assert!(!html.contains("</img>"));
        assert!(html.contains(r#"<a href="/about">About</a>"#));
        assert!(html.contains(
            r#"<header style="background-image: url(&#x27;/media/page_acme-co/images/hero.jpg&#x27;)"></header>"#
        ));
    }

    #[test]
    fn test_button_without_href() {
        let (mut store, page) = setup();
        store
            .insert_element(NewElement {
                content: "Go".into(),
                ..element(&page, ElementType::Button, ElementProps::Button { href: Some(String::new()) }, 0)
            })
            .unwrap();

        let html = render_page(&store, &page).unwrap();
        assert!(html.contains("<button>Go</button>"));
    }
}
