//! End-to-end import over canned responses.

use std::fs;

use page_import::error::AppError;
use page_import::models::{Config, ElementProps, ElementType, PageElement, PageId};
use page_import::services::{MemoryFetcher, PageImporter, render_page};
use page_import::storage::{LocalStorage, MemoryStore, PageStore};
use tempfile::TempDir;

const SITE: &str = "https://acme.example/";

const PAGE: &str = r#"<!DOCTYPE html>
<html>
<head>
  <title>Acme Landing</title>
  <link rel="stylesheet" href="/css/site.css">
  <link rel="stylesheet" href="https://cdn.other.com/s.css">
</head>
<body>
  <header style="background-image: url('/img/hero.jpg')">
    <div><h1>Welcome</h1></div>
  </header>
  <div class="row">
    <div class="col">A</div>
    <div class="col">B</div>
  </div>
  <div class="card-item"><h3>Fast</h3><p>Really <em>fast</em>.</p><div><img src="/img/fast.png"></div></div>
  <img src="logo.png" alt="Logo">
  <form action="/contact" method="post">
    <label for="mail">Mail</label>
    <input type="email" id="mail" name="mail">
    <textarea id="msg" name="msg"></textarea>
    <button>Send</button>
  </form>
</body>
</html>"#;

fn config(tmp: &TempDir) -> Config {
    let mut config = Config::default();
    config.paths.static_root = tmp.path().join("static");
    config.paths.media_root = tmp.path().join("media");
    config.paths.data_dir = tmp.path().join("data");
    config
}

fn fetcher() -> MemoryFetcher {
    MemoryFetcher::new()
        .with(SITE, PAGE)
        .with(
            "https://acme.example/css/site.css",
            "@media print { .x { background: url(print.png) } }\n.hero { background-image: url(bg.png); color: red }",
        )
        .with("https://acme.example/css/bg.png", b"PNG".to_vec())
        .with("https://acme.example/img/hero.jpg", b"JPG".to_vec())
        .with("https://acme.example/img/fast.png", b"PNG".to_vec())
}

/// Every element of the page, depth-first in render order.
fn walk<S: PageStore + ?Sized>(store: &S, page_id: PageId) -> Vec<PageElement> {
    fn visit<S: PageStore + ?Sized>(store: &S, page_id: PageId, parent: Option<&PageElement>, out: &mut Vec<PageElement>) {
        let children = store.children(page_id, parent.map(|p| p.id)).unwrap();
        for child in children {
            out.push(child.clone());
            visit(store, page_id, Some(&child), out);
        }
    }
    let mut out = Vec::new();
    visit(store, page_id, None, &mut out);
    out
}

#[test]
fn test_full_import() {
    let tmp = TempDir::new().unwrap();
    let config = config(&tmp);
    let fetcher = fetcher();
    let mut store = MemoryStore::new();

    let page = PageImporter::new(&config, &fetcher, &mut store)
        .import(SITE)
        .unwrap();

    assert_eq!(page.title, "Acme Landing");
    assert_eq!(page.slug, "acme-landing");
    assert_eq!(
        page.css_files,
        vec![
            "page_acme-landing/css/site.css".to_string(),
            "https://cdn.other.com/s.css".to_string(),
        ]
    );

    let css = fs::read_to_string(tmp.path().join("static/page_acme-landing/css/site.css")).unwrap();
    assert!(css.contains("url(/media/page_acme-landing/images/bg.png)"));
    assert!(css.contains("url(print.png)"));
    assert!(tmp.path().join("media/page_acme-landing/images/bg.png").exists());
    assert!(!fetcher.requests().iter().any(|u| u.contains("cdn.other.com")));

    let roots = store.roots(page.id).unwrap();
    let types: Vec<_> = roots.iter().map(|e| e.element_type).collect();
    assert_eq!(
        types,
        vec![
            ElementType::PageHeader,
            ElementType::Grid,
            ElementType::Card,
            ElementType::Image,
            ElementType::Form,
        ]
    );
    assert_eq!(roots.iter().map(|e| e.order).collect::<Vec<_>>(), vec![0, 1, 2, 3, 4]);

    assert_eq!(
        roots[0].props,
        ElementProps::PageHeader {
            background_image: Some("/media/page_acme-landing/images/hero.jpg".into())
        }
    );
    assert_eq!(roots[1].props, ElementProps::Grid { columns: 2 });
    assert_eq!(
        roots[2].props,
        ElementProps::Card {
            layout: "vertical".into()
        }
    );

    // Unreachable logo: element kept, src untouched.
    assert_eq!(roots[3].image, None);
    assert_eq!(roots[3].html_attrs["src"], "logo.png");

    assert_eq!(
        roots[4].props,
        ElementProps::Form {
            action: "/contact".into(),
            method: "POST".into()
        }
    );

    let all = walk(&store, page.id);
    assert!(all.iter().all(|e| e.element_type != ElementType::Body));
    let fast = all
        .iter()
        .find(|e| e.image.is_some())
        .expect("card image localized");
    assert_eq!(fast.image.as_deref(), Some("page_acme-landing/images/fast.png"));
    assert_eq!(fast.html_attrs["src"], "/media/page_acme-landing/images/fast.png");

    let paragraph = all
        .iter()
        .find(|e| e.element_type == ElementType::Text)
        .unwrap();
    assert_eq!(paragraph.content, "Really <em>fast</em>.");
}

#[test]
fn test_sibling_orders_are_dense() {
    let tmp = TempDir::new().unwrap();
    let config = config(&tmp);
    let fetcher = fetcher();
    let mut store = MemoryStore::new();

    let page = PageImporter::new(&config, &fetcher, &mut store)
        .import(SITE)
        .unwrap();

    let mut parents = vec![None];
    parents.extend(walk(&store, page.id).iter().map(|e| Some(e.id)));
    for parent in parents {
        let orders: Vec<u32> = store
            .children(page.id, parent)
            .unwrap()
            .iter()
            .map(|e| e.order)
            .collect();
        let expected: Vec<u32> = (0..orders.len() as u32).collect();
        assert_eq!(orders, expected);
    }
}

#[test]
fn test_reimport_replaces_page() {
    let tmp = TempDir::new().unwrap();
    let config = config(&tmp);
    let fetcher = fetcher();
    let mut store = MemoryStore::new();

    let first = PageImporter::new(&config, &fetcher, &mut store)
        .import(SITE)
        .unwrap();
    let first_count = store.element_count(first.id).unwrap();

    let second = PageImporter::new(&config, &fetcher, &mut store)
        .import(SITE)
        .unwrap();

    let pages = store.pages().unwrap();
    assert_eq!(pages.len(), 1);
    assert_eq!(pages[0].id, second.id);
    assert_eq!(store.element_count(first.id).unwrap(), 0);
    assert_eq!(store.element_count(second.id).unwrap(), first_count);
}

#[test]
fn test_missing_body_leaves_page_row() {
    let tmp = TempDir::new().unwrap();
    let config = config(&tmp);
    // A frameset document parses without a <body>.
    let fetcher = MemoryFetcher::new().with(
        SITE,
        "<html><head><title>Frames</title></head><frameset><frame src=\"a.html\"></frameset></html>",
    );
    let mut store = MemoryStore::new();

    let err = PageImporter::new(&config, &fetcher, &mut store)
        .import(SITE)
        .unwrap_err();

    assert!(matches!(err, AppError::MissingBody(_)));
    assert!(store.page_by_slug("frames").unwrap().is_some());
}

#[test]
fn test_local_storage_round_trip() {
    let tmp = TempDir::new().unwrap();
    let config = config(&tmp);
    let fetcher = fetcher();

    let page = {
        let mut storage = LocalStorage::open(&config.paths.data_dir).unwrap();
        PageImporter::new(&config, &fetcher, &mut storage)
            .import(SITE)
            .unwrap()
    };

    let storage = LocalStorage::open(&config.paths.data_dir).unwrap();
    let stored = storage.page_by_slug("acme-landing").unwrap().unwrap();
    assert_eq!(stored, page);

    let html = render_page(&storage, &stored).unwrap();
    assert!(html.contains(r#"href="/static/page_acme-landing/css/site.css""#));
    assert!(html.contains(r#"href="https://cdn.other.com/s.css""#));
    assert!(html.contains(r#"<div class="row"><div class="col">A</div><div class="col">B</div></div>"#));
    assert!(html.contains(r#"<form action="/contact" method="post">"#));
}
