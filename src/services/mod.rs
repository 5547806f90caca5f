//! Service layer for the page importer.
//!
//! This module contains the business logic for:
//! - Remote fetching (`AssetFetcher`, `HttpFetcher`)
//! - Asset localization (`AssetLocalizer`)
//! - Stylesheet import and rewriting (`StylesheetImporter`)
//! - Element classification (`Classifier`)
//! - Element tree construction (`TreeBuilder`)
//! - Import orchestration (`PageImporter`)
//! - Rendering and editing of stored pages

pub mod assets;
pub mod classifier;
pub mod editor;
pub mod fetcher;
pub mod importer;
pub mod render;
pub mod stylesheets;
pub mod tree;

pub use assets::{AssetLocalizer, LocalAsset};
pub use classifier::{Classification, Classifier};
pub use editor::{ConfigEnvelope, ContentEnvelope, ElementEditor, SuccessEnvelope};
pub use fetcher::{AssetFetcher, FetchResult, HttpFetcher, MemoryFetcher};
pub use importer::{PageIdentity, PageImporter, page_identity};
pub use render::render_page;
pub use stylesheets::StylesheetImporter;
pub use tree::TreeBuilder;
