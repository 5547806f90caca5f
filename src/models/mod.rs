// src/models/mod.rs

//! Domain models for the page importer.

mod config;
mod element;
mod page;

// Re-export all public types
pub use config::{Config, HttpConfig, LoggingConfig, PageConfig, PathsConfig};
pub use element::{ElementId, ElementProps, ElementType, NewElement, PageElement};
pub use page::{NewPage, Page, PageId, media_image_url, page_dir};
