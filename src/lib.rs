// src/lib.rs

//! Page Import Library
//!
//! Imports an external web page into a typed, ordered element tree with
//! localized stylesheets and images.

pub mod error;
pub mod models;
pub mod services;
pub mod storage;
pub mod utils;
