//! Utility functions and helpers.

pub mod css;
pub mod fs;
pub mod http;
pub mod slug;
pub mod url;

pub use self::url::{file_name, host, resolve, same_host};
