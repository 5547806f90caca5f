// src/utils/url.rs

//! URL manipulation utilities.

use url::Url;

/// Resolve a potentially relative reference against a base URL.
pub fn resolve(base: &Url, href: &str) -> Option<Url> {
    base.join(href.trim()).ok()
}

/// Lowercased host of a URL.
///
/// # Examples
/// ```
/// use page_import::utils::url::host;
/// use url::Url;
///
/// let url = Url::parse("https://Example.COM/path").unwrap();
/// assert_eq!(host(&url), Some("example.com".to_string()));
/// ```
pub fn host(url: &Url) -> Option<String> {
    url.host_str().map(|h| h.to_lowercase())
}

/// Whether two URLs share a host.
pub fn same_host(a: &Url, b: &Url) -> bool {
    match (host(a), host(b)) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}

/// Final path segment of a URL, empty when the path ends in `/`.
pub fn file_name(url: &Url) -> String {
    url.path()
        .rsplit('/')
        .next()
        .unwrap_or_default()
        .to_string()
}
