//! Remote resource fetching.
//!
//! Every fetch returns a tagged result: any transport error or non-2xx
//! status becomes a [`FetchFailure`] carrying the URL and the cause.

use std::cell::RefCell;
use std::collections::HashMap;
use std::time::Duration;

use reqwest::blocking::Client;
use url::Url;

use crate::error::{FetchFailure, Result};
use crate::models::HttpConfig;
use crate::utils::http::create_client;

/// Result of a single fetch.
pub type FetchResult<T> = std::result::Result<T, FetchFailure>;

/// Source of remote bytes.
pub trait AssetFetcher {
    /// Fetch a stylesheet, image, or other asset.
    fn fetch(&self, url: &Url) -> FetchResult<Vec<u8>>;

    /// Fetch the page document itself.
    fn fetch_page(&self, url: &Url) -> FetchResult<Vec<u8>> {
        self.fetch(url)
    }

    /// Fetch and decode as text, replacing invalid UTF-8.
    fn fetch_text(&self, url: &Url) -> FetchResult<String> {
        self.fetch(url)
            .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
    }
}

/// Blocking HTTP fetcher.
pub struct HttpFetcher {
    client: Client,
    page_timeout: Duration,
}

impl HttpFetcher {
    /// Create a fetcher using the asset timeout as the client default.
    pub fn new(config: &HttpConfig) -> Result<Self> {
        Ok(Self {
            client: create_client(config)?,
            page_timeout: Duration::from_secs(config.page_timeout_secs),
        })
    }

    fn get(&self, url: &Url, timeout: Option<Duration>) -> FetchResult<Vec<u8>> {
        let mut request = self.client.get(url.as_str());
        if let Some(timeout) = timeout {
            request = request.timeout(timeout);
        }

        let response = request
            .send()
            .map_err(|e| FetchFailure::transport(url.as_str(), e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchFailure::status(url.as_str(), status.as_u16()));
        }

        let body = response
            .bytes()
            .map_err(|e| FetchFailure::transport(url.as_str(), e))?;
        log::debug!("Fetched {} ({} bytes)", url, body.len());
        Ok(body.to_vec())
    }
}

impl AssetFetcher for HttpFetcher {
    fn fetch(&self, url: &Url) -> FetchResult<Vec<u8>> {
        self.get(url, None)
    }

    fn fetch_page(&self, url: &Url) -> FetchResult<Vec<u8>> {
        self.get(url, Some(self.page_timeout))
    }
}

/// In-memory fetcher serving canned responses.
///
/// Unknown URLs fail with status 404. Every request is recorded in order.
#[derive(Debug, Default)]
pub struct MemoryFetcher {
    responses: HashMap<String, Vec<u8>>,
    requests: RefCell<Vec<String>>,
}

impl MemoryFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `body` for `url`.
    pub fn with(mut self, url: &str, body: impl Into<Vec<u8>>) -> Self {
        self.insert(url, body);
        self
    }

    pub fn insert(&mut self, url: &str, body: impl Into<Vec<u8>>) {
        self.responses.insert(normalize(url), body.into());
    }

    /// URLs requested so far, in request order.
    pub fn requests(&self) -> Vec<String> {
        self.requests.borrow().clone()
    }
}

impl AssetFetcher for MemoryFetcher {
    fn fetch(&self, url: &Url) -> FetchResult<Vec<u8>> {
        self.requests.borrow_mut().push(url.to_string());
        self.responses
            .get(url.as_str())
            .cloned()
            .ok_or_else(|| FetchFailure::status(url.as_str(), 404))
    }
}

fn normalize(url: &str) -> String {
    Url::parse(url)
        .map(|u| u.to_string())
        .unwrap_or_else(|_| url.to_string())
}
