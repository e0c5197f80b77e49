//! Shared HTTP client construction for page and lookup traffic.
//!
//! Both clients share timeout policy and gzip support; they differ in identity
//! and default headers.

use std::time::Duration;

use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, HeaderMap, HeaderValue, REFERER};
use reqwest::{Client, ClientBuilder};

use crate::user_agent;

/// Default connect timeout for all clients.
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Default overall request timeout for all clients.
pub const DEFAULT_READ_TIMEOUT_SECS: u64 = 30;

/// Referrer sent with list page requests.
const PAGE_REFERER: &str = "https://www.imdb.com/";

/// Timeout settings applied to every client built here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HttpTimeouts {
    /// TCP/TLS connect timeout in seconds.
    pub connect_timeout_secs: u64,
    /// Whole-request timeout in seconds.
    pub read_timeout_secs: u64,
}

impl Default for HttpTimeouts {
    fn default() -> Self {
        Self {
            connect_timeout_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
            read_timeout_secs: DEFAULT_READ_TIMEOUT_SECS,
        }
    }
}

fn base_builder(timeouts: HttpTimeouts) -> ClientBuilder {
    Client::builder()
        .connect_timeout(Duration::from_secs(timeouts.connect_timeout_secs))
        .timeout(Duration::from_secs(timeouts.read_timeout_secs))
        .gzip(true)
}

/// Headers that make list page requests look like a regular browser visit.
pub(crate) fn page_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        ACCEPT,
        HeaderValue::from_static(
            "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8",
        ),
    );
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));
    headers.insert(REFERER, HeaderValue::from_static(PAGE_REFERER));
    headers
}

/// Builds the client used for list page fetches.
///
/// # Errors
///
/// Returns the underlying [`reqwest::Error`] when client construction fails.
pub(crate) fn build_page_client(timeouts: HttpTimeouts) -> Result<Client, reqwest::Error> {
    base_builder(timeouts)
        .user_agent(user_agent::page_user_agent())
        .default_headers(page_headers())
        .build()
}

/// Builds the client used for lookup API calls.
///
/// # Errors
///
/// Returns the underlying [`reqwest::Error`] when client construction fails.
pub(crate) fn build_lookup_client(timeouts: HttpTimeouts) -> Result<Client, reqwest::Error> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    base_builder(timeouts)
        .user_agent(user_agent::lookup_user_agent())
        .default_headers(headers)
        .build()
}
