//! Page fetching.
//!
//! [`PageFetcher`] is the seam between the pipeline and the network: the
//! aggregator only ever asks for a URL's markup. [`HttpPageFetcher`] is the
//! reqwest-backed implementation; tests substitute in-memory fetchers.

mod error;
mod http_client;

pub use error::FetchError;
pub use http_client::{DEFAULT_CONNECT_TIMEOUT_SECS, DEFAULT_READ_TIMEOUT_SECS, HttpTimeouts};
pub(crate) use http_client::build_lookup_client;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use tracing::{debug, warn};

use http_client::build_page_client;

/// Source of raw page markup.
///
/// Uses `async_trait` so fetchers can be shared as `Arc<dyn PageFetcher>`.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetches the markup at `url`.
    async fn fetch(&self, url: &str) -> Result<String, FetchError>;
}

/// Fetches list pages over HTTP with browser-like request headers.
#[derive(Debug, Clone)]
pub struct HttpPageFetcher {
    client: Client,
}

impl HttpPageFetcher {
    /// Creates a fetcher with default timeouts.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::ClientBuild`] if the HTTP client cannot be constructed.
    pub fn new() -> Result<Self, FetchError> {
        Self::with_timeouts(HttpTimeouts::default())
    }

    /// Creates a fetcher with explicit timeouts.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::ClientBuild`] if the HTTP client cannot be constructed.
    pub fn with_timeouts(timeouts: HttpTimeouts) -> Result<Self, FetchError> {
        let client = build_page_client(timeouts).map_err(FetchError::client_build)?;
        Ok(Self { client })
    }
}

#[async_trait]
impl PageFetcher for HttpPageFetcher {
    #[tracing::instrument(skip(self), fields(url = %url))]
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        let response = self.client.get(url).send().await.map_err(|e| {
            warn!(error = %e, "page request failed");
            FetchError::network(url, &e)
        })?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            debug!("list page not found");
            return Err(FetchError::not_found(url));
        }
        if !status.is_success() {
            debug!(status = status.as_u16(), "list page returned error status");
            return Err(FetchError::upstream(url, status.as_u16()));
        }

        let body = response
            .text()
            .await
            .map_err(|e| FetchError::network(url, &e))?;
        debug!(bytes = body.len(), "fetched list page");
        Ok(body)
    }
}
