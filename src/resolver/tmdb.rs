//! TMDB lookup client.
//!
//! [`TmdbClient`] answers the two lookups the resolver chains: find a TV show
//! by its title id, then read that show's external ids. Every failure mode
//! (transport, non-success status, unexpected body) degrades to `None` so a
//! flaky lookup service yields a resolution miss rather than an error.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use super::{FindCandidate, LookupClient, ResolveError};
use crate::fetch::{HttpTimeouts, build_lookup_client};

/// Default TMDB API base URL.
pub const DEFAULT_TMDB_BASE_URL: &str = "https://api.themoviedb.org/3";

// ==================== TMDB API Response Types ====================

/// Response of `GET /find/{external_id}`.
#[derive(Debug, Deserialize)]
pub(crate) struct FindResponse {
    #[serde(default)]
    pub tv_results: Vec<FindTvResult>,
}

/// A TV entry in a find response.
#[derive(Debug, Deserialize)]
pub(crate) struct FindTvResult {
    pub id: u64,
    pub name: Option<String>,
    pub original_name: Option<String>,
}

/// Response of `GET /tv/{id}/external_ids`.
#[derive(Debug, Deserialize)]
pub(crate) struct ExternalIdsResponse {
    pub tvdb_id: Option<u64>,
}

// ==================== TmdbClient ====================

/// Lookup client backed by the TMDB v3 REST API.
#[derive(Clone)]
pub struct TmdbClient {
    client: Client,
    base_url: String,
}

impl TmdbClient {
    /// Creates a client against the public TMDB API.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError`] if HTTP client construction fails.
    pub fn new() -> Result<Self, ResolveError> {
        Self::with_base_url(DEFAULT_TMDB_BASE_URL, HttpTimeouts::default())
    }

    /// Creates a client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError`] if HTTP client construction fails.
    pub fn with_base_url(
        base_url: impl Into<String>,
        timeouts: HttpTimeouts,
    ) -> Result<Self, ResolveError> {
        let client = build_lookup_client(timeouts).map_err(|e| ResolveError::client_build(&e))?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    async fn get_json<T: for<'de> Deserialize<'de>>(&self, url: &str, what: &str) -> Option<T> {
        let response = match self.client.get(url).send().await {
            Ok(response) => response,
            Err(e) => {
                warn!(error = %e.without_url(), lookup = what, "TMDB request failed");
                return None;
            }
        };

        let status = response.status();
        if !status.is_success() {
            debug!(status = status.as_u16(), lookup = what, "TMDB returned no result");
            return None;
        }

        match response.json::<T>().await {
            Ok(body) => Some(body),
            Err(e) => {
                warn!(error = %e.without_url(), lookup = what, "unexpected TMDB response format");
                None
            }
        }
    }
}

impl std::fmt::Debug for TmdbClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TmdbClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl LookupClient for TmdbClient {
    #[tracing::instrument(skip(self, api_key), fields(lookup = "find"))]
    async fn find_by_external_id(&self, primary_id: &str, api_key: &str) -> Option<FindCandidate> {
        let url = format!(
            "{}/find/{}?api_key={}&external_source=imdb_id",
            self.base_url,
            urlencoding::encode(primary_id),
            urlencoding::encode(api_key)
        );
        let body: FindResponse = self.get_json(&url, "find").await?;
        let first = body.tv_results.into_iter().next()?;
        let name = first
            .name
            .filter(|name| !name.is_empty())
            .or(first.original_name)
            .unwrap_or_default();
        debug!(tmdb_id = first.id, %name, "TMDB candidate found");
        Some(FindCandidate { id: first.id, name })
    }

    #[tracing::instrument(skip(self, api_key), fields(lookup = "external_ids"))]
    async fn external_ids(&self, candidate_id: u64, api_key: &str) -> Option<u64> {
        let url = format!(
            "{}/tv/{candidate_id}/external_ids?api_key={}",
            self.base_url,
            urlencoding::encode(api_key)
        );
        let body: ExternalIdsResponse = self.get_json(&url, "external_ids").await?;
        body.tvdb_id
    }
}
