//! Identifier resolution from title ids to TVDB ids.
//!
//! Resolution chains two lookups: the title id is looked up to find a TV
//! show candidate, and the candidate's external ids carry the TVDB id.
//! Successful resolutions are memoized in a [`TtlCache`]; misses are not.
//!
//! # Architecture
//!
//! - [`LookupClient`] - Async trait the lookup service implements
//! - [`TmdbClient`] - TMDB v3 implementation of [`LookupClient`]
//! - [`IdentifierResolver`] - Cache-first resolution over a [`LookupClient`]
//! - [`TtlCache`] - Expiring concurrent cache with an injectable [`Clock`]
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use watchlist_bridge::resolver::{IdentifierResolver, TmdbClient, TtlCache, DEFAULT_TTL};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = Arc::new(TmdbClient::new()?);
//! let cache = Arc::new(TtlCache::new(DEFAULT_TTL));
//! let resolver = IdentifierResolver::new(client, Some("api-key".to_string()), cache);
//! if let Some(resolved) = resolver.resolve("tt0903747").await? {
//!     println!("TVDB id: {}", resolved.secondary_id);
//! }
//! # Ok(())
//! # }
//! ```

mod cache;
mod error;
mod tmdb;

pub use cache::{Clock, DEFAULT_TTL, ManualClock, SystemClock, TtlCache};
pub use error::{API_KEY_ENV, ResolveError};
pub use tmdb::{DEFAULT_TMDB_BASE_URL, TmdbClient};

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, instrument};

/// A TV show matched by the first lookup step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FindCandidate {
    /// Lookup-service id of the show.
    pub id: u64,
    /// Display name of the show.
    pub name: String,
}

/// The lookup service behind [`IdentifierResolver`].
///
/// Both steps return `None` for anything other than a usable answer,
/// including transport failures.
#[async_trait]
pub trait LookupClient: Send + Sync {
    /// Finds the TV show whose external title id is `primary_id`.
    async fn find_by_external_id(&self, primary_id: &str, api_key: &str) -> Option<FindCandidate>;

    /// Returns the TVDB id recorded for a show.
    async fn external_ids(&self, candidate_id: u64, api_key: &str) -> Option<u64>;
}

/// A successful resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedIdentifier {
    /// TVDB id.
    pub secondary_id: u64,
    /// TMDB id of the matched show.
    pub auxiliary_id: Option<u64>,
    /// Show name reported by the lookup service.
    pub resolved_title: String,
}

/// Cache-first resolver from title ids to [`ResolvedIdentifier`]s.
pub struct IdentifierResolver {
    client: Arc<dyn LookupClient>,
    api_key: Option<String>,
    cache: Arc<TtlCache<ResolvedIdentifier>>,
}

impl std::fmt::Debug for IdentifierResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentifierResolver")
            .field("has_api_key", &self.api_key.is_some())
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}

impl IdentifierResolver {
    /// Creates a resolver. A blank key counts as missing.
    #[must_use]
    pub fn new(
        client: Arc<dyn LookupClient>,
        api_key: Option<String>,
        cache: Arc<TtlCache<ResolvedIdentifier>>,
    ) -> Self {
        let api_key = api_key
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty());
        Self {
            client,
            api_key,
            cache,
        }
    }

    /// Resolves a title id.
    ///
    /// Returns `Ok(None)` when either lookup step finds nothing.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::Configuration`] when no API key is configured
    /// and the id is not already cached.
    #[instrument(skip(self))]
    pub async fn resolve(
        &self,
        primary_id: &str,
    ) -> Result<Option<ResolvedIdentifier>, ResolveError> {
        if let Some(hit) = self.cache.get(primary_id) {
            debug!(tvdb_id = hit.secondary_id, "cache hit");
            return Ok(Some(hit));
        }
        debug!("cache miss");

        let Some(api_key) = self.api_key.as_deref() else {
            return Err(ResolveError::missing_credential());
        };

        let Some(candidate) = self.client.find_by_external_id(primary_id, api_key).await else {
            debug!("no TV match");
            return Ok(None);
        };

        let Some(tvdb_id) = self.client.external_ids(candidate.id, api_key).await else {
            debug!(tmdb_id = candidate.id, "match has no TVDB id");
            return Ok(None);
        };

        let resolved = ResolvedIdentifier {
            secondary_id: tvdb_id,
            auxiliary_id: Some(candidate.id),
            resolved_title: candidate.name,
        };
        self.cache.insert(primary_id, resolved.clone());
        debug!(tvdb_id, "resolved");
        Ok(Some(resolved))
    }

    /// Empties the resolution cache. Returns how many entries were removed.
    pub fn flush_cache(&self) -> usize {
        self.cache.flush()
    }

    /// The shared resolution cache.
    #[must_use]
    pub fn cache(&self) -> &Arc<TtlCache<ResolvedIdentifier>> {
        &self.cache
    }

    /// Returns true if an API key is configured.
    #[must_use]
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }
}
