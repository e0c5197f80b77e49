//! Consumer-facing facade over the whole pipeline.
//!
//! [`WatchlistService`] is what a front end calls: it parses the reference,
//! aggregates the list, and optionally converts it into import-list records.
//! All component errors are folded into [`ServiceError`].

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::{info, instrument};

use crate::aggregate::{AggregateError, AggregateOptions, AggregatedList, PageAggregator};
use crate::config::BridgeConfig;
use crate::convert::{BatchConverter, OutputRecord};
use crate::fetch::{FetchError, HttpPageFetcher, PageFetcher};
use crate::item::{ContentItem, ContentType};
use crate::reference::{ReferenceError, parse_reference};
use crate::resolver::{IdentifierResolver, LookupClient, ResolveError, TmdbClient, TtlCache};

/// Errors surfaced to consumers of [`WatchlistService`].
#[derive(Debug, Clone, Error)]
pub enum ServiceError {
    /// The reference could not be parsed
    #[error(transparent)]
    InvalidReference(#[from] ReferenceError),

    /// The list does not exist or is private
    #[error("{0}")]
    NotFound(FetchError),

    /// The list site or the network failed
    #[error("{0}")]
    Upstream(FetchError),

    /// A required setting is missing or a client could not be built
    #[error(transparent)]
    Configuration(#[from] ResolveError),
}

impl From<FetchError> for ServiceError {
    fn from(error: FetchError) -> Self {
        match error {
            FetchError::NotFound { .. } => Self::NotFound(error),
            FetchError::ClientBuild { reason } => {
                Self::Configuration(ResolveError::ClientBuild { reason })
            }
            other => Self::Upstream(other),
        }
    }
}

impl From<AggregateError> for ServiceError {
    fn from(error: AggregateError) -> Self {
        match error {
            AggregateError::Reference(e) => Self::InvalidReference(e),
            AggregateError::Fetch(e) => e.into(),
        }
    }
}

/// Fetches lists and converts them into import-list records.
#[derive(Debug)]
pub struct WatchlistService {
    aggregator: PageAggregator,
    converter: BatchConverter,
}

impl WatchlistService {
    /// Builds the HTTP-backed pipeline from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError`] if an HTTP client cannot be constructed.
    pub fn new(config: &BridgeConfig) -> Result<Self, ServiceError> {
        let fetcher = HttpPageFetcher::with_timeouts(config.timeouts())?;
        let lookup = TmdbClient::with_base_url(&config.tmdb_base_url, config.timeouts())?;
        Ok(Self::with_components(Arc::new(fetcher), Arc::new(lookup), config))
    }

    /// Builds the pipeline around caller-supplied fetcher and lookup client.
    #[must_use]
    pub fn with_components(
        fetcher: Arc<dyn PageFetcher>,
        lookup: Arc<dyn LookupClient>,
        config: &BridgeConfig,
    ) -> Self {
        let aggregator = PageAggregator::new(fetcher, config.list_base_url.clone())
            .with_page_delay(config.page_delay());
        let cache = Arc::new(TtlCache::new(config.cache_ttl()));
        let resolver = IdentifierResolver::new(lookup, config.tmdb_api_key.clone(), cache);
        let converter =
            BatchConverter::new(Arc::new(resolver)).with_batch_delay(config.batch_delay());
        Self {
            aggregator,
            converter,
        }
    }

    /// The resolver shared by every conversion.
    #[must_use]
    pub fn resolver(&self) -> &Arc<IdentifierResolver> {
        self.converter.resolver()
    }

    /// Parses `reference` and collects the list's items.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::InvalidReference`] for unparsable input and
    /// [`ServiceError::NotFound`] or [`ServiceError::Upstream`] when the first
    /// page cannot be fetched.
    #[instrument(skip(self))]
    pub async fn fetch_list(
        &self,
        reference: &str,
        options: AggregateOptions,
    ) -> Result<AggregatedList, ServiceError> {
        let reference = parse_reference(reference)?;
        Ok(self.aggregator.aggregate(&reference, options).await?)
    }

    /// Collects a list, keeps the series, and converts them into records.
    ///
    /// # Errors
    ///
    /// As [`Self::fetch_list`], plus [`ServiceError::Configuration`] when no
    /// API key is configured.
    #[instrument(skip(self))]
    pub async fn fetch_and_convert(
        &self,
        reference: &str,
        options: AggregateOptions,
    ) -> Result<Vec<OutputRecord>, ServiceError> {
        let list = self.fetch_list(reference, options).await?;
        let series = filter_by_type(list.items, &[ContentType::Series, ContentType::MiniSeries]);
        let records = self.converter.convert(&series).await?;
        info!(series = series.len(), records = records.len(), "list converted");
        Ok(records)
    }

    /// Empties the resolution cache. Returns how many entries were removed.
    pub fn flush_cache(&self) -> usize {
        self.resolver().flush_cache()
    }

    /// Starts purging expired cache entries every `interval`.
    ///
    /// Must be called from within a tokio runtime. The task ends once the
    /// service is dropped.
    pub fn spawn_cache_sweeper(&self, interval: Duration) -> JoinHandle<()> {
        self.resolver().cache().spawn_sweeper(interval)
    }
}

/// Keeps items whose content type is one of `types`, in order.
#[must_use]
pub fn filter_by_type(items: Vec<ContentItem>, types: &[ContentType]) -> Vec<ContentItem> {
    items
        .into_iter()
        .filter(|item| types.contains(&item.content_type))
        .collect()
}
