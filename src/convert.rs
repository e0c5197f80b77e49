//! Batched conversion of list items into import-list records.
//!
//! Items are resolved in fixed-size chunks: each chunk's resolutions run
//! concurrently on the calling task, and the next chunk starts only after the
//! previous one finished and the batch delay elapsed.

use std::sync::Arc;
use std::time::Duration;

use futures_util::future::join_all;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::item::ContentItem;
use crate::resolver::{IdentifierResolver, ResolveError, ResolvedIdentifier};

/// Maximum resolutions in flight at once.
pub const BATCH_SIZE: usize = 5;

/// Default pause between chunks.
pub const DEFAULT_BATCH_DELAY: Duration = Duration::from_millis(250);

/// One entry of a Sonarr custom import list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputRecord {
    /// TVDB id of the series.
    pub tvdb_id: u64,
    /// Series title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// TMDB id of the series.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tmdb_id: Option<u64>,
    /// Source title id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub imdb_id: Option<String>,
}

impl OutputRecord {
    /// Builds a record from an item and its resolution.
    ///
    /// The resolved title wins; the scraped title fills in when it is blank.
    #[must_use]
    pub fn from_resolution(item: &ContentItem, resolved: ResolvedIdentifier) -> Self {
        let title = if resolved.resolved_title.trim().is_empty() {
            item.title.clone()
        } else {
            resolved.resolved_title
        };
        Self {
            tvdb_id: resolved.secondary_id,
            title: Some(title).filter(|t| !t.is_empty()),
            tmdb_id: resolved.auxiliary_id,
            imdb_id: Some(item.primary_id.clone()),
        }
    }
}

/// Drives an [`IdentifierResolver`] over a list in paced chunks.
#[derive(Debug)]
pub struct BatchConverter {
    resolver: Arc<IdentifierResolver>,
    batch_delay: Duration,
}

impl BatchConverter {
    /// Creates a converter with the default batch delay.
    #[must_use]
    pub fn new(resolver: Arc<IdentifierResolver>) -> Self {
        Self {
            resolver,
            batch_delay: DEFAULT_BATCH_DELAY,
        }
    }

    /// Sets the pause between chunks. `Duration::ZERO` disables it.
    #[must_use]
    pub fn with_batch_delay(mut self, batch_delay: Duration) -> Self {
        self.batch_delay = batch_delay;
        self
    }

    /// The resolver this converter drives.
    #[must_use]
    pub fn resolver(&self) -> &Arc<IdentifierResolver> {
        &self.resolver
    }

    /// Converts items into output records, preserving input order.
    ///
    /// Items that fail to resolve are left out.
    ///
    /// # Errors
    ///
    /// Returns the first fatal [`ResolveError`] (a missing API key); the
    /// remaining chunks are not attempted.
    #[instrument(skip(self, items), fields(items = items.len()))]
    pub async fn convert(&self, items: &[ContentItem]) -> Result<Vec<OutputRecord>, ResolveError> {
        let mut records = Vec::with_capacity(items.len());
        let mut dropped = 0_usize;

        for (index, chunk) in items.chunks(BATCH_SIZE).enumerate() {
            if index > 0 && !self.batch_delay.is_zero() {
                tokio::time::sleep(self.batch_delay).await;
            }

            let results = join_all(
                chunk
                    .iter()
                    .map(|item| self.resolver.resolve(&item.primary_id)),
            )
            .await;

            for (item, result) in chunk.iter().zip(results) {
                match result {
                    Ok(Some(resolved)) => records.push(OutputRecord::from_resolution(item, resolved)),
                    Ok(None) => {
                        debug!(id = %item.primary_id, "no TVDB id; dropping item");
                        dropped += 1;
                    }
                    Err(e) if e.is_fatal() => return Err(e),
                    Err(e) => {
                        warn!(id = %item.primary_id, error = %e, "resolution failed; dropping item");
                        dropped += 1;
                    }
                }
            }
        }

        info!(converted = records.len(), dropped, "conversion complete");
        Ok(records)
    }
}
