//! Pagination walk over a list of unknown size.
//!
//! The [`PageAggregator`] fetches page 1, derives how many pages the list has
//! from the page's declared total, and then walks the remaining pages one at a
//! time. Pages are fetched strictly in sequence: whether a page introduced new
//! ids decides whether the walk continues.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use watchlist_bridge::aggregate::{AggregateOptions, PageAggregator};
//! use watchlist_bridge::fetch::HttpPageFetcher;
//! use watchlist_bridge::reference::{parse_reference, DEFAULT_LIST_BASE_URL};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let fetcher = Arc::new(HttpPageFetcher::new()?);
//! let aggregator = PageAggregator::new(fetcher, DEFAULT_LIST_BASE_URL);
//! let reference = parse_reference("ls012345678")?;
//! let list = aggregator
//!     .aggregate(&reference, AggregateOptions::all().with_limit(500))
//!     .await?;
//! println!("{} items from {} pages", list.items.len(), list.pages_fetched);
//! # Ok(())
//! # }
//! ```

mod error;

pub use error::AggregateError;

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use crate::extract::{PageResult, extract_page};
use crate::fetch::{FetchError, PageFetcher};
use crate::item::ContentItem;
use crate::reference::ListReference;

/// Items the list site renders per page.
pub const ITEMS_PER_PAGE: usize = 250;

/// Default pause between successive page fetches.
pub const DEFAULT_PAGE_DELAY: Duration = Duration::from_millis(500);

/// Upper bound on pages walked when the list does not declare its size.
pub const MAX_UNDECLARED_PAGES: u32 = 200;

/// What the caller wants from a list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AggregateOptions {
    /// Return only the first (or requested) page.
    pub single_page: bool,
    /// Fetch exactly this 1-based page.
    pub page: Option<u32>,
    /// Cap on the number of returned items.
    pub limit: Option<usize>,
}

impl AggregateOptions {
    /// Walk every page.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Fetch only the first page.
    #[must_use]
    pub fn single_page() -> Self {
        Self {
            single_page: true,
            ..Self::default()
        }
    }

    /// Fetch exactly the given page.
    #[must_use]
    pub fn page(page: u32) -> Self {
        Self {
            single_page: true,
            page: Some(page),
            ..Self::default()
        }
    }

    /// Caps the number of returned items.
    #[must_use]
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Pagination metadata for single-page responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    /// The page that was returned.
    pub current_page: u32,
    /// Total pages derived from the declared total.
    pub total_pages: u32,
    /// Whether pages after `current_page` exist.
    pub has_more: bool,
    /// Declared item count, or the number of items seen when undeclared.
    pub total_items: usize,
}

/// Why a full walk ended before the last page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopReason {
    /// The item cap was reached; output was trimmed to it.
    LimitReached,
    /// A page contributed no new ids; treated as end of data.
    NoNewItems {
        /// The page that added nothing.
        page: u32,
    },
    /// A page fetch failed; items gathered so far are returned.
    PageFailed {
        /// The page that failed.
        page: u32,
        /// What went wrong.
        error: FetchError,
    },
}

/// Result of an aggregation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregatedList {
    /// Unique items in list order.
    pub items: Vec<ContentItem>,
    /// Present for single-page responses.
    pub pagination: Option<Pagination>,
    /// Number of page fetches issued.
    pub pages_fetched: u32,
    /// Set when the walk ended early.
    pub stop_reason: Option<StopReason>,
}

impl AggregatedList {
    /// True when a page failure cut the walk short.
    #[must_use]
    pub fn is_partial(&self) -> bool {
        matches!(self.stop_reason, Some(StopReason::PageFailed { .. }))
    }
}

/// Drives [`PageFetcher`] and [`extract_page`] across a paged list.
pub struct PageAggregator {
    fetcher: Arc<dyn PageFetcher>,
    base_url: String,
    page_delay: Duration,
}

impl std::fmt::Debug for PageAggregator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageAggregator")
            .field("base_url", &self.base_url)
            .field("page_delay", &self.page_delay)
            .finish_non_exhaustive()
    }
}

impl PageAggregator {
    /// Creates an aggregator with the default page delay.
    #[must_use]
    pub fn new(fetcher: Arc<dyn PageFetcher>, base_url: impl Into<String>) -> Self {
        Self {
            fetcher,
            base_url: base_url.into(),
            page_delay: DEFAULT_PAGE_DELAY,
        }
    }

    /// Sets the pause between page fetches. `Duration::ZERO` disables it.
    #[must_use]
    pub fn with_page_delay(mut self, page_delay: Duration) -> Self {
        self.page_delay = page_delay;
        self
    }

    /// Returns the configured page delay.
    #[must_use]
    pub fn page_delay(&self) -> Duration {
        self.page_delay
    }

    /// Collects the items of a list according to `options`.
    ///
    /// # Errors
    ///
    /// Returns [`AggregateError`] if the page URL cannot be built or the
    /// first page fetch fails. Failures on later pages end the walk early
    /// instead (see [`StopReason::PageFailed`]).
    #[instrument(skip(self, reference), fields(reference = %reference))]
    pub async fn aggregate(
        &self,
        reference: &ListReference,
        options: AggregateOptions,
    ) -> Result<AggregatedList, AggregateError> {
        let explicit_page = options.page.or_else(|| reference.embedded_page());
        let start_page = explicit_page.unwrap_or(1).max(1);

        // Later pages only differ in their query, so one check covers the walk
        if !options.single_page && explicit_page.is_none() {
            reference.page_url(&self.base_url, start_page.saturating_add(1))?;
        }

        let first = self.fetch_page(reference, start_page).await?;
        let declared_total = first.declared_total;
        let first_len = first.len();

        let mut seen = HashSet::new();
        let mut items = Vec::new();
        absorb(first, &mut seen, &mut items);

        let page_count = page_count(declared_total, first_len);
        debug!(declared_total, first_len, ?page_count, "first page fetched");

        if options.single_page || explicit_page.is_some() || page_count == Some(1) {
            truncate(&mut items, options.limit);
            let total_pages = page_count
                .unwrap_or(if first_len >= ITEMS_PER_PAGE {
                    start_page.saturating_add(1)
                } else {
                    start_page
                })
                .max(start_page);
            let pagination = Pagination {
                current_page: start_page,
                total_pages,
                has_more: start_page < total_pages,
                total_items: if declared_total > 0 {
                    declared_total
                } else {
                    first_len
                },
            };
            return Ok(AggregatedList {
                items,
                pagination: Some(pagination),
                pages_fetched: 1,
                stop_reason: None,
            });
        }

        let mut pages_fetched = 1;
        if truncate(&mut items, options.limit) {
            return Ok(AggregatedList {
                items,
                pagination: None,
                pages_fetched,
                stop_reason: Some(StopReason::LimitReached),
            });
        }

        let last_page = page_count.unwrap_or(MAX_UNDECLARED_PAGES);
        let mut stop_reason = None;

        for page in 2..=last_page {
            if !self.page_delay.is_zero() {
                tokio::time::sleep(self.page_delay).await;
            }

            pages_fetched += 1;
            let result = match self.fetch_page(reference, page).await {
                Ok(result) => result,
                Err(AggregateError::Fetch(error)) => {
                    warn!(page, error = %error, "page fetch failed; keeping items gathered so far");
                    stop_reason = Some(StopReason::PageFailed { page, error });
                    break;
                }
                Err(other) => return Err(other),
            };

            let page_len = result.len();
            let added = absorb(result, &mut seen, &mut items);
            debug!(page, page_len, added, total = items.len(), "page absorbed");

            if added == 0 {
                stop_reason = Some(StopReason::NoNewItems { page });
                break;
            }
            if truncate(&mut items, options.limit) {
                stop_reason = Some(StopReason::LimitReached);
                break;
            }
            if page_count.is_none() && page_len < ITEMS_PER_PAGE {
                break;
            }
        }

        info!(
            items = items.len(),
            pages_fetched,
            stop_reason = ?stop_reason,
            "aggregation complete"
        );

        Ok(AggregatedList {
            items,
            pagination: None,
            pages_fetched,
            stop_reason,
        })
    }

    async fn fetch_page(
        &self,
        reference: &ListReference,
        page: u32,
    ) -> Result<PageResult, AggregateError> {
        let url = reference.page_url(&self.base_url, page)?;
        let html = self.fetcher.fetch(&url).await?;
        Ok(extract_page(&html))
    }
}

/// Pages implied by the declared total; `None` when the list size is undeclared
/// and the first page was full.
fn page_count(declared_total: usize, first_len: usize) -> Option<u32> {
    let effective_total = if declared_total > 0 {
        declared_total
    } else if first_len >= ITEMS_PER_PAGE {
        return None;
    } else {
        first_len
    };
    let pages = effective_total.div_ceil(ITEMS_PER_PAGE).max(1);
    Some(u32::try_from(pages).unwrap_or(u32::MAX))
}

/// Appends unseen items; returns how many were new.
fn absorb(page: PageResult, seen: &mut HashSet<String>, items: &mut Vec<ContentItem>) -> usize {
    let before = items.len();
    items.extend(
        page.items
            .into_iter()
            .filter(|item| seen.insert(item.primary_id.clone())),
    );
    items.len() - before
}

/// Trims to the cap; returns true when the cap is reached.
fn truncate(items: &mut Vec<ContentItem>, limit: Option<usize>) -> bool {
    match limit {
        Some(limit) if items.len() >= limit => {
            items.truncate(limit);
            true
        }
        _ => false,
    }
}
