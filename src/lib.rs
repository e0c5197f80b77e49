//! Watchlist Bridge Library
//!
//! This library turns public watchlist and list pages into normalized content
//! records, then resolves each record's title id to a TVDB id so the result can
//! be served as a Sonarr import list.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`reference`] - Parsing user-supplied list references (short codes or URLs)
//! - [`extract`] - Multi-pass record extraction and content-type classification
//! - [`fetch`] - Page fetching over HTTP with browser-like headers
//! - [`aggregate`] - Pagination walk with dedup, caps and pacing
//! - [`resolver`] - Two-step identifier resolution behind a TTL cache
//! - [`convert`] - Batched conversion into Sonarr-shaped output records
//! - [`service`] - Facade tying the pipeline together for consumers
//! - [`config`] - Environment-backed runtime configuration

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod aggregate;
pub mod config;
pub mod convert;
pub mod extract;
pub mod fetch;
pub mod item;
pub mod reference;
pub mod resolver;
pub mod service;
#[cfg(test)]
pub mod test_support;
pub(crate) mod user_agent;

// Re-export commonly used types
pub use aggregate::{
    AggregateOptions, AggregatedList, DEFAULT_PAGE_DELAY, ITEMS_PER_PAGE, PageAggregator,
    Pagination, StopReason,
};
pub use config::{BridgeConfig, ConfigError};
pub use convert::{BATCH_SIZE, BatchConverter, DEFAULT_BATCH_DELAY, OutputRecord};
pub use extract::{PageResult, classify_text, extract_page};
pub use fetch::{FetchError, HttpPageFetcher, PageFetcher};
pub use item::{ContentItem, ContentType};
pub use reference::{ListReference, ReferenceError, ReferenceKind, parse_reference};
pub use resolver::{
    Clock, IdentifierResolver, LookupClient, ResolveError, ResolvedIdentifier, SystemClock,
    TmdbClient, TtlCache,
};
pub use service::{ServiceError, WatchlistService};
