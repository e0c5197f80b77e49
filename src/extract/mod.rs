//! Record extraction from list page markup.
//!
//! List pages are unstable: the rendered markup often shows fewer items than the
//! embedded client-side data holds, and the shapes of both change without
//! notice. [`extract_page`] therefore runs three independent passes over the
//! same document and merges them by primary id:
//!
//! 1. [`blob`] - walks the embedded `__NEXT_DATA__` JSON payload (primary source)
//! 2. [`markup`] - scans title anchors in the rendered item containers
//! 3. [`linked_data`] - enriches from `ItemList` JSON-LD blocks
//!
//! Later passes only enrich: they may upgrade an `Unknown` content type or fill
//! a missing year, never overwrite a concrete value.
//!
//! Extraction never fails. Malformed embedded JSON is skipped and whatever the
//! remaining passes recovered is returned.

mod blob;
mod classify;
mod linked_data;
mod markup;

pub use classify::classify_text;
pub(crate) use classify::classify_type_hint;

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;
use scraper::Html;
use tracing::debug;

use crate::item::{ContentItem, ContentType};

#[allow(clippy::expect_used)]
static TITLE_COUNT_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(\d{1,3}(?:,\d{3})+|\d+)\s+titles?\b").expect("title count regex is valid") // Static pattern, safe to panic
});

#[allow(clippy::expect_used)]
static YEAR_PREFIX_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{4})").expect("year prefix regex is valid")); // Static pattern, safe to panic

/// Items recovered from a single page plus the page's self-reported total.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageResult {
    /// Unique items in first-seen order.
    pub items: Vec<ContentItem>,
    /// Best-effort item count for the whole list; 0 means unknown.
    pub declared_total: usize,
}

impl PageResult {
    /// Returns the number of extracted items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns true if nothing was extracted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Insertion-ordered, primary-id keyed item set shared by the extraction passes.
#[derive(Debug, Default)]
pub(crate) struct ItemCollector {
    items: Vec<ContentItem>,
    index: HashMap<String, usize>,
}

impl ItemCollector {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn contains(&self, primary_id: &str) -> bool {
        self.index.contains_key(primary_id)
    }

    /// Inserts a new item or enriches the existing one with the same id.
    ///
    /// Returns true if the id was not seen before.
    pub(crate) fn merge(&mut self, item: ContentItem) -> bool {
        if let Some(&position) = self.index.get(&item.primary_id) {
            self.items[position].enrich(item.content_type, item.year);
            return false;
        }
        self.index.insert(item.primary_id.clone(), self.items.len());
        self.items.push(item);
        true
    }

    /// Enriches an existing item only; unknown ids are ignored.
    pub(crate) fn enrich(
        &mut self,
        primary_id: &str,
        content_type: ContentType,
        year: Option<u16>,
    ) -> bool {
        match self.index.get(primary_id) {
            Some(&position) => self.items[position].enrich(content_type, year),
            None => false,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.items.len()
    }

    pub(crate) fn into_items(self) -> Vec<ContentItem> {
        self.items
    }
}

/// Parses a year from the leading four digits of a date-ish string (`2008-01-20`).
pub(crate) fn year_from_date_prefix(value: &str) -> Option<u16> {
    YEAR_PREFIX_PATTERN
        .captures(value.trim())
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Extracts all content items visible on one list page.
///
/// # Example
///
/// ```
/// use watchlist_bridge::{extract_page, ContentType};
///
/// let html = r#"<html><body>
///   <div class="lister-item">
///     <h3><a href="/title/tt0903747/">Breaking Bad</a></h3>
///     <span>2008–2013 TV Series</span>
///   </div>
/// </body></html>"#;
///
/// let page = extract_page(html);
/// assert_eq!(page.items.len(), 1);
/// assert_eq!(page.items[0].content_type, ContentType::Series);
/// ```
#[tracing::instrument(skip(html), fields(html_len = html.len()))]
#[must_use]
pub fn extract_page(html: &str) -> PageResult {
    let document = Html::parse_document(html);
    let mut collector = ItemCollector::new();

    let blob_total = blob::extract(&document, &mut collector);
    let after_blob = collector.len();

    markup::extract(&document, &mut collector);
    let after_markup = collector.len();

    let linked_total = linked_data::extract(&document, &mut collector);

    let declared_total = blob_total
        .or(linked_total)
        .or_else(|| declared_total_from_text(&document))
        .unwrap_or(0);

    debug!(
        blob = after_blob,
        markup = after_markup - after_blob,
        linked_data = collector.len() - after_markup,
        declared_total,
        "extraction passes complete"
    );

    PageResult {
        items: collector.into_items(),
        declared_total,
    }
}

/// Last-resort total: a rendered "1,234 titles" label.
fn declared_total_from_text(document: &Html) -> Option<usize> {
    let text = document.root_element().text().collect::<Vec<_>>().join(" ");
    TITLE_COUNT_PATTERN
        .captures(&text)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().replace(',', "").parse().ok())
}
