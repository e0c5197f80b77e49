//! Synthetic list pages and an in-memory page fetcher.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::json;
use watchlist_bridge::{FetchError, PageFetcher};

/// Items the list site renders per page.
pub const PER_PAGE: usize = 250;

/// Builds a page whose data island carries items `start..start+count` and a
/// declared total.
pub fn blob_page(start: usize, count: usize, declared_total: usize) -> String {
    let edges: Vec<_> = (start..start + count)
        .map(|i| {
            json!({
                "listItem": {
                    "id": format!("tt{:07}", i + 1),
                    "titleText": {"text": format!("Title {}", i + 1)},
                    "titleType": {"id": if i % 2 == 0 { "tvSeries" } else { "movie" }},
                    "releaseYear": {"year": 2000 + (i % 20)}
                }
            })
        })
        .collect();
    let data = json!({
        "props": {"pageProps": {"mainColumnData": {"list": {"titleListItemSearch": {
            "total": declared_total,
            "edges": edges
        }}}}}
    });
    format!(
        r#"<html><head><script id="__NEXT_DATA__" type="application/json">{data}</script></head><body></body></html>"#
    )
}

/// Serves canned markup per URL and records every request.
#[derive(Default)]
pub struct RecordingFetcher {
    pages: HashMap<String, Result<String, FetchError>>,
    requests: Mutex<Vec<String>>,
}

impl RecordingFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serves `html` at `url`.
    pub fn with_page(mut self, url: &str, html: String) -> Self {
        self.pages.insert(url.to_string(), Ok(html));
        self
    }

    /// Fails requests to `url` with `error`.
    pub fn with_error(mut self, url: &str, error: FetchError) -> Self {
        self.pages.insert(url.to_string(), Err(error));
        self
    }

    /// A paged list of `total` items under `base_url`, `PER_PAGE` per page.
    pub fn paged_list(base_url: &str, total: usize) -> Self {
        let mut fetcher = Self::new();
        let pages = total.div_ceil(PER_PAGE);
        for page in 1..=pages {
            let start = (page - 1) * PER_PAGE;
            let count = PER_PAGE.min(total - start);
            fetcher = fetcher.with_page(&page_url(base_url, page), blob_page(start, count, total));
        }
        fetcher
    }

    /// Every URL requested so far, in order.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

/// URL the aggregator builds for page `page` of a list base URL.
pub fn page_url(base_url: &str, page: usize) -> String {
    if page == 1 {
        base_url.to_string()
    } else {
        format!("{base_url}?page={page}")
    }
}

#[async_trait]
impl PageFetcher for RecordingFetcher {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        self.requests.lock().unwrap().push(url.to_string());
        self.pages
            .get(url)
            .cloned()
            .unwrap_or_else(|| Err(FetchError::not_found(url)))
    }
}
