//! Markup pass: scans rendered title anchors.

use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use tracing::trace;

use super::{ItemCollector, classify_text};
use crate::item::ContentItem;

#[allow(clippy::expect_used)]
static TITLE_ANCHOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(r#"a[href*="/title/tt"]"#).expect("anchor selector is valid") // Static selector, safe to panic
});

#[allow(clippy::expect_used)]
static ITEM_CONTAINER: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(".ipc-metadata-list-summary-item, .lister-item")
        .expect("container selector is valid") // Static selector, safe to panic
});

#[allow(clippy::expect_used)]
static TITLE_ELEMENT: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(".ipc-title__text, h3, .lister-item-header a")
        .expect("title selector is valid") // Static selector, safe to panic
});

#[allow(clippy::expect_used)]
static HREF_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/title/(tt\d+)").expect("href regex is valid")); // Static pattern, safe to panic

#[allow(clippy::expect_used)]
static ORDINAL_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+\.\s*").expect("ordinal regex is valid")); // Static pattern, safe to panic

#[allow(clippy::expect_used)]
static INDEX_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+\.?$").expect("index marker regex is valid")); // Static pattern, safe to panic

#[allow(clippy::expect_used)]
static YEAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(?:19|20)\d{2}\b").expect("year regex is valid")); // Static pattern, safe to panic

/// Literal title used when neither the anchor nor its container yields one.
const UNKNOWN_TITLE: &str = "Unknown";

/// Runs the anchor scan, scoped to item containers when any exist.
pub(super) fn extract(document: &Html, collector: &mut ItemCollector) {
    let mut anchors: Vec<ElementRef<'_>> = document
        .select(&ITEM_CONTAINER)
        .flat_map(|container| container.select(&TITLE_ANCHOR))
        .collect();
    if anchors.is_empty() {
        anchors = document.select(&TITLE_ANCHOR).collect();
    }

    for anchor in anchors {
        let Some(primary_id) = anchor
            .value()
            .attr("href")
            .and_then(|href| HREF_ID.captures(href))
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
        else {
            continue;
        };

        let container = enclosing_container(anchor);
        let context = container.map_or_else(|| context_text(anchor), context_text);
        let content_type = classify_text(&context);
        let year = first_year(&context);

        if collector.contains(&primary_id) {
            collector.enrich(&primary_id, content_type, year);
            continue;
        }

        let title = anchor_title(anchor, container);
        trace!(%primary_id, %title, %content_type, "anchor item");
        collector.merge(ContentItem::new(primary_id, title, content_type, year));
    }
}

fn enclosing_container(anchor: ElementRef<'_>) -> Option<ElementRef<'_>> {
    anchor
        .ancestors()
        .filter_map(ElementRef::wrap)
        .find(|element| ITEM_CONTAINER.matches(element))
}

fn anchor_title(anchor: ElementRef<'_>, container: Option<ElementRef<'_>>) -> String {
    let own = collapse_whitespace(&anchor.text().collect::<String>());
    let raw = if own.is_empty() || INDEX_MARKER.is_match(&own) {
        container
            .and_then(|container| {
                container
                    .select(&TITLE_ELEMENT)
                    .map(|element| collapse_whitespace(&element.text().collect::<String>()))
                    .find(|text| !text.is_empty())
            })
            .unwrap_or_default()
    } else {
        own
    };

    let stripped = ORDINAL_PREFIX.replace(&raw, "").trim().to_string();
    if stripped.is_empty() {
        UNKNOWN_TITLE.to_string()
    } else {
        stripped
    }
}

fn context_text(element: ElementRef<'_>) -> String {
    element.text().collect::<Vec<_>>().join(" ")
}

fn first_year(text: &str) -> Option<u16> {
    YEAR.find(text).and_then(|m| m.as_str().parse().ok())
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::item::ContentType;

    fn run(html: &str) -> Vec<ContentItem> {
        let document = Html::parse_document(html);
        let mut collector = ItemCollector::new();
        extract(&document, &mut collector);
        collector.into_items()
    }

    #[test]
    fn test_modern_container_with_numbered_title() {
        let items = run(r#"
            <ul>
              <li class="ipc-metadata-list-summary-item">
                <a href="/title/tt0903747/?ref_=wl_i_1"><img alt="poster"></a>
                <a href="/title/tt0903747/?ref_=wl_t_1"><h3 class="ipc-title__text">1. Breaking Bad</h3></a>
                <span>2008–2013</span><span>62 eps</span><span>TV-MA</span>
              </li>
            </ul>"#);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].primary_id, "tt0903747");
        assert_eq!(items[0].title, "Breaking Bad");
        assert_eq!(items[0].content_type, ContentType::Series);
        assert_eq!(items[0].year, Some(2008));
    }

    #[test]
    fn test_numeric_anchor_falls_back_to_title_element() {
        let items = run(r#"
            <div class="lister-item">
              <a href="/title/tt1375666/">12.</a>
              <h3>12. Inception</h3>
              <p>2010 2h 28m PG-13</p>
            </div>"#);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].title, "Inception");
        assert_eq!(items[0].content_type, ContentType::Movie);
        assert_eq!(items[0].year, Some(2010));
    }

    #[test]
    fn test_falls_back_to_any_anchor_without_containers() {
        let items = run(r#"<p><a href="https://www.imdb.com/title/tt0111161/">The Shawshank Redemption</a></p>
                           <p><a href="/name/nm0000209/">Tim Robbins</a></p>"#);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].primary_id, "tt0111161");
        assert_eq!(items[0].content_type, ContentType::Unknown);
    }

    #[test]
    fn test_empty_title_defaults_to_unknown() {
        let items = run(r#"<div class="lister-item"><a href="/title/tt7/"> </a></div>"#);
        assert_eq!(items[0].title, "Unknown");
    }

    #[test]
    fn test_year_outside_range_is_ignored() {
        let items = run(r#"<div class="lister-item"><a href="/title/tt8/">Old</a><span>1895 2150</span></div>"#);
        assert_eq!(items[0].year, None);
    }
}
