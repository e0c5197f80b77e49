//! Structured-blob pass: walks the embedded `__NEXT_DATA__` JSON payload.
//!
//! The payload has no stable schema, so every object node is tried against a
//! small set of named field rules instead of a fixed path.

use std::sync::LazyLock;

use scraper::{Html, Selector};
use serde_json::{Map, Value};
use tracing::{debug, trace};

use super::{ItemCollector, classify_type_hint, year_from_date_prefix};
use crate::item::{ContentItem, ContentType, is_primary_id};

#[allow(clippy::expect_used)]
static DATA_ISLAND: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("script#__NEXT_DATA__").expect("data island selector is valid") // Static selector, safe to panic
});

/// Fields that may carry the primary id.
const ID_FIELDS: [&str; 2] = ["const", "id"];

/// Item collections that carry a sibling `total` count.
const COLLECTION_FIELDS: [&str; 2] = ["edges", "items"];

/// Runs the blob pass. Returns the declared total if the payload exposes one.
pub(super) fn extract(document: &Html, collector: &mut ItemCollector) -> Option<usize> {
    let mut declared_total = None;

    for script in document.select(&DATA_ISLAND) {
        let raw = script.text().collect::<String>();
        let payload: Value = match serde_json::from_str(raw.trim()) {
            Ok(value) => value,
            Err(e) => {
                debug!(error = %e, "skipping malformed data island");
                continue;
            }
        };
        walk(&payload, collector, &mut declared_total);
    }

    declared_total
}

fn walk(value: &Value, collector: &mut ItemCollector, declared_total: &mut Option<usize>) {
    match value {
        Value::Object(map) => {
            visit_object(map, collector, declared_total);
            for child in map.values() {
                walk(child, collector, declared_total);
            }
        }
        Value::Array(values) => {
            for child in values {
                walk(child, collector, declared_total);
            }
        }
        Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_) => {}
    }
}

fn visit_object(
    map: &Map<String, Value>,
    collector: &mut ItemCollector,
    declared_total: &mut Option<usize>,
) {
    if declared_total.is_none() {
        *declared_total = collection_total(map);
    }

    let Some(primary_id) = primary_id(map) else {
        return;
    };
    if collector.contains(primary_id) {
        return;
    }
    let Some(title) = title(map) else {
        trace!(primary_id, "id without title; skipping node");
        return;
    };

    let content_type = type_hint(map).map_or(ContentType::Unknown, classify_type_hint);
    collector.merge(ContentItem::new(primary_id, title, content_type, year(map)));
}

fn primary_id(map: &Map<String, Value>) -> Option<&str> {
    ID_FIELDS
        .iter()
        .filter_map(|field| map.get(*field).and_then(Value::as_str))
        .find(|candidate| is_primary_id(candidate))
}

/// First non-empty of `titleText.text`, `originalTitleText.text`, `title`, `name`.
fn title(map: &Map<String, Value>) -> Option<String> {
    [
        nested_str(map, "titleText", "text"),
        nested_str(map, "originalTitleText", "text"),
        map.get("title").and_then(Value::as_str),
        map.get("name").and_then(Value::as_str),
    ]
    .into_iter()
    .flatten()
    .map(str::trim)
    .find(|candidate| !candidate.is_empty())
    .map(ToString::to_string)
}

/// `titleType` as an object (`id` or `text`) or a bare string.
fn type_hint(map: &Map<String, Value>) -> Option<&str> {
    match map.get("titleType")? {
        Value::String(hint) => Some(hint.as_str()),
        Value::Object(inner) => inner
            .get("id")
            .and_then(Value::as_str)
            .or_else(|| inner.get("text").and_then(Value::as_str)),
        _ => None,
    }
}

/// `releaseYear.year`, then `year`, then the leading digits of `releaseDate`.
fn year(map: &Map<String, Value>) -> Option<u16> {
    map.get("releaseYear")
        .and_then(|inner| inner.get("year"))
        .and_then(value_as_year)
        .or_else(|| map.get("year").and_then(value_as_year))
        .or_else(|| {
            map.get("releaseDate")
                .and_then(Value::as_str)
                .and_then(year_from_date_prefix)
        })
}

fn value_as_year(value: &Value) -> Option<u16> {
    match value {
        Value::Number(n) => n.as_u64().and_then(|y| u16::try_from(y).ok()),
        Value::String(s) => year_from_date_prefix(s),
        _ => None,
    }
}

fn collection_total(map: &Map<String, Value>) -> Option<usize> {
    let has_collection = COLLECTION_FIELDS
        .iter()
        .any(|field| map.get(*field).is_some_and(Value::is_array));
    if !has_collection {
        return None;
    }
    map.get("total")
        .and_then(Value::as_u64)
        .and_then(|total| usize::try_from(total).ok())
        .filter(|total| *total > 0)
}

fn nested_str<'a>(map: &'a Map<String, Value>, outer: &str, inner: &str) -> Option<&'a str> {
    map.get(outer)?.get(inner)?.as_str()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn run(json: &str) -> (Vec<ContentItem>, Option<usize>) {
        let html = format!(
            r#"<html><head><script id="__NEXT_DATA__" type="application/json">{json}</script></head><body></body></html>"#
        );
        let document = Html::parse_document(&html);
        let mut collector = ItemCollector::new();
        let total = extract(&document, &mut collector);
        (collector.into_items(), total)
    }

    #[test]
    fn test_walks_nested_edges() {
        let (items, total) = run(
            r#"{"props":{"pageProps":{"mainColumnData":{"list":{"titleListItemSearch":{
                "total": 2,
                "edges": [
                    {"listItem": {"id": "tt0903747", "titleText": {"text": "Breaking Bad"},
                        "titleType": {"id": "tvSeries", "text": "TV Series"},
                        "releaseYear": {"year": 2008}}},
                    {"listItem": {"id": "tt1375666", "titleText": {"text": "Inception"},
                        "titleType": {"id": "movie"}, "releaseDate": "2010-07-16"}}
                ]}}}}}}"#,
        );
        assert_eq!(total, Some(2));
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].primary_id, "tt0903747");
        assert_eq!(items[0].content_type, ContentType::Series);
        assert_eq!(items[0].year, Some(2008));
        assert_eq!(items[1].content_type, ContentType::Movie);
        assert_eq!(items[1].year, Some(2010));
    }

    #[test]
    fn test_const_field_and_flat_year() {
        let (items, _) = run(
            r#"{"titles":[{"const":"tt0306414","originalTitleText":{"text":"The Wire"},
                "titleType":"tvMiniSeries","year":2002}]}"#,
        );
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].title, "The Wire");
        assert_eq!(items[0].content_type, ContentType::MiniSeries);
        assert_eq!(items[0].year, Some(2002));
    }

    #[test]
    fn test_node_without_title_is_dropped() {
        let (items, _) = run(r#"{"a":{"id":"tt1"},"b":{"id":"tt2","title":"  "}}"#);
        assert!(items.is_empty());
    }

    #[test]
    fn test_invalid_ids_are_ignored() {
        let (items, _) = run(r#"{"a":{"id":"nm0000123","name":"Person"},"b":{"id":"tt12x","title":"X"}}"#);
        assert!(items.is_empty());
    }

    #[test]
    fn test_duplicate_ids_keep_first_observation() {
        let (items, _) = run(
            r#"[{"id":"tt1","title":"First","titleType":"movie"},
                {"id":"tt1","title":"Second","titleType":"tvSeries"}]"#,
        );
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].title, "First");
        assert_eq!(items[0].content_type, ContentType::Movie);
    }

    #[test]
    fn test_malformed_payload_is_skipped() {
        let (items, total) = run(r#"{"props": [unterminated"#);
        assert!(items.is_empty());
        assert_eq!(total, None);
    }

    #[test]
    fn test_total_requires_collection_sibling() {
        let (_, total) = run(r#"{"total": 99, "other": {"total": 12, "items": []}}"#);
        assert_eq!(total, Some(12));
    }
}
