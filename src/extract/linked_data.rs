//! Linked-data pass: enriches from `ItemList` JSON-LD blocks.

use std::sync::LazyLock;

use regex::Regex;
use scraper::{Html, Selector};
use serde_json::Value;
use tracing::debug;

use super::{ItemCollector, year_from_date_prefix};
use crate::item::{ContentItem, ContentType};

#[allow(clippy::expect_used)]
static LD_JSON: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(r#"script[type="application/ld+json"]"#).expect("ld+json selector is valid") // Static selector, safe to panic
});

#[allow(clippy::expect_used)]
static URL_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/title/(tt\d+)").expect("url id regex is valid")); // Static pattern, safe to panic

/// Runs the linked-data pass. Returns `numberOfItems` of the first list that declares it.
pub(super) fn extract(document: &Html, collector: &mut ItemCollector) -> Option<usize> {
    let mut declared_total = None;

    for script in document.select(&LD_JSON) {
        let raw = script.text().collect::<String>();
        let block: Value = match serde_json::from_str(raw.trim()) {
            Ok(value) => value,
            Err(e) => {
                debug!(error = %e, "skipping malformed linked-data block");
                continue;
            }
        };

        for list in item_lists(&block) {
            if declared_total.is_none() {
                declared_total = list
                    .get("numberOfItems")
                    .and_then(Value::as_u64)
                    .and_then(|n| usize::try_from(n).ok())
                    .filter(|n| *n > 0);
            }
            let Some(entries) = list.get("itemListElement").and_then(Value::as_array) else {
                continue;
            };
            for entry in entries {
                apply_entry(entry, collector);
            }
        }
    }

    declared_total
}

/// Top-level `ItemList` nodes in a block: the block itself, array members, or `@graph` members.
fn item_lists(block: &Value) -> Vec<&Value> {
    let candidates: Vec<&Value> = match block {
        Value::Array(values) => values.iter().collect(),
        Value::Object(map) => match map.get("@graph").and_then(Value::as_array) {
            Some(graph) => graph.iter().chain(std::iter::once(block)).collect(),
            None => vec![block],
        },
        _ => Vec::new(),
    };
    candidates.into_iter().filter(|node| is_item_list(node)).collect()
}

fn is_item_list(node: &Value) -> bool {
    match node.get("@type") {
        Some(Value::String(ty)) => ty == "ItemList",
        Some(Value::Array(types)) => types.iter().any(|ty| ty.as_str() == Some("ItemList")),
        _ => false,
    }
}

fn apply_entry(entry: &Value, collector: &mut ItemCollector) {
    let item = entry.get("item").filter(|inner| inner.is_object()).unwrap_or(entry);

    let Some(primary_id) = item
        .get("url")
        .or_else(|| entry.get("url"))
        .and_then(Value::as_str)
        .and_then(|url| URL_ID.captures(url))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
    else {
        return;
    };

    let content_type = item
        .get("@type")
        .and_then(Value::as_str)
        .map_or(ContentType::Unknown, linked_data_type);
    let year = item
        .get("datePublished")
        .and_then(Value::as_str)
        .and_then(year_from_date_prefix);

    if collector.contains(&primary_id) {
        collector.enrich(&primary_id, content_type, year);
        return;
    }

    let title = ["name", "alternateName"]
        .iter()
        .filter_map(|field| item.get(*field).and_then(Value::as_str))
        .map(str::trim)
        .find(|name| !name.is_empty())
        .unwrap_or("Unknown");
    collector.merge(ContentItem::new(primary_id, title, content_type, year));
}

/// schema.org type annotation to content type: mini-series, then series, then movie.
fn linked_data_type(annotation: &str) -> ContentType {
    let annotation = annotation.to_lowercase();
    if annotation.contains("miniseries") {
        ContentType::MiniSeries
    } else if annotation.contains("series") {
        ContentType::Series
    } else if annotation.contains("movie") {
        ContentType::Movie
    } else {
        ContentType::Unknown
    }
}
