//! CLI entry point for watchlist-bridge.

use anyhow::{Context, Result};
use clap::Parser;
use serde_json::json;
use tracing::{debug, info, warn};
use watchlist_bridge::service::filter_by_type;
use watchlist_bridge::{AggregatedList, BridgeConfig, ContentType, StopReason, WatchlistService};

mod cli;

use cli::Args;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();

    // Priority: RUST_LOG env var > quiet flag > verbose flag > default (info)
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(args.log_level()));

    // Logs go to stderr; stdout carries JSON only
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    debug!(reference = %args.reference, convert = args.convert, "CLI arguments parsed");

    let mut config = BridgeConfig::from_env().context("failed to load configuration")?;
    args.apply_overrides(&mut config);
    config.validate().context("invalid configuration")?;

    let service = WatchlistService::new(&config)?;
    let _sweeper = service.spawn_cache_sweeper(config.cache_sweep_interval());
    let options = args.aggregate_options();

    let output = if args.convert {
        let records = service.fetch_and_convert(&args.reference, options).await?;
        info!(records = records.len(), "conversion finished");
        serde_json::to_value(records)?
    } else {
        let mut list = service.fetch_list(&args.reference, options).await?;
        if args.series_only {
            list.items = filter_by_type(list.items, &[ContentType::Series, ContentType::MiniSeries]);
        }
        list_json(&list)?
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn list_json(list: &AggregatedList) -> Result<serde_json::Value> {
    let stop_reason = match &list.stop_reason {
        None => None,
        Some(StopReason::LimitReached) => Some("limitReached".to_string()),
        Some(StopReason::NoNewItems { page }) => Some(format!("noNewItems(page {page})")),
        Some(StopReason::PageFailed { page, error }) => {
            warn!(page, error = %error, "returning partial list");
            Some(format!("pageFailed(page {page})"))
        }
    };

    let mut body = json!({
        "items": list.items,
        "count": list.items.len(),
        "pagesFetched": list.pages_fetched,
        "partial": list.is_partial(),
    });
    if let Some(pagination) = &list.pagination {
        body["pagination"] = serde_json::to_value(pagination)?;
    }
    if let Some(reason) = stop_reason {
        body["stopReason"] = json!(reason);
    }
    Ok(body)
}
