//! CLI argument definitions using clap derive macros.

use clap::Parser;

use watchlist_bridge::aggregate::AggregateOptions;
use watchlist_bridge::config::BridgeConfig;

/// Fetch a public watchlist or list and print it as JSON.
///
/// With `--convert`, series are resolved to TVDB ids and printed in the shape
/// of a Sonarr custom import list.
#[derive(Parser, Debug)]
#[command(name = "watchlist-bridge")]
#[command(author, version, about)]
pub struct Args {
    /// User id (ur…), list id (ls…) or full list URL
    pub reference: String,

    /// Fetch only this page (1-based)
    #[arg(short, long, value_parser = clap::value_parser!(u32).range(1..))]
    pub page: Option<u32>,

    /// Fetch only the first page
    #[arg(long, conflicts_with = "page")]
    pub single_page: bool,

    /// Maximum number of items to return
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    pub limit: Option<u64>,

    /// Resolve series to TVDB ids and print import-list records
    #[arg(long)]
    pub convert: bool,

    /// Only list series and mini-series
    #[arg(long)]
    pub series_only: bool,

    /// TMDB API key (overrides TMDB_API_KEY)
    #[arg(long)]
    pub tmdb_api_key: Option<String>,

    /// Delay between page fetches in milliseconds (0 to disable, max 60000)
    #[arg(long, value_parser = clap::value_parser!(u64).range(0..=60000))]
    pub page_delay_ms: Option<u64>,

    /// Delay between resolution batches in milliseconds (0 to disable, max 60000)
    #[arg(long, value_parser = clap::value_parser!(u64).range(0..=60000))]
    pub batch_delay_ms: Option<u64>,

    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long)]
    pub quiet: bool,
}

impl Args {
    /// Aggregation options implied by the pagination flags.
    #[must_use]
    pub fn aggregate_options(&self) -> AggregateOptions {
        let options = match self.page {
            Some(page) => AggregateOptions::page(page),
            None if self.single_page => AggregateOptions::single_page(),
            None => AggregateOptions::all(),
        };
        match self.limit.and_then(|limit| usize::try_from(limit).ok()) {
            Some(limit) => options.with_limit(limit),
            None => options,
        }
    }

    /// Applies flag overrides on top of environment configuration.
    pub fn apply_overrides(&self, config: &mut BridgeConfig) {
        if let Some(key) = self.tmdb_api_key.as_ref().filter(|key| !key.trim().is_empty()) {
            config.tmdb_api_key = Some(key.clone());
        }
        if let Some(ms) = self.page_delay_ms {
            config.page_delay_ms = ms;
        }
        if let Some(ms) = self.batch_delay_ms {
            config.batch_delay_ms = ms;
        }
    }

    /// Default log filter; `RUST_LOG` takes precedence over it.
    #[must_use]
    pub fn log_level(&self) -> &'static str {
        if self.quiet {
            "error"
        } else {
            match self.verbose {
                0 => "info",
                1 => "debug",
                _ => "trace",
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_reference_is_required() {
        let err = Args::try_parse_from(["watchlist-bridge"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn test_cli_defaults_walk_every_page() {
        let args = Args::try_parse_from(["watchlist-bridge", "ls012345678"]).unwrap();
        assert_eq!(args.reference, "ls012345678");
        assert_eq!(args.aggregate_options(), AggregateOptions::all());
        assert!(!args.convert);
        assert_eq!(args.log_level(), "info");
    }

    #[test]
    fn test_cli_page_flag_implies_single_page() {
        let args = Args::try_parse_from(["watchlist-bridge", "ur1", "--page", "2"]).unwrap();
        let options = args.aggregate_options();
        assert!(options.single_page);
        assert_eq!(options.page, Some(2));
    }

    #[test]
    fn test_cli_page_zero_rejected() {
        let err = Args::try_parse_from(["watchlist-bridge", "ur1", "-p", "0"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
    }

    #[test]
    fn test_cli_page_conflicts_with_single_page() {
        let err = Args::try_parse_from(["watchlist-bridge", "ur1", "-p", "2", "--single-page"])
            .unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);
    }

    #[test]
    fn test_cli_limit_and_single_page() {
        let args =
            Args::try_parse_from(["watchlist-bridge", "ur1", "--single-page", "--limit", "50"])
                .unwrap();
        let options = args.aggregate_options();
        assert!(options.single_page);
        assert_eq!(options.limit, Some(50));
    }

    #[test]
    fn test_cli_delay_over_max_rejected() {
        let err = Args::try_parse_from(["watchlist-bridge", "ur1", "--page-delay-ms", "60001"])
            .unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
    }

    #[test]
    fn test_cli_flags_override_config() {
        let args = Args::try_parse_from([
            "watchlist-bridge",
            "ur1",
            "--tmdb-api-key",
            "from-flag",
            "--page-delay-ms",
            "0",
        ])
        .unwrap();
        let mut config = BridgeConfig {
            tmdb_api_key: Some("from-env".to_string()),
            ..BridgeConfig::default()
        };
        args.apply_overrides(&mut config);
        assert_eq!(config.tmdb_api_key.as_deref(), Some("from-flag"));
        assert_eq!(config.page_delay_ms, 0);
        assert_eq!(config.batch_delay_ms, 250);
    }

    #[test]
    fn test_cli_verbosity_levels() {
        let args = Args::try_parse_from(["watchlist-bridge", "ur1", "-vv"]).unwrap();
        assert_eq!(args.log_level(), "trace");
        let args = Args::try_parse_from(["watchlist-bridge", "ur1", "-q", "-v"]).unwrap();
        assert_eq!(args.log_level(), "error");
    }

    #[test]
    fn test_cli_help_flag_shows_usage() {
        let err = Args::try_parse_from(["watchlist-bridge", "--help"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayHelp);
    }
}
