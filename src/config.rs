//! Runtime configuration loaded from the environment.
//!
//! Every field has a default; environment variables override defaults and
//! command-line flags override both. A missing API key is allowed at startup
//! and only fails conversions.

use std::env;
use std::time::Duration;

use thiserror::Error;

use crate::fetch::{DEFAULT_CONNECT_TIMEOUT_SECS, DEFAULT_READ_TIMEOUT_SECS, HttpTimeouts};
use crate::reference::DEFAULT_LIST_BASE_URL;
use crate::resolver::{API_KEY_ENV, DEFAULT_TMDB_BASE_URL};

/// Override for the TMDB API base URL.
pub const TMDB_BASE_URL_ENV: &str = "WATCHLIST_TMDB_BASE_URL";
/// Override for the list site base URL.
pub const LIST_BASE_URL_ENV: &str = "WATCHLIST_LIST_BASE_URL";
/// Pause between page fetches in milliseconds.
pub const PAGE_DELAY_ENV: &str = "WATCHLIST_PAGE_DELAY_MS";
/// Pause between resolution chunks in milliseconds.
pub const BATCH_DELAY_ENV: &str = "WATCHLIST_BATCH_DELAY_MS";
/// Resolution cache lifetime in seconds.
pub const CACHE_TTL_ENV: &str = "WATCHLIST_CACHE_TTL_SECS";
/// HTTP connect timeout in seconds.
pub const CONNECT_TIMEOUT_ENV: &str = "WATCHLIST_CONNECT_TIMEOUT_SECS";
/// HTTP request timeout in seconds.
pub const READ_TIMEOUT_ENV: &str = "WATCHLIST_READ_TIMEOUT_SECS";

const MAX_DELAY_MS: u64 = 60_000;
const MAX_TIMEOUT_SECS: u64 = 3600;
const MAX_SWEEP_INTERVAL: Duration = Duration::from_secs(3600);

/// Errors raised while loading or validating configuration.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A value is unparsable or out of range
    #[error("Invalid config value for `{field}`: {value}. Expected {expected}")]
    InvalidValue {
        /// The offending field or variable name
        field: String,
        /// The rejected value
        value: String,
        /// What would have been accepted
        expected: String,
    },
}

impl ConfigError {
    fn invalid(field: &str, value: impl ToString, expected: &str) -> Self {
        Self::InvalidValue {
            field: field.to_string(),
            value: value.to_string(),
            expected: expected.to_string(),
        }
    }
}

/// Settings for the whole pipeline.
#[derive(Clone, PartialEq, Eq)]
pub struct BridgeConfig {
    /// TMDB API key; conversions fail without one.
    pub tmdb_api_key: Option<String>,
    /// TMDB API base URL.
    pub tmdb_base_url: String,
    /// List site base URL.
    pub list_base_url: String,
    /// Pause between page fetches.
    pub page_delay_ms: u64,
    /// Pause between resolution chunks.
    pub batch_delay_ms: u64,
    /// Resolution cache lifetime.
    pub cache_ttl_secs: u64,
    /// HTTP connect timeout.
    pub connect_timeout_secs: u64,
    /// HTTP request timeout.
    pub read_timeout_secs: u64,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            tmdb_api_key: None,
            tmdb_base_url: DEFAULT_TMDB_BASE_URL.to_string(),
            list_base_url: DEFAULT_LIST_BASE_URL.to_string(),
            page_delay_ms: 500,
            batch_delay_ms: 250,
            cache_ttl_secs: 24 * 60 * 60,
            connect_timeout_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
            read_timeout_secs: DEFAULT_READ_TIMEOUT_SECS,
        }
    }
}

impl std::fmt::Debug for BridgeConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BridgeConfig")
            .field("tmdb_api_key", &self.tmdb_api_key.as_ref().map(|_| "<redacted>"))
            .field("tmdb_base_url", &self.tmdb_base_url)
            .field("list_base_url", &self.list_base_url)
            .field("page_delay_ms", &self.page_delay_ms)
            .field("batch_delay_ms", &self.batch_delay_ms)
            .field("cache_ttl_secs", &self.cache_ttl_secs)
            .field("connect_timeout_secs", &self.connect_timeout_secs)
            .field("read_timeout_secs", &self.read_timeout_secs)
            .finish()
    }
}

impl BridgeConfig {
    /// Loads configuration from process environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a variable is set but unparsable or out of range.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Loads configuration through an arbitrary variable lookup.
    ///
    /// Blank values are treated as unset.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a value is unparsable or out of range.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };
        let get_u64 = |name: &str| -> Result<Option<u64>, ConfigError> {
            get(name)
                .map(|raw| {
                    raw.parse::<u64>()
                        .map_err(|_| ConfigError::invalid(name, &raw, "a non-negative integer"))
                })
                .transpose()
        };

        let mut config = Self::default();
        config.tmdb_api_key = get(API_KEY_ENV);
        if let Some(url) = get(TMDB_BASE_URL_ENV) {
            config.tmdb_base_url = url;
        }
        if let Some(url) = get(LIST_BASE_URL_ENV) {
            config.list_base_url = url;
        }
        if let Some(ms) = get_u64(PAGE_DELAY_ENV)? {
            config.page_delay_ms = ms;
        }
        if let Some(ms) = get_u64(BATCH_DELAY_ENV)? {
            config.batch_delay_ms = ms;
        }
        if let Some(secs) = get_u64(CACHE_TTL_ENV)? {
            config.cache_ttl_secs = secs;
        }
        if let Some(secs) = get_u64(CONNECT_TIMEOUT_ENV)? {
            config.connect_timeout_secs = secs;
        }
        if let Some(secs) = get_u64(READ_TIMEOUT_ENV)? {
            config.read_timeout_secs = secs;
        }

        config.validate()?;
        Ok(config)
    }

    /// Range-checks every numeric setting.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] for the first value out of range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_delay_ms("page_delay_ms", self.page_delay_ms)?;
        validate_delay_ms("batch_delay_ms", self.batch_delay_ms)?;
        validate_timeout_secs("connect_timeout_secs", self.connect_timeout_secs)?;
        validate_timeout_secs("read_timeout_secs", self.read_timeout_secs)?;
        if self.cache_ttl_secs == 0 {
            return Err(ConfigError::invalid("cache_ttl_secs", 0, "at least 1"));
        }
        for (field, url) in [
            ("tmdb_base_url", &self.tmdb_base_url),
            ("list_base_url", &self.list_base_url),
        ] {
            if url::Url::parse(url).is_err() {
                return Err(ConfigError::invalid(field, url, "an absolute URL"));
            }
        }
        Ok(())
    }

    /// Pause between page fetches.
    #[must_use]
    pub fn page_delay(&self) -> Duration {
        Duration::from_millis(self.page_delay_ms)
    }

    /// Pause between resolution chunks.
    #[must_use]
    pub fn batch_delay(&self) -> Duration {
        Duration::from_millis(self.batch_delay_ms)
    }

    /// Resolution cache lifetime.
    #[must_use]
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    /// How often a long-lived host should purge expired cache entries.
    ///
    /// One TTL, capped at an hour, so no entry outlives its expiry by more than that.
    #[must_use]
    pub fn cache_sweep_interval(&self) -> Duration {
        self.cache_ttl().min(MAX_SWEEP_INTERVAL)
    }

    /// HTTP timeouts for every client.
    #[must_use]
    pub fn timeouts(&self) -> HttpTimeouts {
        HttpTimeouts {
            connect_timeout_secs: self.connect_timeout_secs,
            read_timeout_secs: self.read_timeout_secs,
        }
    }
}

fn validate_delay_ms(field: &str, value: u64) -> Result<(), ConfigError> {
    if value > MAX_DELAY_MS {
        return Err(ConfigError::invalid(field, value, "range 0..=60000"));
    }
    Ok(())
}

fn validate_timeout_secs(field: &str, value: u64) -> Result<(), ConfigError> {
    if !(1..=MAX_TIMEOUT_SECS).contains(&value) {
        return Err(ConfigError::invalid(field, value, "range 1..=3600"));
    }
    Ok(())
}
