//! Error types for page fetching.

use thiserror::Error;

/// Errors that can occur while fetching a list page.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    /// The list does not exist or is private (HTTP 404)
    #[error("list not found at {url}\n  Suggestion: Check the id and make sure the list is public")]
    NotFound {
        /// The URL that returned 404
        url: String,
    },

    /// The list site answered with a non-success status other than 404
    #[error("list site returned HTTP {status} for {url}\n  Suggestion: Try again later")]
    Upstream {
        /// The URL that failed
        url: String,
        /// The HTTP status code
        status: u16,
    },

    /// Transport-level failure (DNS, connect, TLS, timeout, body read)
    #[error("network error fetching {url}: {reason}\n  Suggestion: Check your network connection")]
    Network {
        /// The URL that failed
        url: String,
        /// Underlying error message
        reason: String,
    },

    /// The HTTP client could not be constructed
    #[error("HTTP client construction failed: {reason}")]
    ClientBuild {
        /// Underlying error message
        reason: String,
    },
}

impl FetchError {
    /// Creates a `NotFound` error.
    #[must_use]
    pub fn not_found(url: &str) -> Self {
        Self::NotFound {
            url: url.to_string(),
        }
    }

    /// Creates an `Upstream` error.
    #[must_use]
    pub fn upstream(url: &str, status: u16) -> Self {
        Self::Upstream {
            url: url.to_string(),
            status,
        }
    }

    /// Creates a `Network` error from any displayable cause.
    #[must_use]
    pub fn network(url: &str, cause: &dyn std::fmt::Display) -> Self {
        Self::Network {
            url: url.to_string(),
            reason: cause.to_string(),
        }
    }

    /// Creates a `ClientBuild` error.
    #[must_use]
    pub fn client_build(error: reqwest::Error) -> Self {
        Self::ClientBuild {
            reason: error.to_string(),
        }
    }
}
