//! Error types for list reference parsing.

use thiserror::Error;

/// Maximum raw URL length to accept (standard browser limit).
pub const MAX_URL_LENGTH: usize = 2000;

/// Errors that can occur while parsing a list reference.
#[derive(Debug, Clone, Error)]
pub enum ReferenceError {
    /// Input is neither a list URL nor a recognized short code
    #[error("invalid list reference '{input}': {reason}\n  Suggestion: {suggestion}")]
    InvalidReference {
        /// The input that failed to parse
        input: String,
        /// Why the input was rejected
        reason: String,
        /// How to fix the issue
        suggestion: String,
    },
}

impl ReferenceError {
    /// Creates an `InvalidReference` error for input matching no known shape.
    #[must_use]
    pub fn unrecognized(input: &str) -> Self {
        Self::InvalidReference {
            input: input.to_string(),
            reason: "not a list URL, user id (ur…) or list id (ls…)".to_string(),
            suggestion: "Pass a watchlist owner like 'ur12345678', a list like 'ls012345678', or a full list URL".to_string(),
        }
    }

    /// Creates an `InvalidReference` error for empty input.
    #[must_use]
    pub fn empty() -> Self {
        Self::InvalidReference {
            input: String::new(),
            reason: "reference is empty".to_string(),
            suggestion: "Provide a user id, list id or list URL".to_string(),
        }
    }

    /// Creates an `InvalidReference` error for an oversized URL.
    #[must_use]
    pub fn too_long(input: &str) -> Self {
        Self::InvalidReference {
            input: input.chars().take(50).collect(),
            reason: format!("URL too long ({} chars, max {MAX_URL_LENGTH})", input.len()),
            suggestion: "Check for extraneous content pasted with the URL".to_string(),
        }
    }

    /// Creates an `InvalidReference` error for a URL the `url` crate rejects.
    #[must_use]
    pub fn malformed_url(input: &str, parse_error: &str) -> Self {
        Self::InvalidReference {
            input: input.to_string(),
            reason: parse_error.to_string(),
            suggestion: "Check the URL format and try again".to_string(),
        }
    }
}
