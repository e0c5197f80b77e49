//! Error types for identifier resolution.
//!
//! A lookup that finds nothing is not an error: it surfaces as `Ok(None)`.
//! Only conditions that make every lookup impossible are reported here.

use thiserror::Error;

/// Environment variable the lookup credential is read from.
pub const API_KEY_ENV: &str = "TMDB_API_KEY";

/// Errors that can occur during identifier resolution.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ResolveError {
    /// The lookup service credential is missing
    #[error("configuration error: {reason}\n  Suggestion: {suggestion}")]
    Configuration {
        /// What is misconfigured
        reason: String,
        /// How to fix the issue
        suggestion: String,
    },

    /// The lookup HTTP client could not be constructed
    #[error("lookup client construction failed: {reason}")]
    ClientBuild {
        /// Underlying error message
        reason: String,
    },
}

impl ResolveError {
    /// Creates a `Configuration` error for a missing API key.
    #[must_use]
    pub fn missing_credential() -> Self {
        Self::Configuration {
            reason: "lookup API key is not configured".to_string(),
            suggestion: format!("Set {API_KEY_ENV} or pass --tmdb-api-key"),
        }
    }

    /// Creates a `ClientBuild` error.
    #[must_use]
    pub fn client_build(error: &reqwest::Error) -> Self {
        Self::ClientBuild {
            reason: error.to_string(),
        }
    }

    /// Returns true for errors that make every further resolution fail too.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Configuration { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_credential_message() {
        let err = ResolveError::missing_credential();
        let msg = err.to_string();
        assert!(msg.contains("API key"));
        assert!(msg.contains(API_KEY_ENV), "suggestion should name the variable");
        assert!(err.is_fatal());
    }
}
