//! Error types for list aggregation.

use thiserror::Error;

use crate::fetch::FetchError;
use crate::reference::ReferenceError;

/// Errors that abort an aggregation outright.
#[derive(Debug, Clone, Error)]
pub enum AggregateError {
    /// A page URL could not be built from the reference
    #[error(transparent)]
    Reference(#[from] ReferenceError),

    /// A page fetch failed
    #[error(transparent)]
    Fetch(#[from] FetchError),
}
