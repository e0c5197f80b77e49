//! List reference parsing.
//!
//! Users point the bridge at a list in one of three ways: a watchlist owner id
//! (`ur…`), a named list id (`ls…`), or a full URL on the list site. This module
//! turns that input into a typed [`ListReference`] and builds per-page fetch URLs
//! from it. No network access happens here.
//!
//! # Example
//!
//! ```
//! use watchlist_bridge::reference::{parse_reference, ReferenceKind};
//!
//! let reference = parse_reference("ur12345678").unwrap();
//! assert_eq!(reference.kind, ReferenceKind::User);
//! assert_eq!(
//!     reference.page_url("https://www.imdb.com", 2).unwrap(),
//!     "https://www.imdb.com/user/ur12345678/watchlist/?page=2"
//! );
//! ```

mod error;

pub use error::{MAX_URL_LENGTH, ReferenceError};

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, trace};
use url::Url;

/// Domain whose URLs are accepted verbatim as list references.
pub const SOURCE_DOMAIN: &str = "imdb.com";

/// Default site root used to build URLs for short-code references.
pub const DEFAULT_LIST_BASE_URL: &str = "https://www.imdb.com";

#[allow(clippy::expect_used)]
static USER_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^ur\d+$").expect("user regex is valid")); // Static pattern, safe to panic

#[allow(clippy::expect_used)]
static LIST_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^ls\d+$").expect("list regex is valid")); // Static pattern, safe to panic

/// Kind of list a reference points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceKind {
    /// A user's watchlist (`ur…`).
    User,
    /// A named custom list (`ls…`).
    CustomList,
    /// A full URL on the source site, kept verbatim.
    RawUrl,
}

impl fmt::Display for ReferenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User => write!(f, "user"),
            Self::CustomList => write!(f, "list"),
            Self::RawUrl => write!(f, "url"),
        }
    }
}

/// A typed pointer to a remote, paged collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListReference {
    /// What the value refers to.
    pub kind: ReferenceKind,
    /// The short code, or the full URL for [`ReferenceKind::RawUrl`].
    pub value: String,
}

impl ListReference {
    /// Builds the URL for the given 1-based page.
    ///
    /// Page 1 is returned without a `page` parameter so raw URLs are fetched
    /// exactly as supplied. Later pages set `page=N`, replacing any existing value.
    ///
    /// # Errors
    ///
    /// Returns [`ReferenceError`] if a raw URL cannot be parsed for rewriting.
    pub fn page_url(&self, base_url: &str, page: u32) -> Result<String, ReferenceError> {
        let base_url = base_url.trim_end_matches('/');
        let first_page = match self.kind {
            ReferenceKind::User => format!("{base_url}/user/{}/watchlist/", self.value),
            ReferenceKind::CustomList => format!("{base_url}/list/{}/", self.value),
            ReferenceKind::RawUrl => with_scheme(&self.value),
        };

        if page <= 1 {
            return Ok(first_page);
        }

        let mut url = Url::parse(&first_page)
            .map_err(|e| ReferenceError::malformed_url(&first_page, &e.to_string()))?;
        let retained: Vec<(String, String)> = url
            .query_pairs()
            .filter(|(key, _)| key != "page")
            .map(|(key, value)| (key.into_owned(), value.into_owned()))
            .collect();
        {
            let mut pairs = url.query_pairs_mut();
            pairs.clear();
            for (key, value) in &retained {
                pairs.append_pair(key, value);
            }
            pairs.append_pair("page", &page.to_string());
        }
        trace!(url = %url, page, "built page URL");
        Ok(url.to_string())
    }

    /// Returns the page number embedded in a raw URL's query, if any.
    #[must_use]
    pub fn embedded_page(&self) -> Option<u32> {
        if self.kind != ReferenceKind::RawUrl {
            return None;
        }
        let url = Url::parse(&with_scheme(&self.value)).ok()?;
        url.query_pairs()
            .find(|(key, _)| key == "page")
            .and_then(|(_, value)| value.parse().ok())
            .filter(|page| *page >= 1)
    }
}

impl fmt::Display for ListReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.value)
    }
}

fn with_scheme(raw: &str) -> String {
    let has_scheme = ["http://", "https://"].iter().any(|scheme| {
        raw.get(..scheme.len())
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case(scheme))
    });
    if has_scheme {
        raw.to_string()
    } else {
        format!("https://{raw}")
    }
}

/// Parses a user-supplied reference into a [`ListReference`].
///
/// Rules, in order:
/// 1. Anything mentioning the source domain is kept verbatim as a raw URL
///    (query parameters included).
/// 2. `ur` followed by digits is a user watchlist.
/// 3. `ls` followed by digits is a custom list.
///
/// # Errors
///
/// Returns [`ReferenceError::InvalidReference`] for any other input.
#[tracing::instrument(skip(input), fields(input_len = input.len()))]
pub fn parse_reference(input: &str) -> Result<ListReference, ReferenceError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(ReferenceError::empty());
    }

    if trimmed.to_ascii_lowercase().contains(SOURCE_DOMAIN) {
        if trimmed.len() > MAX_URL_LENGTH {
            return Err(ReferenceError::too_long(trimmed));
        }
        debug!(url = %trimmed, "reference is a raw URL");
        return Ok(ListReference {
            kind: ReferenceKind::RawUrl,
            value: trimmed.to_string(),
        });
    }

    let kind = if USER_PATTERN.is_match(trimmed) {
        ReferenceKind::User
    } else if LIST_PATTERN.is_match(trimmed) {
        ReferenceKind::CustomList
    } else {
        debug!(input = %trimmed, "reference matched no known shape");
        return Err(ReferenceError::unrecognized(trimmed));
    };

    Ok(ListReference {
        kind,
        value: trimmed.to_string(),
    })
}
