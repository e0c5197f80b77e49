//! Content item and content type definitions.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Pattern every primary (title) identifier must match.
#[allow(clippy::expect_used)]
static PRIMARY_ID_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^tt\d+$").expect("primary id regex is valid")); // Static pattern, safe to panic

/// Returns true if `value` is a well-formed primary identifier (`tt` followed by digits).
#[must_use]
pub fn is_primary_id(value: &str) -> bool {
    PRIMARY_ID_PATTERN.is_match(value)
}

/// Closed set of content types an item can be classified as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ContentType {
    /// Feature film or TV movie.
    Movie,
    /// Ongoing or finished TV series.
    Series,
    /// Limited/mini series.
    MiniSeries,
    /// One-off TV special.
    Special,
    /// Direct-to-video release.
    Video,
    /// Short film.
    Short,
    /// Could not be classified.
    #[default]
    Unknown,
}

impl ContentType {
    /// All variants, in declaration order.
    pub const ALL: [Self; 7] = [
        Self::Movie,
        Self::Series,
        Self::MiniSeries,
        Self::Special,
        Self::Video,
        Self::Short,
        Self::Unknown,
    ];

    /// Returns the stable string label.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Movie => "movie",
            Self::Series => "series",
            Self::MiniSeries => "miniSeries",
            Self::Special => "special",
            Self::Video => "video",
            Self::Short => "short",
            Self::Unknown => "unknown",
        }
    }

    /// Returns true for any value other than [`ContentType::Unknown`].
    #[must_use]
    pub fn is_known(self) -> bool {
        self != Self::Unknown
    }

    /// Returns true for types Sonarr can import (series and mini series).
    #[must_use]
    pub fn is_episodic(self) -> bool {
        matches!(self, Self::Series | Self::MiniSeries)
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ContentType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|ty| ty.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("invalid content type: {s}"))
    }
}

/// A single normalized record recovered from a list page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentItem {
    /// Source catalog id (`tt` followed by digits). Identity of the item.
    #[serde(rename = "imdbId")]
    pub primary_id: String,
    /// Display title.
    pub title: String,
    /// Classified content type.
    #[serde(rename = "type")]
    pub content_type: ContentType,
    /// Release year, when known.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub year: Option<u16>,
}

impl ContentItem {
    /// Creates a new item.
    #[must_use]
    pub fn new(
        primary_id: impl Into<String>,
        title: impl Into<String>,
        content_type: ContentType,
        year: Option<u16>,
    ) -> Self {
        Self {
            primary_id: primary_id.into(),
            title: title.into(),
            content_type,
            year,
        }
    }

    /// Merges facts from a later observation of the same item.
    ///
    /// A concrete content type is never replaced, and an existing year is kept.
    /// Returns true if anything changed.
    pub fn enrich(&mut self, content_type: ContentType, year: Option<u16>) -> bool {
        let mut changed = false;
        if !self.content_type.is_known() && content_type.is_known() {
            self.content_type = content_type;
            changed = true;
        }
        if self.year.is_none() && year.is_some() {
            self.year = year;
            changed = true;
        }
        changed
    }
}

impl fmt::Display for ContentItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.year {
            Some(year) => write!(
                f,
                "[{}] {} ({year}) {}",
                self.content_type, self.title, self.primary_id
            ),
            None => write!(f, "[{}] {} {}", self.content_type, self.title, self.primary_id),
        }
    }
}
