//! Content-type classification from free-text metadata.
//!
//! The rendered text around a list item mixes type labels ("TV Series"),
//! runtimes ("2h 10m"), episode counts ("62 eps") and season counts. Rules are
//! evaluated in order and the first match wins.

use std::sync::LazyLock;

use regex::Regex;

use crate::item::ContentType;

#[allow(clippy::expect_used)]
static EPISODE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\d+\s*eps?\b|\bepisodes?\b").expect("episode regex is valid") // Static pattern, safe to panic
});

#[allow(clippy::expect_used)]
static SEASON_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bseasons?\b").expect("season regex is valid")); // Static pattern, safe to panic

#[allow(clippy::expect_used)]
static DURATION_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+h(\s*\d+m)?").expect("duration regex is valid")); // Static pattern, safe to panic

type Rule = (fn(&str) -> bool, ContentType);

/// Ordered classification rules over lowercased text.
const RULES: [Rule; 8] = [
    (is_series_label, ContentType::Series),
    (is_mini_series_label, ContentType::MiniSeries),
    (is_special_label, ContentType::Special),
    (is_video_label, ContentType::Video),
    (is_short_label, ContentType::Short),
    (has_episode_count, ContentType::Series),
    (has_season_count, ContentType::Series),
    (is_movie_runtime, ContentType::Movie),
];

fn is_series_label(text: &str) -> bool {
    text.contains("tv series")
}

fn is_mini_series_label(text: &str) -> bool {
    text.contains("tv mini series") || text.contains("mini series") || text.contains("mini-series")
}

fn is_special_label(text: &str) -> bool {
    text.contains("tv special")
}

fn is_video_label(text: &str) -> bool {
    text.contains("video")
}

fn is_short_label(text: &str) -> bool {
    text.contains("short")
}

fn has_episode_count(text: &str) -> bool {
    EPISODE_PATTERN.is_match(text)
}

fn has_season_count(text: &str) -> bool {
    SEASON_PATTERN.is_match(text)
}

fn is_movie_runtime(text: &str) -> bool {
    DURATION_PATTERN.is_match(text) && !is_episodic(text)
}

/// Episode-or-season predicate shared by the series rules and the movie exclusion.
fn is_episodic(text: &str) -> bool {
    has_episode_count(text) || has_season_count(text)
}

/// Classifies a free-text metadata blob into a [`ContentType`].
///
/// # Example
///
/// ```
/// use watchlist_bridge::{classify_text, ContentType};
///
/// assert_eq!(classify_text("2008–2013 TV Series 62 eps"), ContentType::Series);
/// assert_eq!(classify_text("2010 2h 28m PG-13"), ContentType::Movie);
/// ```
#[must_use]
pub fn classify_text(text: &str) -> ContentType {
    let lowered = text.to_lowercase();
    RULES
        .iter()
        .find(|(matches, _)| matches(&lowered))
        .map_or(ContentType::Unknown, |(_, content_type)| *content_type)
}

/// Maps a structured type hint (e.g. `tvMiniSeries`, `TV Series`, `movie`) to a [`ContentType`].
///
/// A mini-series hint beats a plain series hint.
#[must_use]
pub(crate) fn classify_type_hint(hint: &str) -> ContentType {
    let hint = hint.to_lowercase();
    if hint.contains("mini") && hint.contains("series") {
        ContentType::MiniSeries
    } else if hint.contains("series") {
        ContentType::Series
    } else if hint.contains("movie") || hint.contains("feature") {
        ContentType::Movie
    } else if hint.contains("special") {
        ContentType::Special
    } else if hint.contains("video") {
        ContentType::Video
    } else if hint.contains("short") {
        ContentType::Short
    } else {
        ContentType::Unknown
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_type_labels() {
        assert_eq!(classify_text("TV Series"), ContentType::Series);
        assert_eq!(classify_text("TV Mini Series"), ContentType::MiniSeries);
        assert_eq!(classify_text("a mini-series event"), ContentType::MiniSeries);
        assert_eq!(classify_text("TV Special 2019"), ContentType::Special);
        assert_eq!(classify_text("Video 2004"), ContentType::Video);
        assert_eq!(classify_text("Short 1995 7m"), ContentType::Short);
    }

    #[test]
    fn test_classify_episode_counts() {
        assert_eq!(classify_text("2016 10 eps"), ContentType::Series);
        assert_eq!(classify_text("1 ep"), ContentType::Series);
        assert_eq!(classify_text("Episode guide"), ContentType::Series);
    }

    #[test]
    fn test_classify_season_counts() {
        assert_eq!(classify_text("2011–2019 8 seasons"), ContentType::Series);
        assert_eq!(classify_text("1 Season"), ContentType::Series);
    }

    #[test]
    fn test_classify_duration_is_movie() {
        assert_eq!(classify_text("2010 2h 28m PG-13"), ContentType::Movie);
        assert_eq!(classify_text("1h"), ContentType::Movie);
    }

    #[test]
    fn test_episode_count_beats_duration() {
        assert_eq!(classify_text("2019 1h 5m 12 eps"), ContentType::Series);
        assert_eq!(classify_text("45m 3 seasons 1h"), ContentType::Series);
    }

    #[test]
    fn test_label_precedence_is_ordered() {
        // "tv series" is checked before "video" and "short"
        assert_eq!(classify_text("TV Series short video"), ContentType::Series);
        assert_eq!(classify_text("video short"), ContentType::Video);
    }

    #[test]
    fn test_classify_unknown() {
        assert_eq!(classify_text(""), ContentType::Unknown);
        assert_eq!(classify_text("2004 Rated R"), ContentType::Unknown);
    }

    #[test]
    fn test_classify_type_hint() {
        assert_eq!(classify_type_hint("tvMiniSeries"), ContentType::MiniSeries);
        assert_eq!(classify_type_hint("TV Series"), ContentType::Series);
        assert_eq!(classify_type_hint("movie"), ContentType::Movie);
        assert_eq!(classify_type_hint("tvMovie"), ContentType::Movie);
        assert_eq!(classify_type_hint("Feature Film"), ContentType::Movie);
        assert_eq!(classify_type_hint("tvSpecial"), ContentType::Special);
        assert_eq!(classify_type_hint("video"), ContentType::Video);
        assert_eq!(classify_type_hint("short"), ContentType::Short);
        assert_eq!(classify_type_hint("podcastEpisode"), ContentType::Unknown);
    }
}
