//! Shared User-Agent strings for page and lookup HTTP clients.

/// Project URL for User-Agent identification on API traffic.
const PROJECT_UA_URL: &str = "https://github.com/fierce/watchlist-bridge";

/// Browser identity sent to the list site, which serves degraded markup to unknown agents.
const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

/// User-Agent for list page requests (browser-like).
#[must_use]
pub(crate) fn page_user_agent() -> &'static str {
    BROWSER_USER_AGENT
}

/// User-Agent for lookup API requests (identifies the tool).
#[must_use]
pub(crate) fn lookup_user_agent() -> String {
    let version = env!("CARGO_PKG_VERSION");
    format!("watchlist-bridge/{version} (+{PROJECT_UA_URL})")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_user_agent_carries_version_and_url() {
        let ua = lookup_user_agent();
        assert!(ua.starts_with("watchlist-bridge/"));
        assert!(ua.contains(env!("CARGO_PKG_VERSION")));
        assert!(ua.contains(PROJECT_UA_URL));
    }

    #[test]
    fn test_page_user_agent_looks_like_a_browser() {
        let ua = page_user_agent();
        assert!(ua.starts_with("Mozilla/5.0"));
        assert!(!ua.contains("watchlist-bridge"));
    }
}
