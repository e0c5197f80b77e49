//! Integration tests for identifier resolution and the service facade.
//!
//! TMDB and the list site are both served by wiremock, so these tests cover
//! the real HTTP clients end to end.

use std::sync::Arc;

use watchlist_bridge::fetch::HttpTimeouts;
use watchlist_bridge::resolver::DEFAULT_TTL;
use watchlist_bridge::{
    AggregateOptions, BridgeConfig, IdentifierResolver, ResolveError, ServiceError, TmdbClient,
    TtlCache, WatchlistService,
};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

mod support;
use support::socket_guard::start_mock_server_or_skip;

async fn mount_breaking_bad(server: &MockServer, expected_calls: u64) {
    Mock::given(method("GET"))
        .and(path("/find/tt0903747"))
        .and(query_param("api_key", "test-key"))
        .and(query_param("external_source", "imdb_id"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "movie_results": [],
            "tv_results": [{"id": 1396, "name": "Breaking Bad"}]
        })))
        .expect(expected_calls)
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/tv/1396/external_ids"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"id": 1396, "tvdb_id": 81189})),
        )
        .expect(expected_calls)
        .mount(server)
        .await;
}

fn resolver_for(server: &MockServer, api_key: Option<&str>) -> IdentifierResolver {
    let client = TmdbClient::with_base_url(server.uri(), HttpTimeouts::default()).unwrap();
    IdentifierResolver::new(
        Arc::new(client),
        api_key.map(String::from),
        Arc::new(TtlCache::new(DEFAULT_TTL)),
    )
}

#[tokio::test]
async fn test_resolution_is_cached_across_calls() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };
    mount_breaking_bad(&server, 1).await;
    let resolver = resolver_for(&server, Some("test-key"));

    let first = resolver.resolve("tt0903747").await.unwrap().unwrap();
    let second = resolver.resolve("tt0903747").await.unwrap().unwrap();

    assert_eq!(first, second);
    assert_eq!(first.secondary_id, 81189);
    assert_eq!(first.auxiliary_id, Some(1396));
    assert_eq!(first.resolved_title, "Breaking Bad");
}

#[tokio::test]
async fn test_flush_causes_fresh_lookup() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };
    mount_breaking_bad(&server, 2).await;
    let resolver = resolver_for(&server, Some("test-key"));

    resolver.resolve("tt0903747").await.unwrap();
    assert_eq!(resolver.flush_cache(), 1);
    resolver.resolve("tt0903747").await.unwrap();
}

#[tokio::test]
async fn test_unknown_title_resolves_to_none() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };
    Mock::given(method("GET"))
        .and(path("/find/tt1375666"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"tv_results": []})),
        )
        .mount(&server)
        .await;
    let resolver = resolver_for(&server, Some("test-key"));

    assert!(resolver.resolve("tt1375666").await.unwrap().is_none());
    assert!(resolver.cache().is_empty());
}

#[tokio::test]
async fn test_lookup_server_error_is_a_miss() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    let resolver = resolver_for(&server, Some("test-key"));

    assert!(resolver.resolve("tt0903747").await.unwrap().is_none());
}

#[tokio::test]
async fn test_missing_key_fails_before_any_request() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    let resolver = resolver_for(&server, None);

    let err = resolver.resolve("tt0903747").await.unwrap_err();
    assert!(matches!(err, ResolveError::Configuration { .. }));
    assert!(err.to_string().contains("TMDB_API_KEY"));
}

const LIST_PAGE: &str = r#"<html><body>
  <div class="lister-item">
    <h3 class="lister-item-header"><a href="/title/tt0903747/">Breaking Bad</a></h3>
    <span>TV Series 2008-2013</span>
  </div>
  <div class="lister-item">
    <h3 class="lister-item-header"><a href="/title/tt1375666/">Inception</a></h3>
    <span>2010 2h 28m</span>
  </div>
</body></html>"#;

fn service_config(server: &MockServer) -> BridgeConfig {
    BridgeConfig {
        tmdb_api_key: Some("test-key".to_string()),
        tmdb_base_url: server.uri(),
        list_base_url: server.uri(),
        page_delay_ms: 0,
        batch_delay_ms: 0,
        ..BridgeConfig::default()
    }
}

#[tokio::test]
async fn test_service_fetches_and_converts_over_http() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };
    Mock::given(method("GET"))
        .and(path("/list/ls055592025/"))
        .and(header("referer", "https://www.imdb.com/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(LIST_PAGE))
        .mount(&server)
        .await;
    mount_breaking_bad(&server, 1).await;

    let service = WatchlistService::new(&service_config(&server)).unwrap();
    let records = service
        .fetch_and_convert("ls055592025", AggregateOptions::all())
        .await
        .unwrap();

    assert_eq!(records.len(), 1);
    let json = serde_json::to_value(&records).unwrap();
    assert_eq!(
        json,
        serde_json::json!([{
            "tvdbId": 81189,
            "title": "Breaking Bad",
            "tmdbId": 1396,
            "imdbId": "tt0903747"
        }])
    );
}

#[tokio::test]
async fn test_service_reports_missing_list() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };
    Mock::given(method("GET"))
        .and(path("/user/ur0000001/watchlist/"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let service = WatchlistService::new(&service_config(&server)).unwrap();
    let err = service
        .fetch_list("ur0000001", AggregateOptions::all())
        .await
        .unwrap_err();

    assert!(matches!(err, ServiceError::NotFound(_)));
}
