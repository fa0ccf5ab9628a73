use geodb_sync::core::{ExternalCountryProvider, SyncContext};
use geodb_sync::utils::error::CancelReason;
use geodb_sync::{GeoDbConfig, GeoDbProvider, HttpClient, InMemoryCurrencyRepo, PageSource, SyncError};
use httpmock::prelude::*;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

fn config_for(server: &MockServer, page_limit: usize) -> GeoDbConfig {
    GeoDbConfig {
        base_url: server.base_url(),
        api_key: "test-key".to_string(),
        page_limit,
        rate_limit_sleep: Duration::ZERO,
        request_timeout_secs: 5,
        ..GeoDbConfig::default()
    }
}

fn provider_for(config: &GeoDbConfig) -> GeoDbProvider {
    GeoDbProvider::new(config, Arc::new(InMemoryCurrencyRepo::new())).unwrap()
}

#[tokio::test]
async fn test_fetch_all_pages_over_http() {
    let server = MockServer::start_async().await;

    let first = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/v1/geo/countries")
                .query_param("limit", "2")
                .query_param("offset", "0")
                .header("x-rapidapi-key", "test-key");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(json!({
                    "data": [
                        {"code": "AD", "currencyCodes": ["EUR"], "name": "Andorra", "wikiDataId": "Q228"},
                        {"code": "BE", "currencyCodes": ["EUR"], "name": "Belgium", "wikiDataId": "Q31"}
                    ],
                    "metadata": {"currentOffset": 0, "totalCount": 3}
                }));
        })
        .await;

    let second = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/v1/geo/countries")
                .query_param("limit", "2")
                .query_param("offset", "2")
                .header("x-rapidapi-key", "test-key");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(json!({
                    "data": [
                        {"code": "CA", "currencyCodes": ["CAD"], "name": "Canada", "wikiDataId": "Q16"}
                    ],
                    "metadata": {"currentOffset": 2, "totalCount": 3}
                }));
        })
        .await;

    let provider = provider_for(&config_for(&server, 2));
    let outcome = provider.fetch_all_countries(&SyncContext::new()).await;

    first.assert_async().await;
    second.assert_async().await;

    assert!(outcome.is_complete(), "unexpected error: {:?}", outcome.error);
    let codes: Vec<&str> = outcome.countries.iter().map(|c| c.code().as_str()).collect();
    assert_eq!(codes, vec!["AD", "BE", "CA"]);
    assert_eq!(outcome.countries[2].wiki_id().as_str(), "Q16");
    // Empty currency store, so every currency is a placeholder.
    assert_eq!(outcome.placeholder_count(), 3);
}

#[tokio::test]
async fn test_server_error_stops_the_fetch() {
    let server = MockServer::start_async().await;

    let failing = server
        .mock_async(|when, then| {
            when.method(GET).path("/v1/geo/countries");
            then.status(500).body("upstream exploded");
        })
        .await;

    let provider = provider_for(&config_for(&server, 10));
    let outcome = provider.fetch_all_countries(&SyncContext::new()).await;

    failing.assert_hits_async(1).await;
    assert!(outcome.countries.is_empty());

    let err = outcome.error.expect("fetch should fail");
    assert!(!err.is_cancellation());
    match err.root() {
        SyncError::Status { status, body } => {
            assert_eq!(*status, 500);
            assert!(body.contains("upstream exploded"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_malformed_json_is_a_decode_failure() {
    let server = MockServer::start_async().await;

    server
        .mock_async(|when, then| {
            when.method(GET).path("/v1/geo/countries");
            then.status(200)
                .header("Content-Type", "application/json")
                .body("{\"data\": [");
        })
        .await;

    let client = HttpClient::new(&config_for(&server, 10)).unwrap();
    let err = client
        .fetch_page(&SyncContext::new(), "/v1/geo/countries", 0, 10)
        .await
        .unwrap_err();

    assert!(matches!(err, SyncError::Decode { .. }));
}

#[tokio::test]
async fn test_missing_currency_codes_are_accepted() {
    let server = MockServer::start_async().await;

    server
        .mock_async(|when, then| {
            when.method(GET).path("/v1/geo/countries");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(json!({
                    "data": [{"code": "AQ", "name": "Antarctica"}],
                    "metadata": {"currentOffset": 0, "totalCount": 1}
                }));
        })
        .await;

    let provider = provider_for(&config_for(&server, 10));
    let outcome = provider.fetch_all_countries(&SyncContext::new()).await;

    assert!(outcome.is_complete());
    assert_eq!(outcome.countries.len(), 1);
    assert!(outcome.countries[0].currencies().is_empty());
    assert!(outcome.countries[0].wiki_id().is_empty());
}

#[tokio::test]
async fn test_total_count_fetches_one_page() {
    let server = MockServer::start_async().await;

    let page = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/v1/geo/countries")
                .query_param("offset", "0");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(json!({
                    "data": [{"code": "AD", "currencyCodes": ["EUR"], "name": "Andorra", "wikiDataId": "Q228"}],
                    "metadata": {"currentOffset": 0, "totalCount": 199}
                }));
        })
        .await;

    let provider = provider_for(&config_for(&server, 1));
    let total = provider
        .total_country_count(&SyncContext::new())
        .await
        .unwrap();

    assert_eq!(total, 199);
    page.assert_hits_async(1).await;
}

#[tokio::test]
async fn test_deadline_beats_a_slow_server() {
    let server = MockServer::start_async().await;

    server
        .mock_async(|when, then| {
            when.method(GET).path("/v1/geo/countries");
            then.status(200)
                .delay(Duration::from_secs(3))
                .header("Content-Type", "application/json")
                .json_body(json!({"data": [], "metadata": {"totalCount": 0}}));
        })
        .await;

    let provider = provider_for(&config_for(&server, 10));
    let ctx = SyncContext::with_timeout(Duration::from_millis(100));

    let started = std::time::Instant::now();
    let outcome = provider.fetch_all_countries(&ctx).await;

    assert!(started.elapsed() < Duration::from_secs(2));
    let err = outcome.error.expect("deadline should abort the fetch");
    assert!(err.is_cancellation());
    assert!(matches!(
        err.root(),
        SyncError::Cancelled {
            reason: CancelReason::DeadlineExceeded
        }
    ));
}

#[tokio::test]
async fn test_request_timeout_is_cancellation_kind() {
    let server = MockServer::start_async().await;

    server
        .mock_async(|when, then| {
            when.method(GET).path("/v1/geo/countries");
            then.status(200)
                .delay(Duration::from_secs(3))
                .json_body(json!({"data": [], "metadata": {"totalCount": 0}}));
        })
        .await;

    let mut config = config_for(&server, 10);
    config.request_timeout_secs = 1;
    let client = HttpClient::new(&config).unwrap();

    let err = client
        .fetch_page(&SyncContext::new(), "/v1/geo/countries", 0, 10)
        .await
        .unwrap_err();

    assert!(matches!(err, SyncError::Timeout));
    assert!(err.is_cancellation());
}
