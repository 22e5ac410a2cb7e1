//! DaData client against a mock provider.

use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use geoproxy_core::{AddressLookup, AddressRecord, GeoError, LookupRequest};
use geoproxy_upstream::{DaDataClient, UpstreamConfig};

fn client_for(server: &MockServer) -> DaDataClient {
    DaDataClient::with_config(UpstreamConfig::new("test_key").with_base_url(&server.uri())).unwrap()
}

fn tverskaya_response() -> serde_json::Value {
    json!({
        "suggestions": [{
            "value": "Moscow, Tverskaya 1",
            "data": {
                "country": "Russia",
                "city": "Moscow",
                "street": "Tverskaya 1",
                "geo_lat": "55.76",
                "geo_lon": "37.60"
            }
        }]
    })
}

#[tokio::test]
async fn test_search_posts_query_with_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/suggest/address"))
        .and(header("Authorization", "Token test_key"))
        .and(body_json(json!({ "query": "Moscow, Tverskaya 1" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(tverskaya_response()))
        .expect(1)
        .mount(&server)
        .await;

    let result = client_for(&server)
        .lookup(&LookupRequest::text("Moscow, Tverskaya 1"))
        .await
        .unwrap();

    assert_eq!(
        result.records(),
        &[AddressRecord::new("Tverskaya 1", "Moscow", "Russia", "55.76", "37.60")]
    );
}

#[tokio::test]
async fn test_geocode_posts_coordinates_as_strings() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/geolocate/address"))
        .and(body_json(json!({ "lat": "55.76", "lon": "37.60" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(tverskaya_response()))
        .expect(1)
        .mount(&server)
        .await;

    let result = client_for(&server)
        .lookup(&LookupRequest::coordinates("55.76", "37.60"))
        .await
        .unwrap();

    assert_eq!(result.best().latitude, "55.76");
    assert_eq!(result.best().longitude, "37.60");
}

#[tokio::test]
async fn test_max_results_sent_as_count() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/suggest/address"))
        .and(body_json(json!({ "query": "Tverskaya", "count": 3 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(tverskaya_response()))
        .expect(1)
        .mount(&server)
        .await;

    let config = UpstreamConfig::new("test_key")
        .with_base_url(&server.uri())
        .with_max_results(3);
    let client = DaDataClient::with_config(config).unwrap();

    assert!(client.lookup(&LookupRequest::text("Tverskaya")).await.is_ok());
}

#[tokio::test]
async fn test_preserves_provider_rank_order() {
    let server = MockServer::start().await;
    let body = json!({
        "suggestions": [
            { "data": { "street": "first", "geo_lat": "1", "geo_lon": "1" } },
            { "data": { "street": "second", "geo_lat": "2", "geo_lon": "2" } },
            { "data": { "street": "third", "geo_lat": "3", "geo_lon": "3" } }
        ]
    });
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(&server)
        .await;

    let result = client_for(&server)
        .lookup(&LookupRequest::text("anything"))
        .await
        .unwrap();

    let streets: Vec<_> = result.records().iter().map(|r| r.street.as_str()).collect();
    assert_eq!(streets, ["first", "second", "third"]);
}

#[tokio::test]
async fn test_empty_suggestions_is_no_results() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "suggestions": [] })))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .lookup(&LookupRequest::text("Atlantis"))
        .await
        .unwrap_err();

    assert!(matches!(err, GeoError::NoResults));
}

#[tokio::test]
async fn test_error_status_is_transport_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(403).set_body_string("Forbidden"))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .lookup(&LookupRequest::text("Tverskaya"))
        .await
        .unwrap_err();

    match err {
        GeoError::Transport(msg) => assert!(msg.contains("403")),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_malformed_body_is_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .lookup(&LookupRequest::text("Tverskaya"))
        .await
        .unwrap_err();

    assert!(matches!(err, GeoError::Decode(_)));
}

#[tokio::test]
async fn test_missing_suggestions_is_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "family": "CLIENT_ERROR" })))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .lookup(&LookupRequest::text("Tverskaya"))
        .await
        .unwrap_err();

    assert!(matches!(err, GeoError::Decode(_)));
}

#[tokio::test]
async fn test_slow_provider_times_out_as_transport_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(tverskaya_response())
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let config = UpstreamConfig::new("test_key")
        .with_base_url(&server.uri())
        .with_timeout_seconds(1);
    let client = DaDataClient::with_config(config).unwrap();

    let err = client
        .lookup(&LookupRequest::text("Tverskaya"))
        .await
        .unwrap_err();

    match err {
        GeoError::Transport(msg) => assert!(msg.contains("timed out")),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_unreachable_provider_is_transport_error() {
    let config = UpstreamConfig::new("test_key").with_base_url("http://127.0.0.1:1");
    let client = DaDataClient::with_config(config).unwrap();

    let err = client
        .lookup(&LookupRequest::text("Tverskaya"))
        .await
        .unwrap_err();

    assert!(matches!(err, GeoError::Transport(_)));
}
