//! Full pipeline: router, cache-aside proxy and DaData client against a mock provider.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use geoproxy_api::{ApiServer, AppConfig, CacheBackend};
use geoproxy_cache::RedisConfig;

async fn server_for(mock: &MockServer) -> ApiServer {
    let mut config = AppConfig::new("test_key");
    config.upstream = config.upstream.with_base_url(&mock.uri());
    config.cache_backend = CacheBackend::Memory;
    ApiServer::build(config).await.unwrap()
}

fn moscow_suggestion() -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "suggestions": [{ "data": {
            "country": "Russia", "city": "Moscow", "street": "Tverskaya 1",
            "geo_lat": "55.76", "geo_lon": "37.60"
        }}]
    }))
}

fn search(query: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/address/search")
        .header("content-type", "application/json")
        .body(Body::from(json!({ "query": query }).to_string()))
        .unwrap()
}

async fn read_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_second_identical_search_skips_provider() {
    let mock = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/suggest/address"))
        .respond_with(moscow_suggestion())
        .expect(1)
        .mount(&mock)
        .await;

    let app = server_for(&mock).await.router();

    let first = app.clone().oneshot(search("Moscow, Tverskaya 1")).await.unwrap();
    assert_eq!(first.status(), StatusCode::OK);
    let first = read_json(first).await;

    let second = app.oneshot(search("Moscow, Tverskaya 1")).await.unwrap();
    assert_eq!(second.status(), StatusCode::OK);
    assert_eq!(read_json(second).await, first);
    assert_eq!(first["addresses"][0]["street"], "Tverskaya 1");
}

#[tokio::test]
async fn test_empty_provider_answer_is_404_and_not_cached() {
    let mock = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "suggestions": [] })))
        .expect(2)
        .mount(&mock)
        .await;

    let app = server_for(&mock).await.router();

    for _ in 0..2 {
        let response = app.clone().oneshot(search("Atlantis")).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}

#[tokio::test]
async fn test_provider_outage_is_500() {
    let mock = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&mock)
        .await;

    let app = server_for(&mock).await.router();

    let response = app.oneshot(search("Tverskaya")).await.unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(read_json(response).await["error"]["code"], "INTERNAL_ERROR");
}

#[tokio::test]
async fn test_unreachable_redis_degrades_to_provider() {
    let mock = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/suggest/address"))
        .respond_with(moscow_suggestion())
        .expect(2)
        .mount(&mock)
        .await;

    let mut config = AppConfig::new("test_key");
    config.upstream = config.upstream.with_base_url(&mock.uri());
    config.cache_backend = CacheBackend::Redis;
    config.redis = RedisConfig::new("redis://127.0.0.1:1").with_timeout_ms(200);
    let app = ApiServer::build(config).await.unwrap().router();

    for _ in 0..2 {
        let response = app.clone().oneshot(search("Moscow, Tverskaya 1")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(read_json(response).await["addresses"][0]["city"], "Moscow");
    }

    let health = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let health = read_json(health).await;
    assert_eq!(health["cache_backend"], "redis");
    assert_eq!(health["cache_connected"], false);
}
