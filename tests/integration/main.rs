//! Integration tests for the relay against stand-in providers.
//!
//! Each test starts a wiremock server in place of OpenWeather/TomTom and
//! drives the real router with `oneshot`. Mocks with `.expect(n)` are
//! verified when the mock server is dropped.

use std::time::{Duration, Instant};

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use pretty_assertions::assert_eq;
use tower::ServiceExt;
use wiremock::matchers::{method, path, query_param};
use metrics_exporter_prometheus::PrometheusBuilder;
use wiremock::{Mock, MockServer, ResponseTemplate};

use weather_traffic_relay::api::{create_router, AppState};
use weather_traffic_relay::config::Config;
use weather_traffic_relay::provider::RelayClient;
use weather_traffic_relay::ConfigError;

const WEATHER_PATH: &str = "/data/2.5/weather";
const TRAFFIC_PATH: &str = "/traffic/services/4/flowSegmentData/absolute/10/json";

/// Build a config pointing both providers at `server`.
fn test_config(server: &MockServer, timeout_ms: u64) -> Config {
    Config::from_vars([
        ("OPENWEATHER_API_KEY", "ow-test-key".to_string()),
        ("TOMTOM_API_KEY", "tt-test-key".to_string()),
        ("OPENWEATHER_URL", format!("{}{}", server.uri(), WEATHER_PATH)),
        ("TOMTOM_URL", format!("{}{}", server.uri(), TRAFFIC_PATH)),
        ("UPSTREAM_TIMEOUT_MS", timeout_ms.to_string()),
    ])
    .unwrap()
}

/// Send a GET through the router and return status and raw body.
async fn get(config: &Config, uri: &str) -> (StatusCode, Vec<u8>) {
    let state = AppState::new(RelayClient::new(config).unwrap());
    let response = create_router(state)
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, body.to_vec())
}

fn detail(body: &[u8]) -> String {
    let value: serde_json::Value = serde_json::from_slice(body).unwrap();
    value["detail"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn weather_returns_provider_body_verbatim() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(WEATHER_PATH))
        .and(query_param("lat", "51.5"))
        .and(query_param("lon", "-0.12"))
        .and(query_param("appid", "ow-test-key"))
        .and(query_param("units", "metric"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(r#"{"temp":15.2}"#, "application/json"))
        .expect(1)
        .mount(&server)
        .await;

    let config = test_config(&server, 5_000);
    let (status, body) = get(&config, "/weather?lat=51.5&lon=-0.12").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(String::from_utf8(body).unwrap(), r#"{"temp":15.2}"#);
}

#[tokio::test]
async fn weather_body_keeps_provider_key_order() {
    let server = MockServer::start().await;
    let provider_body = r#"{"name":"London","main":{"temp":15.2,"humidity":72},"cod":200}"#;
    Mock::given(method("GET"))
        .and(path(WEATHER_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_raw(provider_body, "application/json"))
        .expect(1)
        .mount(&server)
        .await;

    let config = test_config(&server, 5_000);
    let (status, body) = get(&config, "/weather?lat=51.5&lon=-0.12").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(String::from_utf8(body).unwrap(), provider_body);
}

#[tokio::test]
async fn traffic_sends_combined_point() {
    let server = MockServer::start().await;
    let provider_body = r#"{"flowSegmentData":{"currentSpeed":41,"freeFlowSpeed":50}}"#;
    Mock::given(method("GET"))
        .and(path(TRAFFIC_PATH))
        .and(query_param("point", "52.41072,4.84239"))
        .and(query_param("key", "tt-test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(provider_body, "application/json"))
        .expect(1)
        .mount(&server)
        .await;

    let config = test_config(&server, 5_000);
    let (status, body) = get(&config, "/traffic?lat=52.41072&lon=4.84239").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(String::from_utf8(body).unwrap(), provider_body);
}

#[tokio::test]
async fn weather_missing_lon_makes_no_outbound_call() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("{}", "application/json"))
        .expect(0)
        .mount(&server)
        .await;

    let config = test_config(&server, 5_000);
    let (status, _) = get(&config, "/weather?lat=51.5").await;

    assert!(status.is_client_error());
    assert_eq!(server.received_requests().await.unwrap().len(), 0);
}

#[tokio::test]
async fn traffic_non_numeric_coordinate_makes_no_outbound_call() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("{}", "application/json"))
        .expect(0)
        .mount(&server)
        .await;

    let config = test_config(&server, 5_000);
    let (status, body) = get(&config, "/traffic?lat=abc&lon=4.8").await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(detail(&body).starts_with("invalid query"));
}

#[tokio::test]
async fn weather_provider_404_is_passed_through() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(WEATHER_PATH))
        .respond_with(
            ResponseTemplate::new(404).set_body_raw(r#"{"error":"not found"}"#, "application/json"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let config = test_config(&server, 5_000);
    let (status, body) = get(&config, "/weather?lat=51.5&lon=-0.12").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(detail(&body), r#"{"error":"not found"}"#);
}

#[tokio::test]
async fn traffic_provider_403_is_passed_through() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(TRAFFIC_PATH))
        .respond_with(ResponseTemplate::new(403).set_body_string("Developer Inactive"))
        .expect(1)
        .mount(&server)
        .await;

    let config = test_config(&server, 5_000);
    let (status, body) = get(&config, "/traffic?lat=1&lon=2").await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(detail(&body), "Developer Inactive");
}

#[tokio::test]
async fn hanging_traffic_provider_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(TRAFFIC_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw("{}", "application/json")
                .set_delay(Duration::from_secs(3)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let config = test_config(&server, 200);
    let started = Instant::now();
    let (status, body) = get(&config, "/traffic?lat=1&lon=2").await;

    assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
    assert!(started.elapsed() < Duration::from_secs(2));
    assert!(detail(&body).contains("200ms"));
}

#[tokio::test]
async fn non_json_success_body_is_bad_gateway() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(WEATHER_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .expect(1)
        .mount(&server)
        .await;

    let config = test_config(&server, 5_000);
    let (status, _) = get(&config, "/weather?lat=1&lon=2").await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn unreachable_provider_is_bad_gateway_without_leaking_key() {
    let config = Config::from_vars([
        ("OPENWEATHER_API_KEY", "ow-test-key"),
        ("TOMTOM_API_KEY", "tt-test-key"),
        ("OPENWEATHER_URL", "http://127.0.0.1:1/data/2.5/weather"),
    ])
    .unwrap();

    let (status, body) = get(&config, "/weather?lat=1&lon=2").await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(!detail(&body).contains("ow-test-key"));
}

#[tokio::test]
async fn healthz_never_calls_providers() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let config = test_config(&server, 5_000);
    let (status, body) = get(&config, "/healthz").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(String::from_utf8(body).unwrap(), r#"{"status":"ok"}"#);
}

#[tokio::test]
async fn relayed_request_is_counted_in_metrics() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(WEATHER_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_raw(r#"{"temp":15.2}"#, "application/json"))
        .expect(1)
        .mount(&server)
        .await;

    let recorder = PrometheusBuilder::new().build_recorder();
    let state = AppState::new(RelayClient::new(&test_config(&server, 5_000)).unwrap())
        .with_metrics(recorder.handle());
    let app = create_router(state);

    // Current-thread runtime: the handler records on this thread
    let _guard = metrics::set_default_local_recorder(&recorder);

    let relayed = app
        .clone()
        .oneshot(Request::builder().uri("/weather?lat=51.5&lon=-0.12").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(relayed.status(), StatusCode::OK);

    let scraped = app
        .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(scraped.status(), StatusCode::OK);

    let body = to_bytes(scraped.into_body(), usize::MAX).await.unwrap();
    let rendered = String::from_utf8(body.to_vec()).unwrap();
    let counted = rendered.lines().any(|line| {
        line.starts_with("relay_requests_total{")
            && line.contains(r#"provider="weather""#)
            && line.contains(r#"outcome="ok""#)
            && line.ends_with(" 1")
    });
    assert!(counted, "counter missing from:\n{rendered}");
    assert!(rendered.contains(r#"upstream_latency_ms_count{provider="weather"} 1"#));
}

#[test]
fn startup_without_credentials_fails() {
    let missing_traffic = Config::from_vars([("OPENWEATHER_API_KEY", "ow-test-key")]);
    assert!(matches!(missing_traffic, Err(ConfigError::Env(_))));

    let missing_weather = Config::from_vars([("TOMTOM_API_KEY", "tt-test-key")]);
    assert!(matches!(missing_weather, Err(ConfigError::Env(_))));

    let empty_weather =
        Config::from_vars([("OPENWEATHER_API_KEY", ""), ("TOMTOM_API_KEY", "tt-test-key")]);
    assert!(matches!(
        empty_weather,
        Err(ConfigError::MissingCredential("OPENWEATHER_API_KEY"))
    ));
}
