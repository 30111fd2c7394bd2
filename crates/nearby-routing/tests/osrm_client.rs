//! Integration tests for `OsrmClient` using wiremock HTTP mocks.

use std::time::Duration;

use nearby_core::{Point, RoutingConfig};
use nearby_routing::{OsrmClient, RoutingError, RoutingService, METERS_TO_MILES};
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ROUTE_PATH: &str = "/route/v1/driving/-86,36;-86,36.05";

fn test_client(base_url: &str, max_retries: u32) -> OsrmClient {
    OsrmClient::new(&RoutingConfig {
        base_url: base_url.to_owned(),
        timeout_secs: 1,
        max_concurrent: 4,
        max_retries,
        retry_backoff_base_ms: 0,
        user_agent: "nearby-test/0.1".to_owned(),
    })
    .expect("failed to build test OsrmClient")
}

fn origin() -> Point {
    Point::new(36.0, -86.0).unwrap()
}

fn destination() -> Point {
    Point::new(36.05, -86.0).unwrap()
}

#[tokio::test]
async fn converts_first_route_distance_to_miles() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(ROUTE_PATH))
        .and(query_param("overview", "false"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": "Ok",
            "routes": [
                { "distance": 4_828.03, "duration": 420.0 },
                { "distance": 9_000.0, "duration": 700.0 }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let miles = test_client(&server.uri(), 0)
        .road_distance_miles(origin(), destination())
        .await
        .expect("route should resolve");

    assert!((miles - 4_828.03 * METERS_TO_MILES).abs() < 1e-9);
    assert!((miles - 3.0).abs() < 0.01, "got {miles}");
}

#[tokio::test]
async fn non_ok_code_is_no_route() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(ROUTE_PATH))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "code": "NoRoute",
            "message": "Impossible route between points"
        })))
        .mount(&server)
        .await;

    let result = test_client(&server.uri(), 0)
        .road_distance_miles(origin(), destination())
        .await;

    assert!(
        matches!(result, Err(RoutingError::NoRoute { ref code }) if code == "NoRoute"),
        "got {result:?}"
    );
}

#[tokio::test]
async fn empty_route_list_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(ROUTE_PATH))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "code": "Ok", "routes": [] })),
        )
        .mount(&server)
        .await;

    let result = test_client(&server.uri(), 0)
        .road_distance_miles(origin(), destination())
        .await;

    assert!(matches!(result, Err(RoutingError::EmptyRoutes)), "got {result:?}");
}

#[tokio::test]
async fn malformed_body_is_deserialize_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(ROUTE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>busy</html>"))
        .mount(&server)
        .await;

    let result = test_client(&server.uri(), 0)
        .road_distance_miles(origin(), destination())
        .await;

    assert!(
        matches!(result, Err(RoutingError::Deserialize { .. })),
        "got {result:?}"
    );
}

#[tokio::test]
async fn server_error_is_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(ROUTE_PATH))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(ROUTE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": "Ok",
            "routes": [{ "distance": 1_609.34 }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let miles = test_client(&server.uri(), 1)
        .road_distance_miles(origin(), destination())
        .await
        .expect("second attempt should succeed");

    assert!((miles - 1.0).abs() < 0.001, "got {miles}");
}

#[tokio::test]
async fn server_error_without_retries_is_http_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(ROUTE_PATH))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let result = test_client(&server.uri(), 0)
        .road_distance_miles(origin(), destination())
        .await;

    assert!(matches!(result, Err(RoutingError::Http(_))), "got {result:?}");
}

#[tokio::test]
async fn slow_response_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(ROUTE_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "code": "Ok", "routes": [{ "distance": 1.0 }] }))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let result = test_client(&server.uri(), 0)
        .road_distance_miles(origin(), destination())
        .await;

    assert!(
        matches!(result, Err(RoutingError::Http(ref e)) if e.is_timeout()),
        "got {result:?}"
    );
}

#[tokio::test]
async fn timed_out_attempt_is_retried_within_the_call_budget() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(ROUTE_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "code": "Ok", "routes": [{ "distance": 1_609.34 }] }))
                .set_delay(Duration::from_secs(3)),
        )
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(ROUTE_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "code": "Ok", "routes": [{ "distance": 1_609.34 }] })),
        )
        .expect(1)
        .mount(&server)
        .await;

    // One retry halves the 1 s budget, so the second attempt lands before it runs out.
    let client = test_client(&server.uri(), 1);
    let miles = tokio::time::timeout(
        Duration::from_secs(1),
        client.road_distance_miles(origin(), destination()),
    )
    .await
    .expect("retry should finish inside the per-call timeout")
    .expect("second attempt should succeed");

    assert!((miles - 1_609.34 * METERS_TO_MILES).abs() < 1e-9);
}
