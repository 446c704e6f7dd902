#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    extract::ConnectInfo,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use khakisol_webhooks::{
    auth, build_app, config::AppConfig, notify::NotificationService, state::AppState,
    store::EventStore,
};
use tempfile::TempDir;
use tower::ServiceExt;

const SECRET: &str = "test-webhook-secret";

struct TestApp {
    app: Router,
    store: Arc<EventStore>,
    _dir: TempDir,
}

fn setup() -> TestApp {
    let dir = tempfile::tempdir().expect("create temp dir");
    let config = AppConfig {
        api_secret: SECRET.to_string(),
        snapshot_path: dir.path().join("webhooks.json"),
        ..AppConfig::default()
    };
    let config = Arc::new(config);
    let store = Arc::new(EventStore::open(&config.snapshot_path));
    let notifier = Arc::new(NotificationService::new(&config).expect("build notifier"));
    let state = AppState {
        store: Arc::clone(&store),
        notifier,
        config,
    };

    TestApp {
        app: build_app(state),
        store,
        _dir: dir,
    }
}

fn order_body() -> String {
    serde_json::json!({
        "order_number": 1001,
        "total_price": "49.99",
        "currency": "USD",
        "email": "a.b@example.com",
        "customer": { "first_name": "A", "last_name": "B" },
        "line_items": [{ "name": "Khaki Belt", "quantity": 1 }]
    })
    .to_string()
}

fn signed_request(path: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(path)
        .header("content-type", "application/json")
        .header("x-shopify-hmac-sha256", auth::sign(SECRET, body.as_bytes()))
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn response_body(response: axum::response::Response) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

// ─────────────────────────────────────────────────────────────────────────────
// Valid signature - accepted and recorded
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn valid_signature_returns_200_and_records_one_event() {
    let test = setup();
    let body = order_body();

    let response = test
        .app
        .oneshot(signed_request("/webhooks/orders/create", &body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response_body(response).await, "OK");
    assert_eq!(test.store.stats().stats.total, 1);
}

#[tokio::test]
async fn each_delivery_appends_exactly_one_event() {
    let test = setup();
    for _ in 0..3 {
        let body = order_body();
        let response = test
            .app
            .clone()
            .oneshot(signed_request("/webhooks/orders/create", &body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
    assert_eq!(test.store.stats().stats.total, 3);
}

// ─────────────────────────────────────────────────────────────────────────────
// Bad or missing signature - 401, nothing recorded
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn wrong_secret_signature_returns_401_and_records_nothing() {
    let test = setup();
    let body = order_body();

    let request = Request::builder()
        .method("POST")
        .uri("/webhooks/orders/create")
        .header("content-type", "application/json")
        .header(
            "x-shopify-hmac-sha256",
            auth::sign("some-other-secret", body.as_bytes()),
        )
        .body(Body::from(body))
        .unwrap();

    let response = test.app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(test.store.stats().stats.total, 0);
}

#[tokio::test]
async fn signature_over_different_body_returns_401() {
    let test = setup();
    let body = order_body();

    let request = Request::builder()
        .method("POST")
        .uri("/webhooks/orders/create")
        .header("content-type", "application/json")
        .header(
            "x-shopify-hmac-sha256",
            auth::sign(SECRET, b"{\"order_number\":9999}"),
        )
        .body(Body::from(body))
        .unwrap();

    let response = test.app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(test.store.stats().stats.total, 0);
}

#[tokio::test]
async fn missing_signature_header_returns_401_and_stats_unchanged() {
    let test = setup();
    let before = test.store.stats().stats.total;

    let request = Request::builder()
        .method("POST")
        .uri("/webhooks/orders/create")
        .header("content-type", "application/json")
        .body(Body::from(order_body()))
        .unwrap();

    let response = test.app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = response_body(response).await;
    assert!(body.contains("invalid"));
    assert_eq!(test.store.stats().stats.total, before);
}

// ─────────────────────────────────────────────────────────────────────────────
// Test-mode bypass - loopback peers only
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_mode_from_loopback_skips_signature() {
    let test = setup();
    let mut request = Request::builder()
        .method("POST")
        .uri("/webhooks/orders/create")
        .header("content-type", "application/json")
        .header("x-test-mode", "true")
        .body(Body::from(order_body()))
        .unwrap();
    let addr: SocketAddr = "127.0.0.1:50000".parse().unwrap();
    request.extensions_mut().insert(ConnectInfo(addr));

    let response = test.app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(test.store.stats().stats.total, 1);
}

#[tokio::test]
async fn test_mode_from_remote_peer_is_rejected() {
    let test = setup();
    let mut request = Request::builder()
        .method("POST")
        .uri("/webhooks/orders/create")
        .header("content-type", "application/json")
        .header("x-test-mode", "true")
        .body(Body::from(order_body()))
        .unwrap();
    let addr: SocketAddr = "203.0.113.9:443".parse().unwrap();
    request.extensions_mut().insert(ConnectInfo(addr));

    let response = test.app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(test.store.stats().stats.total, 0);
}

#[tokio::test]
async fn test_mode_without_peer_info_is_rejected() {
    let test = setup();
    let request = Request::builder()
        .method("POST")
        .uri("/webhooks/orders/create")
        .header("content-type", "application/json")
        .header("x-test-mode", "true")
        .body(Body::from(order_body()))
        .unwrap();

    let response = test.app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

// ─────────────────────────────────────────────────────────────────────────────
// Authenticated but unparseable body - 400, nothing recorded
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn valid_signature_over_non_json_body_returns_400() {
    let test = setup();
    let body = "this is not json";

    let response = test
        .app
        .oneshot(signed_request("/webhooks/orders/create", body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(test.store.stats().stats.total, 0);
}

// ─────────────────────────────────────────────────────────────────────────────
// Status surface stays unauthenticated
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn health_endpoint_needs_no_signature() {
    let test = setup();
    let request = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .unwrap();

    let response = test.app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = response_body(response).await;
    assert!(body.contains("healthy"));
}
