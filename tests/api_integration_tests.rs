//! Integration Tests for API Endpoints
//!
//! Tests full request/response cycle for each endpoint.

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use resource_cache::{
    api::create_router,
    cache::{CacheConfig, ResourceCache},
    AppState,
};
use serde_json::{json, Value};
use std::time::Duration;
use tower::ServiceExt;

// == Helper Functions ==

fn create_test_app() -> Router {
    create_app_with(CacheConfig::default())
}

fn create_app_with(config: CacheConfig) -> Router {
    let state = AppState::new(ResourceCache::new(config));
    create_router(state)
}

async fn body_to_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    (status, body_to_json(response.into_body()).await)
}

async fn put_value(app: &Router, body: Value) {
    let (status, _) = send(app, "PUT", "/set", Some(body)).await;
    assert_eq!(status, StatusCode::OK);
}

// == SET / GET Endpoint Tests ==

#[tokio::test]
async fn test_set_endpoint_success() {
    let app = create_test_app();

    let (status, json) = send(
        &app,
        "PUT",
        "/set",
        Some(json!({"key": "test_key", "value": "test_value"})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(json["message"].as_str().unwrap().contains("test_key"));
}

#[tokio::test]
async fn test_get_endpoint_success() {
    let app = create_test_app();
    put_value(&app, json!({"key": "dockerfile:web", "value": "FROM rust:1.80"})).await;

    let (status, json) = send(&app, "GET", "/get/dockerfile:web", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["key"], "dockerfile:web");
    assert_eq!(json["value"], "FROM rust:1.80");
}

#[tokio::test]
async fn test_get_structured_value() {
    let app = create_test_app();
    put_value(&app, json!({"key": "scan", "value": {"findings": [1, 2], "ok": false}})).await;

    let (status, json) = send(&app, "GET", "/get/scan", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["value"], json!({"findings": [1, 2], "ok": false}));
}

#[tokio::test]
async fn test_get_endpoint_not_found() {
    let app = create_test_app();

    let (status, json) = send(&app, "GET", "/get/nonexistent", None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(json["error"].as_str().unwrap().contains("nonexistent"));
}

#[tokio::test]
async fn test_keys_with_slashes() {
    let app = create_test_app();
    put_value(&app, json!({"key": "scan/web/latest", "value": "clean"})).await;

    let (status, json) = send(&app, "GET", "/get/scan/web/latest", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["key"], "scan/web/latest");

    let (status, json) = send(&app, "GET", "/has/scan/web/latest", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["exists"], true);
}

#[tokio::test]
async fn test_file_scheme_key_round_trip() {
    let app = create_test_app();
    put_value(
        &app,
        json!({"key": "file:///srv/app/Dockerfile", "value": "FROM alpine:3.20"}),
    )
    .await;

    let (status, json) = send(&app, "GET", "/get/file:///srv/app/Dockerfile", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["key"], "file:///srv/app/Dockerfile");
    assert_eq!(json["value"], "FROM alpine:3.20");

    let (status, _) = send(&app, "DELETE", "/del/file:///srv/app/Dockerfile", None).await;
    assert_eq!(status, StatusCode::OK);
}

// == HAS / DELETE Endpoint Tests ==

#[tokio::test]
async fn test_has_endpoint() {
    let app = create_test_app();
    put_value(&app, json!({"key": "present", "value": 1})).await;

    let (_, json) = send(&app, "GET", "/has/present", None).await;
    assert_eq!(json["exists"], true);

    let (status, json) = send(&app, "GET", "/has/absent", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["exists"], false);
}

#[tokio::test]
async fn test_delete_endpoint_success() {
    let app = create_test_app();
    put_value(&app, json!({"key": "to_delete", "value": "value"})).await;

    let (status, json) = send(&app, "DELETE", "/del/to_delete", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(json["message"].as_str().unwrap().contains("deleted"));

    let (status, _) = send(&app, "GET", "/get/to_delete", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_endpoint_not_found() {
    let app = create_test_app();

    let (status, _) = send(&app, "DELETE", "/del/nonexistent", None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

// == Invalidation Endpoint Tests ==

#[tokio::test]
async fn test_invalidate_by_prefix() {
    let app = create_test_app();
    put_value(&app, json!({"key": "dockerfile:web", "value": "a"})).await;
    put_value(&app, json!({"key": "dockerfile:api", "value": "b"})).await;
    put_value(&app, json!({"key": "scan:web", "value": "c"})).await;

    let (status, json) = send(&app, "POST", "/invalidate", Some(json!({"pattern": "dockerfile:*"}))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["removed"], 2);

    let (_, json) = send(&app, "GET", "/keys", None).await;
    assert_eq!(json["keys"], json!(["scan:web"]));
}

#[tokio::test]
async fn test_invalidate_by_tags() {
    let app = create_test_app();
    put_value(&app, json!({"key": "img:web", "value": "x", "tags": ["docker", "web"]})).await;
    put_value(&app, json!({"key": "img:api", "value": "y", "tags": ["docker"]})).await;
    put_value(&app, json!({"key": "report", "value": "z", "tags": ["web"]})).await;

    let (status, json) = send(
        &app,
        "POST",
        "/invalidate",
        Some(json!({"key_pattern": "^img:", "tags": ["web"]})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["removed"], 1);

    let (_, json) = send(&app, "GET", "/keys", None).await;
    assert_eq!(json["keys"], json!(["img:api", "report"]));
}

#[tokio::test]
async fn test_invalidate_invalid_regex() {
    let app = create_test_app();

    let (status, json) = send(&app, "POST", "/invalidate", Some(json!({"pattern": "(unclosed"}))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json.get("error").is_some());
}

#[tokio::test]
async fn test_keys_with_glob_pattern() {
    let app = create_test_app();
    put_value(&app, json!({"key": "img/web", "value": 1})).await;
    put_value(&app, json!({"key": "img/api", "value": 2})).await;
    put_value(&app, json!({"key": "scan/web", "value": 3})).await;

    let (status, json) = send(&app, "GET", "/keys?pattern=img/*", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["keys"], json!(["img/api", "img/web"]));
}

// == STATS / CLEAR Endpoint Tests ==

#[tokio::test]
async fn test_stats_endpoint() {
    let app = create_test_app();
    put_value(&app, json!({"key": "k1", "value": "v1"})).await;

    send(&app, "GET", "/get/k1", None).await;
    send(&app, "GET", "/get/k1", None).await;
    send(&app, "GET", "/get/missing", None).await;
    send(&app, "GET", "/get/missing", None).await;

    let (status, json) = send(&app, "GET", "/stats", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["size"], 1);
    assert_eq!(json["hits"], 2);
    assert_eq!(json["misses"], 2);
    assert_eq!(json["requests"], 4);
    assert!((json["hit_rate"].as_f64().unwrap() - 0.5).abs() < f64::EPSILON);
    assert_eq!(json["top_keys"][0]["key"], "k1");
}

#[tokio::test]
async fn test_clear_endpoint() {
    let app = create_test_app();
    put_value(&app, json!({"key": "a", "value": 1})).await;
    put_value(&app, json!({"key": "b", "value": 2})).await;

    let (status, _) = send(&app, "POST", "/clear", None).await;
    assert_eq!(status, StatusCode::OK);

    let (_, json) = send(&app, "GET", "/stats", None).await;
    assert_eq!(json["size"], 0);
    assert_eq!(json["memory_usage"], 0);
}

// == HEALTH Endpoint Tests ==

#[tokio::test]
async fn test_health_endpoint() {
    let app = create_test_app();

    let (status, json) = send(&app, "GET", "/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "healthy");
    assert!(json.get("timestamp").is_some());
}

// == Error Handling Tests ==

#[tokio::test]
async fn test_invalid_json_request() {
    let app = create_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .method("PUT")
                .uri("/set")
                .header("content-type", "application/json")
                .body(Body::from("not valid json"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert!(response.status().is_client_error());
}

#[tokio::test]
async fn test_empty_key_request() {
    let app = create_test_app();

    let (status, json) = send(&app, "PUT", "/set", Some(json!({"key": "", "value": "v"}))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json.get("error").is_some());
}

#[tokio::test]
async fn test_oversized_value_rejected() {
    let app = create_app_with(CacheConfig {
        max_memory_usage: 8,
        ..CacheConfig::default()
    });

    let (status, json) = send(
        &app,
        "PUT",
        "/set",
        Some(json!({"key": "big", "value": "this value is far too large"})),
    )
    .await;

    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert!(json.get("error").is_some());
}

// == TTL Tests ==

#[tokio::test]
async fn test_ttl_expiration_via_api() {
    let app = create_app_with(CacheConfig {
        enable_validity_check: false,
        ..CacheConfig::default()
    });
    put_value(&app, json!({"key": "short", "value": "v", "ttl": 50})).await;

    let (status, _) = send(&app, "GET", "/get/short", None).await;
    assert_eq!(status, StatusCode::OK);

    tokio::time::sleep(Duration::from_millis(120)).await;

    let (status, _) = send(&app, "GET", "/get/short", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
