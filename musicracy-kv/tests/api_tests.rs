//! Integration tests for the musicracy-kv HTTP API
//!
//! Tests cover:
//! - Create / retrieve / delete round trips through the router
//! - Composite keys
//! - 400 responses and their `reason` bodies
//! - Ping and health endpoints

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use musicracy_kv::{build_router, AppState};
use serde_json::{json, Value};
use tower::util::ServiceExt; // for `oneshot` method

fn setup_app() -> Router {
    build_router(AppState::default())
}

fn post_json(body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

async fn extract_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Should read body");
    serde_json::from_slice(&bytes).expect("Should parse JSON")
}

async fn extract_text(body: Body) -> String {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Should read body");
    String::from_utf8(bytes.to_vec()).expect("Should be UTF-8")
}

// =============================================================================
// Happy path
// =============================================================================

#[tokio::test]
async fn test_create_then_retrieve() {
    let app = setup_app();

    let response = app
        .clone()
        .oneshot(post_json(r#"{"key": "10.0.0.7", "value": "track-1", "action": "create"}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    assert!(extract_text(response.into_body()).await.is_empty());

    let response = app.oneshot(get("/?key=10.0.0.7")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        extract_json(response.into_body()).await,
        json!({"key": "10.0.0.7", "value": ["track-1"]})
    );
}

#[tokio::test]
async fn test_unknown_key_returns_empty_list() {
    let app = setup_app();

    let response = app.oneshot(get("/?key=nobody")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        extract_json(response.into_body()).await,
        json!({"key": "nobody", "value": []})
    );
}

#[tokio::test]
async fn test_delete_removes_value_everywhere() {
    let app = setup_app();

    for voter in ["u1", "u2"] {
        let body = json!({"key": voter, "value": "track-1", "action": "create"}).to_string();
        let response = app.clone().oneshot(post_json(&body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let response = app
        .clone()
        .oneshot(post_json(r#"{"value": "track-1", "action": "delete"}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    for voter in ["u1", "u2"] {
        let response = app
            .clone()
            .oneshot(get(&format!("/?key={}", voter)))
            .await
            .unwrap();
        let body = extract_json(response.into_body()).await;
        assert_eq!(body["value"], json!([]));
    }
}

#[tokio::test]
async fn test_composite_key_round_trip() {
    let app = setup_app();

    let response = app
        .clone()
        .oneshot(post_json(r#"{"key": "room-1,10.0.0.7", "value": "t", "action": "create"}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .clone()
        .oneshot(get("/?key=room-1%2C10.0.0.7"))
        .await
        .unwrap();
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["key"], "room-1,10.0.0.7");
    assert_eq!(body["value"], json!(["t"]));

    // A single field of a composite key is a different key
    let response = app.oneshot(get("/?key=room-1")).await.unwrap();
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["value"], json!([]));
}

#[tokio::test]
async fn test_custom_separator() {
    let state = AppState::new(std::sync::Arc::new(musicracy_kv::KvStore::new()), "|");
    let app = build_router(state);

    let response = app
        .clone()
        .oneshot(post_json(r#"{"key": "a|b", "value": "v", "action": "create"}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app.oneshot(get("/?key=a%7Cb")).await.unwrap();
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["value"], json!(["v"]));
}

// =============================================================================
// Rejections
// =============================================================================

#[tokio::test]
async fn test_get_without_key_is_bad_request() {
    let app = setup_app();

    let response = app.clone().oneshot(get("/")).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app.oneshot(get("/?key=")).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_invalid_json_is_bad_request() {
    let app = setup_app();

    let response = app.oneshot(post_json("{nope")).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        extract_json(response.into_body()).await,
        json!({"reason": "Request contains invalid JSON"})
    );
}

#[tokio::test]
async fn test_missing_field_is_bad_request() {
    let app = setup_app();

    let response = app
        .oneshot(post_json(r#"{"value": "v", "action": "create"}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        extract_json(response.into_body()).await,
        json!({"reason": "Missing mandatory field 'key'"})
    );
}

#[tokio::test]
async fn test_unknown_action_is_bad_request() {
    let app = setup_app();

    let response = app
        .oneshot(post_json(r#"{"key": "k", "value": "v", "action": "upsert"}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        extract_json(response.into_body()).await,
        json!({"reason": "Invalid action upsert"})
    );
}

// =============================================================================
// Liveness
// =============================================================================

#[tokio::test]
async fn test_ping() {
    let app = setup_app();

    for uri in ["/ping", "/PING", "/service/ping"] {
        let response = app.clone().oneshot(get(uri)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK, "uri {}", uri);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "text/plain"
        );
        assert_eq!(extract_text(response.into_body()).await, "PONG");
    }
}

#[tokio::test]
async fn test_unknown_path_is_not_found() {
    let app = setup_app();

    let response = app.oneshot(get("/nothing-here")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_health() {
    let app = setup_app();

    let response = app.oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["module"], "musicracy-kv");
    assert!(body["version"].is_string());
}
