//! Router-level tests driven through `tower::ServiceExt::oneshot`.

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use clicktrail_audit_types::{EventType, ReceivedRecord};
use clicktrail_server::config::ServerConfig;
use clicktrail_server::routes::create_router;
use clicktrail_server::{AppState, AuditSink, MemorySink, SinkError};
use serde_json::{json, Value};
use std::sync::Arc;
use test_case::test_case;
use tower::ServiceExt;

fn app(sink: Arc<dyn AuditSink>, config: &ServerConfig) -> Router {
    create_router(AppState::with_sink(sink), config)
}

fn memory_app() -> (Router, MemorySink) {
    let sink = MemorySink::new();
    (app(Arc::new(sink.clone()), &ServerConfig::default()), sink)
}

fn post_json(uri: &str, body: impl Into<Body>) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(body.into())
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn read_json(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn click_body() -> Value {
    json!({
        "userId": "user-1",
        "path": "/shop",
        "timestamp": "2024-05-01T12:00:00Z",
        "eventType": "click",
        "elementInfo": { "tagName": "button", "className": "btn", "text": "Go" },
        "additionalData": { "x": 12.0, "y": 34.0, "button": 0 }
    })
}

#[tokio::test]
async fn valid_record_is_acknowledged_and_stored() {
    let (app, sink) = memory_app();

    let response = app
        .oneshot(post_json("/api/audit-log", click_body().to_string()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        read_json(response).await,
        json!({ "success": true, "message": "Audit log received", "eventType": "click" })
    );

    let stored = sink.records();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].record.user_id, "user-1");
    assert_eq!(stored[0].record.event_type(), EventType::Click);
    assert!(stored[0].server_timestamp > stored[0].record.timestamp);
}

#[tokio::test]
async fn every_event_type_is_accepted() {
    let (app, sink) = memory_app();
    let bodies = [
        json!({ "userId": "u", "path": "/", "timestamp": "2024-05-01T12:00:00Z",
                "eventType": "route_change" }),
        json!({ "userId": "u", "path": "/b", "timestamp": "2024-05-01T12:00:00Z",
                "eventType": "route_change", "additionalData": { "previousPath": "/a" } }),
        json!({ "userId": "u", "path": "/", "timestamp": "2024-05-01T12:00:00Z",
                "eventType": "form_submit", "additionalData": { "formFields": ["email"] } }),
        json!({ "userId": "u", "path": "/", "timestamp": "2024-05-01T12:00:00Z",
                "eventType": "input_change",
                "additionalData": { "inputType": "text", "valueLength": 3 } }),
        json!({ "userId": "u", "path": "/", "timestamp": "2024-05-01T12:00:00Z",
                "eventType": "custom",
                "additionalData": { "customEventType": "business_event_checkout", "orderId": "123" } }),
    ];

    for body in bodies {
        let response = app
            .clone()
            .oneshot(post_json("/api/audit-log", body.to_string()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK, "body: {body}");
    }
    assert_eq!(sink.len(), 5);
}

#[test_case(r#"{"userId": "u""# ; "truncated json")]
#[test_case(r#"{"userId":"u","path":"/","timestamp":"2024-05-01T12:00:00Z","eventType":"hover"}"# ; "unknown event type")]
#[test_case(r#"{"userId":"u","path":"/","timestamp":"2024-05-01T12:00:00Z","eventType":"form_submit","additionalData":{"x":1,"y":2,"button":0}}"# ; "mismatched payload")]
#[test_case(r#"{"path":"/","timestamp":"2024-05-01T12:00:00Z","eventType":"click"}"# ; "missing user id")]
#[tokio::test]
async fn malformed_records_are_rejected(body: &'static str) {
    let (app, sink) = memory_app();

    let response = app.oneshot(post_json("/api/audit-log", body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = read_json(response).await;
    assert_eq!(json["success"], json!(false));
    assert_eq!(json["error"]["code"], json!("invalid_record"));
    assert!(json["error"]["message"].as_str().is_some());
    assert!(sink.is_empty());
}

#[tokio::test]
async fn record_without_content_type_is_still_decoded() {
    let (app, sink) = memory_app();
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/audit-log")
        .body(Body::from(click_body().to_string()))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(sink.len(), 1);
}

struct FailingSink;

#[async_trait]
impl AuditSink for FailingSink {
    async fn write(&self, _record: &ReceivedRecord) -> Result<(), SinkError> {
        Err(SinkError::Io(std::io::Error::new(
            std::io::ErrorKind::BrokenPipe,
            "stdout closed",
        )))
    }

    fn name(&self) -> &'static str {
        "failing"
    }
}

#[tokio::test]
async fn sink_failure_is_a_server_error() {
    let app = app(Arc::new(FailingSink), &ServerConfig::default());

    let response = app
        .oneshot(post_json("/api/audit-log", click_body().to_string()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(read_json(response).await["error"]["code"], json!("sink_error"));
}

#[tokio::test]
async fn oversized_body_is_rejected() {
    let sink = MemorySink::new();
    let mut config = ServerConfig::default();
    config.server.body_limit_bytes = 64;
    let app = app(Arc::new(sink.clone()), &config);

    let response = app
        .oneshot(post_json("/api/audit-log", click_body().to_string()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert!(sink.is_empty());
}

#[tokio::test]
async fn page_endpoint_greets() {
    let (app, _) = memory_app();

    let response = app.oneshot(get("/api/page/checkout")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        read_json(response).await,
        json!({ "message": "Hello checkout", "pageName": "checkout" })
    );
}

#[tokio::test]
async fn health_endpoint_reports_version() {
    let (app, _) = memory_app();

    let response = app.oneshot(get("/api/health")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = read_json(response).await;
    assert_eq!(json["status"], json!("ok"));
    assert_eq!(json["version"], json!(env!("CARGO_PKG_VERSION")));
    assert!(json["timestamp"].as_str().is_some());
}

#[tokio::test]
async fn unknown_route_is_not_found() {
    let (app, _) = memory_app();

    let response = app.oneshot(get("/api/nope")).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        read_json(response).await,
        json!({ "success": false, "error": { "code": "not_found", "message": "Route not found" } })
    );
}

#[tokio::test]
async fn cors_is_permissive_without_origins() {
    let (app, _) = memory_app();
    let request = Request::builder()
        .uri("/api/health")
        .header(header::ORIGIN, "http://anywhere.example")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(
        response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "*"
    );
}

#[tokio::test]
async fn cors_allows_only_listed_origins() {
    let mut config = ServerConfig::default();
    config.cors.allowed_origins = vec!["http://localhost:3000".into()];
    let app = app(Arc::new(MemorySink::new()), &config);

    let preflight = |origin: &str| {
        Request::builder()
            .method(Method::OPTIONS)
            .uri("/api/audit-log")
            .header(header::ORIGIN, origin)
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
            .body(Body::empty())
            .unwrap()
    };

    let allowed = app
        .clone()
        .oneshot(preflight("http://localhost:3000"))
        .await
        .unwrap();
    assert_eq!(
        allowed.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "http://localhost:3000"
    );

    let denied = app.oneshot(preflight("http://evil.example")).await.unwrap();
    assert!(denied
        .headers()
        .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
        .is_none());
}
