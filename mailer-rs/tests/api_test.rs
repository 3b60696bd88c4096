//! Integration tests for the HTTP API

mod common;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use common::RecordingTransport;
use mailer_rs::api::{router, AppState};
use mailer_rs::config::Config;
use serde_json::{json, Value};
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

fn config(recipients: &[&str], template_path: &str) -> Config {
    let mut config = Config::default();
    config.sender.email = "sender@example.com".to_string();
    config.delivery.recipients = recipients.iter().map(|r| r.to_string()).collect();
    config.delivery.send_delay_ms = 0;
    config.templates.default_path = template_path.to_string();
    config
}

fn app(config: &Config, transport: Arc<RecordingTransport>) -> Router {
    router(Arc::new(AppState::from_config(config, transport)))
}

async fn call(app: Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(match body {
            Some(body) => Body::from(body.to_string()),
            None => Body::empty(),
        })
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn test_health() {
    let app = app(&config(&[], ""), Arc::new(RecordingTransport::default()));
    let (status, body) = call(app, "GET", "/api/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "ok" }));
}

#[tokio::test]
async fn test_load_without_configured_path() {
    let app = app(&config(&[], ""), Arc::new(RecordingTransport::default()));
    let (status, body) = call(app, "GET", "/api/templates/load", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["templates"], json!([]));
    assert_eq!(body["message"], "No template path configured");
}

#[tokio::test]
async fn test_load_configured_path() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("hello.html"), "<p>hello</p>").unwrap();

    let config = config(&[], dir.path().to_str().unwrap());
    let app = app(&config, Arc::new(RecordingTransport::default()));
    let (status, body) = call(app, "GET", "/api/templates/load", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["templates"][0]["name"], "hello.html");
    assert_eq!(body["templates"][0]["relativePath"], "hello.html");
    assert_eq!(body["templates"][0]["content"], "<p>hello</p>");
}

#[tokio::test]
async fn test_load_unavailable_path() {
    let config = config(&[], "/definitely/not/here");
    let app = app(&config, Arc::new(RecordingTransport::default()));
    let (status, body) = call(app, "GET", "/api/templates/load", None).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Loading templates failed");
}

#[tokio::test]
async fn test_send_email_validation() {
    let transport = Arc::new(RecordingTransport::default());
    let app = app(&config(&["a@example.com"], ""), transport.clone());
    let (status, body) = call(
        app,
        "POST",
        "/api/send-email",
        Some(json!({ "to": "a@example.com", "subject": "Hi" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Missing required parameters: html");
    assert_eq!(transport.sent_count(), 0);
}

#[tokio::test]
async fn test_send_email_no_recipient() {
    let transport = Arc::new(RecordingTransport::default());
    let app = app(&config(&[], ""), transport.clone());
    let (status, body) = call(
        app,
        "POST",
        "/api/send-email",
        Some(json!({ "subject": "Hi", "html": "<p>x</p>" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "no_recipient");
    assert_eq!(transport.sent_count(), 0);
}

#[tokio::test]
async fn test_send_email_to_default_list() {
    let transport = Arc::new(RecordingTransport::default());
    let app = app(&config(&["a@example.com", "b@example.com"], ""), transport.clone());
    let (status, body) = call(
        app,
        "POST",
        "/api/send-email",
        Some(json!({ "subject": "Hi", "html": "<p>x</p>" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["status"], "sent");
    assert_eq!(body["recipients"][0]["messageId"], "<1@test>");
    assert_eq!(transport.sent_count(), 2);
}

#[tokio::test]
async fn test_send_email_transport_failure() {
    let transport = Arc::new(RecordingTransport::failing_on(&["Hi"]));
    let app = app(&config(&[], ""), transport);
    let (status, body) = call(
        app,
        "POST",
        "/api/send-email",
        Some(json!({ "to": "a@example.com", "subject": "Hi", "html": "<p>x</p>" })),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["success"], false);
    assert!(body["error"].as_str().unwrap().contains("a@example.com"));
}

#[tokio::test]
async fn test_send_batch_reports_counts() {
    let transport = Arc::new(RecordingTransport::failing_on(&["b.html"]));
    let app = app(&config(&["ops@example.com"], ""), transport.clone());
    let templates = json!([
        { "name": "a.html", "relativePath": "a.html", "fullPath": "/t/a.html", "content": "<p>a</p>" },
        { "name": "b.html", "relativePath": "b.html", "fullPath": "/t/b.html", "content": "<p>b</p>" },
        { "fileName": "c.html", "relativePath": "c.html", "fullPath": "/t/c.html", "htmlContent": "<p>c</p>" },
        { "name": "d.html", "relativePath": "d.html", "fullPath": "/t/d.html" }
    ]);

    let (status, body) = call(
        app,
        "POST",
        "/api/send-batch",
        Some(json!({ "templates": templates })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["succeeded"], 2);
    assert_eq!(body["failed"], 2);
    assert_eq!(body["success"], false);
    assert_eq!(body["results"].as_array().unwrap().len(), 4);
    assert_eq!(body["results"][1]["success"], false);
    assert_eq!(body["results"][2]["success"], true);
    assert_eq!(body["results"][3]["success"], false);
    assert!(body["results"][3]["error"].as_str().unwrap().contains("html"));

    // the content-less template never reaches the transport
    let sent = transport.sent();
    assert_eq!(sent.len(), 3);
    assert_eq!(sent[2].0.subject, "c.html");
    assert_eq!(sent[2].0.html, "<p>c</p>");
}
