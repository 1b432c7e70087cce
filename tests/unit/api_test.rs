//! HTTP facade tests. Requests are driven through the router with `oneshot`;
//! the completion client is scripted so no network is involved.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use http_body_util::BodyExt;
use rstest::rstest;
use serde_json::{json, Value};
use slidesmith::api::error::ApiError;
use slidesmith::api::router;
use slidesmith::api::session_id::{SESSION_COOKIE, SESSION_HEADER};
use slidesmith::app::App;
use slidesmith::services::exporter::PPTX_CONTENT_TYPE;
use slidesmith::services::llm_client::{LlmClient, OfflineClient};
use slidesmith::types::ai::{ChatMessage, JsonShape};
use slidesmith::types::errors::{DeckError, ExportError, IngestError, LlmError, SessionError};
use slidesmith::types::settings::ServerSettings;
use tower::ServiceExt;

struct ScriptedClient {
    replies: Mutex<VecDeque<Result<String, LlmError>>>,
}

#[async_trait]
impl LlmClient for ScriptedClient {
    async fn complete(&self, _messages: &[ChatMessage]) -> Result<String, LlmError> {
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(LlmError::NotConfigured))
    }
}

fn app_with(replies: Vec<Result<String, LlmError>>) -> Router {
    let client = ScriptedClient { replies: Mutex::new(replies.into()) };
    router(Arc::new(App::new(ServerSettings::default(), Arc::new(client))))
}

fn offline_app() -> Router {
    router(Arc::new(App::new(ServerSettings::default(), Arc::new(OfflineClient))))
}

struct Reply {
    status: StatusCode,
    headers: axum::http::HeaderMap,
    body: Vec<u8>,
}

impl Reply {
    fn json(&self) -> Value {
        serde_json::from_slice(&self.body).unwrap()
    }
}

async fn send(app: &Router, method: &str, uri: &str, session: Option<&str>, body: Option<Value>) -> Reply {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(id) = session {
        builder = builder.header(SESSION_HEADER, id);
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let body = response.into_body().collect().await.unwrap().to_bytes().to_vec();
    Reply { status, headers, body }
}

async fn post(app: &Router, uri: &str, session: &str, body: Value) -> Reply {
    send(app, "POST", uri, Some(session), Some(body)).await
}

async fn seed_slides(app: &Router, session: &str, slides: Value) {
    let reply = post(app, "/save_slides", session, json!({ "slides": slides })).await;
    assert_eq!(reply.status, StatusCode::OK);
}

// === Error Mapping Tests ===

#[rstest]
#[case(ApiError::BadRequest("x".to_string()), StatusCode::BAD_REQUEST)]
#[case(ApiError::Session(SessionError::NotFound("s".to_string())), StatusCode::BAD_REQUEST)]
#[case(
    ApiError::Deck(DeckError::Session(SessionError::SlideIndexOutOfRange { index: 1, len: 0 })),
    StatusCode::BAD_REQUEST
)]
#[case(
    ApiError::Deck(DeckError::Session(SessionError::InvalidSuggestionIndex { index: 1, len: 0 })),
    StatusCode::BAD_REQUEST
)]
#[case(ApiError::Deck(DeckError::Llm(LlmError::Timeout)), StatusCode::INTERNAL_SERVER_ERROR)]
#[case(
    ApiError::Deck(DeckError::Ingest(IngestError::NoJsonFound(JsonShape::Array))),
    StatusCode::INTERNAL_SERVER_ERROR
)]
#[case(ApiError::Deck(DeckError::NoUsableElements), StatusCode::INTERNAL_SERVER_ERROR)]
#[case(ApiError::Export(ExportError::NotImplemented("pdf".to_string())), StatusCode::NOT_IMPLEMENTED)]
#[case(ApiError::Export(ExportError::UnsupportedFormat("doc".to_string())), StatusCode::BAD_REQUEST)]
#[case(ApiError::Export(ExportError::Package("io".to_string())), StatusCode::INTERNAL_SERVER_ERROR)]
fn errors_map_to_status(#[case] error: ApiError, #[case] expected: StatusCode) {
    assert_eq!(error.status(), expected);
}

// === Session Tests ===

#[tokio::test]
async fn health_is_ok() {
    let reply = send(&offline_app(), "GET", "/health", None, None).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body, b"OK");
}

#[tokio::test]
async fn create_session_sets_cookie() {
    let app = offline_app();
    let reply = send(&app, "POST", "/api/session", None, None).await;
    assert_eq!(reply.status, StatusCode::OK);

    let body = reply.json();
    let id = body["sessionId"].as_str().unwrap().to_string();
    let cookie = reply.headers[header::SET_COOKIE].to_str().unwrap();
    assert!(cookie.starts_with(&format!("{}={}", SESSION_COOKIE, id)));

    let request = Request::builder()
        .uri("/get_slides")
        .header(header::COOKIE, format!("{}={}", SESSION_COOKIE, id))
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn missing_session_id_is_bad_request() {
    let reply = send(&offline_app(), "GET", "/get_slides", None, None).await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert_eq!(reply.json(), json!({"success": false, "error": "No session ID found"}));
}

#[tokio::test]
async fn cookie_takes_precedence_over_header() {
    let app = offline_app();
    seed_slides(&app, "from-cookie", json!([{"title": "Cookie deck"}])).await;

    let request = Request::builder()
        .uri("/get_slides")
        .header(header::COOKIE, format!("theme=dark; {}=from-cookie", SESSION_COOKIE))
        .header(SESSION_HEADER, "from-header")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    let body: Value =
        serde_json::from_slice(&response.into_body().collect().await.unwrap().to_bytes()).unwrap();
    assert_eq!(body["slides"][0]["title"], "Cookie deck");
}

#[tokio::test]
async fn get_session_returns_full_state() {
    let app = offline_app();
    let reply = send(&app, "GET", "/api/session", Some("s1"), None).await;
    assert_eq!(reply.status, StatusCode::OK);
    let body = reply.json();
    assert_eq!(body["sessionId"], "s1");
    assert_eq!(body["session"]["theme"], "default");
    assert_eq!(body["session"]["extensions"]["aiEnabled"], false);
}

// === Deck Tests ===

#[tokio::test]
async fn unknown_session_reads_empty_deck() {
    let reply = send(&offline_app(), "GET", "/get_slides", Some("new"), None).await;
    assert_eq!(reply.json(), json!({"success": true, "slides": []}));
}

#[tokio::test]
async fn save_then_get_round_trips_with_synthesized_ids() {
    let app = offline_app();
    seed_slides(
        &app,
        "s1",
        json!([{"title": "A", "content": "B", "elements": [{"type": "text", "content": "x"}], "notes": "n"}]),
    )
    .await;

    let body = send(&app, "GET", "/get_slides", Some("s1"), None).await.json();
    let slide = &body["slides"][0];
    assert_eq!(slide["title"], "A");
    assert_eq!(slide["notes"], "n");
    assert!(slide["elements"][0]["id"].as_str().unwrap().starts_with("elem_0_0_"));
}

#[tokio::test]
async fn save_slides_requires_slides() {
    let reply = post(&offline_app(), "/save_slides", "s1", json!({"slides": []})).await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert_eq!(reply.json()["error"], "No slides data provided");
}

#[tokio::test]
async fn malformed_body_is_invalid_request_data() {
    let app = offline_app();
    let request = Request::builder()
        .method("POST")
        .uri("/save_slides")
        .header(SESSION_HEADER, "s1")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value =
        serde_json::from_slice(&response.into_body().collect().await.unwrap().to_bytes()).unwrap();
    assert_eq!(body["error"], "Invalid request data");
}

#[tokio::test]
async fn theme_and_settings_update() {
    let app = offline_app();
    let reply = post(&app, "/update_theme", "s1", json!({"theme": "dark"})).await;
    assert_eq!(reply.json(), json!({"success": true, "message": "Theme updated"}));

    let reply = post(&app, "/update_setting", "s1", json!({"key": "colorPalette", "value": "green"})).await;
    assert_eq!(reply.status, StatusCode::OK);

    let session = send(&app, "GET", "/api/session", Some("s1"), None).await.json();
    assert_eq!(session["session"]["theme"], "dark");
    assert_eq!(session["session"]["colorPalette"], "green");
}

#[tokio::test]
async fn blank_theme_and_unknown_setting_are_rejected() {
    let app = offline_app();
    let reply = post(&app, "/update_theme", "s1", json!({"theme": " "})).await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert_eq!(reply.json()["error"], "Theme is required");

    let reply = post(&app, "/update_setting", "s1", json!({"key": "layout", "value": "wide"})).await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn toggle_extension_reports_state() {
    let app = offline_app();
    let reply = post(&app, "/toggle_extension", "s1", json!({"extension": "ai", "enabled": true})).await;
    assert_eq!(reply.json()["message"], "Extension 'ai' enabled");

    let session = send(&app, "GET", "/api/session", Some("s1"), None).await.json();
    assert_eq!(session["session"]["extensions"]["aiEnabled"], true);
}

// === AI Tests ===

#[tokio::test]
async fn generation_requires_topic() {
    let reply = post(&offline_app(), "/generate_from_topic", "s1", json!({"topic": ""})).await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert_eq!(reply.json()["error"], "Topic is required");
}

#[tokio::test]
async fn offline_generation_serves_demo_deck() {
    let app = offline_app();
    let reply = post(&app, "/generate_from_topic", "s1", json!({"topic": "Rust", "slideCount": "3"})).await;
    assert_eq!(reply.status, StatusCode::OK);
    let body = reply.json();
    assert_eq!(body["source"], "demo");
    assert_eq!(body["slides"].as_array().unwrap().len(), 3);

    let stored = send(&app, "GET", "/get_slides", Some("s1"), None).await.json();
    assert_eq!(stored["slides"], body["slides"]);
}

#[tokio::test]
async fn generation_defaults_to_five_slides() {
    let reply = post(&offline_app(), "/generate_from_topic", "s1", json!({"topic": "Rust"})).await;
    assert_eq!(reply.json()["slides"].as_array().unwrap().len(), 5);
}

#[tokio::test]
async fn edit_slide_appends_elements() {
    let app = app_with(vec![Ok(r#"[{"type": "shape", "content": "star"}]"#.to_string())]);
    seed_slides(&app, "s1", json!([{"title": "A"}])).await;

    let reply = post(&app, "/edit_slide_ai", "s1", json!({"index": 0, "prompt": "add a star"})).await;
    assert_eq!(reply.status, StatusCode::OK);
    let body = reply.json();
    assert_eq!(body["elements"][0]["content"], "star");
}

#[tokio::test]
async fn edit_slide_validates_request() {
    let app = offline_app();
    let reply = post(&app, "/edit_slide_ai", "s1", json!({"prompt": "x"})).await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert_eq!(reply.json()["error"], "Invalid request data");

    let reply = post(&app, "/edit_slide_ai", "s1", json!({"index": 4, "prompt": "x"})).await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn edit_slide_upstream_failure_is_server_error() {
    let app = app_with(vec![Err(LlmError::InsufficientBalance)]);
    seed_slides(&app, "s1", json!([{"title": "A"}])).await;

    let reply = post(&app, "/edit_slide_ai", "s1", json!({"index": 0, "prompt": "x"})).await;
    assert_eq!(reply.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(reply.json()["error"], LlmError::InsufficientBalance.to_string());
}

#[tokio::test]
async fn analyze_then_apply_stored_suggestion() {
    let analysis = json!({
        "improvementSuggestions": [
            {"slideIndex": 0, "suggestion": "Retitle", "changes": {"title": "Better"}}
        ]
    });
    let app = app_with(vec![Ok(analysis.to_string())]);
    seed_slides(&app, "s1", json!([{"title": "A"}])).await;

    let reply = post(&app, "/api/ai/analyze", "s1", json!({})).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.json()["analysis"]["improvementSuggestions"][0]["priority"], "medium");

    let reply = post(&app, "/apply_suggestion", "s1", json!({"suggestionIndex": 0})).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.json()["slide"]["title"], "Better");
}

#[tokio::test]
async fn apply_suggestion_with_bad_index_is_bad_request() {
    let app = offline_app();
    seed_slides(&app, "s1", json!([{"title": "A"}])).await;
    let reply = post(&app, "/apply_suggestion", "s1", json!({"suggestionIndex": 3})).await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);

    let reply = post(&app, "/apply_suggestion", "s1", json!({})).await;
    assert_eq!(reply.json()["error"], "Invalid request data");
}

#[tokio::test]
async fn chat_replies_and_requires_message() {
    let app = app_with(vec![Ok("Keep it short.".to_string())]);
    let reply = post(&app, "/api/ai/chat", "s1", json!({"message": "Tips?"})).await;
    assert_eq!(reply.json(), json!({"success": true, "response": "Keep it short."}));

    let reply = post(&app, "/api/ai/chat", "s1", json!({"message": "  "})).await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert_eq!(reply.json()["error"], "Message is required");
}

// === Export Tests ===

#[tokio::test]
async fn export_returns_pptx_download() {
    let app = offline_app();
    seed_slides(&app, "s1", json!([{"title": "Quarterly Review", "content": "Numbers"}])).await;

    let reply = post(&app, "/api/export", "s1", json!({})).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.headers[header::CONTENT_TYPE], PPTX_CONTENT_TYPE);
    assert_eq!(
        reply.headers[header::CONTENT_DISPOSITION],
        "attachment; filename=\"Quarterly_Review.pptx\""
    );
    assert!(reply.body.starts_with(b"PK"));
}

#[tokio::test]
async fn export_base64_encodes_given_slides() {
    let reply = post(
        &offline_app(),
        "/api/export",
        "s1",
        json!({"slides": [{"title": "Inline"}], "title": "My Deck", "encoding": "base64"}),
    )
    .await;
    let body = reply.json();
    assert_eq!(body["fileName"], "My_Deck.pptx");
    let bytes = BASE64.decode(body["data"].as_str().unwrap()).unwrap();
    assert!(bytes.starts_with(b"PK"));
}

#[tokio::test]
async fn export_format_errors_map_to_status() {
    let app = offline_app();
    let reply = post(&app, "/api/export", "s1", json!({"format": "pdf"})).await;
    assert_eq!(reply.status, StatusCode::NOT_IMPLEMENTED);

    let reply = post(&app, "/api/export", "s1", json!({"format": "docx"})).await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert_eq!(reply.json()["error"], "Unsupported export format: docx");
}
