//! HTTP-level tests for the summarization clients.
//!
//! Each test spins up a local axum server on an ephemeral port that stands in
//! for the chat-completion service or the relay.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::Json;
use axum::Router;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use serde_json::{Value, json};

use pdfsum_core::summary::relay::{ErrorResponse, SummarizeRequest, SummarizeResponse};
use pdfsum_core::{ChatCompletionClient, RelayClient, SummaryError, Summarizer};

#[derive(Clone, Default)]
struct Seen {
    body: Arc<Mutex<Option<Value>>>,
    auth: Arc<Mutex<Option<String>>>,
}

async fn serve(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

async fn chat_ok(State(seen): State<Seen>, headers: HeaderMap, Json(body): Json<Value>) -> Json<Value> {
    *seen.auth.lock().unwrap() = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(String::from);
    *seen.body.lock().unwrap() = Some(body);
    Json(json!({
        "id": "chatcmpl-1",
        "choices": [{"index": 0, "message": {"role": "assistant", "content": "It is about testing."}}]
    }))
}

fn chat_client(base_url: &str, api_key: Option<&str>) -> ChatCompletionClient {
    ChatCompletionClient::new(
        reqwest::Client::new(),
        format!("{base_url}/v1"),
        api_key.map(String::from),
        "test-model",
        Duration::from_secs(5),
    )
}

#[tokio::test]
async fn chat_success_sends_truncated_prompt_with_bearer() {
    let seen = Seen::default();
    let app = Router::new()
        .route("/v1/chat/completions", post(chat_ok))
        .with_state(seen.clone());
    let base = serve(app).await;

    let text = format!("{}{}", "a".repeat(3000), "TAIL");
    let summary = chat_client(&base, Some("sk-test"))
        .summarize(&text)
        .await
        .unwrap();
    assert_eq!(summary, "It is about testing.");

    assert_eq!(seen.auth.lock().unwrap().as_deref(), Some("Bearer sk-test"));
    let body = seen.body.lock().unwrap().clone().unwrap();
    assert_eq!(body["model"], "test-model");
    assert_eq!(body["messages"][0]["role"], "system");
    let user = body["messages"][1]["content"].as_str().unwrap();
    assert_eq!(user, &text[..3000]);
    assert!(!user.contains("TAIL"));
}

#[tokio::test]
async fn chat_unauthorized_maps_to_status_error() {
    let app = Router::new().route(
        "/v1/chat/completions",
        post(|| async { (StatusCode::UNAUTHORIZED, "invalid api key") }),
    );
    let base = serve(app).await;

    let err = chat_client(&base, Some("sk-bad"))
        .summarize("hello")
        .await
        .unwrap_err();
    match err {
        SummaryError::Status { status, body } => {
            assert_eq!(status, 401);
            assert_eq!(body, "invalid api key");
        }
        other => panic!("expected status error, got {other:?}"),
    }
}

#[tokio::test]
async fn chat_rate_limit_maps_to_rate_limited() {
    let app = Router::new().route(
        "/v1/chat/completions",
        post(|| async { StatusCode::TOO_MANY_REQUESTS }),
    );
    let base = serve(app).await;

    let err = chat_client(&base, Some("sk-test"))
        .summarize("hello")
        .await
        .unwrap_err();
    assert!(matches!(err, SummaryError::RateLimited));
}

#[tokio::test]
async fn chat_without_key_fails_before_network() {
    // Nothing listens on this address; a request would fail with Http.
    let err = chat_client("http://127.0.0.1:9", None)
        .summarize("hello")
        .await
        .unwrap_err();
    assert!(matches!(err, SummaryError::MissingApiKey));
}

#[tokio::test]
async fn connection_refused_maps_to_http_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = chat_client(&format!("http://{addr}"), Some("sk-test"))
        .summarize("hello")
        .await
        .unwrap_err();
    assert!(matches!(err, SummaryError::Http(_)));
}

#[tokio::test]
async fn relay_success_returns_summary() {
    let seen = Seen::default();
    let app = Router::new()
        .route(
            "/api/summarize",
            post(
                |State(seen): State<Seen>, Json(req): Json<SummarizeRequest>| async move {
                    *seen.body.lock().unwrap() = Some(json!({ "text": req.text }));
                    Json(SummarizeResponse {
                        summary: "relayed".into(),
                    })
                },
            ),
        )
        .with_state(seen.clone());
    let base = serve(app).await;

    let client = RelayClient::new(reqwest::Client::new(), base, Duration::from_secs(5));
    let text = "é".repeat(3100);
    assert_eq!(client.summarize(&text).await.unwrap(), "relayed");

    let body = seen.body.lock().unwrap().clone().unwrap();
    assert_eq!(body["text"].as_str().unwrap().chars().count(), 3000);
}

#[tokio::test]
async fn relay_error_body_becomes_upstream_error() {
    let app = Router::new().route(
        "/api/summarize",
        post(|| async {
            (
                StatusCode::BAD_GATEWAY,
                Json(ErrorResponse {
                    error: "Failed to generate summary".into(),
                }),
            )
        }),
    );
    let base = serve(app).await;

    let client = RelayClient::new(reqwest::Client::new(), base, Duration::from_secs(5));
    match client.summarize("text").await.unwrap_err() {
        SummaryError::Upstream(msg) => assert_eq!(msg, "Failed to generate summary"),
        other => panic!("expected upstream error, got {other:?}"),
    }
}
