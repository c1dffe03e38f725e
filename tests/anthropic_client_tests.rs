use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
};
use chat_proxy::services::anthropic::AnthropicClient;
use chat_proxy::services::completion::{
    CompletionProvider, CompletionRequest, ContentBlock, ProviderError, TokenUsage,
};
use serde_json::{Value, json};
use tokio::net::TcpListener;

#[derive(Clone)]
struct FakeApi {
    status: StatusCode,
    body: String,
    captured: Arc<Mutex<Vec<(HeaderMap, Value)>>>,
}

async fn messages(State(api): State<FakeApi>, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    api.captured.lock().unwrap().push((headers, body));
    (
        api.status,
        [("content-type", "application/json")],
        api.body.clone(),
    )
        .into_response()
}

/// Serve a canned Messages API answer on an ephemeral port.
async fn spawn_fake(status: StatusCode, body: &str) -> (String, Arc<Mutex<Vec<(HeaderMap, Value)>>>) {
    let captured = Arc::new(Mutex::new(Vec::new()));
    let api = FakeApi {
        status,
        body: body.to_string(),
        captured: captured.clone(),
    };
    let app = Router::new().route("/v1/messages", post(messages)).with_state(api);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{addr}"), captured)
}

fn request() -> CompletionRequest {
    CompletionRequest {
        model: "claude-3-opus-20240229".to_string(),
        max_tokens: 1000,
        temperature: Some(0.7),
        system: Some("You are a helpful AI assistant.".to_string()),
        message: "Hello".to_string(),
    }
}

fn client(base_url: &str) -> AnthropicClient {
    AnthropicClient::new("sk-test", base_url, Duration::from_secs(5)).unwrap()
}

#[tokio::test]
async fn sends_messages_api_request() {
    let body = json!({
        "id": "msg_1",
        "type": "message",
        "role": "assistant",
        "model": "claude-3-opus-20240229",
        "content": [{"type": "text", "text": "Hi"}],
        "stop_reason": "end_turn",
        "usage": {"input_tokens": 8, "output_tokens": 1}
    })
    .to_string();
    let (base_url, captured) = spawn_fake(StatusCode::OK, &body).await;

    let response = client(&base_url).complete(request()).await.unwrap();

    assert_eq!(response.content, vec![ContentBlock::Text { text: "Hi".to_string() }]);
    assert_eq!(response.usage, Some(TokenUsage { input_tokens: 8, output_tokens: 1 }));

    let captured = captured.lock().unwrap();
    assert_eq!(captured.len(), 1);
    let (headers, sent) = &captured[0];
    assert_eq!(headers.get("x-api-key").unwrap(), "sk-test");
    assert_eq!(headers.get("anthropic-version").unwrap(), "2023-06-01");
    assert_eq!(sent["model"], "claude-3-opus-20240229");
    assert_eq!(sent["max_tokens"], 1000);
    assert_eq!(sent["system"], "You are a helpful AI assistant.");
    assert_eq!(sent["messages"], json!([{"role": "user", "content": "Hello"}]));
}

#[tokio::test]
async fn keeps_non_text_blocks_as_other() {
    let body = json!({
        "content": [
            {"type": "tool_use", "id": "t1", "name": "lookup", "input": {}},
            {"type": "text", "text": "Done"}
        ]
    })
    .to_string();
    let (base_url, _) = spawn_fake(StatusCode::OK, &body).await;

    let response = client(&base_url).complete(request()).await.unwrap();

    assert_eq!(
        response.content,
        vec![ContentBlock::Other, ContentBlock::Text { text: "Done".to_string() }]
    );
    assert!(response.usage.is_none());
}

#[tokio::test]
async fn non_success_status_is_provider_error() {
    let body = json!({
        "type": "error",
        "error": {"type": "authentication_error", "message": "invalid x-api-key"}
    })
    .to_string();
    let (base_url, _) = spawn_fake(StatusCode::UNAUTHORIZED, &body).await;

    let err = client(&base_url).complete(request()).await.unwrap_err();

    match err {
        ProviderError::Status { status, message } => {
            assert_eq!(status, 401);
            assert_eq!(message, "invalid x-api-key");
        }
        other => panic!("expected status error, got {other:?}"),
    }
}

#[tokio::test]
async fn unstructured_error_body_is_kept_verbatim() {
    let (base_url, _) = spawn_fake(StatusCode::BAD_GATEWAY, "upstream down").await;

    let err = client(&base_url).complete(request()).await.unwrap_err();

    assert!(matches!(err, ProviderError::Status { status: 502, ref message } if message == "upstream down"));
}

#[tokio::test]
async fn malformed_payload_is_provider_error() {
    let (base_url, _) = spawn_fake(StatusCode::OK, r#"{"unexpected": true}"#).await;

    let err = client(&base_url).complete(request()).await.unwrap_err();

    assert!(matches!(err, ProviderError::Malformed(_)));
}

#[tokio::test]
async fn unreachable_host_is_transport_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = client(&format!("http://{addr}")).complete(request()).await.unwrap_err();

    assert!(matches!(err, ProviderError::Transport(_)));
}

async fn slow_messages() -> &'static str {
    tokio::time::sleep(Duration::from_secs(2)).await;
    "{}"
}

#[tokio::test]
async fn timeout_is_transport_error() {
    let app = Router::new().route("/v1/messages", post(slow_messages));
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let client = AnthropicClient::new("sk-test", &format!("http://{addr}"), Duration::from_millis(100)).unwrap();
    let err = client.complete(request()).await.unwrap_err();

    match err {
        ProviderError::Transport(inner) => assert!(inner.is_timeout()),
        other => panic!("expected timeout, got {other:?}"),
    }
}
