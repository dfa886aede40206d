//! End-to-end streaming tests against a mock HTTP server.

use futures::StreamExt;
use giteeai::model::{ChatCompletionMessage, ChatCompletionRequest, CompletionRequest, QWEN2_7B_INSTRUCT};
use giteeai::{Client, ClientConfig, ClientError};
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer, limit: usize) -> Client {
    let config = ClientConfig::new("test-key")
        .with_base_url(format!("{}/v1", server.uri()))
        .with_empty_messages_limit(limit);
    Client::new(config).expect("client")
}

fn chat_request() -> ChatCompletionRequest {
    ChatCompletionRequest::new(QWEN2_7B_INSTRUCT, vec![ChatCompletionMessage::user("Hello!")])
}

fn chat_chunk(content: &str) -> String {
    format!(
        "data: {}\n\n",
        serde_json::json!({
            "id": "chatcmpl-1",
            "object": "chat.completion.chunk",
            "created": 1700000000,
            "model": QWEN2_7B_INSTRUCT,
            "choices": [{"index": 0, "delta": {"content": content}, "finish_reason": null}]
        })
    )
}

#[tokio::test]
async fn chat_stream_delivers_chunks_in_order() {
    let server = MockServer::start().await;
    let body = format!("{}{}: keep-alive\n\n{}data: [DONE]\n\n", chat_chunk("Hel"), chat_chunk("lo"), chat_chunk("!"));
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer test-key"))
        .and(header("accept", "text/event-stream"))
        .and(body_partial_json(serde_json::json!({"stream": true})))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("x-ratelimit-remaining-requests", "41")
                .set_body_raw(body, "text/event-stream"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, 300);
    let mut stream = client.create_chat_completion_stream(chat_request()).await.unwrap();

    let mut text = String::new();
    while let Some(event) = stream.recv().await.unwrap() {
        assert_eq!(event.rate_limit().remaining_requests, 41);
        text.push_str(event.content().unwrap_or_default());
    }
    assert_eq!(text, "Hello!");
    assert!(stream.is_closed());
    assert!(stream.recv().await.unwrap().is_none());
}

#[tokio::test]
async fn chat_stream_failure_status_is_reported_at_open() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
            "error": {"message": "Incorrect API key provided", "type": "invalid_request_error", "code": "invalid_api_key"}
        })))
        .mount(&server)
        .await;

    let client = client_for(&server, 300);
    match client.create_chat_completion_stream(chat_request()).await {
        Err(ClientError::Api(e)) => {
            assert_eq!(e.http_status_code, 401);
            assert_eq!(e.message, "Incorrect API key provided");
            assert_eq!(e.code, Some(serde_json::json!("invalid_api_key")));
        }
        other => panic!("expected api error, got {other:?}"),
    }
}

#[tokio::test]
async fn chat_stream_error_body_with_success_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            "{\n  \"error\": {\n    \"message\": \"model is overloaded\",\n    \"type\": \"server_error\"\n  }\n}\n",
            "application/json",
        ))
        .mount(&server)
        .await;

    let client = client_for(&server, 300);
    let mut stream = client.create_chat_completion_stream(chat_request()).await.unwrap();
    match stream.recv().await {
        Err(ClientError::Api(e)) => assert_eq!(e.message, "model is overloaded"),
        other => panic!("expected api error, got {other:?}"),
    }
}

#[tokio::test]
async fn chat_stream_stall_guard() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            format!("{}{}", chat_chunk("a"), "\n".repeat(10)),
            "text/event-stream",
        ))
        .mount(&server)
        .await;

    let client = client_for(&server, 5);
    let mut stream = client.create_chat_completion_stream(chat_request()).await.unwrap();
    assert_eq!(stream.recv().await.unwrap().unwrap().content(), Some("a"));
    assert!(matches!(
        stream.recv().await,
        Err(ClientError::TooManyEmptyStreamMessages { limit: 5 })
    ));
}

#[tokio::test]
async fn completion_stream_as_futures_stream() {
    let server = MockServer::start().await;
    let chunk = |text: &str| {
        format!(
            "data: {}\n\n",
            serde_json::json!({"id": "cmpl-1", "choices": [{"text": text, "index": 0}]})
        )
    };
    Mock::given(method("POST"))
        .and(path("/v1/completions"))
        .and(body_partial_json(serde_json::json!({"stream": true, "prompt": "Lorem"})))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            format!("{}{}data: [DONE]\n\n", chunk(" ipsum"), chunk(" dolor")),
            "text/event-stream",
        ))
        .mount(&server)
        .await;

    let client = client_for(&server, 300);
    let stream = client
        .create_completion_stream(CompletionRequest::new(QWEN2_7B_INSTRUCT, "Lorem"))
        .await
        .unwrap();

    let texts: Vec<String> = stream
        .into_stream()
        .map(|event| event.unwrap().choices[0].text.clone())
        .collect()
        .await;
    assert_eq!(texts, vec![" ipsum", " dolor"]);
}
