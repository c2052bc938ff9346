//! Integration tests for the chat completion client

use serde_json::json;
use stockpulse::config::ChatConfig;
use stockpulse::services::chat::{
    ChatCompleter, ChatError, OpenAiChatClient, MAX_COMPLETION_TOKENS, SYSTEM_PROMPT,
};
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn chat_config(server: &MockServer, api_key: Option<&str>) -> ChatConfig {
    ChatConfig {
        api_key: api_key.map(str::to_string),
        model: "gpt-test".to_string(),
        base_url: server.uri(),
    }
}

fn test_client(server: &MockServer, api_key: Option<&str>) -> OpenAiChatClient {
    OpenAiChatClient::new(&chat_config(server, api_key), reqwest::Client::new())
}

#[tokio::test]
async fn completes_with_system_prompt() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("authorization", "Bearer sk-test"))
        .and(body_partial_json(json!({
            "model": "gpt-test",
            "max_tokens": MAX_COMPLETION_TOKENS,
            "messages": [
                { "role": "system", "content": SYSTEM_PROMPT },
                { "role": "user", "content": "What is MACD?" }
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{ "message": { "role": "assistant", "content": "A momentum indicator." } }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server, Some("sk-test"));
    let reply = client.complete("What is MACD?").await.expect("reply");
    assert_eq!(reply, "A momentum indicator.");
}

#[tokio::test]
async fn missing_api_key_fails_without_calling_upstream() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let client = test_client(&server, None);
    assert!(matches!(
        client.complete("hi").await,
        Err(ChatError::MissingApiKey)
    ));
}

#[tokio::test]
async fn upstream_error_status_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&server)
        .await;

    let client = test_client(&server, Some("sk-test"));
    assert!(matches!(
        client.complete("hi").await,
        Err(ChatError::Status(429))
    ));
}

#[tokio::test]
async fn null_content_is_empty_reply() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{ "message": { "role": "assistant", "content": null } }]
        })))
        .mount(&server)
        .await;

    let client = test_client(&server, Some("sk-test"));
    assert_eq!(client.complete("hi").await.expect("reply"), "");
}

#[tokio::test]
async fn no_choices_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "choices": [] })))
        .mount(&server)
        .await;

    let client = test_client(&server, Some("sk-test"));
    assert!(matches!(client.complete("hi").await, Err(ChatError::NoChoices)));
}
