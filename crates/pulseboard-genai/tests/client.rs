//! Integration tests for `GeminiClient` using wiremock HTTP mocks.

use std::time::Duration;

use pulseboard_genai::{GeminiClient, GenAiError};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_client(base_url: &str) -> GeminiClient {
    GeminiClient::with_base_url("test-key", "gemini-2.0-flash", 30, base_url)
        .expect("client construction should not fail")
}

#[tokio::test]
async fn generate_returns_text_and_token_usage() {
    let server = MockServer::start().await;

    let body = serde_json::json!({
        "candidates": [
            {
                "content": {
                    "parts": [
                        { "text": "A compelling caption " },
                        { "text": "in two parts." }
                    ],
                    "role": "model"
                },
                "finishReason": "STOP"
            }
        ],
        "usageMetadata": {
            "promptTokenCount": 42,
            "candidatesTokenCount": 58,
            "totalTokenCount": 100
        }
    });

    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-2.0-flash:generateContent"))
        .and(query_param("key", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let generation = client.generate("write a caption").await.expect("generation");

    assert_eq!(generation.text, "A compelling caption in two parts.");
    assert_eq!(generation.tokens, 100);
    assert_eq!(generation.model, "gemini-2.0-flash");
}

#[tokio::test]
async fn generate_defaults_tokens_to_zero_without_usage_metadata() {
    let server = MockServer::start().await;

    let body = serde_json::json!({
        "candidates": [
            { "content": { "parts": [{ "text": "short answer" }] } }
        ]
    });

    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-2.0-flash:generateContent"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let generation = client.generate("prompt").await.expect("generation");

    assert_eq!(generation.text, "short answer");
    assert_eq!(generation.tokens, 0);
}

#[tokio::test]
async fn api_error_surfaces_message() {
    let server = MockServer::start().await;

    let body = serde_json::json!({
        "error": {
            "code": 400,
            "message": "API key not valid. Please pass a valid API key.",
            "status": "INVALID_ARGUMENT"
        }
    });

    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-2.0-flash:generateContent"))
        .respond_with(ResponseTemplate::new(400).set_body_json(&body))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client.generate("prompt").await.unwrap_err();

    assert!(
        matches!(err, GenAiError::Api(ref msg) if msg.contains("API key not valid")),
        "expected Api error with message, got: {err:?}"
    );
}

#[tokio::test]
async fn empty_candidate_list_is_an_api_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-2.0-flash:generateContent"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "candidates": [] })),
        )
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client.generate("prompt").await.unwrap_err();

    assert!(
        matches!(err, GenAiError::Api(ref msg) if msg.contains("no candidates")),
        "expected Api error, got: {err:?}"
    );
}

#[tokio::test]
async fn slow_response_maps_to_timeout() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-2.0-flash:generateContent"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "candidates": [] }))
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&server)
        .await;

    // 1-second budget against a 5-second mock delay.
    let client = GeminiClient::with_base_url("test-key", "gemini-2.0-flash", 1, &server.uri())
        .expect("client construction should not fail");
    let err = client.generate("prompt").await.unwrap_err();

    assert!(
        matches!(err, GenAiError::Timeout),
        "expected Timeout, got: {err:?}"
    );
}
