//! Integration tests for model providers behind the retrying client.

use mockito::Matcher;
use serde_json::json;
use std::sync::Arc;
use thoughtchain_abstraction::{ChatMessage, Completion, Model, ModelError};
use thoughtchain_models::{LlmClient, ModelConfig, ModelFactory, ModelType};

fn deepseek_client(server: &mockito::ServerGuard) -> LlmClient {
    let config = ModelConfig::new(ModelType::DeepSeek)
        .with_api_key("test-key".to_string())
        .with_endpoint(format!("{}/chat/completions", server.url()));
    LlmClient::new(ModelFactory::create(config).unwrap())
}

#[tokio::test]
async fn test_model_factory_mock() {
    let model = ModelFactory::create_from_str("mock").unwrap();
    assert_eq!(model.model_id(), "mock");

    let response =
        model.generate_chat_completion(&[ChatMessage::user("Hello")], None).await.unwrap();
    assert!(!response.completion.is_empty());
    assert!(response.usage.is_some());
}

#[tokio::test]
async fn test_model_factory_invalid_type() {
    let result = ModelFactory::create_from_str("invalid");
    assert!(matches!(result, Err(ModelError::UnsupportedModelProvider(_))));
}

#[tokio::test]
async fn test_client_sends_temperature_and_reads_content() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/chat/completions")
        .match_body(Matcher::PartialJson(json!({
            "model": "deepseek-chat",
            "temperature": 0.25,
            "stream": false,
            "messages": [
                {"role": "system", "content": "Grade strictly."},
                {"role": "user", "content": "x = 1"}
            ]
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"choices":[{"message":{"role":"assistant","content":"7/10 fine"}}]}"#)
        .expect(1)
        .create_async()
        .await;

    let completion = deepseek_client(&server).ask("Grade strictly.", "x = 1", 0.25).await.unwrap();

    assert_eq!(completion, Completion::Content("7/10 fine".to_string()));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_client_retries_server_errors_three_times() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/chat/completions")
        .with_status(503)
        .with_body("overloaded")
        .expect(3)
        .create_async()
        .await;

    let err = deepseek_client(&server).ask("s", "u", 0.7).await.unwrap_err();

    assert_eq!(err, ModelError::Status { status: 503, body: "overloaded".to_string() });
    mock.assert_async().await;
}

#[tokio::test]
async fn test_client_does_not_retry_malformed_body() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/chat/completions")
        .with_status(200)
        .with_body("not json at all")
        .expect(1)
        .create_async()
        .await;

    let completion = deepseek_client(&server).ask("s", "u", 0.7).await.unwrap();

    assert_eq!(completion, Completion::Empty);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_client_with_single_attempt() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/chat/completions")
        .with_status(500)
        .expect(1)
        .create_async()
        .await;

    let model: Arc<dyn Model> = ModelFactory::create(
        ModelConfig::new(ModelType::DeepSeek)
            .with_api_key("k".to_string())
            .with_endpoint(format!("{}/chat/completions", server.url())),
    )
    .unwrap();
    let client = LlmClient::new(model).with_max_attempts(1);

    assert!(client.ask("s", "u", 0.7).await.is_err());
    mock.assert_async().await;
}
