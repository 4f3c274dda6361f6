//! Provider HTTP tests with mocked network responses
//!
//! These tests use wiremock to stand in for the OpenAI-compatible chat and
//! embedding endpoints and the Ollama chat endpoint.

use groundwork::index::Embedder;
use groundwork::llm::openai::OpenAIClient;
use groundwork::llm::{LLMClient, Provider};
use groundwork::rag::embeddings::{EmbedderSettings, OpenAIEmbedder};
use groundwork::types::{AppError, ChatMessage};
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TIMEOUT: Duration = Duration::from_secs(5);

// ============= Helper Functions =============

/// Create a mock OpenAI chat completion response
fn mock_completion(content: &str) -> serde_json::Value {
    json!({
        "id": "chatcmpl-1",
        "object": "chat.completion",
        "model": "gpt-4o-mini",
        "choices": [{
            "index": 0,
            "message": { "role": "assistant", "content": content },
            "finish_reason": "stop"
        }]
    })
}

fn openai_client(server: &MockServer) -> OpenAIClient {
    OpenAIClient::new(
        "sk-test".to_string(),
        format!("{}/v1/", server.uri()),
        "gpt-4o-mini".to_string(),
        TIMEOUT,
    )
    .unwrap()
}

fn openai_embedder(server: &MockServer) -> OpenAIEmbedder {
    OpenAIEmbedder::new(
        "sk-test".to_string(),
        format!("{}/v1", server.uri()),
        "text-embedding-3-small".to_string(),
        TIMEOUT,
    )
    .unwrap()
}

// ============= OpenAI Chat =============

#[tokio::test]
async fn test_openai_chat_sends_system_prompt_first() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer sk-test"))
        .and(body_json(json!({
            "model": "gpt-4o-mini",
            "messages": [
                { "role": "system", "content": "Be brief." },
                { "role": "user", "content": "What is X?" }
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(mock_completion("A widget.")))
        .expect(1)
        .mount(&server)
        .await;

    let client = openai_client(&server);
    let answer = client
        .complete(&[ChatMessage::user("What is X?")], Some("Be brief."))
        .await
        .unwrap();

    assert_eq!(answer, "A widget.");
    assert_eq!(client.model_name(), "gpt-4o-mini");
}

#[tokio::test]
async fn test_openai_generate_uses_single_user_message() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(body_json(json!({
            "model": "gpt-4o-mini",
            "messages": [{ "role": "user", "content": "hello" }]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(mock_completion("hi")))
        .mount(&server)
        .await;

    assert_eq!(openai_client(&server).generate("hello").await.unwrap(), "hi");
}

#[tokio::test]
async fn test_openai_error_status_is_generation_failure() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(429).set_body_json(json!({
            "error": { "message": "Rate limit reached", "type": "rate_limit" }
        })))
        .mount(&server)
        .await;

    let err = openai_client(&server).generate("hello").await.unwrap_err();

    match err {
        AppError::GenerationService(message) => {
            assert!(message.contains("429"));
            assert!(message.contains("Rate limit reached"));
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[tokio::test]
async fn test_openai_empty_content_is_generation_failure() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "choices": [] })))
        .mount(&server)
        .await;

    let err = openai_client(&server).generate("hello").await.unwrap_err();
    assert!(matches!(err, AppError::GenerationService(_)));
    assert!(err.is_collaborator_failure());
}

#[tokio::test]
async fn test_provider_creates_openai_client() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(mock_completion("ok")))
        .mount(&server)
        .await;

    let provider = Provider::OpenAI {
        api_key: "sk-test".to_string(),
        api_base: format!("{}/v1", server.uri()),
        model: "gpt-4o-mini".to_string(),
    };
    let client = provider.create_client(TIMEOUT).unwrap();

    assert_eq!(client.generate("ping").await.unwrap(), "ok");
}

// ============= OpenAI Embeddings =============

#[tokio::test]
async fn test_openai_embeddings_reordered_by_index() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/embeddings"))
        .and(header("authorization", "Bearer sk-test"))
        .and(body_json(json!({
            "model": "text-embedding-3-small",
            "input": ["first", "second"]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "object": "list",
            "data": [
                { "object": "embedding", "index": 1, "embedding": [0.0, 1.0] },
                { "object": "embedding", "index": 0, "embedding": [1.0, 0.0] }
            ],
            "model": "text-embedding-3-small"
        })))
        .mount(&server)
        .await;

    let embeddings = openai_embedder(&server)
        .embed_documents(&["first".to_string(), "second".to_string()])
        .await
        .unwrap();

    assert_eq!(embeddings, vec![vec![1.0, 0.0], vec![0.0, 1.0]]);
}

#[tokio::test]
async fn test_openai_query_embedding() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/embeddings"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{ "index": 0, "embedding": [0.5, 0.25, 0.125] }]
        })))
        .mount(&server)
        .await;

    let embedding = openai_embedder(&server).embed_query("cats").await.unwrap();
    assert_eq!(embedding, vec![0.5, 0.25, 0.125]);
}

#[tokio::test]
async fn test_openai_embedding_count_mismatch() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/embeddings"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{ "index": 0, "embedding": [1.0] }]
        })))
        .mount(&server)
        .await;

    let err = openai_embedder(&server)
        .embed_documents(&["a".to_string(), "b".to_string()])
        .await
        .unwrap_err();

    let err: AppError = err.into();
    assert!(matches!(err, AppError::EmbeddingService(_)));
}

#[tokio::test]
async fn test_openai_embedding_api_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/embeddings"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": { "message": "Incorrect API key provided" }
        })))
        .mount(&server)
        .await;

    let err: AppError = openai_embedder(&server)
        .embed_query("cats")
        .await
        .unwrap_err()
        .into();

    assert!(err.to_string().contains("Incorrect API key provided"));
    assert!(err.is_collaborator_failure());
}

#[tokio::test]
async fn test_settings_create_openai_embedder() {
    let settings = EmbedderSettings::OpenAI {
        api_key: "sk-test".to_string(),
        api_base: "http://localhost:1".to_string(),
        model: "text-embedding-3-small".to_string(),
    };
    let embedder = settings.create_embedder(TIMEOUT).unwrap();
    assert_eq!(embedder.name(), "openai");

    let empty_key = EmbedderSettings::OpenAI {
        api_key: String::new(),
        api_base: "http://localhost:1".to_string(),
        model: "text-embedding-3-small".to_string(),
    };
    assert!(matches!(
        empty_key.create_embedder(TIMEOUT),
        Err(AppError::Configuration(_))
    ));
}

// ============= Ollama =============

#[cfg(feature = "ollama")]
mod ollama {
    use super::*;
    use groundwork::llm::ollama::OllamaClient;

    /// Create a mock Ollama chat completion response
    fn mock_chat_response(content: &str) -> serde_json::Value {
        json!({
            "model": "llama3.2",
            "created_at": "2024-01-01T00:00:00Z",
            "message": {
                "role": "assistant",
                "content": content
            },
            "done": true
        })
    }

    #[tokio::test]
    async fn test_ollama_chat() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .respond_with(ResponseTemplate::new(200).set_body_json(mock_chat_response("A widget.")))
            .expect(1)
            .mount(&server)
            .await;

        let client = OllamaClient::new(server.uri(), "llama3.2".to_string(), TIMEOUT).unwrap();
        let answer = client
            .complete(&[ChatMessage::user("What is X?")], Some("Be brief."))
            .await
            .unwrap();

        assert_eq!(answer, "A widget.");
        assert_eq!(client.model_name(), "llama3.2");
    }

    #[tokio::test]
    async fn test_ollama_server_error_is_generation_failure() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .respond_with(ResponseTemplate::new(500).set_body_string("model not loaded"))
            .mount(&server)
            .await;

        let client = OllamaClient::new(server.uri(), "llama3.2".to_string(), TIMEOUT).unwrap();
        let err = client.generate("hello").await.unwrap_err();

        assert!(matches!(err, AppError::GenerationService(_)));
    }

    #[test]
    fn test_ollama_invalid_url() {
        let result = OllamaClient::new("not a url".to_string(), "llama3.2".to_string(), TIMEOUT);
        assert!(matches!(result, Err(AppError::Configuration(_))));
    }
}
