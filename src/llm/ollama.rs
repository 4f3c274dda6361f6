use crate::llm::client::LLMClient;
use crate::types::{AppError, ChatMessage, MessageRole, Result};
use async_trait::async_trait;
use ollama_rs::{
    Ollama,
    generation::chat::{ChatMessage as OllamaMessage, request::ChatMessageRequest},
};
use std::time::Duration;
use tracing::debug;

const DEFAULT_PORT: u16 = 11434;

pub struct OllamaClient {
    client: Ollama,
    model: String,
    timeout: Duration,
}

impl OllamaClient {
    pub fn new(base_url: String, model: String, timeout: Duration) -> Result<Self> {
        let url = reqwest::Url::parse(&base_url).map_err(|e| {
            AppError::Configuration(format!("Invalid Ollama URL '{}': {}", base_url, e))
        })?;
        let host = url.host_str().ok_or_else(|| {
            AppError::Configuration(format!("Ollama URL '{}' has no host", base_url))
        })?;
        let port = url.port().unwrap_or(DEFAULT_PORT);

        let client = Ollama::new(format!("{}://{}", url.scheme(), host), port);

        Ok(Self {
            client,
            model,
            timeout,
        })
    }
}

fn to_ollama(message: &ChatMessage) -> OllamaMessage {
    match message.role {
        MessageRole::System => OllamaMessage::system(message.content.clone()),
        MessageRole::User => OllamaMessage::user(message.content.clone()),
        MessageRole::Assistant => OllamaMessage::assistant(message.content.clone()),
    }
}

#[async_trait]
impl LLMClient for OllamaClient {
    async fn complete(
        &self,
        messages: &[ChatMessage],
        system_prompt: Option<&str>,
    ) -> Result<String> {
        let chat_messages: Vec<OllamaMessage> = system_prompt
            .map(|system| OllamaMessage::system(system.to_string()))
            .into_iter()
            .chain(messages.iter().map(to_ollama))
            .collect();

        let request = ChatMessageRequest::new(self.model.clone(), chat_messages);

        let response = tokio::time::timeout(self.timeout, self.client.send_chat_messages(request))
            .await
            .map_err(|_| AppError::Timeout {
                operation: "Ollama chat".to_string(),
                seconds: self.timeout.as_secs(),
            })?
            .map_err(|e| AppError::GenerationService(format!("Ollama error: {}", e)))?;

        let content = response.message.content;
        if content.is_empty() {
            return Err(AppError::GenerationService(
                "No response from Ollama".to_string(),
            ));
        }

        debug!(model = %self.model, chars = content.len(), "Ollama completion received");
        Ok(content)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
