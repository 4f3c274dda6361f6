//! Conversation orchestrator: turns a question plus history into a grounded answer.
//!
//! Each call runs four steps:
//! 1. render the history as a `user:` / `assistant:` transcript
//! 2. in standalone mode, ask the model to rewrite the question so it no
//!    longer depends on the transcript
//! 3. retrieve chunks for the (rewritten) question and join them with a
//!    blank line into the grounding context
//! 4. ask the model for the answer, with the transcript in contextual mode
//!
//! Embedding, retrieval and model calls each run under the configured
//! timeout. Their failures, timeouts included, are turned into an answer
//! string reporting the reason. Index invariant violations are returned as
//! errors.

use crate::llm::LLMClient;
use crate::rag::prompts;
use crate::rag::retriever::Retrieve;
use crate::types::{AppError, ChatMessage, Result, Turn};
use groundwork_index::Document;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::future::Future;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, instrument};

fn default_max_docs() -> usize {
    5
}

fn default_request_timeout_secs() -> u64 {
    60
}

/// How history is folded into a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConversationMode {
    /// Rewrite the question into a standalone one, then answer from context only.
    #[default]
    Standalone,
    /// Keep the question as asked and include the transcript in the answer prompt.
    Contextual,
}

impl ConversationMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConversationMode::Standalone => "standalone",
            ConversationMode::Contextual => "contextual",
        }
    }
}

impl FromStr for ConversationMode {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "standalone" => Ok(ConversationMode::Standalone),
            "contextual" => Ok(ConversationMode::Contextual),
            other => Err(AppError::Configuration(format!(
                "Unknown conversation mode '{}' (expected standalone or contextual)",
                other
            ))),
        }
    }
}

impl fmt::Display for ConversationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratorConfig {
    #[serde(default)]
    pub mode: ConversationMode,

    /// Sent as the system message on every model call.
    #[serde(default)]
    pub system_prompt: Option<String>,

    /// Chunks retrieved per question.
    #[serde(default = "default_max_docs")]
    pub max_docs: usize,

    /// Upper bound for each embedding, retrieval or model call.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            mode: ConversationMode::default(),
            system_prompt: None,
            max_docs: default_max_docs(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl GeneratorConfig {
    pub fn with_mode(mut self, mode: ConversationMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    pub fn with_max_docs(mut self, max_docs: usize) -> Self {
        self.max_docs = max_docs;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout_secs = timeout.as_secs().max(1);
        self
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Render history as alternating `user:` / `assistant:` lines, oldest first.
pub fn format_chat_history(history: &[Turn]) -> String {
    history
        .iter()
        .flat_map(|turn| {
            [
                format!("user: {}", turn.user),
                format!("assistant: {}", turn.assistant),
            ]
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Join chunk contents with a blank line, keeping retrieval order.
pub fn format_docs(documents: &[Document]) -> String {
    documents
        .iter()
        .map(|d| d.content.as_str())
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// The answer returned in place of a failed turn.
pub fn failure_answer(reason: &AppError) -> String {
    format!("Question failed due to:\n {}", reason)
}

pub struct Generator {
    llm: Arc<dyn LLMClient>,
    retriever: Arc<dyn Retrieve>,
    config: GeneratorConfig,
}

impl Generator {
    pub fn new(
        llm: Arc<dyn LLMClient>,
        retriever: Arc<dyn Retrieve>,
        config: GeneratorConfig,
    ) -> Self {
        Self {
            llm,
            retriever,
            config,
        }
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Answer `question` given the conversation so far.
    ///
    /// Returns `Ok` with either the model's answer or a message naming the
    /// collaborator failure. Returns `Err` only for errors that indicate
    /// corrupted local state.
    #[instrument(skip(self, question, history), fields(mode = %self.config.mode, turns = history.len()))]
    pub async fn answer_user_question(&self, question: &str, history: &[Turn]) -> Result<String> {
        match self.try_answer(question, history).await {
            Ok(answer) => Ok(answer),
            Err(e) if e.is_collaborator_failure() => {
                error!(error = %e, "Question failed");
                Ok(failure_answer(&e))
            }
            Err(e) => Err(e),
        }
    }

    async fn try_answer(&self, question: &str, history: &[Turn]) -> Result<String> {
        let transcript = format_chat_history(history);

        let prompt = match self.config.mode {
            ConversationMode::Standalone => {
                let standalone = self
                    .call_llm(&prompts::standalone_question(&transcript, question))
                    .await?;
                debug!(original = question, rewritten = %standalone, "Rewrote question");
                let context = self.retrieve_context(&standalone).await?;
                prompts::standalone_answer(&context, &standalone)
            }
            ConversationMode::Contextual => {
                let context = self.retrieve_context(question).await?;
                prompts::contextual_answer(&transcript, &context, question)
            }
        };

        let answer = self.call_llm(&prompt).await?;
        info!(chars = answer.len(), "Answered question");
        Ok(answer)
    }

    async fn retrieve_context(&self, question: &str) -> Result<String> {
        let documents = self
            .with_timeout(
                "retrieval",
                self.retriever
                    .retrieve_similar_docs(question, self.config.max_docs),
            )
            .await?;
        debug!(documents = documents.len(), "Assembled grounding context");
        Ok(format_docs(&documents))
    }

    async fn call_llm(&self, prompt: &str) -> Result<String> {
        let messages = [ChatMessage::user(prompt)];
        self.with_timeout(
            "language model call",
            self.llm
                .complete(&messages, self.config.system_prompt.as_deref()),
        )
        .await
    }

    async fn with_timeout<T>(
        &self,
        operation: &str,
        call: impl Future<Output = Result<T>>,
    ) -> Result<T> {
        let timeout = self.config.request_timeout();
        tokio::time::timeout(timeout, call)
            .await
            .map_err(|_| AppError::Timeout {
                operation: operation.to_string(),
                seconds: timeout.as_secs(),
            })?
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_chat_history() {
        let history = vec![
            Turn::new("What is X?", "X is a widget."),
            Turn::new("And Y?", "Y is a gadget."),
        ];
        assert_eq!(
            format_chat_history(&history),
            "user: What is X?\nassistant: X is a widget.\nuser: And Y?\nassistant: Y is a gadget."
        );
        assert_eq!(format_chat_history(&[]), "");
    }

    #[test]
    fn test_format_chat_history_is_verbatim() {
        let history = vec![Turn::new("line one\nline two", "")];
        assert_eq!(
            format_chat_history(&history),
            "user: line one\nline two\nassistant: "
        );
    }

    #[test]
    fn test_format_docs() {
        let docs = vec![Document::new("first"), Document::new("second")];
        assert_eq!(format_docs(&docs), "first\n\nsecond");
        assert_eq!(format_docs(&[]), "");
    }

    #[test]
    fn test_mode_from_str() {
        assert_eq!(
            "Contextual".parse::<ConversationMode>().unwrap(),
            ConversationMode::Contextual
        );
        assert!("chatty".parse::<ConversationMode>().is_err());
    }

    #[test]
    fn test_failure_answer_includes_reason() {
        let answer = failure_answer(&AppError::GenerationService("rate limited".into()));
        assert!(answer.starts_with("Question failed due to:\n "));
        assert!(answer.contains("rate limited"));
    }
}
