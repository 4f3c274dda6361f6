use serde::{Deserialize, Serialize};
use std::fmt;

// ============= Chat Types =============

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
}

impl MessageRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageRole::System => "system",
            MessageRole::User => "user",
            MessageRole::Assistant => "assistant",
        }
    }
}

impl fmt::Display for MessageRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single message sent to a language model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: MessageRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
        }
    }
}

// ============= Conversation Types =============

/// One exchange: what the user said and what the assistant answered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub user: String,
    pub assistant: String,
}

impl Turn {
    pub fn new(user: impl Into<String>, assistant: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            assistant: assistant.into(),
        }
    }
}

impl<U: Into<String>, A: Into<String>> From<(U, A)> for Turn {
    fn from((user, assistant): (U, A)) -> Self {
        Self::new(user, assistant)
    }
}

/// Append-only, chronologically ordered conversation history.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conversation {
    turns: Vec<Turn>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, turn: Turn) {
        self.turns.push(turn);
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}

impl<T: Into<Turn>> FromIterator<T> for Conversation {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self {
            turns: iter.into_iter().map(Into::into).collect(),
        }
    }
}

// ============= Error Types =============

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Index(groundwork_index::Error),

    #[error("Unsupported backend '{0}'")]
    UnsupportedBackend(String),

    #[error("Embedding service error: {0}")]
    EmbeddingService(String),

    #[error("Generation service error: {0}")]
    GenerationService(String),

    #[error("{operation} timed out after {seconds}s")]
    Timeout { operation: String, seconds: u64 },

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl AppError {
    /// Failures of an external collaborator (embedder, language model) rather
    /// than of local state. These are recoverable per request.
    pub fn is_collaborator_failure(&self) -> bool {
        matches!(
            self,
            AppError::EmbeddingService(_) | AppError::GenerationService(_) | AppError::Timeout { .. }
        )
    }
}

impl From<groundwork_index::Error> for AppError {
    fn from(err: groundwork_index::Error) -> Self {
        match err {
            groundwork_index::Error::Embedding(msg) => AppError::EmbeddingService(msg),
            groundwork_index::Error::UnsupportedBackend(name) => AppError::UnsupportedBackend(name),
            other => AppError::Index(other),
        }
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
