//! # groundwork
//!
//! Conversational retrieval over your own documents: documents are split into
//! chunks, embedded and stored in a vector index; questions are answered by a
//! language model from the chunks most similar to them.
//!
//! ## Overview
//!
//! groundwork can be used in two ways:
//!
//! 1. **As a CLI** - Run the `groundwork` binary (`index`, `search`, `ask`, `chat`)
//! 2. **As a library** - Import components into your own Rust project
//!
//! The index itself (documents, splitting, nearest-neighbor backends and
//! persistence) lives in the `groundwork-index` crate and is re-exported
//! here as [`index`].
//!
//! ## Quick Start (Library Usage)
//!
//! ```rust,ignore
//! use groundwork::rag::{get_retriever, Generator, GeneratorConfig, RagSession, RetrieverOptions};
//! use groundwork::{EmbedderSettings, Provider};
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> groundwork::Result<()> {
//!     let timeout = Duration::from_secs(60);
//!     let embedder = EmbedderSettings::OpenAI {
//!         api_key: std::env::var("OPENAI_API_KEY").unwrap_or_default(),
//!         api_base: "https://api.openai.com/v1".to_string(),
//!         model: "text-embedding-3-small".to_string(),
//!     }
//!     .create_embedder(timeout)?;
//!
//!     let llm = Provider::Ollama {
//!         base_url: "http://localhost:11434".to_string(),
//!         model: "llama3.2".to_string(),
//!     }
//!     .create_client(timeout)?;
//!
//!     let docs = vec!["X is a widget.".into(), "Widgets cost $5.".into()];
//!     let retriever = get_retriever(docs, "flat", embedder, &RetrieverOptions::default()).await?;
//!
//!     let generator = Generator::new(llm.into(), Arc::new(retriever), GeneratorConfig::default());
//!     let mut session = RagSession::new(generator);
//!     println!("{}", session.ask("What is X?").await?);
//!     println!("{}", session.ask("How much does it cost?").await?);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `ollama` | Ollama language models via `ollama-rs` (default) |
//! | `local-embeddings` | Local ONNX embedding models via `fastembed` |

/// Command-line interface (argument parsing, handlers, output).
pub mod cli;
/// Language model clients and provider selection.
pub mod llm;
/// Retrieval Augmented Generation components.
pub mod rag;
/// Core types (messages, conversation history, errors).
pub mod types;
/// Configuration utilities (TOML).
pub mod utils;

/// The vector index crate.
pub use groundwork_index as index;

// Re-export commonly used types
pub use groundwork_index::{Backend, Document, Embedder, VectorIndex};
pub use llm::{LLMClient, Provider};
pub use rag::{
    get_retriever, ConversationMode, EmbedderSettings, Generator, GeneratorConfig, RagSession,
    Retrieve, Retriever, RetrieverOptions,
};
pub use types::{AppError, Conversation, Result, Turn};
pub use utils::toml_config::GroundworkConfig;
