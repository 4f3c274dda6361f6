//! LLM Provider Clients and Abstractions
//!
//! Language models are external collaborators: the orchestrator only needs
//! `complete(messages, system_prompt) -> text`. Each provider implements
//! [`LLMClient`] and is selected at runtime through the closed [`Provider`]
//! enum.
//!
//! # Supported Providers
//!
//! - OpenAI-compatible chat completions (always available)
//! - `ollama` feature - Local Ollama server
//!
//! # Example
//!
//! ```ignore
//! use groundwork::llm::Provider;
//!
//! let client = Provider::Ollama {
//!     base_url: "http://localhost:11434".to_string(),
//!     model: "llama3.2".to_string(),
//! }
//! .create_client(Duration::from_secs(60))?;
//!
//! let answer = client.generate("What is 2+2?").await?;
//! ```

/// Core LLM client trait and provider selection.
pub mod client;

#[cfg(feature = "ollama")]
pub mod ollama;

pub mod openai;

pub use client::{LLMClient, Provider};
