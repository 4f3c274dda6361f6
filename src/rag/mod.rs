//! Retrieval Augmented Generation pipeline.
//!
//! # Module Structure
//!
//! - [`rag::loaders`](crate::rag::loaders) - Turn text and files into documents
//! - [`rag::embeddings`](crate::rag::embeddings) - Remote and local embedding models
//! - [`rag::retriever`](crate::rag::retriever) - Similarity retrieval over a vector index
//! - [`rag::prompts`](crate::rag::prompts) - Question rewriting and answer templates
//! - [`rag::generator`](crate::rag::generator) - Answers a question given the conversation so far
//! - [`rag::session`](crate::rag::session) - Keeps the history between questions
//!
//! # Pipeline
//!
//! 1. **Ingestion** - Documents are loaded, split into chunks and embedded
//! 2. **Storage** - Chunks and vectors go into a [`VectorIndex`](groundwork_index::VectorIndex)
//! 3. **Retrieval** - The (rewritten) question is embedded and its nearest chunks returned
//! 4. **Generation** - The model answers from the retrieved context
//!
//! # Example
//!
//! ```ignore
//! use groundwork::rag::{get_retriever, Generator, GeneratorConfig, RagSession, RetrieverOptions};
//!
//! let retriever = get_retriever(documents, "flat", embedder, &RetrieverOptions::default()).await?;
//! let generator = Generator::new(llm, Arc::new(retriever), GeneratorConfig::default());
//! let mut session = RagSession::new(generator);
//!
//! let answer = session.ask("What is X?").await?;
//! let follow_up = session.ask("How much does it cost?").await?;
//! ```

pub mod embeddings;
pub mod generator;
pub mod loaders;
pub mod prompts;
pub mod retriever;
pub mod session;

pub use embeddings::{EmbedderSettings, OpenAIEmbedder};
pub use generator::{ConversationMode, Generator, GeneratorConfig};
pub use loaders::{DirectoryLoader, Loader, TextLoader};
pub use retriever::{get_retriever, Retrieve, Retriever, RetrieverOptions};
pub use session::RagSession;
