//! # groundwork-index
//!
//! The retrieval core of groundwork: documents, an append-only document
//! store, a deterministic text splitter, and a persistent nearest-neighbor
//! index over embedded chunks.
//!
//! ## Features
//!
//! - **Two backends**: exact flat L2 scan, or approximate HNSW search
//! - **Stable identifiers**: every chunk gets a uuid that survives save/load
//! - **Thread-safe**: concurrent searches, exclusive inserts
//! - **Atomic persistence**: both artifacts are published together
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use groundwork_index::{Document, IndexConfig, SplitterConfig, VectorIndex};
//!
//! let index = VectorIndex::from_documents(
//!     vec![Document::new("cats are mammals")],
//!     true,
//!     embedder,
//!     &SplitterConfig::default(),
//!     IndexConfig::default(),
//! )
//! .await?;
//!
//! let query = embedder.embed_query("which animals are mammals?").await?;
//! let hits = index.search(&query, 4)?;
//! index.save("data/index").await?;
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │                 VectorIndex                  │
//! │  RwLock ┌───────────┐ ┌──────────────────┐   │
//! │         │ DocStore  │ │ position → id    │   │
//! │         └───────────┘ └──────────────────┘   │
//! │         ┌──────────────────────────────────┐ │
//! │         │ Neighbors: FlatIndex | HnswIndex │ │
//! │         └──────────────────────────────────┘ │
//! └──────────────────────────────────────────────┘
//!          save/load: index.bin + docstore.json
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod distance;
pub mod docstore;
pub mod document;
pub mod embedder;
pub mod error;
pub mod flat;
pub mod hnsw;
pub mod index;
pub mod persistence;
pub mod splitter;

// Re-exports for convenience
pub use config::{Backend, HnswConfig, IndexConfig};
pub use docstore::DocStore;
pub use document::Document;
pub use embedder::Embedder;
pub use error::{Error, Result};
pub use index::{IndexStats, VectorIndex};
pub use persistence::{DOCSTORE_FILE, VECTORS_FILE};
pub use splitter::{Chunks, Language, SplitterConfig, TextSplitter};
