//! Similarity retrieval facade.
//!
//! Callers depend on [`Retrieve`] only. [`Retriever`] implements it over a
//! [`VectorIndex`] of either backend; [`get_retriever`] selects the backend
//! by name and rejects unknown names before any embedding work starts.

use crate::types::{AppError, Result};
use async_trait::async_trait;
use groundwork_index::{
    Backend, Document, Embedder, HnswConfig, IndexConfig, SplitterConfig, VectorIndex,
};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, instrument};

/// The single retrieval capability the orchestrator depends on.
#[async_trait]
pub trait Retrieve: Send + Sync {
    /// Up to `max_docs` chunks most similar to `query`, most similar first.
    async fn retrieve_similar_docs(&self, query: &str, max_docs: usize) -> Result<Vec<Document>>;
}

/// Options for building a retriever from raw documents.
#[derive(Debug, Clone)]
pub struct RetrieverOptions {
    /// Chunk documents before embedding.
    pub split_docs: bool,
    pub splitter: SplitterConfig,
    pub hnsw: HnswConfig,
}

impl Default for RetrieverOptions {
    fn default() -> Self {
        Self {
            split_docs: true,
            splitter: SplitterConfig::default(),
            hnsw: HnswConfig::default(),
        }
    }
}

/// Retriever over a [`VectorIndex`].
#[derive(Debug, Clone)]
pub struct Retriever {
    index: Arc<VectorIndex>,
}

impl Retriever {
    pub fn new(index: Arc<VectorIndex>) -> Self {
        Self { index }
    }

    /// Build an index over `documents` with the given backend.
    pub async fn build(
        documents: Vec<Document>,
        backend: Backend,
        embedder: Arc<dyn Embedder>,
        options: &RetrieverOptions,
    ) -> Result<Self> {
        let config = IndexConfig::new(backend).with_hnsw_config(options.hnsw.clone());
        let index = VectorIndex::from_documents(
            documents,
            options.split_docs,
            embedder,
            &options.splitter,
            config,
        )
        .await?;
        Ok(Self::new(Arc::new(index)))
    }

    /// Load a saved index and attach `embedder`.
    pub async fn load(path: impl AsRef<Path>, embedder: Arc<dyn Embedder>) -> Result<Self> {
        let index = VectorIndex::load(path, embedder).await?;
        Ok(Self::new(Arc::new(index)))
    }

    /// Persist the underlying index.
    pub async fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        Ok(self.index.save(path).await?)
    }

    /// Like [`Retrieve::retrieve_similar_docs`], paired with squared distances.
    pub async fn retrieve_with_scores(
        &self,
        query: &str,
        max_docs: usize,
    ) -> Result<Vec<(Document, f32)>> {
        let embedding = self.index.embedder().embed_query(query).await?;
        Ok(self.index.search_with_scores(&embedding, max_docs)?)
    }

    pub fn index(&self) -> &Arc<VectorIndex> {
        &self.index
    }

    pub fn backend(&self) -> Backend {
        self.index.backend()
    }
}

#[async_trait]
impl Retrieve for Retriever {
    #[instrument(skip(self, query), fields(backend = %self.index.backend()))]
    async fn retrieve_similar_docs(&self, query: &str, max_docs: usize) -> Result<Vec<Document>> {
        let embedding = self.index.embedder().embed_query(query).await?;
        let documents = self.index.search(&embedding, max_docs)?;
        debug!(returned = documents.len(), "Retrieved similar documents");
        Ok(documents)
    }
}

/// Build a retriever for the backend named `backend`.
///
/// Accepts `flat` (aliases `exact`, `faiss`) and `hnsw` (alias
/// `approximate`). Any other name fails with
/// [`AppError::UnsupportedBackend`] before documents are split or embedded.
pub async fn get_retriever(
    documents: Vec<Document>,
    backend: &str,
    embedder: Arc<dyn Embedder>,
    options: &RetrieverOptions,
) -> Result<Retriever> {
    let backend: Backend = backend
        .parse()
        .map_err(|_| AppError::UnsupportedBackend(backend.to_string()))?;
    Retriever::build(documents, backend, embedder, options).await
}
