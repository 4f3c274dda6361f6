//! Embedding-backed nearest-neighbor index over document chunks.
//!
//! Every chunk gets a fresh docstore identifier and the next integer
//! position in the nearest-neighbor structure. The position→identifier
//! list and the docstore live under one lock and are always updated
//! together.
//!
//! Results are ordered by ascending squared L2 distance. Equal distances
//! are ordered by ascending position, i.e. insertion order.

use crate::config::{Backend, HnswConfig, IndexConfig};
use crate::distance::validate_vector;
use crate::docstore::DocStore;
use crate::document::Document;
use crate::embedder::Embedder;
use crate::error::{Error, Result};
use crate::flat::FlatIndex;
use crate::hnsw::HnswIndex;
use crate::splitter::{SplitterConfig, TextSplitter};
use parking_lot::RwLock;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

/// The nearest-neighbor structure behind an index.
pub(crate) enum Neighbors {
    Flat(FlatIndex),
    Hnsw(HnswIndex),
}

impl Neighbors {
    fn new(backend: Backend, dimension: usize, hnsw: &HnswConfig) -> Self {
        match backend {
            Backend::Flat => Neighbors::Flat(FlatIndex::new(dimension)),
            Backend::Hnsw => Neighbors::Hnsw(HnswIndex::new(dimension, hnsw.clone())),
        }
    }

    /// Rebuild from row-major vector data.
    pub(crate) fn from_raw(
        backend: Backend,
        dimension: usize,
        data: Vec<f32>,
        hnsw: &HnswConfig,
    ) -> Result<Self> {
        let flat = FlatIndex::from_raw(dimension, data)?;
        Ok(match backend {
            Backend::Flat => Neighbors::Flat(flat),
            Backend::Hnsw => {
                let rows = flat
                    .raw()
                    .chunks_exact(dimension)
                    .map(<[f32]>::to_vec)
                    .collect();
                Neighbors::Hnsw(HnswIndex::rebuild(dimension, hnsw.clone(), rows))
            }
        })
    }

    pub(crate) fn dimension(&self) -> usize {
        match self {
            Neighbors::Flat(index) => index.dimension(),
            Neighbors::Hnsw(index) => index.dimension(),
        }
    }

    pub(crate) fn len(&self) -> usize {
        match self {
            Neighbors::Flat(index) => index.len(),
            Neighbors::Hnsw(index) => index.len(),
        }
    }

    fn add(&mut self, vectors: Vec<Vec<f32>>) {
        match self {
            Neighbors::Flat(index) => index.add(&vectors),
            Neighbors::Hnsw(index) => index.add(vectors),
        }
    }

    fn search(&self, query: &[f32], k: usize) -> Vec<(usize, f32)> {
        match self {
            Neighbors::Flat(index) => index.search(query, k),
            Neighbors::Hnsw(index) => index.search(query, k),
        }
    }

    /// All vectors, row-major, in position order.
    pub(crate) fn to_raw(&self) -> Vec<f32> {
        match self {
            Neighbors::Flat(index) => index.raw().to_vec(),
            Neighbors::Hnsw(index) => index.vectors().concat(),
        }
    }
}

/// Docstore, position→identifier list and nearest-neighbor structure.
pub(crate) struct IndexState {
    pub(crate) docstore: DocStore,
    pub(crate) index_to_id: Vec<String>,
    pub(crate) neighbors: Option<Neighbors>,
}

impl IndexState {
    fn empty() -> Self {
        Self {
            docstore: DocStore::new(),
            index_to_id: Vec::new(),
            neighbors: None,
        }
    }

    /// Assemble state from persisted parts, rejecting any inconsistency.
    pub(crate) fn from_parts(
        docstore: DocStore,
        index_to_id: Vec<String>,
        neighbors: Option<Neighbors>,
    ) -> Result<Self> {
        let positions = neighbors.as_ref().map_or(0, Neighbors::len);
        if positions != index_to_id.len() {
            return Err(Error::CorruptIndex(format!(
                "{} vectors but {} position mappings",
                positions,
                index_to_id.len()
            )));
        }
        if docstore.len() != index_to_id.len() {
            return Err(Error::CorruptIndex(format!(
                "{} documents but {} position mappings",
                docstore.len(),
                index_to_id.len()
            )));
        }

        let mut seen = HashSet::with_capacity(index_to_id.len());
        for id in &index_to_id {
            if !seen.insert(id.as_str()) {
                return Err(Error::CorruptIndex(format!(
                    "identifier '{id}' mapped to more than one position"
                )));
            }
            if !docstore.contains(id) {
                return Err(Error::CorruptIndex(format!(
                    "identifier '{id}' missing from the document store"
                )));
            }
        }

        Ok(Self {
            docstore,
            index_to_id,
            neighbors,
        })
    }

    fn dimension(&self) -> Option<usize> {
        self.neighbors.as_ref().map(Neighbors::dimension)
    }
}

/// Summary of an index's contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexStats {
    /// Number of indexed chunks.
    pub count: usize,
    /// Embedding dimensionality, once fixed.
    pub dimension: Option<usize>,
    /// Nearest-neighbor backend.
    pub backend: Backend,
}

/// Thread-safe vector index.
///
/// Searches take the read side of an internal lock; `add` takes the write
/// side, so readers never observe a partially applied batch. Saves are
/// serialized with each other and snapshot under the read side.
pub struct VectorIndex {
    pub(crate) embedder: Arc<dyn Embedder>,
    pub(crate) config: IndexConfig,
    pub(crate) state: RwLock<IndexState>,
    pub(crate) persist_lock: tokio::sync::Mutex<()>,
}

impl VectorIndex {
    /// Create an empty index. The dimension is fixed by the first `add`.
    pub fn new(embedder: Arc<dyn Embedder>, config: IndexConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::with_state(embedder, config, IndexState::empty()))
    }

    pub(crate) fn with_state(
        embedder: Arc<dyn Embedder>,
        config: IndexConfig,
        state: IndexState,
    ) -> Self {
        Self {
            embedder,
            config,
            state: RwLock::new(state),
            persist_lock: tokio::sync::Mutex::new(()),
        }
    }

    /// Build an index from raw documents.
    ///
    /// When `split` is set the documents are chunked first. Every chunk is
    /// embedded with `embedder` and added in order.
    #[instrument(skip(documents, embedder, splitter, config), fields(documents = documents.len(), backend = %config.backend))]
    pub async fn from_documents(
        documents: Vec<Document>,
        split: bool,
        embedder: Arc<dyn Embedder>,
        splitter: &SplitterConfig,
        config: IndexConfig,
    ) -> Result<Self> {
        let chunks: Vec<Document> = if split {
            let splitter = TextSplitter::new(splitter.clone())?;
            splitter.split(&documents).collect()
        } else {
            documents
        };

        let index = Self::new(embedder, config)?;
        index.add_documents(chunks).await?;

        info!(
            chunks = index.len(),
            dimension = ?index.dimension(),
            "Built vector index"
        );
        Ok(index)
    }

    /// Embed `documents` with the index's embedder and add them.
    ///
    /// An embedder that declares its dimensionality is checked against the
    /// index before any text is sent to it.
    pub async fn add_documents(&self, documents: Vec<Document>) -> Result<Vec<String>> {
        if documents.is_empty() {
            return Ok(Vec::new());
        }
        if let (Some(expected), Some(actual)) = (self.dimension(), self.embedder.dimensions()) {
            if expected != actual {
                return Err(Error::DimensionMismatch { expected, actual });
            }
        }
        let texts: Vec<String> = documents.iter().map(|d| d.content.clone()).collect();
        let embeddings = self.embedder.embed_documents(&texts).await?;
        self.add(documents, embeddings)
    }

    /// Add chunks with precomputed embeddings, returning their new identifiers.
    ///
    /// Validation (batch sizes, vector contents, dimensionality) happens
    /// before any state changes, so a failed call leaves the index intact.
    #[instrument(skip(self, chunks, embeddings), fields(count = chunks.len()))]
    pub fn add(&self, chunks: Vec<Document>, embeddings: Vec<Vec<f32>>) -> Result<Vec<String>> {
        if chunks.len() != embeddings.len() {
            return Err(Error::BatchSizeMismatch {
                documents: chunks.len(),
                embeddings: embeddings.len(),
            });
        }
        let Some(first) = embeddings.first() else {
            return Ok(Vec::new());
        };

        let dimension = first.len();
        for vector in &embeddings {
            validate_vector(vector)?;
            if vector.len() != dimension {
                return Err(Error::DimensionMismatch {
                    expected: dimension,
                    actual: vector.len(),
                });
            }
        }

        let mut guard = self.state.write();
        let state = &mut *guard;

        if let Some(expected) = state.dimension() {
            if expected != dimension {
                return Err(Error::DimensionMismatch {
                    expected,
                    actual: dimension,
                });
            }
        }

        let ids: Vec<String> = (0..chunks.len())
            .map(|_| Uuid::new_v4().to_string())
            .collect();

        if let Err(err) = state.docstore.add(ids.iter().cloned().zip(chunks)) {
            error!(error = %err, "Generated identifier collided with the document store");
            return Err(err);
        }

        let start = state.index_to_id.len();
        state
            .neighbors
            .get_or_insert_with(|| {
                Neighbors::new(self.config.backend, dimension, &self.config.hnsw)
            })
            .add(embeddings);
        state.index_to_id.extend(ids.iter().cloned());

        debug!(start, count = ids.len(), dimension, "Added chunks to index");
        Ok(ids)
    }

    /// Up to `max_results` chunks nearest to `query`, nearest first.
    pub fn search(&self, query: &[f32], max_results: usize) -> Result<Vec<Document>> {
        Ok(self
            .search_with_scores(query, max_results)?
            .into_iter()
            .map(|(document, _)| document)
            .collect())
    }

    /// Like [`search`](Self::search), paired with squared L2 distances.
    ///
    /// An empty index yields an empty result. Positions the structure
    /// reports but that have no mapped identifier are skipped.
    pub fn search_with_scores(
        &self,
        query: &[f32],
        max_results: usize,
    ) -> Result<Vec<(Document, f32)>> {
        let state = self.state.read();
        let Some(neighbors) = state.neighbors.as_ref() else {
            return Ok(Vec::new());
        };
        if max_results == 0 {
            return Ok(Vec::new());
        }
        if query.len() != neighbors.dimension() {
            return Err(Error::DimensionMismatch {
                expected: neighbors.dimension(),
                actual: query.len(),
            });
        }
        validate_vector(query)?;

        let hits = neighbors.search(query, max_results);
        let mut results = Vec::with_capacity(hits.len());
        for (position, distance) in hits {
            let Some(id) = state.index_to_id.get(position) else {
                warn!(position, "Skipping neighbor without a mapped identifier");
                continue;
            };
            results.push((state.docstore.get(id)?.clone(), distance));
        }

        debug!(requested = max_results, returned = results.len(), "Searched index");
        Ok(results)
    }

    /// Look up a chunk by identifier.
    pub fn get(&self, id: &str) -> Result<Document> {
        self.state.read().docstore.get(id).cloned()
    }

    /// Identifiers in position order.
    pub fn ids(&self) -> Vec<String> {
        self.state.read().index_to_id.clone()
    }

    /// Number of indexed chunks.
    pub fn len(&self) -> usize {
        self.state.read().index_to_id.len()
    }

    /// Whether the index holds no chunks.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Embedding dimensionality, once fixed by the first `add`.
    pub fn dimension(&self) -> Option<usize> {
        self.state.read().dimension()
    }

    /// Nearest-neighbor backend.
    pub fn backend(&self) -> Backend {
        self.config.backend
    }

    /// Index configuration.
    pub fn config(&self) -> &IndexConfig {
        &self.config
    }

    /// The embedder attached to this index.
    pub fn embedder(&self) -> Arc<dyn Embedder> {
        Arc::clone(&self.embedder)
    }

    /// Summary of the index's contents.
    pub fn stats(&self) -> IndexStats {
        let state = self.state.read();
        IndexStats {
            count: state.index_to_id.len(),
            dimension: state.dimension(),
            backend: self.config.backend,
        }
    }
}

impl std::fmt::Debug for VectorIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VectorIndex")
            .field("embedder", &self.embedder.name())
            .field("stats", &self.stats())
            .finish()
    }
}
