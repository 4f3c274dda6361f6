//! The embedding collaborator consumed by the index.

use crate::error::Result;
use async_trait::async_trait;

/// Turns text into fixed-dimensionality vectors.
///
/// Every vector produced by one instance must have the same length.
/// Implementations report failures as [`Error::Embedding`](crate::Error::Embedding).
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embed a single query string.
    async fn embed_query(&self, text: &str) -> Result<Vec<f32>>;

    /// Embed a batch of texts, one vector per input, in input order.
    async fn embed_documents(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let mut embeddings = Vec::with_capacity(texts.len());
        for text in texts {
            embeddings.push(self.embed_query(text).await?);
        }
        Ok(embeddings)
    }

    /// Dimensionality, when known up front.
    fn dimensions(&self) -> Option<usize> {
        None
    }

    /// Short name for logs.
    fn name(&self) -> &str {
        "embedder"
    }
}
