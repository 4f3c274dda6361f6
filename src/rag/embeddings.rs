//! Embedding providers.
//!
//! Both providers implement [`groundwork_index::Embedder`] and report
//! failures as [`groundwork_index::Error::Embedding`], which the application
//! error type maps onto `EmbeddingService`.

use crate::types::{AppError, Result};
use async_trait::async_trait;
use groundwork_index::{Embedder, Error as IndexError};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error};

pub const DEFAULT_OPENAI_EMBEDDING_MODEL: &str = "text-embedding-3-small";

/// Explicit embedder settings, resolved from configuration.
#[derive(Debug, Clone)]
pub enum EmbedderSettings {
    OpenAI {
        api_key: String,
        api_base: String,
        model: String,
    },
    FastEmbed {
        model: String,
    },
}

impl EmbedderSettings {
    /// Build the embedder these settings describe.
    pub fn create_embedder(&self, timeout: Duration) -> Result<Arc<dyn Embedder>> {
        match self {
            EmbedderSettings::OpenAI {
                api_key,
                api_base,
                model,
            } => Ok(Arc::new(OpenAIEmbedder::new(
                api_key.clone(),
                api_base.clone(),
                model.clone(),
                timeout,
            )?)),

            #[cfg(feature = "local-embeddings")]
            EmbedderSettings::FastEmbed { model } => Ok(Arc::new(FastEmbedder::new(model)?)),

            #[cfg(not(feature = "local-embeddings"))]
            EmbedderSettings::FastEmbed { model } => Err(AppError::Configuration(format!(
                "fastembed model '{}' requires the local-embeddings feature",
                model
            ))),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            EmbedderSettings::OpenAI { .. } => "openai",
            EmbedderSettings::FastEmbed { .. } => "fastembed",
        }
    }
}

// ============= OpenAI =============

/// Embeddings from an OpenAI-compatible `/embeddings` endpoint.
pub struct OpenAIEmbedder {
    client: reqwest::Client,
    api_key: String,
    api_base: String,
    model: String,
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    #[serde(default)]
    index: usize,
    embedding: Vec<f32>,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: String,
}

impl OpenAIEmbedder {
    pub fn new(api_key: String, api_base: String, model: String, timeout: Duration) -> Result<Self> {
        if api_key.is_empty() {
            return Err(AppError::Configuration(
                "OpenAI embeddings API key must not be empty".to_string(),
            ));
        }
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Configuration(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_key,
            api_base: api_base.trim_end_matches('/').to_string(),
            model,
        })
    }

    async fn request(&self, texts: &[String]) -> groundwork_index::Result<Vec<Vec<f32>>> {
        debug!(batch_size = texts.len(), model = %self.model, "Requesting embeddings");

        let response = self
            .client
            .post(format!("{}/embeddings", self.api_base))
            .bearer_auth(&self.api_key)
            .json(&EmbeddingRequest {
                model: &self.model,
                input: texts,
            })
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "Embedding request failed");
                IndexError::Embedding(format!("request failed: {e}"))
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorResponse>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            error!(%status, %message, "Embedding API error");
            return Err(IndexError::Embedding(format!("API error ({status}): {message}")));
        }

        let mut body: EmbeddingResponse = response
            .json()
            .await
            .map_err(|e| IndexError::Embedding(format!("invalid response: {e}")))?;

        if body.data.len() != texts.len() {
            return Err(IndexError::Embedding(format!(
                "expected {} embeddings, received {}",
                texts.len(),
                body.data.len()
            )));
        }

        body.data.sort_by_key(|d| d.index);
        Ok(body.data.into_iter().map(|d| d.embedding).collect())
    }
}

#[async_trait]
impl Embedder for OpenAIEmbedder {
    async fn embed_query(&self, text: &str) -> groundwork_index::Result<Vec<f32>> {
        self.request(&[text.to_string()])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| IndexError::Embedding("API returned empty response".to_string()))
    }

    async fn embed_documents(&self, texts: &[String]) -> groundwork_index::Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        self.request(texts).await
    }

    fn name(&self) -> &str {
        "openai"
    }
}

// ============= fastembed =============

/// Local ONNX embeddings via fastembed.
#[cfg(feature = "local-embeddings")]
pub struct FastEmbedder {
    model: Arc<parking_lot::Mutex<fastembed::TextEmbedding>>,
}

#[cfg(feature = "local-embeddings")]
impl FastEmbedder {
    pub fn new(model_name: &str) -> Result<Self> {
        use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};

        let model = match model_name.to_ascii_lowercase().as_str() {
            "bge-small-en-v1.5" | "baai/bge-small-en-v1.5" => EmbeddingModel::BGESmallENV15,
            "bge-base-en-v1.5" | "baai/bge-base-en-v1.5" => EmbeddingModel::BGEBaseENV15,
            "all-minilm-l6-v2" | "sentence-transformers/all-minilm-l6-v2" => {
                EmbeddingModel::AllMiniLML6V2
            }
            other => {
                return Err(AppError::Configuration(format!(
                    "Unknown fastembed model '{}'",
                    other
                )))
            }
        };

        let embedding = TextEmbedding::try_new(InitOptions::new(model).with_show_download_progress(true))
            .map_err(|e| AppError::EmbeddingService(e.to_string()))?;

        Ok(Self {
            model: Arc::new(parking_lot::Mutex::new(embedding)),
        })
    }
}

#[cfg(feature = "local-embeddings")]
#[async_trait]
impl Embedder for FastEmbedder {
    async fn embed_query(&self, text: &str) -> groundwork_index::Result<Vec<f32>> {
        self.embed_documents(&[text.to_string()])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| IndexError::Embedding("fastembed returned nothing".to_string()))
    }

    async fn embed_documents(&self, texts: &[String]) -> groundwork_index::Result<Vec<Vec<f32>>> {
        let model = Arc::clone(&self.model);
        let texts = texts.to_vec();
        tokio::task::spawn_blocking(move || model.lock().embed(texts, None))
            .await
            .map_err(|e| IndexError::Embedding(format!("embedding task failed: {e}")))?
            .map_err(|e| IndexError::Embedding(e.to_string()))
    }

    fn name(&self) -> &str {
        "fastembed"
    }
}
