//! Saving and loading a [`VectorIndex`] directory.
//!
//! A saved index is a directory holding two artifacts:
//! - `index.bin`: the vectors in position order (postcard)
//! - `docstore.json`: the document store, the position→identifier list and
//!   the settings needed to rebuild the nearest-neighbor structure
//!
//! Both are written into a fresh staging directory next to the target,
//! flushed, and published with a rename. If a previous save exists it is
//! renamed aside first and removed once the new directory is in place. A
//! crash between those two renames leaves the target missing, never half
//! written; the previous copy is still on disk under its `.retired-*` name.

use crate::config::{Backend, HnswConfig, IndexConfig};
use crate::docstore::DocStore;
use crate::embedder::Embedder;
use crate::error::{Error, Result};
use crate::index::{IndexState, Neighbors, VectorIndex};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

/// File name of the vector artifact.
pub const VECTORS_FILE: &str = "index.bin";

/// File name of the docstore artifact.
pub const DOCSTORE_FILE: &str = "docstore.json";

const FORMAT_VERSION: u32 = 1;

/// Binary vector artifact.
#[derive(Debug, Serialize, Deserialize)]
struct VectorsArtifact {
    format_version: u32,
    backend: Backend,
    dimension: Option<usize>,
    count: usize,
    vectors: Vec<f32>,
}

/// Docstore snapshot plus rebuild settings.
#[derive(Debug, Serialize, Deserialize)]
struct DocstoreArtifact {
    format_version: u32,
    backend: Backend,
    hnsw: HnswConfig,
    dimension: Option<usize>,
    saved_at: DateTime<Utc>,
    docstore: DocStore,
    index_to_docstore_id: Vec<String>,
}

impl VectorIndex {
    /// Write the index to the directory `path`, replacing any previous save.
    #[instrument(skip(self, path), fields(path = %path.as_ref().display()))]
    pub async fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let _persist = self.persist_lock.lock().await;

        let (vectors, docstore, count) = {
            let state = self.state.read();
            let dimension = state.neighbors.as_ref().map(Neighbors::dimension);
            let raw = state
                .neighbors
                .as_ref()
                .map(Neighbors::to_raw)
                .unwrap_or_default();

            let vectors = VectorsArtifact {
                format_version: FORMAT_VERSION,
                backend: self.config.backend,
                dimension,
                count: state.index_to_id.len(),
                vectors: raw,
            };
            let docstore = DocstoreArtifact {
                format_version: FORMAT_VERSION,
                backend: self.config.backend,
                hnsw: self.config.hnsw.clone(),
                dimension,
                saved_at: Utc::now(),
                docstore: state.docstore.clone(),
                index_to_docstore_id: state.index_to_id.clone(),
            };
            (vectors, docstore, state.index_to_id.len())
        };

        let vector_bytes = postcard::to_allocvec(&vectors)
            .map_err(|e| Error::CorruptIndex(format!("Failed to encode vectors: {e}")))?;
        let docstore_bytes = serde_json::to_vec(&docstore)
            .map_err(|e| Error::CorruptIndex(format!("Failed to encode docstore: {e}")))?;

        publish(
            path,
            &[
                (VECTORS_FILE, vector_bytes.as_slice()),
                (DOCSTORE_FILE, docstore_bytes.as_slice()),
            ],
        )
        .await?;

        info!(count, path = %path.display(), "Saved vector index");
        Ok(())
    }

    /// Load an index saved with [`save`](Self::save), attaching `embedder`.
    ///
    /// Fails with [`Error::CorruptIndex`] if either artifact is missing,
    /// undecodable, or inconsistent with the other.
    #[instrument(skip(path, embedder), fields(path = %path.as_ref().display()))]
    pub async fn load(path: impl AsRef<Path>, embedder: Arc<dyn Embedder>) -> Result<Self> {
        let path = path.as_ref();

        let vector_bytes = read_artifact(&path.join(VECTORS_FILE)).await?;
        let docstore_bytes = read_artifact(&path.join(DOCSTORE_FILE)).await?;

        let vectors: VectorsArtifact = postcard::from_bytes(&vector_bytes)
            .map_err(|e| Error::CorruptIndex(format!("{VECTORS_FILE}: {e}")))?;
        let docstore: DocstoreArtifact = serde_json::from_slice(&docstore_bytes)
            .map_err(|e| Error::CorruptIndex(format!("{DOCSTORE_FILE}: {e}")))?;

        if vectors.format_version != FORMAT_VERSION || docstore.format_version != FORMAT_VERSION {
            return Err(Error::CorruptIndex(format!(
                "unsupported format version {}/{}",
                vectors.format_version, docstore.format_version
            )));
        }
        if vectors.backend != docstore.backend || vectors.dimension != docstore.dimension {
            return Err(Error::CorruptIndex(
                "artifacts disagree on backend or dimension".to_string(),
            ));
        }

        let config = IndexConfig::new(docstore.backend).with_hnsw_config(docstore.hnsw);
        config
            .validate()
            .map_err(|e| Error::CorruptIndex(e.to_string()))?;

        let neighbors = match vectors.dimension {
            Some(dimension) => {
                if vectors.vectors.len() != vectors.count * dimension {
                    return Err(Error::CorruptIndex(format!(
                        "expected {} x {} values, found {}",
                        vectors.count,
                        dimension,
                        vectors.vectors.len()
                    )));
                }
                Some(Neighbors::from_raw(
                    config.backend,
                    dimension,
                    vectors.vectors,
                    &config.hnsw,
                )?)
            }
            None if vectors.count == 0 && vectors.vectors.is_empty() => None,
            None => {
                return Err(Error::CorruptIndex(
                    "vectors present without a dimension".to_string(),
                ))
            }
        };

        let state =
            IndexState::from_parts(docstore.docstore, docstore.index_to_docstore_id, neighbors)?;
        let count = state.index_to_id.len();
        let index = VectorIndex::with_state(embedder, config, state);

        info!(
            count,
            backend = %index.backend(),
            saved_at = %docstore.saved_at,
            "Loaded vector index"
        );
        Ok(index)
    }
}

async fn read_artifact(path: &Path) -> Result<Vec<u8>> {
    match tokio::fs::read(path).await {
        Ok(bytes) => Ok(bytes),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(Error::CorruptIndex(format!(
            "missing artifact {}",
            path.display()
        ))),
        Err(e) => Err(Error::Io(e)),
    }
}

fn sibling(path: &Path, tag: &str) -> Result<PathBuf> {
    let name = path
        .file_name()
        .ok_or_else(|| Error::InvalidConfig(format!("invalid index path {}", path.display())))?
        .to_string_lossy();
    Ok(path.with_file_name(format!(".{name}.{tag}-{}", Uuid::new_v4().simple())))
}

async fn write_file(path: &Path, bytes: &[u8]) -> Result<()> {
    let mut file = tokio::fs::File::create(path).await?;
    file.write_all(bytes).await?;
    file.flush().await?;
    file.sync_all().await?;
    Ok(())
}

/// Write `files` into a staging directory and rename it onto `path`.
///
/// On any failure the staging directory is removed again.
async fn publish(path: &Path, files: &[(&str, &[u8])]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }

    let staging = sibling(path, "staging")?;
    tokio::fs::create_dir(&staging).await?;

    let published = async {
        for (name, bytes) in files {
            write_file(&staging.join(name), bytes).await?;
        }
        swap_in(&staging, path).await
    }
    .await;

    let retired = match published {
        Ok(retired) => retired,
        Err(e) => {
            if let Err(cleanup) = tokio::fs::remove_dir_all(&staging).await {
                warn!(path = %staging.display(), error = %cleanup, "Failed to remove staging directory");
            }
            return Err(e);
        }
    };
    debug!(path = %path.display(), "Published index directory");

    if let Some(retired) = retired {
        if let Err(e) = tokio::fs::remove_dir_all(&retired).await {
            warn!(path = %retired.display(), error = %e, "Failed to remove previous index directory");
        }
    }
    Ok(())
}

/// Move any existing `path` aside and rename `staging` onto it, returning
/// where the previous directory went. If the final rename fails the
/// previous directory is moved back.
async fn swap_in(staging: &Path, path: &Path) -> Result<Option<PathBuf>> {
    let retired = if tokio::fs::try_exists(path).await? {
        let retired = sibling(path, "retired")?;
        tokio::fs::rename(path, &retired).await?;
        Some(retired)
    } else {
        None
    };

    if let Err(e) = tokio::fs::rename(staging, path).await {
        if let Some(retired) = &retired {
            if let Err(restore) = tokio::fs::rename(retired, path).await {
                warn!(path = %retired.display(), error = %restore, "Failed to restore previous index directory");
            }
        }
        return Err(Error::Io(e));
    }
    Ok(retired)
}
