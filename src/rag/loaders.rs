//! Document loaders.
//!
//! Loaders only produce documents; nothing downstream calls back into them.

use crate::types::{AppError, Result};
use async_trait::async_trait;
use groundwork_index::Document;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub const DEFAULT_EXTENSIONS: &[&str] = &["txt", "md", "py", "rs"];

#[async_trait]
pub trait Loader: Send + Sync {
    async fn load_documents(&self) -> Result<Vec<Document>>;
}

/// Documents from in-memory strings.
#[derive(Debug, Clone, Default)]
pub struct TextLoader {
    contents: Vec<String>,
}

impl TextLoader {
    pub fn new<I, S>(contents: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            contents: contents.into_iter().map(Into::into).collect(),
        }
    }
}

#[async_trait]
impl Loader for TextLoader {
    async fn load_documents(&self) -> Result<Vec<Document>> {
        Ok(self.contents.iter().map(|c| Document::new(c.as_str())).collect())
    }
}

/// UTF-8 files under a root path, read recursively in sorted path order.
///
/// Each document is titled with the file stem and sourced with its path.
/// Files that cannot be read as UTF-8 are skipped with a warning.
#[derive(Debug, Clone)]
pub struct DirectoryLoader {
    root: PathBuf,
    extensions: Vec<String>,
}

impl DirectoryLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            extensions: DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
        }
    }

    pub fn with_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extensions = extensions
            .into_iter()
            .map(|e| e.into().trim_start_matches('.').to_ascii_lowercase())
            .collect();
        self
    }

    fn accepts(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .map(|e| self.extensions.iter().any(|x| x.eq_ignore_ascii_case(e)))
            .unwrap_or(false)
    }

    async fn collect_files(&self) -> Result<Vec<PathBuf>> {
        let metadata = tokio::fs::metadata(&self.root).await.map_err(|e| {
            AppError::InvalidInput(format!("Cannot read {}: {}", self.root.display(), e))
        })?;
        if metadata.is_file() {
            return Ok(vec![self.root.clone()]);
        }

        let mut files = Vec::new();
        let mut pending = vec![self.root.clone()];
        while let Some(dir) = pending.pop() {
            let mut entries = tokio::fs::read_dir(&dir).await?;
            while let Some(entry) = entries.next_entry().await? {
                let path = entry.path();
                let file_type = entry.file_type().await?;
                if file_type.is_dir() {
                    pending.push(path);
                } else if file_type.is_file() && self.accepts(&path) {
                    files.push(path);
                }
            }
        }
        files.sort();
        Ok(files)
    }
}

#[async_trait]
impl Loader for DirectoryLoader {
    async fn load_documents(&self) -> Result<Vec<Document>> {
        let files = self.collect_files().await?;
        let mut documents = Vec::with_capacity(files.len());

        for path in files {
            let content = match tokio::fs::read_to_string(&path).await {
                Ok(content) => content,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Skipping unreadable file");
                    continue;
                }
            };
            let mut document = Document::new(content).with_source(path.display().to_string());
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                document = document.with_title(stem);
            }
            documents.push(document);
        }

        debug!(root = %self.root.display(), count = documents.len(), "Loaded documents");
        Ok(documents)
    }
}
