//! The unit of retrievable text.

use serde::{Deserialize, Serialize};

/// Retrievable text plus provenance metadata.
///
/// A document has no identity of its own; an identifier is assigned only
/// when it is inserted into a [`DocStore`](crate::DocStore).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// Text content.
    pub content: String,
    /// Optional human readable title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Optional provenance (file path, URL, ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

impl Document {
    /// Create a document with no metadata.
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            title: None,
            source: None,
        }
    }

    /// Set the title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set the source.
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// A new document carrying this document's metadata and different content.
    pub fn derive_chunk(&self, content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            title: self.title.clone(),
            source: self.source.clone(),
        }
    }
}

impl From<&str> for Document {
    fn from(content: &str) -> Self {
        Self::new(content)
    }
}

impl From<String> for Document {
    fn from(content: String) -> Self {
        Self::new(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derive_chunk_keeps_metadata() {
        let doc = Document::new("full text")
            .with_title("Guide")
            .with_source("docs/guide.md");
        let chunk = doc.derive_chunk("full");

        assert_eq!(chunk.content, "full");
        assert_eq!(chunk.title.as_deref(), Some("Guide"));
        assert_eq!(chunk.source.as_deref(), Some("docs/guide.md"));
    }

    #[test]
    fn test_serde_skips_missing_metadata() {
        let json = serde_json::to_string(&Document::new("hi")).unwrap();
        assert_eq!(json, r#"{"content":"hi"}"#);

        let back: Document = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Document::new("hi"));
    }
}
