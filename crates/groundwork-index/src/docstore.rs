//! Append-only mapping from identifier to [`Document`].

use crate::document::Document;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// In-memory document store.
///
/// Entries are never overwritten or removed. A `BTreeMap` keeps snapshots
/// byte-stable for identical contents.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocStore {
    documents: BTreeMap<String, Document>,
}

impl DocStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge a batch into the store.
    ///
    /// The whole batch is rejected with [`Error::DuplicateId`] if any of its
    /// identifiers already exists, or appears twice within the batch. On
    /// failure the store is left untouched.
    pub fn add<I>(&mut self, batch: I) -> Result<()>
    where
        I: IntoIterator<Item = (String, Document)>,
    {
        let batch: Vec<(String, Document)> = batch.into_iter().collect();

        let mut seen = HashSet::with_capacity(batch.len());
        let mut collisions: Vec<String> = batch
            .iter()
            .filter(|(id, _)| self.documents.contains_key(id) || !seen.insert(id.as_str()))
            .map(|(id, _)| id.clone())
            .collect();

        if !collisions.is_empty() {
            collisions.sort();
            collisions.dedup();
            return Err(Error::DuplicateId(collisions));
        }

        self.documents.extend(batch);
        Ok(())
    }

    /// Look up a document.
    pub fn get(&self, id: &str) -> Result<&Document> {
        self.documents
            .get(id)
            .ok_or_else(|| Error::NotFound(id.to_string()))
    }

    /// Whether `id` is present.
    pub fn contains(&self, id: &str) -> bool {
        self.documents.contains_key(id)
    }

    /// Number of stored documents.
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Iterate over stored identifiers in sorted order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.documents.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: &str, content: &str) -> (String, Document) {
        (id.to_string(), Document::new(content))
    }

    #[test]
    fn test_add_then_get() {
        let mut store = DocStore::new();
        store
            .add(vec![entry("a", "alpha"), entry("b", "beta")])
            .unwrap();

        assert_eq!(store.len(), 2);
        assert_eq!(store.get("a").unwrap().content, "alpha");
        assert_eq!(store.get("b").unwrap().content, "beta");
    }

    #[test]
    fn test_get_missing() {
        let store = DocStore::new();
        let err = store.get("nope").unwrap_err();
        assert!(matches!(err, Error::NotFound(id) if id == "nope"));
    }

    #[test]
    fn test_duplicate_rejects_whole_batch() {
        let mut store = DocStore::new();
        store.add(vec![entry("a", "alpha")]).unwrap();
        let before = store.clone();

        let err = store
            .add(vec![entry("c", "gamma"), entry("a", "other")])
            .unwrap_err();

        match err {
            Error::DuplicateId(ids) => assert_eq!(ids, vec!["a".to_string()]),
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(store, before);
        assert!(!store.contains("c"));
    }

    #[test]
    fn test_duplicate_within_batch() {
        let mut store = DocStore::new();
        let err = store
            .add(vec![entry("x", "one"), entry("x", "two")])
            .unwrap_err();

        assert!(matches!(err, Error::DuplicateId(ids) if ids == vec!["x".to_string()]));
        assert!(store.is_empty());
    }

    #[test]
    fn test_snapshot_is_stable() {
        let mut first = DocStore::new();
        first.add(vec![entry("b", "2"), entry("a", "1")]).unwrap();
        let mut second = DocStore::new();
        second.add(vec![entry("a", "1")]).unwrap();
        second.add(vec![entry("b", "2")]).unwrap();

        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }
}
