//! Retriever facade tests over both backends
//!
//! Uses the keyword embedder from `common::mocks`, so distances are exact
//! small integers and result order is fully determined.

mod common;

use common::mocks::{corpus, KeywordEmbedder};
use groundwork::index::{Backend, Document, Error as IndexError};
use groundwork::rag::{get_retriever, Retrieve, Retriever, RetrieverOptions};
use groundwork::types::AppError;
use rstest::rstest;
use std::sync::Arc;
use tempfile::TempDir;

fn contents(docs: &[Document]) -> Vec<&str> {
    docs.iter().map(|d| d.content.as_str()).collect()
}

#[rstest]
#[case("flat")]
#[case("faiss")]
#[case("hnsw")]
#[case("approximate")]
#[tokio::test]
async fn test_nearest_document_first(#[case] backend: &str) {
    let embedder = Arc::new(KeywordEmbedder::new());
    let retriever = get_retriever(corpus(), backend, embedder, &RetrieverOptions::default())
        .await
        .unwrap();

    let docs = retriever.retrieve_similar_docs("cats", 2).await.unwrap();

    // "dogs are mammals" and "rust is a language" tie; insertion order wins
    assert_eq!(contents(&docs), vec!["cats are mammals", "dogs are mammals"]);
}

#[rstest]
#[case(Backend::Flat)]
#[case(Backend::Hnsw)]
#[tokio::test]
async fn test_scores_are_squared_distances(#[case] backend: Backend) {
    let retriever = Retriever::build(
        corpus(),
        backend,
        Arc::new(KeywordEmbedder::new()),
        &RetrieverOptions::default(),
    )
    .await
    .unwrap();

    let hits = retriever.retrieve_with_scores("cats", 3).await.unwrap();
    let scores: Vec<f32> = hits.iter().map(|(_, d)| *d).collect();

    assert_eq!(scores, vec![1.0, 3.0, 3.0]);
    assert_eq!(hits[2].0.content, "rust is a language");
}

#[tokio::test]
async fn test_unknown_backend_rejected_before_embedding() {
    let embedder = Arc::new(KeywordEmbedder::new());

    let err = get_retriever(
        corpus(),
        "annoy",
        embedder.clone(),
        &RetrieverOptions::default(),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, AppError::UnsupportedBackend(ref name) if name == "annoy"));
    assert_eq!(embedder.document_calls(), 0);
    assert_eq!(embedder.query_calls(), 0);
}

#[tokio::test]
async fn test_fewer_documents_than_requested() {
    let retriever = get_retriever(
        corpus(),
        "flat",
        Arc::new(KeywordEmbedder::new()),
        &RetrieverOptions::default(),
    )
    .await
    .unwrap();

    let docs = retriever.retrieve_similar_docs("rust", 10).await.unwrap();
    assert_eq!(docs.len(), 3);
    assert_eq!(docs[0].content, "rust is a language");

    assert!(retriever.retrieve_similar_docs("rust", 0).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_empty_corpus_retrieves_nothing() {
    let retriever = get_retriever(
        Vec::new(),
        "hnsw",
        Arc::new(KeywordEmbedder::new()),
        &RetrieverOptions::default(),
    )
    .await
    .unwrap();

    assert!(retriever.index().is_empty());
    assert!(retriever.retrieve_similar_docs("cats", 3).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_chunks_keep_document_metadata() {
    let mut options = RetrieverOptions::default();
    options.splitter = options.splitter.with_chunk_size(20).with_chunk_overlap(0);

    let long = Document::new("cats are mammals\n\ndogs are mammals\n\nrust is a language")
        .with_title("animals")
        .with_source("notes/animals.md");
    let retriever = get_retriever(vec![long], "flat", Arc::new(KeywordEmbedder::new()), &options)
        .await
        .unwrap();

    assert_eq!(retriever.index().len(), 3);
    let docs = retriever.retrieve_similar_docs("dogs", 1).await.unwrap();
    assert_eq!(docs[0].content, "dogs are mammals");
    assert_eq!(docs[0].title.as_deref(), Some("animals"));
    assert_eq!(docs[0].source.as_deref(), Some("notes/animals.md"));
}

#[tokio::test]
async fn test_unsplit_documents_indexed_whole() {
    let options = RetrieverOptions {
        split_docs: false,
        ..RetrieverOptions::default()
    };
    let text = "cats are mammals. ".repeat(200);
    let retriever = get_retriever(
        vec![Document::new(text.clone())],
        "flat",
        Arc::new(KeywordEmbedder::new()),
        &options,
    )
    .await
    .unwrap();

    assert_eq!(retriever.index().len(), 1);
    let docs = retriever.retrieve_similar_docs("cats", 1).await.unwrap();
    assert_eq!(docs[0].content, text);
}

#[rstest]
#[case(Backend::Flat)]
#[case(Backend::Hnsw)]
#[tokio::test]
async fn test_save_and_load_round_trip(#[case] backend: Backend) {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("index");

    let original = Retriever::build(
        corpus(),
        backend,
        Arc::new(KeywordEmbedder::new()),
        &RetrieverOptions::default(),
    )
    .await
    .unwrap();
    original.save(&path).await.unwrap();

    let loaded = Retriever::load(&path, Arc::new(KeywordEmbedder::new()))
        .await
        .unwrap();

    assert_eq!(loaded.backend(), backend);
    assert_eq!(loaded.index().len(), 3);
    for query in ["cats", "dogs", "language", "widget"] {
        let before = original.retrieve_with_scores(query, 3).await.unwrap();
        let after = loaded.retrieve_with_scores(query, 3).await.unwrap();
        assert_eq!(before, after, "query {query}");
    }
}

#[tokio::test]
async fn test_load_missing_index_is_corrupt() {
    let dir = TempDir::new().unwrap();

    let err = Retriever::load(dir.path().join("nothing"), Arc::new(KeywordEmbedder::new()))
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Index(IndexError::CorruptIndex(_))));
}

#[tokio::test]
async fn test_query_embedding_failure_maps_to_embedding_service() {
    let retriever = get_retriever(
        corpus(),
        "flat",
        Arc::new(KeywordEmbedder::failing_queries()),
        &RetrieverOptions::default(),
    )
    .await
    .unwrap();

    let err = retriever.retrieve_similar_docs("cats", 1).await.unwrap_err();
    assert!(matches!(err, AppError::EmbeddingService(_)));
    assert!(err.is_collaborator_failure());
}

#[tokio::test]
async fn test_concurrent_retrieval() {
    let retriever = Arc::new(
        get_retriever(
            corpus(),
            "hnsw",
            Arc::new(KeywordEmbedder::new()),
            &RetrieverOptions::default(),
        )
        .await
        .unwrap(),
    );

    let handles: Vec<_> = ["cats", "dogs", "rust", "cats", "dogs", "rust"]
        .into_iter()
        .map(|query| {
            let retriever = retriever.clone();
            tokio::spawn(async move { retriever.retrieve_similar_docs(query, 1).await })
        })
        .collect();

    for (handle, expected) in handles.into_iter().zip([
        "cats are mammals",
        "dogs are mammals",
        "rust is a language",
        "cats are mammals",
        "dogs are mammals",
        "rust is a language",
    ]) {
        let docs = handle.await.unwrap().unwrap();
        assert_eq!(docs[0].content, expected);
    }
}
