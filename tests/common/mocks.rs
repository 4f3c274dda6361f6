//! Mock implementations for testing.
//!
//! Deterministic embedders, scripted language models and a recording
//! retriever shared by the integration tests.

use async_trait::async_trait;
use groundwork::index::{self, Document, Embedder};
use groundwork::llm::LLMClient;
use groundwork::rag::Retrieve;
use groundwork::types::{AppError, ChatMessage, Result};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Words the keyword embedder counts, one dimension each.
pub const VOCABULARY: &[&str] = &[
    "cats", "dogs", "mammals", "rust", "language", "widget", "cost", "price",
];

/// The three-document corpus used across tests.
pub fn corpus() -> Vec<Document> {
    ["cats are mammals", "dogs are mammals", "rust is a language"]
        .into_iter()
        .map(Document::new)
        .collect()
}

/// Embeds text as keyword counts over [`VOCABULARY`].
///
/// The query "cats" lands at squared distance 1 from "cats are mammals"
/// and 3 from the other two corpus documents.
#[derive(Default)]
pub struct KeywordEmbedder {
    query_calls: AtomicUsize,
    document_calls: AtomicUsize,
    fail_queries: bool,
}

impl KeywordEmbedder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Embeds documents normally but fails every query.
    pub fn failing_queries() -> Self {
        Self {
            fail_queries: true,
            ..Self::default()
        }
    }

    pub fn embed(text: &str) -> Vec<f32> {
        let lower = text.to_lowercase();
        let words: Vec<&str> = lower
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
            .collect();
        VOCABULARY
            .iter()
            .map(|term| words.iter().filter(|w| *w == term).count() as f32)
            .collect()
    }

    pub fn query_calls(&self) -> usize {
        self.query_calls.load(Ordering::SeqCst)
    }

    pub fn document_calls(&self) -> usize {
        self.document_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Embedder for KeywordEmbedder {
    async fn embed_query(&self, text: &str) -> index::Result<Vec<f32>> {
        self.query_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_queries {
            return Err(index::Error::Embedding("mock embedding outage".to_string()));
        }
        Ok(Self::embed(text))
    }

    async fn embed_documents(&self, texts: &[String]) -> index::Result<Vec<Vec<f32>>> {
        self.document_calls.fetch_add(1, Ordering::SeqCst);
        Ok(texts.iter().map(|t| Self::embed(t)).collect())
    }

    fn dimensions(&self) -> Option<usize> {
        Some(VOCABULARY.len())
    }

    fn name(&self) -> &str {
        "keyword"
    }
}

/// Language model that replays scripted answers and records every prompt.
///
/// Once the script runs out it echoes the prompt back, or hangs when built
/// with [`ScriptedLLM::then_hang`].
#[derive(Clone, Default)]
pub struct ScriptedLLM {
    script: Arc<Mutex<VecDeque<String>>>,
    prompts: Arc<Mutex<Vec<String>>>,
    systems: Arc<Mutex<Vec<Option<String>>>>,
    hang_when_exhausted: bool,
}

impl ScriptedLLM {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            script: Arc::new(Mutex::new(answers.into_iter().map(Into::into).collect())),
            ..Self::default()
        }
    }

    /// Replays `answers`, then never answers again.
    pub fn then_hang<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            hang_when_exhausted: true,
            ..Self::new(answers)
        }
    }

    /// Echoes every prompt.
    pub fn echo() -> Self {
        Self::default()
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    pub fn system_prompts(&self) -> Vec<Option<String>> {
        self.systems.lock().unwrap().clone()
    }
}

#[async_trait]
impl LLMClient for ScriptedLLM {
    async fn complete(&self, messages: &[ChatMessage], system_prompt: Option<&str>) -> Result<String> {
        let prompt = messages
            .last()
            .map(|m| m.content.clone())
            .unwrap_or_default();
        self.prompts.lock().unwrap().push(prompt.clone());
        self.systems
            .lock()
            .unwrap()
            .push(system_prompt.map(str::to_string));

        let scripted = self.script.lock().unwrap().pop_front();
        match scripted {
            Some(answer) => Ok(answer),
            None if self.hang_when_exhausted => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Ok("too late".to_string())
            }
            None => Ok(prompt),
        }
    }

    fn model_name(&self) -> &str {
        "scripted"
    }
}

/// Language model whose every call fails.
pub struct FailingLLM;

#[async_trait]
impl LLMClient for FailingLLM {
    async fn complete(&self, _messages: &[ChatMessage], _system: Option<&str>) -> Result<String> {
        Err(AppError::GenerationService("mock model is down".to_string()))
    }

    fn model_name(&self) -> &str {
        "failing"
    }
}

/// Language model that never answers within any reasonable timeout.
pub struct HangingLLM;

#[async_trait]
impl LLMClient for HangingLLM {
    async fn complete(&self, _messages: &[ChatMessage], _system: Option<&str>) -> Result<String> {
        tokio::time::sleep(Duration::from_secs(3600)).await;
        Ok("too late".to_string())
    }

    fn model_name(&self) -> &str {
        "hanging"
    }
}

/// Retriever returning fixed documents and recording each query.
#[derive(Clone, Default)]
pub struct RecordingRetriever {
    documents: Vec<Document>,
    queries: Arc<Mutex<Vec<String>>>,
}

impl RecordingRetriever {
    pub fn new(documents: Vec<Document>) -> Self {
        Self {
            documents,
            queries: Arc::default(),
        }
    }

    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl Retrieve for RecordingRetriever {
    async fn retrieve_similar_docs(&self, query: &str, max_docs: usize) -> Result<Vec<Document>> {
        self.queries.lock().unwrap().push(query.to_string());
        Ok(self.documents.iter().take(max_docs).cloned().collect())
    }
}
