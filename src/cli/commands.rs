//! Subcommand handlers.
//!
//! Each handler resolves what it needs from the configuration (credentials
//! included) at the start of the command and reports through [`Output`].

use super::output::Output;
use crate::llm::LLMClient;
use crate::rag::generator::{ConversationMode, Generator};
use crate::rag::loaders::{DirectoryLoader, Loader};
use crate::rag::retriever::{get_retriever, Retriever};
use crate::rag::session::RagSession;
use crate::types::{AppError, Result};
use crate::utils::toml_config::GroundworkConfig;
use groundwork_index::{Document, Embedder, Language};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;

/// Options for `groundwork index`
#[derive(Debug, Clone, Default)]
pub struct IndexArgs {
    pub inputs: Vec<PathBuf>,
    pub out: Option<PathBuf>,
    pub backend: Option<String>,
    pub no_split: bool,
    pub language: Option<String>,
}

/// Shared state for one CLI invocation
pub struct CommandContext {
    pub config: GroundworkConfig,
    pub output: Output,
}

impl CommandContext {
    pub fn new(config: GroundworkConfig, output: Output) -> Self {
        Self { config, output }
    }

    fn index_path(&self, explicit: Option<PathBuf>) -> PathBuf {
        explicit.unwrap_or_else(|| self.config.index.path.clone())
    }

    fn embedder(&self) -> Result<Arc<dyn Embedder>> {
        let settings = self.config.embeddings.to_settings()?;
        settings.create_embedder(self.config.generator.request_timeout())
    }

    fn llm(&self) -> Result<Arc<dyn LLMClient>> {
        let provider = self.config.llm.to_provider()?;
        let client = provider.create_client(self.config.generator.request_timeout())?;
        Ok(Arc::from(client))
    }

    async fn generator(&self, index: Option<PathBuf>, mode: Option<String>) -> Result<Generator> {
        let path = self.index_path(index);
        let retriever = Retriever::load(&path, self.embedder()?).await?;

        let mut config = self.config.generator.to_generator_config()?;
        if let Some(mode) = mode {
            config = config.with_mode(mode.parse::<ConversationMode>()?);
        }

        Ok(Generator::new(self.llm()?, Arc::new(retriever), config))
    }

    /// `groundwork index`
    pub async fn index(&self, args: IndexArgs) -> Result<()> {
        self.output.header("Indexing documents");

        let mut documents: Vec<Document> = Vec::new();
        for input in &args.inputs {
            let loaded = DirectoryLoader::new(input).load_documents().await?;
            self.output
                .info(&format!("{}: {} document(s)", input.display(), loaded.len()));
            documents.extend(loaded);
        }
        if documents.is_empty() {
            return Err(AppError::InvalidInput(
                "No readable documents found in the given inputs".to_string(),
            ));
        }

        let mut options = self.config.retriever_options()?;
        if args.no_split {
            options.split_docs = false;
        }
        if let Some(ref name) = args.language {
            options.splitter = options.splitter.with_language(name.parse::<Language>()?);
        }
        let backend = args
            .backend
            .unwrap_or_else(|| self.config.index.backend.clone());

        let retriever = get_retriever(documents, &backend, self.embedder()?, &options).await?;

        let out = self.index_path(args.out);
        retriever.save(&out).await?;

        let stats = retriever.index().stats();
        info!(path = %out.display(), count = stats.count, backend = %stats.backend, "Index written");
        self.output.success(&format!(
            "Indexed {} chunk(s) with the {} backend",
            stats.count, stats.backend
        ));
        self.output.created("index", &out.display().to_string());
        Ok(())
    }

    /// `groundwork search`
    pub async fn search(&self, query: &str, index: Option<PathBuf>, k: usize) -> Result<()> {
        let path = self.index_path(index);
        let retriever = Retriever::load(&path, self.embedder()?).await?;
        let hits = retriever.retrieve_with_scores(query, k).await?;

        if hits.is_empty() {
            self.output.warning("The index is empty");
            return Ok(());
        }
        for (rank, (document, distance)) in hits.iter().enumerate() {
            self.output
                .hit(rank + 1, *distance, &origin(document), &document.content);
        }
        Ok(())
    }

    /// `groundwork ask`
    pub async fn ask(
        &self,
        question: &str,
        index: Option<PathBuf>,
        mode: Option<String>,
    ) -> Result<()> {
        let generator = self.generator(index, mode).await?;
        let answer = generator.answer_user_question(question, &[]).await?;
        self.output.answer(&answer);
        Ok(())
    }

    /// `groundwork chat`
    pub async fn chat(&self, index: Option<PathBuf>, mode: Option<String>) -> Result<()> {
        let generator = self.generator(index, mode).await?;
        let mut session = RagSession::new(generator);

        self.output.banner();
        self.output
            .hint("Ask a question. An empty line or `exit` quits.");

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            self.output.prompt();
            let Some(line) = lines.next_line().await? else {
                break;
            };
            let question = line.trim();
            if question.is_empty() || question.eq_ignore_ascii_case("exit") {
                break;
            }

            let answer = session.ask(question).await?;
            self.output.answer(&answer);
        }

        self.output
            .info(&format!("{} turn(s) in this session", session.turns().len()));
        Ok(())
    }

    /// `groundwork inspect`
    pub async fn inspect(&self, index: Option<PathBuf>) -> Result<()> {
        let path = self.index_path(index);
        let retriever = Retriever::load(&path, self.embedder()?).await?;
        let stats = retriever.index().stats();

        self.output.header("Index");
        self.output.kv("path", &path.display().to_string());
        self.output.kv("backend", stats.backend.name());
        self.output.kv("chunks", &stats.count.to_string());
        self.output.kv(
            "dimension",
            &stats
                .dimension
                .map(|d| d.to_string())
                .unwrap_or_else(|| "-".to_string()),
        );

        let mut sources: Vec<String> = retriever
            .index()
            .ids()
            .iter()
            .filter_map(|id| retriever.index().get(id).ok())
            .filter_map(|document| document.source)
            .collect();
        sources.sort();
        sources.dedup();
        if !sources.is_empty() {
            self.output.subheader("Sources");
            for source in &sources {
                self.output.list_item(source);
            }
        }
        Ok(())
    }
}

fn origin(document: &Document) -> String {
    match (&document.title, &document.source) {
        (_, Some(source)) => source.clone(),
        (Some(title), None) => title.clone(),
        (None, None) => String::new(),
    }
}

/// Read the configuration, falling back to defaults when the file is absent.
pub fn load_config(path: &Path, output: &Output) -> Result<GroundworkConfig> {
    if path.exists() {
        return Ok(GroundworkConfig::load(path)?);
    }
    output.warning(&format!("{} not found, using defaults", path.display()));
    output.hint("Run `groundwork init` to create one");
    Ok(GroundworkConfig::default())
}
