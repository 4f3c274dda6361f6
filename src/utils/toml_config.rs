//! TOML-based configuration for groundwork
//!
//! Providers, embeddings, index, splitter and generator settings are read
//! from a TOML file (`groundwork.toml`). Credentials never appear in the
//! file itself: each provider section names the environment variable that
//! holds its key, and the key is resolved once when the section is turned
//! into a [`Provider`] or [`EmbedderSettings`].

use crate::llm::Provider;
use crate::rag::embeddings::{EmbedderSettings, DEFAULT_OPENAI_EMBEDDING_MODEL};
use crate::rag::generator::{ConversationMode, GeneratorConfig};
use crate::rag::retriever::RetrieverOptions;
use crate::types::AppError;
use groundwork_index::{Backend, HnswConfig, IndexConfig, Language, SplitterConfig};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default configuration file name
pub const DEFAULT_CONFIG_FILE: &str = "groundwork.toml";

/// Root configuration structure loaded from groundwork.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GroundworkConfig {
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Language model used for rewriting and answering
    #[serde(default)]
    pub llm: ProviderConfig,

    #[serde(default)]
    pub embeddings: EmbeddingsConfig,

    #[serde(default)]
    pub index: IndexSection,

    #[serde(default)]
    pub splitter: SplitterSection,

    #[serde(default)]
    pub generator: GeneratorSection,
}

// ============= Logging Configuration =============

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter directive, overridden by `RUST_LOG`
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default)]
    pub format: LogFormat,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

// ============= Provider Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ProviderConfig {
    Ollama {
        #[serde(default = "default_ollama_url")]
        base_url: String,
        model: String,
    },
    #[serde(rename = "openai")]
    OpenAI {
        /// Environment variable containing API key
        #[serde(default = "default_openai_key_env")]
        api_key_env: String,
        #[serde(default = "default_openai_base")]
        api_base: String,
        model: String,
    },
}

fn default_ollama_url() -> String {
    "http://localhost:11434".to_string()
}

fn default_openai_base() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_openai_key_env() -> String {
    "OPENAI_API_KEY".to_string()
}

impl Default for ProviderConfig {
    fn default() -> Self {
        ProviderConfig::Ollama {
            base_url: default_ollama_url(),
            model: "llama3.2".to_string(),
        }
    }
}

impl ProviderConfig {
    /// Resolve credentials and produce an explicit [`Provider`].
    pub fn to_provider(&self) -> Result<Provider, ConfigError> {
        match self {
            ProviderConfig::Ollama { base_url, model } => Ok(Provider::Ollama {
                base_url: base_url.clone(),
                model: model.clone(),
            }),
            ProviderConfig::OpenAI {
                api_key_env,
                api_base,
                model,
            } => Ok(Provider::OpenAI {
                api_key: resolve_env(api_key_env)?,
                api_base: api_base.clone(),
                model: model.clone(),
            }),
        }
    }

    fn model(&self) -> &str {
        match self {
            ProviderConfig::Ollama { model, .. } | ProviderConfig::OpenAI { model, .. } => model,
        }
    }
}

// ============= Embeddings Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum EmbeddingsConfig {
    #[serde(rename = "openai")]
    OpenAI {
        #[serde(default = "default_openai_key_env")]
        api_key_env: String,
        #[serde(default = "default_openai_base")]
        api_base: String,
        #[serde(default = "default_embedding_model")]
        model: String,
    },
    /// Local ONNX models (requires the `local-embeddings` feature)
    FastEmbed {
        #[serde(default = "default_fastembed_model")]
        model: String,
    },
}

fn default_embedding_model() -> String {
    DEFAULT_OPENAI_EMBEDDING_MODEL.to_string()
}

fn default_fastembed_model() -> String {
    "BAAI/bge-small-en-v1.5".to_string()
}

impl Default for EmbeddingsConfig {
    fn default() -> Self {
        EmbeddingsConfig::OpenAI {
            api_key_env: default_openai_key_env(),
            api_base: default_openai_base(),
            model: default_embedding_model(),
        }
    }
}

impl EmbeddingsConfig {
    /// Resolve credentials and produce explicit [`EmbedderSettings`].
    pub fn to_settings(&self) -> Result<EmbedderSettings, ConfigError> {
        match self {
            EmbeddingsConfig::OpenAI {
                api_key_env,
                api_base,
                model,
            } => Ok(EmbedderSettings::OpenAI {
                api_key: resolve_env(api_key_env)?,
                api_base: api_base.clone(),
                model: model.clone(),
            }),
            EmbeddingsConfig::FastEmbed { model } => Ok(EmbedderSettings::FastEmbed {
                model: model.clone(),
            }),
        }
    }
}

// ============= Index Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexSection {
    /// `flat` (exact) or `hnsw` (approximate)
    #[serde(default = "default_backend")]
    pub backend: String,

    /// Directory the index is saved to and loaded from
    #[serde(default = "default_index_path")]
    pub path: PathBuf,

    #[serde(default)]
    pub hnsw: HnswConfig,
}

fn default_backend() -> String {
    Backend::Flat.name().to_string()
}

fn default_index_path() -> PathBuf {
    PathBuf::from("data/index")
}

impl Default for IndexSection {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            path: default_index_path(),
            hnsw: HnswConfig::default(),
        }
    }
}

impl IndexSection {
    pub fn backend(&self) -> Result<Backend, ConfigError> {
        self.backend
            .parse()
            .map_err(|_| ConfigError::ValidationError(format!("Unknown index backend '{}'", self.backend)))
    }

    pub fn to_index_config(&self) -> Result<IndexConfig, ConfigError> {
        Ok(IndexConfig::new(self.backend()?).with_hnsw_config(self.hnsw.clone()))
    }
}

// ============= Splitter Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SplitterSection {
    #[serde(default = "default_true")]
    pub split_docs: bool,

    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    #[serde(default = "default_chunk_overlap")]
    pub chunk_overlap: usize,

    /// `python`, `rust` or `markdown`; prose separators when absent
    #[serde(default)]
    pub language: Option<String>,
}

fn default_true() -> bool {
    true
}

fn default_chunk_size() -> usize {
    1000
}

fn default_chunk_overlap() -> usize {
    100
}

impl Default for SplitterSection {
    fn default() -> Self {
        Self {
            split_docs: true,
            chunk_size: default_chunk_size(),
            chunk_overlap: default_chunk_overlap(),
            language: None,
        }
    }
}

impl SplitterSection {
    pub fn to_splitter_config(&self) -> Result<SplitterConfig, ConfigError> {
        let mut config = SplitterConfig::default()
            .with_chunk_size(self.chunk_size)
            .with_chunk_overlap(self.chunk_overlap);
        if let Some(ref name) = self.language {
            let language: Language = name
                .parse()
                .map_err(|_| ConfigError::ValidationError(format!("Unknown splitter language '{}'", name)))?;
            config = config.with_language(language);
        }
        config
            .validate()
            .map_err(|e| ConfigError::ValidationError(e.to_string()))?;
        Ok(config)
    }
}

// ============= Generator Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorSection {
    /// `standalone` or `contextual`
    #[serde(default = "default_mode")]
    pub mode: String,

    #[serde(default)]
    pub system_prompt: Option<String>,

    #[serde(default = "default_max_docs")]
    pub max_docs: usize,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_mode() -> String {
    ConversationMode::default().as_str().to_string()
}

fn default_max_docs() -> usize {
    5
}

fn default_request_timeout_secs() -> u64 {
    60
}

impl Default for GeneratorSection {
    fn default() -> Self {
        Self {
            mode: default_mode(),
            system_prompt: None,
            max_docs: default_max_docs(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl GeneratorSection {
    pub fn mode(&self) -> Result<ConversationMode, ConfigError> {
        self.mode
            .parse()
            .map_err(|_| ConfigError::ValidationError(format!("Unknown conversation mode '{}'", self.mode)))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn to_generator_config(&self) -> Result<GeneratorConfig, ConfigError> {
        let mut config = GeneratorConfig::default()
            .with_mode(self.mode()?)
            .with_max_docs(self.max_docs)
            .with_request_timeout(self.request_timeout());
        if let Some(ref prompt) = self.system_prompt {
            config = config.with_system_prompt(prompt.clone());
        }
        Ok(config)
    }
}

// ============= Configuration Loading & Validation =============

/// Errors that can occur during configuration loading
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read configuration file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Environment variable '{0}' referenced in config is not set")]
    MissingEnvVar(String),
}

impl From<ConfigError> for AppError {
    fn from(err: ConfigError) -> Self {
        AppError::Configuration(err.to_string())
    }
}

fn resolve_env(name: &str) -> Result<String, ConfigError> {
    match std::env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ConfigError::MissingEnvVar(name.to_string())),
    }
}

impl GroundworkConfig {
    /// Load and validate configuration from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        let config = Self::parse(&content)?;
        Ok(config)
    }

    /// Parse and validate configuration from TOML text
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: GroundworkConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate names and numeric bounds.
    ///
    /// Environment variables are not checked here; they are resolved when a
    /// provider is built, so commands that never call a provider still run.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.llm.model().trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "llm.model must not be empty".to_string(),
            ));
        }

        self.index
            .to_index_config()?
            .validate()
            .map_err(|e| ConfigError::ValidationError(e.to_string()))?;
        self.splitter.to_splitter_config()?;
        self.generator.mode()?;

        if self.generator.max_docs == 0 {
            return Err(ConfigError::ValidationError(
                "generator.max_docs must be greater than zero".to_string(),
            ));
        }
        if self.generator.request_timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "generator.request_timeout_secs must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }

    /// Retriever build options from the index and splitter sections
    pub fn retriever_options(&self) -> Result<RetrieverOptions, ConfigError> {
        Ok(RetrieverOptions {
            split_docs: self.splitter.split_docs,
            splitter: self.splitter.to_splitter_config()?,
            hnsw: self.index.hnsw.clone(),
        })
    }
}
