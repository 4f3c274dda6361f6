//! Init command implementation
//!
//! Scaffolds a groundwork project: a `groundwork.toml`, an `.env.example`
//! listing the credentials it references, and the data directory.

use super::output::Output;
use crate::utils::toml_config::DEFAULT_CONFIG_FILE;
use std::fs;
use std::path::{Path, PathBuf};

/// Result of the init operation
#[derive(Debug)]
pub enum InitResult {
    /// Initialization completed successfully
    Success,
    /// Project already exists (groundwork.toml found)
    AlreadyExists,
    /// An error occurred during initialization
    Error(String),
}

/// Configuration for the init command
pub struct InitConfig {
    /// Directory to initialize
    pub path: PathBuf,
    /// Overwrite existing files
    pub force: bool,
    /// LLM provider to configure (ollama or openai)
    pub provider: String,
}

/// Run the init command
pub fn run(config: InitConfig, output: &Output) -> InitResult {
    output.banner();
    output.header("Initializing groundwork project");

    let base_path = &config.path;

    let config_path = base_path.join(DEFAULT_CONFIG_FILE);
    if config_path.exists() && !config.force {
        output.warning(&format!("{} already exists!", DEFAULT_CONFIG_FILE));
        output.hint("Use --force to overwrite existing files");
        return InitResult::AlreadyExists;
    }

    output.subheader("Creating directories");
    let data_dir = base_path.join("data");
    if data_dir.exists() {
        output.skipped("data", "already exists");
    } else {
        if let Err(e) = fs::create_dir_all(&data_dir) {
            output.error(&format!("Failed to create data: {}", e));
            return InitResult::Error(e.to_string());
        }
        output.created_dir("data");
    }

    output.subheader("Creating configuration files");

    let toml_content = generate_config_toml(&config.provider);
    if let Err(e) = write_file(&config_path, &toml_content, config.force) {
        output.error(&format!("Failed to create {}: {}", DEFAULT_CONFIG_FILE, e));
        return InitResult::Error(e.to_string());
    }
    output.created("config", DEFAULT_CONFIG_FILE);

    let env_example_path = base_path.join(".env.example");
    if let Err(e) = write_file(&env_example_path, &generate_env_example(), config.force) {
        output.error(&format!("Failed to create .env.example: {}", e));
        return InitResult::Error(e.to_string());
    }
    output.created("env", ".env.example");

    output.complete("groundwork project initialized successfully!");

    output.header("Next Steps");
    output.newline();
    output.info("1. Set up environment variables:");
    output.command("cp .env.example .env");
    output.command("# Edit .env and set OPENAI_API_KEY");
    output.newline();

    if config.provider == "ollama" {
        output.info("2. Start Ollama (if not running):");
        output.command("ollama serve");
        output.command("ollama pull llama3.2");
        output.newline();
    }

    output.info("3. Index some documents and ask a question:");
    output.command("groundwork index ./docs");
    output.command("groundwork ask \"What is in my docs?\"");

    InitResult::Success
}

fn write_file(path: &Path, content: &str, force: bool) -> std::io::Result<()> {
    if path.exists() && !force {
        return Ok(());
    }
    fs::write(path, content)
}

fn generate_config_toml(provider: &str) -> String {
    let llm_section = if provider == "openai" {
        r#"# OpenAI API (set OPENAI_API_KEY in .env)
[llm]
type = "openai"
api_key_env = "OPENAI_API_KEY"
api_base = "https://api.openai.com/v1"
model = "gpt-4o-mini""#
    } else {
        r#"# Ollama - local inference (no API key required)
[llm]
type = "ollama"
base_url = "http://localhost:11434"
model = "llama3.2""#
    };

    format!(
        r#"# groundwork configuration
# Generated by: groundwork init
#
# Credentials are read from the environment variables named below.

[logging]
level = "info"        # overridden by RUST_LOG
format = "pretty"     # or "json"

{llm_section}

[embeddings]
type = "openai"       # or "fastembed" (requires the local-embeddings feature)
api_key_env = "OPENAI_API_KEY"
api_base = "https://api.openai.com/v1"
model = "text-embedding-3-small"

[index]
backend = "flat"      # exact search; "hnsw" for approximate
path = "data/index"

[index.hnsw]
m = 16
ef_construction = 200
ef_search = 100
max_elements = 100000

[splitter]
split_docs = true
chunk_size = 1000
chunk_overlap = 100
# language = "markdown"   # python, rust or markdown

[generator]
mode = "standalone"   # or "contextual"
max_docs = 5
request_timeout_secs = 60
# system_prompt = "Answer concisely."
"#
    )
}

fn generate_env_example() -> String {
    r#"# groundwork environment variables
# Copy to .env and fill in the values.

# OpenAI-compatible API key (embeddings, and the LLM when type = "openai")
OPENAI_API_KEY=

# Log filter, e.g. groundwork=debug
# RUST_LOG=info
"#
    .to_string()
}
