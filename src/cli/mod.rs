//! CLI module for groundwork
//!
//! Provides command-line interface parsing and handling for the groundwork binary.
//! Uses clap for argument parsing and owo-colors for colored terminal output.

pub mod commands;
pub mod init;
pub mod output;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// groundwork - answers grounded in your own documents
#[derive(Parser, Debug)]
#[command(
    name = "groundwork",
    version,
    about = "Conversational retrieval over your own documents",
    long_about = "Index local documents into a vector index, then ask questions that are\n\
                  answered by a language model from the most similar chunks.\n\n\
                  Follow-up questions in a chat are rewritten into standalone questions\n\
                  before retrieval.",
    after_help = "EXAMPLES:\n    \
                  groundwork init                       # Scaffold groundwork.toml and .env.example\n    \
                  groundwork index ./docs               # Build and save the index\n    \
                  groundwork search \"vector index\" -k 3 # Show the nearest chunks\n    \
                  groundwork ask \"What is X?\"           # One-shot answer\n    \
                  groundwork chat                       # Interactive session"
)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "groundwork.toml", global = true)]
    pub config: PathBuf,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create groundwork.toml and .env.example
    Init {
        /// Directory to initialize (defaults to current directory)
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Overwrite existing files
        #[arg(short, long)]
        force: bool,

        /// LLM provider to configure (ollama or openai)
        #[arg(long, default_value = "ollama")]
        provider: String,
    },

    /// Load files, build the index and save it
    Index {
        /// Files or directories to index
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Output directory (defaults to index.path from the config)
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Backend: flat (exact) or hnsw (approximate)
        #[arg(short, long)]
        backend: Option<String>,

        /// Index whole documents without chunking
        #[arg(long)]
        no_split: bool,

        /// Separator hierarchy: python, rust or markdown
        #[arg(short, long)]
        language: Option<String>,
    },

    /// Print the chunks nearest to a query
    Search {
        query: String,

        /// Index directory (defaults to index.path from the config)
        #[arg(short, long)]
        index: Option<PathBuf>,

        /// Number of results
        #[arg(short, default_value = "4")]
        k: usize,
    },

    /// Answer a single question
    Ask {
        question: String,

        /// Index directory (defaults to index.path from the config)
        #[arg(short, long)]
        index: Option<PathBuf>,

        /// Conversation mode: standalone or contextual
        #[arg(short, long)]
        mode: Option<String>,
    },

    /// Interactive question answering; an empty line or `exit` quits
    Chat {
        /// Index directory (defaults to index.path from the config)
        #[arg(short, long)]
        index: Option<PathBuf>,

        /// Conversation mode: standalone or contextual
        #[arg(short, long)]
        mode: Option<String>,
    },

    /// Show index statistics
    Inspect {
        /// Index directory (defaults to index.path from the config)
        #[arg(short, long)]
        index: Option<PathBuf>,
    },
}

impl Cli {
    /// Parse CLI arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
