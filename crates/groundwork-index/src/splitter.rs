//! Recursive character splitting of documents into retrieval-sized chunks.
//!
//! Text is cut on the coarsest separator that occurs in it (paragraph,
//! line, sentence, word, then single characters). Pieces still longer than
//! `chunk_size` are cut again on the next separator. Small neighbouring
//! pieces are then merged back into chunks of at most `chunk_size`
//! characters, each new chunk starting with up to `chunk_overlap`
//! characters taken from the end of the previous one.
//!
//! Lengths are counted in `char`s, so results never depend on the byte
//! width of the input encoding.

use crate::document::Document;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;
use std::str::FromStr;

const PROSE_SEPARATORS: &[&str] = &["\n\n", "\n", ". ", " ", ""];

const PYTHON_SEPARATORS: &[&str] = &["\nclass ", "\ndef ", "\n\tdef ", "\n\n", "\n", " ", ""];

const RUST_SEPARATORS: &[&str] = &[
    "\nfn ", "\nconst ", "\nlet ", "\nif ", "\nwhile ", "\nfor ", "\nloop ", "\nmatch ", "\n\n",
    "\n", " ", "",
];

const MARKDOWN_SEPARATORS: &[&str] = &[
    "\n# ", "\n## ", "\n### ", "\n#### ", "\n##### ", "\n###### ", "\n```\n", "\n\n", "\n", " ",
    "",
];

fn default_chunk_size() -> usize {
    1000
}

fn default_chunk_overlap() -> usize {
    100
}

/// Syntax hint selecting a language-specific separator hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    /// Split at class and function definitions first.
    Python,
    /// Split at item and statement keywords first.
    Rust,
    /// Split at headings and fenced blocks first.
    Markdown,
}

impl Language {
    /// Canonical lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::Python => "python",
            Language::Rust => "rust",
            Language::Markdown => "markdown",
        }
    }

    fn separators(&self) -> &'static [&'static str] {
        match self {
            Language::Python => PYTHON_SEPARATORS,
            Language::Rust => RUST_SEPARATORS,
            Language::Markdown => MARKDOWN_SEPARATORS,
        }
    }
}

impl FromStr for Language {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "python" | "py" => Ok(Language::Python),
            "rust" | "rs" => Ok(Language::Rust),
            "markdown" | "md" => Ok(Language::Markdown),
            _ => Err(Error::UnsupportedLanguage(s.to_string())),
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Splitter configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitterConfig {
    /// Maximum characters per chunk.
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Characters carried over from the end of the previous chunk.
    /// Must be smaller than `chunk_size`.
    #[serde(default = "default_chunk_overlap")]
    pub chunk_overlap: usize,

    /// Optional syntax-aware separator hierarchy.
    #[serde(default)]
    pub language: Option<Language>,
}

impl Default for SplitterConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            chunk_overlap: default_chunk_overlap(),
            language: None,
        }
    }
}

impl SplitterConfig {
    /// Set the chunk size.
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    /// Set the chunk overlap.
    pub fn with_chunk_overlap(mut self, chunk_overlap: usize) -> Self {
        self.chunk_overlap = chunk_overlap;
        self
    }

    /// Set the language hint.
    pub fn with_language(mut self, language: Language) -> Self {
        self.language = Some(language);
        self
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(Error::InvalidConfig("chunk_size must be > 0".to_string()));
        }
        if self.chunk_overlap >= self.chunk_size {
            return Err(Error::InvalidConfig(format!(
                "chunk_overlap ({}) must be smaller than chunk_size ({})",
                self.chunk_overlap, self.chunk_size
            )));
        }
        Ok(())
    }
}

/// Where a separator ends up once text is cut on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Placement {
    /// Trailing the piece before the cut.
    End,
    /// Leading the piece after the cut.
    Start,
}

/// Deterministic recursive text splitter.
#[derive(Debug, Clone)]
pub struct TextSplitter {
    config: SplitterConfig,
    separators: &'static [&'static str],
    placement: Placement,
}

impl TextSplitter {
    /// Build a splitter, rejecting invalid configurations.
    pub fn new(config: SplitterConfig) -> Result<Self> {
        config.validate()?;
        let (separators, placement) = match config.language {
            Some(language) => (language.separators(), Placement::Start),
            None => (PROSE_SEPARATORS, Placement::End),
        };
        Ok(Self {
            config,
            separators,
            placement,
        })
    }

    /// The configuration in use.
    pub fn config(&self) -> &SplitterConfig {
        &self.config
    }

    /// Lazily split a sequence of documents into chunks.
    ///
    /// The returned iterator is `Clone`; cloning it restarts from the same
    /// position and yields the same chunks.
    pub fn split<'a>(&'a self, documents: &'a [Document]) -> Chunks<'a> {
        Chunks {
            splitter: self,
            documents: documents.iter(),
            current: None,
        }
    }

    /// Split a single text into chunk contents.
    pub fn split_text(&self, text: &str) -> Vec<String> {
        if text.trim().is_empty() {
            return Vec::new();
        }
        if char_len(text) <= self.config.chunk_size {
            return vec![text.to_string()];
        }

        self.split_recursive(text, self.separators)
            .into_iter()
            .filter_map(|chunk| {
                let trimmed = chunk.trim();
                (!trimmed.is_empty()).then(|| trimmed.to_string())
            })
            .collect()
    }

    fn split_recursive(&self, text: &str, separators: &[&str]) -> Vec<String> {
        let mut separator = "";
        let mut finer: &[&str] = &[];
        for (i, &candidate) in separators.iter().enumerate() {
            if candidate.is_empty() {
                break;
            }
            if text.contains(candidate) {
                separator = candidate;
                finer = &separators[i + 1..];
                break;
            }
        }

        let mut chunks = Vec::new();
        let mut pending: Vec<&str> = Vec::new();

        for piece in split_keeping(text, separator, self.placement) {
            if char_len(piece) < self.config.chunk_size {
                pending.push(piece);
                continue;
            }
            if !pending.is_empty() {
                chunks.extend(self.merge(&pending));
                pending.clear();
            }
            if finer.is_empty() {
                chunks.push(piece.to_string());
            } else {
                chunks.extend(self.split_recursive(piece, finer));
            }
        }

        if !pending.is_empty() {
            chunks.extend(self.merge(&pending));
        }
        chunks
    }

    /// Greedily pack pieces into chunks, sliding a window so that each new
    /// chunk starts with at most `chunk_overlap` characters of the last one.
    ///
    /// A window is only emitted when it gained text since the last chunk;
    /// otherwise it would repeat the carried-over tail on its own.
    fn merge(&self, pieces: &[&str]) -> Vec<String> {
        let size = self.config.chunk_size;
        let overlap = self.config.chunk_overlap;

        let mut chunks = Vec::new();
        let mut window: VecDeque<&str> = VecDeque::new();
        let mut total = 0usize;
        let mut fresh = false;

        for piece in pieces {
            let len = char_len(piece);
            if total + len > size && !window.is_empty() {
                if fresh {
                    if let Some(chunk) = join_window(&window) {
                        chunks.push(chunk);
                    }
                    fresh = false;
                }
                while total > overlap || (total > 0 && total + len > size) {
                    match window.pop_front() {
                        Some(front) => total -= char_len(front),
                        None => break,
                    }
                }
            }
            window.push_back(piece);
            total += len;
            fresh |= !piece.trim().is_empty();
        }

        if fresh {
            if let Some(chunk) = join_window(&window) {
                chunks.push(chunk);
            }
        }
        chunks
    }
}

/// Lazy chunk sequence produced by [`TextSplitter::split`].
#[derive(Debug, Clone)]
pub struct Chunks<'a> {
    splitter: &'a TextSplitter,
    documents: std::slice::Iter<'a, Document>,
    current: Option<(&'a Document, std::vec::IntoIter<String>)>,
}

impl Iterator for Chunks<'_> {
    type Item = Document;

    fn next(&mut self) -> Option<Document> {
        loop {
            if let Some((parent, pieces)) = &mut self.current {
                if let Some(content) = pieces.next() {
                    return Some(parent.derive_chunk(content));
                }
            }
            let parent = self.documents.next()?;
            let pieces = self.splitter.split_text(&parent.content).into_iter();
            self.current = Some((parent, pieces));
        }
    }
}

fn char_len(text: &str) -> usize {
    text.chars().count()
}

fn join_window(window: &VecDeque<&str>) -> Option<String> {
    let joined: String = window.iter().copied().collect();
    let trimmed = joined.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn split_keeping<'t>(text: &'t str, separator: &str, placement: Placement) -> Vec<&'t str> {
    if separator.is_empty() {
        return text
            .char_indices()
            .map(|(i, c)| &text[i..i + c.len_utf8()])
            .collect();
    }

    let mut pieces = Vec::new();
    let mut start = 0;
    for (idx, _) in text.match_indices(separator) {
        let cut = match placement {
            Placement::End => idx + separator.len(),
            Placement::Start => idx,
        };
        if cut > start {
            pieces.push(&text[start..cut]);
            start = cut;
        }
    }
    if start < text.len() {
        pieces.push(&text[start..]);
    }
    pieces
}
