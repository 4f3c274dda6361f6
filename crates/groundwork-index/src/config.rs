//! Index configuration: backend selection and HNSW tuning.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Nearest-neighbor backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// Exact brute-force squared-L2 scan.
    #[default]
    Flat,
    /// Approximate search over an HNSW graph.
    Hnsw,
}

impl Backend {
    /// Canonical lowercase name.
    pub fn name(&self) -> &'static str {
        match self {
            Backend::Flat => "flat",
            Backend::Hnsw => "hnsw",
        }
    }

    /// Whether results are exact nearest neighbors.
    pub fn is_exact(&self) -> bool {
        matches!(self, Backend::Flat)
    }
}

impl FromStr for Backend {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "flat" | "exact" | "faiss" => Ok(Backend::Flat),
            "hnsw" | "approximate" => Ok(Backend::Hnsw),
            _ => Err(Error::UnsupportedBackend(s.to_string())),
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// HNSW index configuration.
///
/// These parameters control the trade-off between search accuracy,
/// speed, and memory usage. They are ignored by the flat backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HnswConfig {
    /// Maximum number of connections per element per layer.
    ///
    /// Higher values improve search quality but use more memory.
    /// Typical values: 12-48. Default: 16.
    pub m: usize,

    /// Size of the dynamic candidate list during construction.
    ///
    /// Typical values: 100-500. Default: 200.
    pub ef_construction: usize,

    /// Size of the dynamic candidate list during search.
    ///
    /// Raised to the requested result count when smaller. Default: 100.
    pub ef_search: usize,

    /// Capacity hint for the graph. Default: 100_000.
    pub max_elements: usize,
}

impl Default for HnswConfig {
    fn default() -> Self {
        Self {
            m: 16,
            ef_construction: 200,
            ef_search: 100,
            max_elements: 100_000,
        }
    }
}

impl HnswConfig {
    /// Higher recall at the cost of slower construction and search.
    pub fn accurate() -> Self {
        Self {
            m: 32,
            ef_construction: 400,
            ef_search: 200,
            ..Self::default()
        }
    }

    /// Set M.
    pub fn with_m(mut self, m: usize) -> Self {
        self.m = m;
        self
    }

    /// Set ef_construction.
    pub fn with_ef_construction(mut self, ef: usize) -> Self {
        self.ef_construction = ef;
        self
    }

    /// Set ef_search.
    pub fn with_ef_search(mut self, ef: usize) -> Self {
        self.ef_search = ef;
        self
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.m == 0 {
            return Err(Error::InvalidConfig("hnsw.m must be > 0".to_string()));
        }
        if self.ef_construction == 0 || self.ef_search == 0 {
            return Err(Error::InvalidConfig(
                "hnsw ef values must be > 0".to_string(),
            ));
        }
        if self.max_elements == 0 {
            return Err(Error::InvalidConfig(
                "hnsw.max_elements must be > 0".to_string(),
            ));
        }
        Ok(())
    }
}

/// Configuration for a [`VectorIndex`](crate::VectorIndex).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexConfig {
    /// Nearest-neighbor backend.
    #[serde(default)]
    pub backend: Backend,

    /// HNSW tuning, used when `backend` is [`Backend::Hnsw`].
    #[serde(default)]
    pub hnsw: HnswConfig,
}

impl IndexConfig {
    /// Configuration for the given backend with default tuning.
    pub fn new(backend: Backend) -> Self {
        Self {
            backend,
            hnsw: HnswConfig::default(),
        }
    }

    /// Set the HNSW configuration.
    pub fn with_hnsw_config(mut self, hnsw: HnswConfig) -> Self {
        self.hnsw = hnsw;
        self
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        self.hnsw.validate()
    }
}
