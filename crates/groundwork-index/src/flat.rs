//! Exact nearest-neighbor search by brute-force scan.

use crate::distance::{sort_neighbors, squared_l2};
use crate::error::{Error, Result};

/// Contiguous row-major vector storage searched exhaustively.
#[derive(Debug, Clone)]
pub struct FlatIndex {
    dimension: usize,
    data: Vec<f32>,
}

impl FlatIndex {
    /// Create an empty index for vectors of `dimension` components.
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            data: Vec::new(),
        }
    }

    /// Rebuild from row-major data.
    pub fn from_raw(dimension: usize, data: Vec<f32>) -> Result<Self> {
        if dimension == 0 || data.len() % dimension != 0 {
            return Err(Error::CorruptIndex(format!(
                "{} values cannot be split into rows of {}",
                data.len(),
                dimension
            )));
        }
        Ok(Self { dimension, data })
    }

    /// Vector dimensionality.
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Number of stored vectors.
    pub fn len(&self) -> usize {
        self.data.len() / self.dimension
    }

    /// Whether the index is empty.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Append vectors at the next positions. Callers validate dimensions.
    pub fn add(&mut self, vectors: &[Vec<f32>]) {
        self.data.reserve(vectors.len() * self.dimension);
        for vector in vectors {
            self.data.extend_from_slice(vector);
        }
    }

    /// Row-major view of all stored vectors.
    pub fn raw(&self) -> &[f32] {
        &self.data
    }

    /// Up to `k` `(position, squared distance)` pairs, nearest first.
    pub fn search(&self, query: &[f32], k: usize) -> Vec<(usize, f32)> {
        if k == 0 || self.is_empty() {
            return Vec::new();
        }

        let mut scored: Vec<(usize, f32)> = self
            .data
            .chunks_exact(self.dimension)
            .enumerate()
            .map(|(position, row)| (position, squared_l2(query, row)))
            .collect();

        sort_neighbors(&mut scored);
        scored.truncate(k);
        scored
    }
}
