//! Approximate nearest-neighbor search over an HNSW graph.
//!
//! Wraps hnsw_rs with the L2 metric. Vectors are kept alongside the graph
//! so the index can be persisted and rebuilt, and so candidates returned
//! by the graph can be re-scored with exact squared distances.

use crate::config::HnswConfig;
use crate::distance::{sort_neighbors, squared_l2};
use anndists::dist::distances::DistL2;
use hnsw_rs::hnsw::Hnsw;
use tracing::trace;

const MAX_LAYER: usize = 16;

/// HNSW graph plus the vectors inserted into it, keyed by position.
pub struct HnswIndex {
    graph: Hnsw<'static, f32, DistL2>,
    vectors: Vec<Vec<f32>>,
    dimension: usize,
    config: HnswConfig,
}

impl HnswIndex {
    /// Create an empty graph for vectors of `dimension` components.
    pub fn new(dimension: usize, config: HnswConfig) -> Self {
        Self::with_capacity(dimension, config, 0)
    }

    fn with_capacity(dimension: usize, config: HnswConfig, expected: usize) -> Self {
        let max_elements = config.max_elements.max(expected);
        let graph = Hnsw::new(
            config.m,
            max_elements,
            MAX_LAYER,
            config.ef_construction,
            DistL2 {},
        );
        Self {
            graph,
            vectors: Vec::new(),
            dimension,
            config,
        }
    }

    /// Rebuild a graph by re-inserting `vectors` in position order.
    pub fn rebuild(dimension: usize, config: HnswConfig, vectors: Vec<Vec<f32>>) -> Self {
        let mut index = Self::with_capacity(dimension, config, vectors.len());
        index.add(vectors);
        index
    }

    /// Vector dimensionality.
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Number of stored vectors.
    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    /// Whether the index is empty.
    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    /// Stored vectors in position order.
    pub fn vectors(&self) -> &[Vec<f32>] {
        &self.vectors
    }

    /// Append vectors at the next positions. Callers validate dimensions.
    ///
    /// Insertion is sequential so the graph only depends on insertion order.
    pub fn add(&mut self, vectors: Vec<Vec<f32>>) {
        let start = self.vectors.len();
        for (offset, vector) in vectors.iter().enumerate() {
            self.graph.insert((vector.as_slice(), start + offset));
        }
        trace!(count = vectors.len(), start, "Inserted vectors into HNSW graph");
        self.vectors.extend(vectors);
    }

    /// Up to `k` `(position, squared distance)` pairs, nearest first.
    pub fn search(&self, query: &[f32], k: usize) -> Vec<(usize, f32)> {
        if k == 0 || self.is_empty() {
            return Vec::new();
        }

        let k = k.min(self.len());
        let ef_search = self.config.ef_search.max(k);
        // Take the whole candidate list so ties at the cut are settled by position
        let candidates = ef_search.min(self.len());
        let mut hits: Vec<(usize, f32)> = self
            .graph
            .search(query, candidates, ef_search)
            .into_iter()
            .filter_map(|neighbour| {
                let vector = self.vectors.get(neighbour.d_id)?;
                Some((neighbour.d_id, squared_l2(query, vector)))
            })
            .collect();

        sort_neighbors(&mut hits);
        hits.truncate(k);
        hits
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn random_vectors(count: usize, dimension: usize, seed: u64) -> Vec<Vec<f32>> {
        let mut rng = StdRng::seed_from_u64(seed);
        (0..count)
            .map(|_| {
                (0..dimension)
                    .map(|_| rng.random_range(-1.0f32..1.0))
                    .collect()
            })
            .collect()
    }

    #[test]
    fn test_exact_match_is_first() {
        let vectors = random_vectors(200, 8, 7);
        let probe = vectors[42].clone();
        let index = HnswIndex::rebuild(8, HnswConfig::default(), vectors);

        let hits = index.search(&probe, 5);
        assert_eq!(hits.len(), 5);
        assert_eq!(hits[0], (42, 0.0));
        assert!(hits.windows(2).all(|w| w[0].1 <= w[1].1));
    }

    #[test]
    fn test_reports_squared_distance() {
        let index = HnswIndex::rebuild(
            2,
            HnswConfig::default(),
            vec![vec![0.0, 0.0], vec![3.0, 4.0]],
        );
        let hits = index.search(&[0.0, 0.0], 2);
        assert_eq!(hits, vec![(0, 0.0), (1, 25.0)]);
    }

    #[test]
    fn test_empty_and_oversized_requests() {
        let empty = HnswIndex::new(3, HnswConfig::default());
        assert!(empty.search(&[0.0, 0.0, 0.0], 4).is_empty());

        let index = HnswIndex::rebuild(1, HnswConfig::default(), vec![vec![1.0], vec![2.0]]);
        assert_eq!(index.search(&[0.0], 10).len(), 2);
    }

    #[test]
    fn test_ties_ordered_by_position() {
        let index = HnswIndex::rebuild(
            1,
            HnswConfig::default(),
            vec![vec![5.0], vec![-1.0], vec![1.0], vec![0.0]],
        );
        assert_eq!(index.search(&[0.0], 3), vec![(3, 0.0), (1, 1.0), (2, 1.0)]);
    }

    #[test]
    fn test_incremental_add_continues_positions() {
        let mut index = HnswIndex::new(1, HnswConfig::default());
        index.add(vec![vec![10.0]]);
        index.add(vec![vec![20.0], vec![30.0]]);

        assert_eq!(index.len(), 3);
        assert_eq!(index.search(&[29.0], 1), vec![(2, 1.0)]);
    }
}
