use ndarray::{Array2, ArrayView1};
use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;
use tracing::{debug, warn};
use watchfinder_common::{Result, WatchFinderError};

use crate::normalize::{ensure_finite, normalize};
use crate::store::EmbeddingStore;
use crate::types::Hit;

/// Exact cosine-similarity index over a dense `N x D` matrix
///
/// Immutable once built. Degenerate (zero-length) store vectors are left
/// out; `positions` maps each matrix row back to its store position.
#[derive(Debug, Clone)]
pub struct FlatIndex {
    matrix: Array2<f32>,
    positions: Vec<usize>,
    dimension: usize,
}

impl FlatIndex {
    /// Capture the searchable vectors of `store`
    pub fn build(store: &EmbeddingStore) -> Result<Self> {
        let dimension = store.dimension();
        let mut positions = Vec::with_capacity(store.len());
        let mut data = Vec::with_capacity(store.len() * dimension);

        for position in 0..store.len() {
            if store.is_degenerate(position) {
                continue;
            }
            if let Some(vector) = store.vector(position) {
                positions.push(position);
                data.extend_from_slice(vector);
            }
        }

        let matrix = Array2::from_shape_vec((positions.len(), dimension), data)
            .map_err(|e| WatchFinderError::internal(format!("Index shape error: {}", e)))?;

        debug!(
            "Flat index built - {} rows x {} dims ({} excluded)",
            positions.len(),
            dimension,
            store.len() - positions.len()
        );

        Ok(Self {
            matrix,
            positions,
            dimension,
        })
    }

    /// Searchable vector count
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Top `k` positions by cosine similarity to `query`
    ///
    /// Results are sorted by descending score; equal scores keep ascending
    /// position order. `k` larger than the index is clamped. An empty index
    /// or an all-zero query yields no hits.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<Hit>> {
        if k == 0 {
            return Err(WatchFinderError::invalid_input("k must be at least 1"));
        }

        // An empty store built without a declared dimension has no D to check.
        let dimension_known = !(self.dimension == 0 && self.is_empty());
        if dimension_known && query.len() != self.dimension {
            return Err(WatchFinderError::dimension_mismatch(self.dimension, query.len()));
        }

        if self.is_empty() {
            return Ok(Vec::new());
        }

        ensure_finite(query)?;
        let query = normalize(query);
        if query.degenerate {
            warn!("Query embedding has zero length; no results");
            return Ok(Vec::new());
        }

        let scores = self.matrix.dot(&ArrayView1::from(&query.vector[..]));
        let hits = scores.iter().zip(&self.positions).map(|(&score, &position)| Hit {
            position,
            score: clamp_score(score),
        });

        Ok(top_k(hits, k.min(self.len())))
    }
}

/// Keep rounding error from pushing scores outside [-1, 1]
fn clamp_score(score: f32) -> f32 {
    // `+ 0.0` folds -0.0 into 0.0
    score.clamp(-1.0, 1.0) + 0.0
}

/// Ordering where greater means ranked earlier
#[derive(Debug, Clone, Copy)]
struct Ranked(Hit);

impl Ord for Ranked {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0
            .score
            .partial_cmp(&other.0.score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| other.0.position.cmp(&self.0.position))
    }
}

impl PartialOrd for Ranked {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Ranked {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Ranked {}

/// Bounded min-heap selection, O(N log k)
fn top_k(hits: impl Iterator<Item = Hit>, k: usize) -> Vec<Hit> {
    if k == 0 {
        return Vec::new();
    }

    let mut heap: BinaryHeap<Reverse<Ranked>> = BinaryHeap::with_capacity(k + 1);
    for hit in hits {
        let candidate = Ranked(hit);
        if heap.len() < k {
            heap.push(Reverse(candidate));
        } else if let Some(Reverse(worst)) = heap.peek() {
            if candidate > *worst {
                heap.pop();
                heap.push(Reverse(candidate));
            }
        }
    }

    // Ascending order of Reverse(...) is best-first
    heap.into_sorted_vec()
        .into_iter()
        .map(|Reverse(Ranked(hit))| hit)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index_of(vectors: Vec<Vec<f32>>) -> FlatIndex {
        let store = EmbeddingStore::from_vectors(vectors, None).unwrap();
        FlatIndex::build(&store).unwrap()
    }

    fn positions(hits: &[Hit]) -> Vec<usize> {
        hits.iter().map(|h| h.position).collect()
    }

    fn sample_vectors() -> Vec<Vec<f32>> {
        vec![
            vec![1.0, 0.0, 0.0],
            vec![0.0, 1.0, 0.0],
            vec![0.0, 0.0, 1.0],
            vec![1.0, 1.0, 0.0],
            vec![-1.0, 0.5, 0.25],
        ]
    }

    #[test]
    fn test_self_similarity_is_maximal() {
        let vectors = sample_vectors();
        let index = index_of(vectors.clone());
        for (i, v) in vectors.iter().enumerate() {
            let hits = index.search(v, 1).unwrap();
            assert_eq!(hits.len(), 1);
            assert_eq!(hits[0].position, i);
            assert!((hits[0].score - 1.0).abs() < 1e-6);
        }
    }

    #[test]
    fn test_scores_are_cosine_similarity() {
        let index = index_of(vec![vec![1.0, 0.0], vec![1.0, 1.0], vec![-3.0, 0.0]]);
        let hits = index.search(&[5.0, 0.0], 3).unwrap();
        assert_eq!(positions(&hits), vec![0, 1, 2]);
        assert!((hits[0].score - 1.0).abs() < 1e-6);
        assert!((hits[1].score - std::f32::consts::FRAC_1_SQRT_2).abs() < 1e-6);
        assert!((hits[2].score + 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_k_clamped_to_index_size() {
        let index = index_of(sample_vectors());
        let hits = index.search(&[1.0, 0.2, 0.1], 1000).unwrap();
        assert_eq!(hits.len(), 5);
        for pair in hits.windows(2) {
            assert!(pair[0].score >= pair[1].score);
        }
    }

    #[test]
    fn test_tie_break_by_ascending_position() {
        // Positions 1, 3 and 4 all score the same against the query.
        let index = index_of(vec![
            vec![0.0, 1.0],
            vec![1.0, 0.0],
            vec![-1.0, 0.0],
            vec![2.0, 0.0],
            vec![0.5, 0.0],
        ]);
        let hits = index.search(&[1.0, 0.0], 4).unwrap();
        assert_eq!(positions(&hits), vec![1, 3, 4, 0]);

        let hits = index.search(&[1.0, 0.0], 2).unwrap();
        assert_eq!(positions(&hits), vec![1, 3]);
    }

    #[test]
    fn test_search_is_deterministic() {
        let index = index_of(vec![vec![1.0, 1.0]; 20]);
        let first = index.search(&[0.3, 0.7], 7).unwrap();
        let second = index.search(&[0.3, 0.7], 7).unwrap();
        assert_eq!(first, second);
        assert_eq!(positions(&first), (0..7).collect::<Vec<_>>());
    }

    #[test]
    fn test_dimension_mismatch() {
        let index = index_of(sample_vectors());
        let err = index.search(&[1.0, 0.0, 0.0, 0.0], 3).unwrap_err();
        assert!(matches!(
            err,
            WatchFinderError::DimensionMismatch {
                expected: 3,
                got: 4
            }
        ));
    }

    #[test]
    fn test_zero_k_rejected() {
        let index = index_of(sample_vectors());
        assert!(matches!(
            index.search(&[1.0, 0.0, 0.0], 0),
            Err(WatchFinderError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_empty_index_returns_no_hits() {
        let index = index_of(Vec::new());
        assert!(index.is_empty());
        assert!(index.search(&[1.0, 2.0], 5).unwrap().is_empty());

        let store = EmbeddingStore::from_vectors(Vec::new(), Some(2)).unwrap();
        let index = FlatIndex::build(&store).unwrap();
        assert!(index.search(&[1.0, 2.0], 5).unwrap().is_empty());
        assert!(index.search(&[1.0, 2.0, 3.0], 5).is_err());
    }

    #[test]
    fn test_degenerate_vectors_excluded() {
        let index = index_of(vec![vec![0.0, 0.0], vec![0.0, 1.0], vec![0.0, 0.0]]);
        assert_eq!(index.len(), 1);
        let hits = index.search(&[1.0, 0.0], 10).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].position, 1);
        assert_eq!(hits[0].score, 0.0);
    }

    #[test]
    fn test_zero_query_returns_no_hits() {
        let index = index_of(sample_vectors());
        assert!(index.search(&[0.0, 0.0, 0.0], 3).unwrap().is_empty());
    }

    #[test]
    fn test_non_finite_query_rejected() {
        let index = index_of(sample_vectors());
        assert!(matches!(
            index.search(&[f32::NAN, 0.0, 0.0], 3),
            Err(WatchFinderError::Embedding(_))
        ));
    }

    #[test]
    fn test_scores_within_unit_range() {
        let index = index_of(vec![vec![0.1, 0.2, 0.3]; 4]);
        for hit in index.search(&[0.1, 0.2, 0.3], 4).unwrap() {
            assert!((-1.0..=1.0).contains(&hit.score));
        }
    }

    #[test]
    fn test_top_k_matches_full_sort() {
        let hits: Vec<Hit> = (0..50)
            .map(|i| Hit {
                position: i,
                score: ((i * 37) % 11) as f32 / 10.0,
            })
            .collect();

        let mut expected = hits.clone();
        expected.sort_by(|a, b| Ranked(*b).cmp(&Ranked(*a)));
        expected.truncate(9);

        assert_eq!(top_k(hits.into_iter(), 9), expected);
    }
}
