//! L2 normalization.
//!
//! Once both sides are unit length, cosine similarity is a plain dot product.

use rayon::prelude::*;
use watchfinder_common::{Result, WatchFinderError};

/// Result of normalizing one vector
#[derive(Debug, Clone, PartialEq)]
pub struct Normalized {
    /// Unit-length vector, or all zeros when `degenerate`
    pub vector: Vec<f32>,

    /// Input had zero length
    pub degenerate: bool,
}

/// Euclidean length, accumulated in f64
pub fn l2_norm(v: &[f32]) -> f64 {
    v.iter()
        .map(|&x| {
            let x = x as f64;
            x * x
        })
        .sum::<f64>()
        .sqrt()
}

/// Reject vectors containing NaN or infinite components
pub fn ensure_finite(v: &[f32]) -> Result<()> {
    match v.iter().position(|x| !x.is_finite()) {
        Some(i) => Err(WatchFinderError::embedding(format!(
            "non-finite value {} at component {}",
            v[i], i
        ))),
        None => Ok(()),
    }
}

/// Rescale `v` to unit length
///
/// A zero-length input yields a zero vector flagged `degenerate`.
pub fn normalize(v: &[f32]) -> Normalized {
    let norm = l2_norm(v);
    if norm == 0.0 || !norm.is_finite() {
        return Normalized {
            vector: vec![0.0; v.len()],
            degenerate: true,
        };
    }

    Normalized {
        vector: v.iter().map(|&x| (x as f64 / norm) as f32).collect(),
        degenerate: false,
    }
}

/// Normalize every vector in parallel; output order matches input order
pub fn normalize_batch(vectors: &[Vec<f32>]) -> Vec<Normalized> {
    vectors.par_iter().map(|v| normalize(v)).collect()
}
