use futures::stream::{self, StreamExt, TryStreamExt};
use ndarray::ArrayView2;
use tracing::{debug, info, warn};
use watchfinder_catalog::Document;
use watchfinder_common::{Result, WatchFinderError};
use watchfinder_embed::EmbeddingModel;

use crate::normalize::{ensure_finite, normalize_batch};
use crate::types::BuildOptions;

/// Normalized document embeddings, one per document, in document order
///
/// Vectors live in one row-major buffer so the whole store can be viewed as
/// an `N x D` matrix.
#[derive(Debug, Clone)]
pub struct EmbeddingStore {
    dimension: usize,
    data: Vec<f32>,
    degenerate: Vec<bool>,
}

impl EmbeddingStore {
    /// Embed every document and normalize the results
    ///
    /// Batches are embedded concurrently but reassembled in input order.
    /// Empty document text is passed to the model unchanged.
    pub async fn build(
        model: &dyn EmbeddingModel,
        documents: &[Document],
        options: &BuildOptions,
    ) -> Result<Self> {
        let batch_size = options.batch_size.max(1);

        info!(
            "Embedding {} documents - Model: {}, batch size: {}",
            documents.len(),
            model.name(),
            batch_size
        );

        // Owned batches keep the stream (and every caller's future) Send
        let text_batches: Vec<Vec<String>> = documents
            .chunks(batch_size)
            .map(|chunk| chunk.iter().map(|d| d.text.clone()).collect())
            .collect();

        let batches: Vec<Vec<Vec<f32>>> = stream::iter(text_batches.into_iter().enumerate())
            .map(move |(batch_no, batch)| async move {
                let embeddings = model.embed_many(&batch).await?;
                if embeddings.len() != batch.len() {
                    return Err(WatchFinderError::embedding(format!(
                        "model returned {} embeddings for batch {} of {} texts",
                        embeddings.len(),
                        batch_no,
                        batch.len()
                    )));
                }
                debug!("Embedded batch {} ({} texts)", batch_no, batch.len());
                Ok::<_, WatchFinderError>(embeddings)
            })
            .buffered(options.concurrency.max(1))
            .try_collect()
            .await?;

        let vectors: Vec<Vec<f32>> = batches.into_iter().flatten().collect();
        let expected = model.dimension();

        tokio::task::spawn_blocking(move || Self::from_vectors(vectors, expected))
            .await
            .map_err(|e| WatchFinderError::internal(format!("Normalization task failed: {}", e)))?
    }

    /// Validate and normalize raw embeddings
    ///
    /// Every vector must be non-empty, finite and of one dimensionality
    /// (`expected_dimension` when given, otherwise the first vector's).
    pub fn from_vectors(vectors: Vec<Vec<f32>>, expected_dimension: Option<usize>) -> Result<Self> {
        let dimension = match (expected_dimension, vectors.first()) {
            (Some(d), _) => d,
            (None, Some(first)) => first.len(),
            (None, None) => 0,
        };

        if dimension == 0 && !vectors.is_empty() {
            return Err(WatchFinderError::embedding("model returned an empty embedding"));
        }

        for (position, vector) in vectors.iter().enumerate() {
            if vector.len() != dimension {
                return Err(WatchFinderError::embedding(format!(
                    "document {} has dimension {}, expected {}",
                    position,
                    vector.len(),
                    dimension
                )));
            }
            ensure_finite(vector).map_err(|e| {
                WatchFinderError::embedding(format!("document {}: {}", position, e))
            })?;
        }

        let normalized = normalize_batch(&vectors);
        let mut data = Vec::with_capacity(vectors.len() * dimension);
        let mut degenerate = Vec::with_capacity(vectors.len());
        for n in normalized {
            data.extend_from_slice(&n.vector);
            degenerate.push(n.degenerate);
        }

        let store = Self {
            dimension,
            data,
            degenerate,
        };

        if store.degenerate_count() > 0 {
            warn!(
                "{} of {} embeddings have zero length and will not be searchable",
                store.degenerate_count(),
                store.len()
            );
        }

        Ok(store)
    }

    pub fn len(&self) -> usize {
        self.degenerate.len()
    }

    pub fn is_empty(&self) -> bool {
        self.degenerate.is_empty()
    }

    /// Dimensionality shared by every vector
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Normalized vector at `position`
    pub fn vector(&self, position: usize) -> Option<&[f32]> {
        if position >= self.len() {
            return None;
        }
        let start = position * self.dimension;
        Some(&self.data[start..start + self.dimension])
    }

    pub fn is_degenerate(&self, position: usize) -> bool {
        self.degenerate.get(position).copied().unwrap_or(false)
    }

    pub fn degenerate_count(&self) -> usize {
        self.degenerate.iter().filter(|&&d| d).count()
    }

    /// All vectors as an `N x D` matrix view
    pub fn matrix(&self) -> Result<ArrayView2<'_, f32>> {
        ArrayView2::from_shape((self.len(), self.dimension), &self.data)
            .map_err(|e| WatchFinderError::internal(format!("Embedding store shape error: {}", e)))
    }
}
