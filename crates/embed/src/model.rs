use async_trait::async_trait;
use watchfinder_common::Result;

/// Common trait for text embedding models
///
/// Implementations must be deterministic for a given input and return
/// vectors of one fixed dimensionality.
#[async_trait]
pub trait EmbeddingModel: Send + Sync {
    /// Model identifier, for logs and stats
    fn name(&self) -> &str;

    /// Output dimensionality, when known up front
    fn dimension(&self) -> Option<usize> {
        None
    }

    /// Generate embedding for a single text
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Generate embeddings for many texts, preserving input order
    ///
    /// The default calls `embed` once per text.
    async fn embed_many(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let mut embeddings = Vec::with_capacity(texts.len());
        for text in texts {
            embeddings.push(self.embed(text).await?);
        }
        Ok(embeddings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct LengthModel;

    #[async_trait]
    impl EmbeddingModel for LengthModel {
        fn name(&self) -> &str {
            "length"
        }

        async fn embed(&self, text: &str) -> Result<Vec<f32>> {
            Ok(vec![text.len() as f32, 1.0])
        }
    }

    #[tokio::test]
    async fn test_default_embed_many_preserves_order() {
        let texts = vec!["a".to_string(), "abc".to_string(), "".to_string()];
        let embeddings = LengthModel.embed_many(&texts).await.unwrap();
        assert_eq!(
            embeddings,
            vec![vec![1.0, 1.0], vec![3.0, 1.0], vec![0.0, 1.0]]
        );
        assert_eq!(LengthModel.dimension(), None);
    }
}
