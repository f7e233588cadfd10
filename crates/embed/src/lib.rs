//! WatchFinder embedding models
//!
//! Ollama API client and an offline hashing embedder behind one trait

mod hashing;
mod model;
mod ollama;
mod types;

use std::sync::Arc;
use watchfinder_common::{AppConfig, EmbeddingBackend, Result};

pub use hashing::HashingEmbedder;
pub use model::EmbeddingModel;
pub use ollama::OllamaEmbedder;
pub use types::{BatchEmbedRequest, BatchEmbedResponse};

/// Build the embedding model selected by configuration
pub fn embedder_from_config(config: &AppConfig) -> Result<Arc<dyn EmbeddingModel>> {
    let model: Arc<dyn EmbeddingModel> = match config.embedding_backend {
        EmbeddingBackend::Ollama => Arc::new(OllamaEmbedder::new(
            config.ollama_base_url.clone(),
            config.embedding_model.clone(),
        )?),
        EmbeddingBackend::Hashing => Arc::new(HashingEmbedder::new(config.hashing_dimension)?),
    };
    Ok(model)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedder_from_config_hashing() {
        let mut config = AppConfig::default();
        config.embedding_backend = EmbeddingBackend::Hashing;
        config.hashing_dimension = 96;
        let model = embedder_from_config(&config).unwrap();
        assert_eq!(model.dimension(), Some(96));
        assert_eq!(model.name(), "hashing-96");
    }

    #[test]
    fn test_embedder_from_config_ollama() {
        let config = AppConfig::default();
        let model = embedder_from_config(&config).unwrap();
        assert_eq!(model.name(), "nomic-embed-text");
    }
}
