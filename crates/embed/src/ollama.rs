use async_trait::async_trait;
use reqwest::Client;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, info, warn};
use watchfinder_common::{Result, WatchFinderError};

use crate::model::EmbeddingModel;
use crate::types::{BatchEmbedRequest, BatchEmbedResponse};

const DEFAULT_MAX_RETRIES: u32 = 3;

/// Ollama embedding client
#[derive(Debug, Clone)]
pub struct OllamaEmbedder {
    base_url: String,
    model: String,
    client: Client,
    max_retries: u32,
}

impl OllamaEmbedder {
    /// Create new Ollama embedding client
    pub fn new(base_url: impl Into<String>, model: impl Into<String>) -> Result<Self> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let model = model.into();

        if model.trim().is_empty() {
            return Err(WatchFinderError::config("Embedding model name cannot be empty"));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to create HTTP client: {}", e))?;

        info!("Ollama embedder initialized: {} (model={})", base_url, model);
        Ok(Self {
            base_url,
            model,
            client,
            max_retries: DEFAULT_MAX_RETRIES,
        })
    }

    /// Override the number of attempts per request
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries.max(1);
        self
    }

    /// Test connection to Ollama
    pub async fn test_connection(&self) -> Result<bool> {
        let url = format!("{}/api/tags", self.base_url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| WatchFinderError::network(format!("Failed to connect to Ollama: {}", e)))?;
        Ok(response.status().is_success())
    }

    /// Run `op` up to `max_retries` times with exponential backoff
    async fn with_retry<T, F, Fut>(&self, what: &str, mut op: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut last_error = None;

        for attempt in 1..=self.max_retries {
            match op().await {
                Ok(value) => return Ok(value),
                Err(e) => {
                    if attempt < self.max_retries {
                        let delay = Duration::from_secs(2u64.pow(attempt - 1));
                        warn!(
                            "{} failed (attempt {}/{}): {}. Retrying in {:?}...",
                            what, attempt, self.max_retries, e, delay
                        );
                        tokio::time::sleep(delay).await;
                    }
                    last_error = Some(e);
                }
            }
        }

        Err(last_error
            .unwrap_or_else(|| WatchFinderError::embedding(format!("{}: all retries failed", what))))
    }

    /// Single attempt against `/api/embed`
    async fn try_embed_batch(&self, request: &BatchEmbedRequest) -> Result<Vec<Vec<f32>>> {
        let url = format!("{}/api/embed", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|e| WatchFinderError::embedding(format!("Failed to send batch embedding request: {}", e)))?
            .error_for_status()
            .map_err(|e| WatchFinderError::embedding(format!("Ollama embed API error: {}", e)))?;

        let result: BatchEmbedResponse = response.json().await.map_err(|e| {
            WatchFinderError::embedding(format!("Failed to parse batch embedding response: {}", e))
        })?;

        if result.embeddings.len() != request.input.len() {
            return Err(WatchFinderError::embedding(format!(
                "Ollama returned {} embeddings for {} inputs",
                result.embeddings.len(),
                request.input.len()
            )));
        }

        if result.embeddings.iter().any(|e| e.is_empty()) {
            return Err(WatchFinderError::embedding("Empty embedding in Ollama batch response"));
        }

        Ok(result.embeddings)
    }
}

#[async_trait]
impl EmbeddingModel for OllamaEmbedder {
    fn name(&self) -> &str {
        &self.model
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        debug!("Generating embedding - Model: {}, Text length: {}", self.model, text.len());

        // Same endpoint as documents so queries and documents embed alike
        let request = BatchEmbedRequest {
            model: self.model.clone(),
            input: vec![text.to_string()],
        };

        let request = &request;
        let embedding = self
            .with_retry("Embedding request", move || self.try_embed_batch(request))
            .await?
            .pop()
            .ok_or_else(|| WatchFinderError::embedding("Empty embedding from Ollama"))?;
        debug!("Received embedding - Dimension: {}", embedding.len());
        Ok(embedding)
    }

    async fn embed_many(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        debug!("Generating {} embeddings - Model: {}", texts.len(), self.model);

        let request = BatchEmbedRequest {
            model: self.model.clone(),
            input: texts.to_vec(),
        };

        let request = &request;
        self.with_retry("Batch embedding request", move || self.try_embed_batch(request))
            .await
    }
}
