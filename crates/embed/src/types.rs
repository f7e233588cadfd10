use serde::{Deserialize, Serialize};

/// Ollama batch embedding request (`/api/embed`)
#[derive(Debug, Clone, Serialize)]
pub struct BatchEmbedRequest {
    /// Model name
    pub model: String,

    /// Texts to embed, in order
    pub input: Vec<String>,
}

/// Ollama batch embedding response
#[derive(Debug, Clone, Deserialize)]
pub struct BatchEmbedResponse {
    /// One embedding per input, in input order
    #[serde(default)]
    pub embeddings: Vec<Vec<f32>>,
}
