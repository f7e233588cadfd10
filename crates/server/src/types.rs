use serde::{Deserialize, Serialize};
use watchfinder_vector::{IndexStats, RetrievedDocument};

/// Ask request
#[derive(Debug, Deserialize)]
pub struct AskRequest {
    /// Free-text question
    pub query: String,

    /// Results wanted; server default when absent
    #[serde(default)]
    pub top_k: Option<usize>,
}

/// Ask response
#[derive(Debug, Serialize)]
pub struct AskResponse {
    pub query: String,

    /// Document texts, best first, without duplicates
    pub retrieved_documents: Vec<String>,

    /// Same documents with ids and scores
    pub results: Vec<RetrievedDocument>,
}

/// Refresh response
#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    pub success: bool,

    #[serde(flatten)]
    pub stats: IndexStats,
}

/// Stats response
#[derive(Debug, Serialize)]
pub struct StatsResponse {
    #[serde(flatten)]
    pub stats: IndexStats,

    pub embedding_model: String,

    pub top_k: usize,
}

/// Error body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}
