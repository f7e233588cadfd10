use crate::error::WatchFinderError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Which embedding model implementation backs the retrieval engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingBackend {
    /// Ollama HTTP API
    Ollama,
    /// Deterministic offline feature hashing
    Hashing,
}

impl FromStr for EmbeddingBackend {
    type Err = WatchFinderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "ollama" => Ok(Self::Ollama),
            "hashing" => Ok(Self::Hashing),
            other => Err(WatchFinderError::config(format!(
                "Unknown embedding backend '{}' (expected 'ollama' or 'hashing')",
                other
            ))),
        }
    }
}

/// WatchFinder application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Catalog JSON file the documents are loaded from
    pub catalog_path: PathBuf,

    /// Embedding backend
    pub embedding_backend: EmbeddingBackend,

    /// Ollama API base URL
    pub ollama_base_url: String,

    /// Embedding model name
    pub embedding_model: String,

    /// Output dimension of the hashing embedder
    pub hashing_dimension: usize,

    /// Texts per embedding request
    pub embed_batch_size: usize,

    /// Embedding requests in flight during an index build
    pub embed_concurrency: usize,

    /// Default number of results per query
    pub top_k: usize,

    /// Time budget for embedding a query
    pub query_timeout_secs: u64,

    /// Server bind address
    pub server_host: String,

    /// Server port
    pub server_port: u16,

    /// Log directory
    pub log_dir: PathBuf,

    /// Log level
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            catalog_path: PathBuf::from("./data/catalog.json"),
            embedding_backend: EmbeddingBackend::Ollama,
            ollama_base_url: "http://localhost:11434".to_string(),
            embedding_model: "nomic-embed-text".to_string(),
            hashing_dimension: 384,
            embed_batch_size: 32,
            embed_concurrency: 4,
            top_k: 10,
            query_timeout_secs: 30,
            server_host: "0.0.0.0".to_string(),
            server_port: 8000,
            log_dir: PathBuf::from("./log"),
            log_level: "info".to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables and .env file
    pub fn from_env() -> Result<Self, WatchFinderError> {
        // Load .env file (ignore if not exists)
        let _ = dotenv::dotenv();

        let defaults = Self::default();
        let embedding_backend = match std::env::var("EMBEDDING_BACKEND") {
            Ok(value) => value.parse()?,
            Err(_) => defaults.embedding_backend,
        };

        let config = Self {
            catalog_path: Self::get_env_path("CATALOG_PATH")
                .unwrap_or(defaults.catalog_path),
            embedding_backend,
            ollama_base_url: std::env::var("OLLAMA_BASE_URL")
                .unwrap_or(defaults.ollama_base_url),
            embedding_model: std::env::var("EMBEDDING_MODEL")
                .unwrap_or(defaults.embedding_model),
            hashing_dimension: Self::get_env_parsed("HASHING_DIMENSION")
                .unwrap_or(defaults.hashing_dimension),
            embed_batch_size: Self::get_env_parsed("EMBED_BATCH_SIZE")
                .unwrap_or(defaults.embed_batch_size),
            embed_concurrency: Self::get_env_parsed("EMBED_CONCURRENCY")
                .unwrap_or(defaults.embed_concurrency),
            top_k: Self::get_env_parsed("TOP_K").unwrap_or(defaults.top_k),
            query_timeout_secs: Self::get_env_parsed("QUERY_TIMEOUT_SECS")
                .unwrap_or(defaults.query_timeout_secs),
            server_host: std::env::var("SERVER_HOST")
                .unwrap_or(defaults.server_host),
            server_port: Self::get_env_parsed("SERVER_PORT")
                .unwrap_or(defaults.server_port),
            log_dir: Self::get_env_path("LOG_DIR").unwrap_or(defaults.log_dir),
            log_level: std::env::var("LOG_LEVEL").unwrap_or(defaults.log_level),
        };

        // Ensure required directories exist
        config.ensure_directories()?;

        Ok(config)
    }

    /// Get PathBuf from environment variable
    fn get_env_path(key: &str) -> Option<PathBuf> {
        std::env::var(key).ok().map(PathBuf::from)
    }

    /// Get a parsed value from environment variable, ignoring malformed values
    fn get_env_parsed<T: FromStr>(key: &str) -> Option<T> {
        std::env::var(key).ok().and_then(|s| s.trim().parse().ok())
    }

    /// Ensure required directories exist, create if not
    pub fn ensure_directories(&self) -> Result<(), WatchFinderError> {
        if !self.log_dir.exists() {
            std::fs::create_dir_all(&self.log_dir).map_err(|e| {
                WatchFinderError::config(format!(
                    "Failed to create directory {}: {}",
                    self.log_dir.display(),
                    e
                ))
            })?;
        }

        Ok(())
    }

    /// Get server bind address (host:port)
    pub fn server_bind_address(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }

    /// Query embedding time budget
    pub fn query_timeout(&self) -> Duration {
        Duration::from_secs(self.query_timeout_secs)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), WatchFinderError> {
        if self.embedding_model.trim().is_empty() {
            return Err(WatchFinderError::config("Embedding model name cannot be empty"));
        }

        if self.embedding_backend == EmbeddingBackend::Ollama
            && !self.ollama_base_url.starts_with("http://")
            && !self.ollama_base_url.starts_with("https://")
        {
            return Err(WatchFinderError::config(
                "Ollama base URL must start with http:// or https://",
            ));
        }

        if self.hashing_dimension == 0 {
            return Err(WatchFinderError::config("Hashing dimension must be at least 1"));
        }

        if self.embed_batch_size == 0 {
            return Err(WatchFinderError::config("Embedding batch size must be at least 1"));
        }

        if self.embed_concurrency == 0 {
            return Err(WatchFinderError::config("Embedding concurrency must be at least 1"));
        }

        if self.top_k == 0 {
            return Err(WatchFinderError::config("top_k must be at least 1"));
        }

        if self.query_timeout_secs == 0 {
            return Err(WatchFinderError::config("Query timeout cannot be 0"));
        }

        if self.server_port == 0 {
            return Err(WatchFinderError::config("Server port cannot be 0"));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.server_port, 8000);
        assert_eq!(config.top_k, 10);
        assert_eq!(config.embedding_backend, EmbeddingBackend::Ollama);
        assert_eq!(config.query_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_server_bind_address() {
        let config = AppConfig::default();
        assert_eq!(config.server_bind_address(), "0.0.0.0:8000");
    }

    #[test]
    fn test_backend_parse() {
        assert_eq!("ollama".parse::<EmbeddingBackend>().unwrap(), EmbeddingBackend::Ollama);
        assert_eq!(" Hashing ".parse::<EmbeddingBackend>().unwrap(), EmbeddingBackend::Hashing);
        assert!("faiss".parse::<EmbeddingBackend>().is_err());
    }

    #[test]
    fn test_validate() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());

        let mut invalid_config = AppConfig::default();
        invalid_config.embedding_model = String::new();
        assert!(invalid_config.validate().is_err());

        let mut invalid_config = AppConfig::default();
        invalid_config.top_k = 0;
        assert!(invalid_config.validate().is_err());

        let mut invalid_config = AppConfig::default();
        invalid_config.embed_batch_size = 0;
        assert!(invalid_config.validate().is_err());
    }

    #[test]
    fn test_hashing_backend_ignores_url() {
        let mut config = AppConfig::default();
        config.embedding_backend = EmbeddingBackend::Hashing;
        config.ollama_base_url = "not-a-url".to_string();
        assert!(config.validate().is_ok());
    }
}
