use serde::Serialize;
use std::time::Duration;
use watchfinder_common::AppConfig;

/// One scored index position
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Hit {
    /// Position in the document sequence
    pub position: usize,

    /// Cosine similarity in [-1, 1]
    pub score: f32,
}

/// Document returned by the retrieval service
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RetrievedDocument {
    /// Catalog row id
    pub id: i64,

    /// Position in the document sequence
    pub position: usize,

    /// Cosine similarity in [-1, 1]
    pub score: f32,

    /// Rendered document text
    pub text: String,
}

/// How an embedding store is built
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildOptions {
    /// Texts per `embed_many` call
    pub batch_size: usize,

    /// Batches in flight at once
    pub concurrency: usize,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            batch_size: 32,
            concurrency: 4,
        }
    }
}

impl BuildOptions {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            batch_size: config.embed_batch_size.max(1),
            concurrency: config.embed_concurrency.max(1),
        }
    }
}

/// Retrieval service settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServiceOptions {
    /// Results per query when the caller does not say
    pub top_k: usize,

    /// Budget for the query embedding call
    pub query_timeout: Duration,

    /// Store build settings used on refresh
    pub build: BuildOptions,
}

impl Default for ServiceOptions {
    fn default() -> Self {
        Self {
            top_k: 10,
            query_timeout: Duration::from_secs(30),
            build: BuildOptions::default(),
        }
    }
}

impl ServiceOptions {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            top_k: config.top_k.max(1),
            query_timeout: config.query_timeout(),
            build: BuildOptions::from_config(config),
        }
    }
}

/// Summary of an active snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndexStats {
    /// Documents in the snapshot
    pub documents: usize,

    /// Vectors searchable in the index
    pub indexed: usize,

    /// Documents whose embedding had zero length
    pub degenerate: usize,

    /// Embedding dimensionality (0 for an empty catalog of unknown dimension)
    pub dimension: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_options_from_config() {
        let mut config = AppConfig::default();
        config.embed_batch_size = 8;
        config.embed_concurrency = 2;
        config.top_k = 5;
        config.query_timeout_secs = 3;

        let options = ServiceOptions::from_config(&config);
        assert_eq!(options.top_k, 5);
        assert_eq!(options.query_timeout, Duration::from_secs(3));
        assert_eq!(
            options.build,
            BuildOptions {
                batch_size: 8,
                concurrency: 2
            }
        );
    }
}
