//! WatchFinder Vector Search Engine
//!
//! Exact cosine-similarity retrieval over catalog document embeddings:
//! normalization, the embedding store, a flat index and the retrieval
//! service that ties them to an embedding model.

pub mod index;
pub mod normalize;
pub mod service;
pub mod store;
pub mod types;

pub use index::FlatIndex;
pub use normalize::{ensure_finite, l2_norm, normalize, normalize_batch, Normalized};
pub use service::{dedup_by_text, RetrievalService, Snapshot};
pub use store::EmbeddingStore;
pub use types::{BuildOptions, Hit, IndexStats, RetrievedDocument, ServiceOptions};
