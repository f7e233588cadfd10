use std::sync::Arc;
use watchfinder_catalog::DocumentSource;
use watchfinder_common::AppConfig;
use watchfinder_vector::RetrievalService;

/// Shared application state
pub struct AppState {
    /// Application configuration
    pub config: AppConfig,

    /// Retrieval engine over the active catalog snapshot
    pub retrieval: Arc<RetrievalService>,

    /// Where `/refresh` reloads documents from
    pub source: Arc<dyn DocumentSource>,
}

impl AppState {
    /// Create new application state
    pub fn new(
        config: AppConfig,
        retrieval: Arc<RetrievalService>,
        source: Arc<dyn DocumentSource>,
    ) -> Self {
        Self {
            config,
            retrieval,
            source,
        }
    }
}
