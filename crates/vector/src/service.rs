use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info};
use watchfinder_catalog::{Document, DocumentSource};
use watchfinder_common::{Result, WatchFinderError};
use watchfinder_embed::EmbeddingModel;

use crate::index::FlatIndex;
use crate::store::EmbeddingStore;
use crate::types::{BuildOptions, IndexStats, RetrievedDocument, ServiceOptions};

/// Documents, their embeddings and the index built over them
///
/// The three share one lifetime; a refresh builds a whole new snapshot.
#[derive(Debug)]
pub struct Snapshot {
    documents: Vec<Document>,
    store: EmbeddingStore,
    index: FlatIndex,
}

impl Snapshot {
    /// Embed `documents` and index them
    pub async fn build(
        model: &dyn EmbeddingModel,
        documents: Vec<Document>,
        options: &BuildOptions,
    ) -> Result<Self> {
        let store = EmbeddingStore::build(model, &documents, options).await?;
        let index = FlatIndex::build(&store)?;

        if store.len() != documents.len() {
            return Err(WatchFinderError::internal(format!(
                "store holds {} vectors for {} documents",
                store.len(),
                documents.len()
            )));
        }

        Ok(Self {
            documents,
            store,
            index,
        })
    }

    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    pub fn document(&self, position: usize) -> Option<&Document> {
        self.documents.get(position)
    }

    pub fn store(&self) -> &EmbeddingStore {
        &self.store
    }

    pub fn index(&self) -> &FlatIndex {
        &self.index
    }

    pub fn stats(&self) -> IndexStats {
        IndexStats {
            documents: self.documents.len(),
            indexed: self.index.len(),
            degenerate: self.store.degenerate_count(),
            dimension: self.store.dimension(),
        }
    }
}

/// Semantic search over the catalog
///
/// Queries run against the snapshot active when they start. `refresh`
/// builds a replacement off to the side and swaps it in with one write.
/// Refreshes run one at a time, in the order they were requested.
pub struct RetrievalService {
    model: Arc<dyn EmbeddingModel>,
    active: RwLock<Arc<Snapshot>>,
    refresh_lock: Mutex<()>,
    options: ServiceOptions,
}

impl RetrievalService {
    /// Build the initial snapshot from `source`
    pub async fn new(
        model: Arc<dyn EmbeddingModel>,
        source: &dyn DocumentSource,
        options: ServiceOptions,
    ) -> Result<Self> {
        let documents = source.list_documents().await?;
        let snapshot = Snapshot::build(model.as_ref(), documents, &options.build).await?;
        log_snapshot("Retrieval index built", &snapshot);
        Ok(Self::with_snapshot(model, snapshot, options))
    }

    /// Wrap an already-built snapshot
    pub fn with_snapshot(
        model: Arc<dyn EmbeddingModel>,
        snapshot: Snapshot,
        options: ServiceOptions,
    ) -> Self {
        Self {
            model,
            active: RwLock::new(Arc::new(snapshot)),
            refresh_lock: Mutex::new(()),
            options,
        }
    }

    /// The snapshot queries currently run against
    pub async fn snapshot(&self) -> Arc<Snapshot> {
        self.active.read().await.clone()
    }

    /// Rebuild from `source` and replace the active snapshot
    ///
    /// On failure the active snapshot is left as it was.
    pub async fn refresh(&self, source: &dyn DocumentSource) -> Result<IndexStats> {
        // Held from listing to swap so an older catalog never replaces a newer one
        let _guard = self.refresh_lock.lock().await;

        let documents = source.list_documents().await?;
        let snapshot = Snapshot::build(self.model.as_ref(), documents, &self.options.build).await?;
        log_snapshot("Retrieval index rebuilt", &snapshot);

        let stats = snapshot.stats();
        *self.active.write().await = Arc::new(snapshot);
        Ok(stats)
    }

    /// Ranked, de-duplicated documents for `query`
    pub async fn ask(&self, query: &str, top_k: usize) -> Result<Vec<RetrievedDocument>> {
        if top_k == 0 {
            return Err(WatchFinderError::invalid_input("top_k must be at least 1"));
        }

        let embedding = tokio::time::timeout(self.options.query_timeout, self.model.embed(query))
            .await
            .map_err(|_| {
                WatchFinderError::embedding(format!(
                    "query embedding timed out after {:?}",
                    self.options.query_timeout
                ))
            })??;

        let snapshot = self.snapshot().await;
        let hits = snapshot.index().search(&embedding, top_k)?;
        debug!("Index returned {} hits for top_k={}", hits.len(), top_k);

        let mut ranked = Vec::with_capacity(hits.len());
        for hit in hits {
            let document = snapshot.document(hit.position).ok_or_else(|| {
                WatchFinderError::internal(format!("index position {} has no document", hit.position))
            })?;
            ranked.push(RetrievedDocument {
                id: document.id,
                position: hit.position,
                score: hit.score,
                text: document.text.clone(),
            });
        }

        let results = dedup_by_text(ranked);
        info!("Query answered - {} documents (top_k={})", results.len(), top_k);
        Ok(results)
    }

    /// `ask` with the configured `top_k`
    pub async fn ask_default(&self, query: &str) -> Result<Vec<RetrievedDocument>> {
        self.ask(query, self.options.top_k).await
    }

    pub async fn stats(&self) -> IndexStats {
        self.snapshot().await.stats()
    }

    pub fn default_top_k(&self) -> usize {
        self.options.top_k
    }

    pub fn model_name(&self) -> &str {
        self.model.name()
    }
}

fn log_snapshot(what: &str, snapshot: &Snapshot) {
    let stats = snapshot.stats();
    info!(
        "{} - {} documents, {} indexed, {} degenerate, dimension {}",
        what, stats.documents, stats.indexed, stats.degenerate, stats.dimension
    );
}

/// Drop documents whose text already appeared at a better rank
pub fn dedup_by_text(documents: Vec<RetrievedDocument>) -> Vec<RetrievedDocument> {
    let mut seen = HashSet::with_capacity(documents.len());
    documents
        .into_iter()
        .filter(|doc| seen.insert(doc.text.clone()))
        .collect()
}
