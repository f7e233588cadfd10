use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::PathBuf;
use tracing::{debug, info};
use watchfinder_common::{Result, WatchFinderError};

use crate::item::{render_document, CatalogItem};

/// A rendered catalog document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// Stable external identifier (catalog row id)
    pub id: i64,

    /// Text that gets embedded
    pub text: String,
}

impl Document {
    pub fn new(id: i64, text: impl Into<String>) -> Self {
        Self { id, text: text.into() }
    }

    /// Render a catalog item into a document
    pub fn from_item(item: &CatalogItem) -> Self {
        Self {
            id: item.id,
            text: render_document(item),
        }
    }
}

/// Supplier of the ordered document set
///
/// Two calls must return the same order unless the catalog itself changed.
#[async_trait]
pub trait DocumentSource: Send + Sync {
    async fn list_documents(&self) -> Result<Vec<Document>>;
}

/// Catalog stored as a JSON array of [`CatalogItem`]s
///
/// Documents are returned sorted by `id`, whatever the file order.
#[derive(Debug, Clone)]
pub struct JsonCatalogSource {
    path: PathBuf,
}

impl JsonCatalogSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }

    /// Load and validate the raw catalog items
    pub async fn load_items(&self) -> Result<Vec<CatalogItem>> {
        let data = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            WatchFinderError::catalog(format!(
                "Failed to read catalog {}: {}",
                self.path.display(),
                e
            ))
        })?;

        let mut items: Vec<CatalogItem> = serde_json::from_str(&data).map_err(|e| {
            WatchFinderError::catalog(format!(
                "Failed to parse catalog {}: {}",
                self.path.display(),
                e
            ))
        })?;

        let mut seen = HashSet::with_capacity(items.len());
        for item in &items {
            if !seen.insert(item.id) {
                return Err(WatchFinderError::catalog(format!(
                    "Duplicate catalog id {} in {}",
                    item.id,
                    self.path.display()
                )));
            }
        }

        items.sort_by_key(|item| item.id);
        debug!("Loaded {} catalog items from {}", items.len(), self.path.display());
        Ok(items)
    }
}

#[async_trait]
impl DocumentSource for JsonCatalogSource {
    async fn list_documents(&self) -> Result<Vec<Document>> {
        let items = self.load_items().await?;
        let documents: Vec<Document> = items.iter().map(Document::from_item).collect();
        info!(
            "Catalog rendered - {} documents from {}",
            documents.len(),
            self.path.display()
        );
        Ok(documents)
    }
}

/// Fixed, in-memory document list returned in the given order
#[derive(Debug, Clone, Default)]
pub struct InMemorySource {
    documents: Vec<Document>,
}

impl InMemorySource {
    pub fn new(documents: Vec<Document>) -> Self {
        Self { documents }
    }

    /// Documents with ids `0..n` from plain texts
    pub fn from_texts<I, S>(texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let documents = texts
            .into_iter()
            .enumerate()
            .map(|(i, text)| Document::new(i as i64, text))
            .collect();
        Self { documents }
    }
}

#[async_trait]
impl DocumentSource for InMemorySource {
    async fn list_documents(&self) -> Result<Vec<Document>> {
        Ok(self.documents.clone())
    }
}
