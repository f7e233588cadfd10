//! WatchFinder catalog
//!
//! Catalog items, their rendered text documents, and document sources

mod item;
mod source;

pub use item::{render_document, CatalogItem};
pub use source::{Document, DocumentSource, InMemorySource, JsonCatalogSource};
