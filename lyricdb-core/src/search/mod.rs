//! Search index contract and adapters
//!
//! The index holds [`SearchDocument`] projections only. It is never
//! authoritative: hits are ids that the caller hydrates from the primary
//! store, and the whole index can be rebuilt from the store at any time.

pub mod memory;
pub mod sqlite;
pub mod tokenizer;

pub use memory::MemorySearchIndex;
pub use sqlite::SqliteSearchIndex;

use async_trait::async_trait;
use lyricdb_common::config::{SearchBackend, TomlConfig};
use lyricdb_common::db;
use lyricdb_common::models::{Page, SearchDocument};
use lyricdb_common::Result;
use std::sync::Arc;
use tracing::info;

#[async_trait]
pub trait SearchIndex: Send + Sync {
    /// Insert or replace the document with the same id; returns the id
    async fn index_document(&self, doc: &SearchDocument) -> Result<String>;

    /// Ids of matching documents, best match first
    async fn search(&self, query: &str, page: Page) -> Result<Vec<String>>;

    /// Remove a document; returns the id whether or not it was present
    async fn delete_document(&self, id: &str) -> Result<String>;
}

/// Build the search index selected in configuration
pub async fn open_index(config: &TomlConfig) -> Result<Arc<dyn SearchIndex>> {
    match config.search.backend {
        SearchBackend::Sqlite => {
            let path = config.search_database_path();
            let pool = db::open_database(&path, config.search.max_connections).await?;
            let index = SqliteSearchIndex::new(pool).await?;
            info!("Search index: sqlite fts5 at {}", path.display());
            Ok(Arc::new(index))
        }
        SearchBackend::Memory => {
            info!("Search index: in-memory");
            Ok(Arc::new(MemorySearchIndex::new()))
        }
    }
}
