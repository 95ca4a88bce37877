//! Primary store contracts and adapters
//!
//! The primary store is the source of truth for lyric, translation and
//! not-found records. Adapters are interchangeable and selected by
//! configuration; nothing above this module depends on which one is in use.
//!
//! # Adapters
//! - **sqlite** - [`SqliteStore`], sqlx over an on-disk or in-memory database
//! - **memory** - [`MemoryStore`], process-local maps for tests and ephemeral runs
//!
//! Both adapters enforce content-hash uniqueness themselves (reported as
//! [`Error::Conflict`](lyricdb_common::Error::Conflict)) and apply vote deltas
//! atomically.

pub mod memory;
pub mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use async_trait::async_trait;
use lyricdb_common::config::{StoreBackend, TomlConfig};
use lyricdb_common::db;
use lyricdb_common::models::{
    LyricRecord, NotFoundRecord, Page, StoredRecord, TranslatedLyricRecord,
};
use lyricdb_common::{Error, Result};
use std::sync::Arc;
use tracing::info;

/// CRUD and lookup operations for one record type
#[async_trait]
pub trait RecordStore<R: StoredRecord>: Send + Sync {
    async fn find_by_id(&self, id: &str) -> Result<Option<R>>;

    async fn find_by_video_id(&self, video_id: &str, page: Page) -> Result<Vec<R>>;

    async fn find_by_content_hash(&self, hash: &str) -> Result<Option<R>>;

    /// Create or replace by id.
    ///
    /// Fails with `Conflict` when a different record already holds the same
    /// content hash.
    async fn save(&self, record: &R) -> Result<R>;

    /// Add `delta` to the vote counter in one atomic step.
    ///
    /// Returns the updated record, or `None` when no record has this id.
    /// Fails with `InvalidInput` when the new count would leave the `i64`
    /// range; the stored count is then unchanged.
    async fn update_vote(&self, id: &str, delta: i64) -> Result<Option<R>>;
}

/// Derived "no lyrics for this video" entries
#[async_trait]
pub trait NotFoundStore: Send + Sync {
    async fn find_not_found(&self, video_id: &str) -> Result<Option<NotFoundRecord>>;

    /// Insert, keeping an existing entry for the same video untouched
    async fn insert_not_found(&self, record: &NotFoundRecord) -> Result<()>;

    /// Remove the entry for `video_id`; `false` when there was none
    async fn delete_by_video_id(&self, video_id: &str) -> Result<bool>;
}

/// Everything the orchestration layer needs from the source of truth
#[async_trait]
pub trait PrimaryStore:
    RecordStore<LyricRecord> + RecordStore<TranslatedLyricRecord> + NotFoundStore
{
    /// Adapter name for logs
    fn backend(&self) -> &'static str;

    /// Lyrics in stable id order, one page at a time
    async fn scan_lyrics(&self, page: Page) -> Result<Vec<LyricRecord>>;

    /// Translations for a video, optionally restricted to one language
    async fn find_translations(
        &self,
        video_id: &str,
        language: Option<&str>,
        page: Page,
    ) -> Result<Vec<TranslatedLyricRecord>>;
}

fn vote_out_of_range(id: &str, delta: i64) -> Error {
    Error::InvalidInput(format!("vote change {} on {} is out of range", delta, id))
}

/// Build the primary store selected in configuration
pub async fn open_store(config: &TomlConfig) -> Result<Arc<dyn PrimaryStore>> {
    match config.store.backend {
        StoreBackend::Sqlite => {
            let path = config.store_database_path();
            let pool = db::open_database(&path, config.store.max_connections).await?;
            let store = SqliteStore::new(pool).await?;
            info!("Primary store: sqlite at {}", path.display());
            Ok(Arc::new(store))
        }
        StoreBackend::Memory => {
            info!("Primary store: in-memory (data is not persisted)");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}
