//! In-memory primary store
//!
//! Each table is a map guarded by its own `RwLock`; a write lock is held for
//! the whole of a save or vote so both are atomic per table.

use super::{vote_out_of_range, NotFoundStore, PrimaryStore, RecordStore};
use async_trait::async_trait;
use lyricdb_common::models::{
    LyricRecord, NotFoundRecord, Page, StoredRecord, TranslatedLyricRecord,
};
use lyricdb_common::{Error, Result};
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Records whose vote counter can be adjusted in place
trait Votable: StoredRecord {
    fn vote_mut(&mut self) -> &mut i64;
}

impl Votable for LyricRecord {
    fn vote_mut(&mut self) -> &mut i64 {
        &mut self.vote
    }
}

impl Votable for TranslatedLyricRecord {
    fn vote_mut(&mut self) -> &mut i64 {
        &mut self.vote
    }
}

struct Table<R> {
    rows: RwLock<HashMap<String, R>>,
}

impl<R: Votable> Table<R> {
    fn new() -> Self {
        Self {
            rows: RwLock::new(HashMap::new()),
        }
    }

    async fn get(&self, id: &str) -> Option<R> {
        self.rows.read().await.get(id).cloned()
    }

    async fn select(&self, page: Page, filter: impl Fn(&R) -> bool) -> Vec<R> {
        let rows = self.rows.read().await;
        let mut matching: Vec<R> = rows.values().filter(|r| filter(*r)).cloned().collect();
        // Highest voted first, id as a stable tie breaker
        matching.sort_by(|a, b| b.vote().cmp(&a.vote()).then_with(|| a.id().cmp(b.id())));
        paginate(matching, page)
    }

    async fn by_hash(&self, hash: &str) -> Option<R> {
        self.rows
            .read()
            .await
            .values()
            .find(|r| r.content_hash() == hash)
            .cloned()
    }

    async fn upsert(&self, record: &R) -> Result<R> {
        let mut rows = self.rows.write().await;
        let duplicate = rows
            .values()
            .any(|r| r.content_hash() == record.content_hash() && r.id() != record.id());
        if duplicate {
            return Err(Error::Conflict(format!(
                "{} with content hash {} already exists",
                R::KIND,
                record.content_hash()
            )));
        }
        rows.insert(record.id().to_string(), record.clone());
        Ok(record.clone())
    }

    async fn add_vote(&self, id: &str, delta: i64) -> Result<Option<R>> {
        let mut rows = self.rows.write().await;
        let Some(row) = rows.get_mut(id) else {
            return Ok(None);
        };
        let vote = row.vote_mut();
        *vote = vote
            .checked_add(delta)
            .ok_or_else(|| vote_out_of_range(id, delta))?;
        Ok(Some(row.clone()))
    }
}

fn paginate<R>(rows: Vec<R>, page: Page) -> Vec<R> {
    rows.into_iter()
        .skip(page.offset as usize)
        .take(page.limit as usize)
        .collect()
}

/// Process-local primary store
pub struct MemoryStore {
    lyrics: Table<LyricRecord>,
    translations: Table<TranslatedLyricRecord>,
    not_found: RwLock<HashMap<String, NotFoundRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            lyrics: Table::new(),
            translations: Table::new(),
            not_found: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RecordStore<LyricRecord> for MemoryStore {
    async fn find_by_id(&self, id: &str) -> Result<Option<LyricRecord>> {
        Ok(self.lyrics.get(id).await)
    }

    async fn find_by_video_id(&self, video_id: &str, page: Page) -> Result<Vec<LyricRecord>> {
        Ok(self.lyrics.select(page, |r| r.video_id == video_id).await)
    }

    async fn find_by_content_hash(&self, hash: &str) -> Result<Option<LyricRecord>> {
        Ok(self.lyrics.by_hash(hash).await)
    }

    async fn save(&self, record: &LyricRecord) -> Result<LyricRecord> {
        self.lyrics.upsert(record).await
    }

    async fn update_vote(&self, id: &str, delta: i64) -> Result<Option<LyricRecord>> {
        self.lyrics.add_vote(id, delta).await
    }
}

#[async_trait]
impl RecordStore<TranslatedLyricRecord> for MemoryStore {
    async fn find_by_id(&self, id: &str) -> Result<Option<TranslatedLyricRecord>> {
        Ok(self.translations.get(id).await)
    }

    async fn find_by_video_id(
        &self,
        video_id: &str,
        page: Page,
    ) -> Result<Vec<TranslatedLyricRecord>> {
        Ok(self.translations.select(page, |r| r.video_id == video_id).await)
    }

    async fn find_by_content_hash(&self, hash: &str) -> Result<Option<TranslatedLyricRecord>> {
        Ok(self.translations.by_hash(hash).await)
    }

    async fn save(&self, record: &TranslatedLyricRecord) -> Result<TranslatedLyricRecord> {
        self.translations.upsert(record).await
    }

    async fn update_vote(&self, id: &str, delta: i64) -> Result<Option<TranslatedLyricRecord>> {
        self.translations.add_vote(id, delta).await
    }
}

#[async_trait]
impl NotFoundStore for MemoryStore {
    async fn find_not_found(&self, video_id: &str) -> Result<Option<NotFoundRecord>> {
        Ok(self.not_found.read().await.get(video_id).cloned())
    }

    async fn insert_not_found(&self, record: &NotFoundRecord) -> Result<()> {
        self.not_found
            .write()
            .await
            .entry(record.video_id.clone())
            .or_insert_with(|| record.clone());
        Ok(())
    }

    async fn delete_by_video_id(&self, video_id: &str) -> Result<bool> {
        Ok(self.not_found.write().await.remove(video_id).is_some())
    }
}

#[async_trait]
impl PrimaryStore for MemoryStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn scan_lyrics(&self, page: Page) -> Result<Vec<LyricRecord>> {
        let rows = self.lyrics.rows.read().await;
        let mut all: Vec<LyricRecord> = rows.values().cloned().collect();
        all.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(paginate(all, page))
    }

    async fn find_translations(
        &self,
        video_id: &str,
        language: Option<&str>,
        page: Page,
    ) -> Result<Vec<TranslatedLyricRecord>> {
        Ok(self
            .translations
            .select(page, |r| {
                r.video_id == video_id && language.map_or(true, |lang| r.language == lang)
            })
            .await)
    }
}
