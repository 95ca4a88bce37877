//! Primary store double
//!
//! Wraps [`MemoryStore`], counts the calls the orchestration tests assert on,
//! fails selected calls on demand and slows selected calls down.

use async_trait::async_trait;
use lyricdb_common::models::{LyricRecord, NotFoundRecord, Page, TranslatedLyricRecord};
use lyricdb_common::{Error, Result};
use lyricdb_core::store::{MemoryStore, NotFoundStore, PrimaryStore, RecordStore};
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

#[derive(Default)]
pub struct CountingStore {
    inner: MemoryStore,

    pub saves: AtomicUsize,
    pub hash_lookups: AtomicUsize,
    pub not_found_inserts: AtomicUsize,
    pub not_found_deletes: AtomicUsize,

    failing_ids: Mutex<HashSet<String>>,
    pub fail_hash_lookup: AtomicBool,
    pub fail_video_lookup: AtomicBool,
    pub fail_not_found_writes: AtomicBool,

    /// Delays in milliseconds, zero for none
    pub find_by_id_delay_ms: AtomicU64,
    pub not_found_insert_delay_ms: AtomicU64,
    pub not_found_delete_delay_ms: AtomicU64,
    /// Lyric `find_by_id` calls that ran to the end
    pub find_by_id_completed: AtomicUsize,
}

impl CountingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `find_by_id` fail for `id`
    pub fn fail_find_by_id(&self, id: &str) {
        self.failing_ids.lock().unwrap().insert(id.to_string());
    }

    pub fn count(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }

    async fn pause(delay_ms: &AtomicU64) {
        let ms = delay_ms.load(Ordering::SeqCst);
        if ms > 0 {
            tokio::time::sleep(Duration::from_millis(ms)).await;
        }
    }

    fn injected(what: &str) -> Error {
        Error::Internal(format!("injected failure: {}", what))
    }
}

#[async_trait]
impl RecordStore<LyricRecord> for CountingStore {
    async fn find_by_id(&self, id: &str) -> Result<Option<LyricRecord>> {
        Self::pause(&self.find_by_id_delay_ms).await;
        if self.failing_ids.lock().unwrap().contains(id) {
            return Err(Self::injected("find_by_id"));
        }
        let found = RecordStore::<LyricRecord>::find_by_id(&self.inner, id).await;
        self.find_by_id_completed.fetch_add(1, Ordering::SeqCst);
        found
    }

    async fn find_by_video_id(&self, video_id: &str, page: Page) -> Result<Vec<LyricRecord>> {
        if self.fail_video_lookup.load(Ordering::SeqCst) {
            return Err(Self::injected("find_by_video_id"));
        }
        RecordStore::<LyricRecord>::find_by_video_id(&self.inner, video_id, page).await
    }

    async fn find_by_content_hash(&self, hash: &str) -> Result<Option<LyricRecord>> {
        self.hash_lookups.fetch_add(1, Ordering::SeqCst);
        if self.fail_hash_lookup.load(Ordering::SeqCst) {
            return Err(Self::injected("find_by_content_hash"));
        }
        RecordStore::<LyricRecord>::find_by_content_hash(&self.inner, hash).await
    }

    async fn save(&self, record: &LyricRecord) -> Result<LyricRecord> {
        self.saves.fetch_add(1, Ordering::SeqCst);
        RecordStore::<LyricRecord>::save(&self.inner, record).await
    }

    async fn update_vote(&self, id: &str, delta: i64) -> Result<Option<LyricRecord>> {
        RecordStore::<LyricRecord>::update_vote(&self.inner, id, delta).await
    }
}

#[async_trait]
impl RecordStore<TranslatedLyricRecord> for CountingStore {
    async fn find_by_id(&self, id: &str) -> Result<Option<TranslatedLyricRecord>> {
        RecordStore::<TranslatedLyricRecord>::find_by_id(&self.inner, id).await
    }

    async fn find_by_video_id(
        &self,
        video_id: &str,
        page: Page,
    ) -> Result<Vec<TranslatedLyricRecord>> {
        RecordStore::<TranslatedLyricRecord>::find_by_video_id(&self.inner, video_id, page).await
    }

    async fn find_by_content_hash(&self, hash: &str) -> Result<Option<TranslatedLyricRecord>> {
        self.hash_lookups.fetch_add(1, Ordering::SeqCst);
        RecordStore::<TranslatedLyricRecord>::find_by_content_hash(&self.inner, hash).await
    }

    async fn save(&self, record: &TranslatedLyricRecord) -> Result<TranslatedLyricRecord> {
        self.saves.fetch_add(1, Ordering::SeqCst);
        RecordStore::<TranslatedLyricRecord>::save(&self.inner, record).await
    }

    async fn update_vote(&self, id: &str, delta: i64) -> Result<Option<TranslatedLyricRecord>> {
        RecordStore::<TranslatedLyricRecord>::update_vote(&self.inner, id, delta).await
    }
}

#[async_trait]
impl NotFoundStore for CountingStore {
    async fn find_not_found(&self, video_id: &str) -> Result<Option<NotFoundRecord>> {
        self.inner.find_not_found(video_id).await
    }

    async fn insert_not_found(&self, record: &NotFoundRecord) -> Result<()> {
        self.not_found_inserts.fetch_add(1, Ordering::SeqCst);
        Self::pause(&self.not_found_insert_delay_ms).await;
        if self.fail_not_found_writes.load(Ordering::SeqCst) {
            return Err(Self::injected("insert_not_found"));
        }
        self.inner.insert_not_found(record).await
    }

    async fn delete_by_video_id(&self, video_id: &str) -> Result<bool> {
        self.not_found_deletes.fetch_add(1, Ordering::SeqCst);
        Self::pause(&self.not_found_delete_delay_ms).await;
        if self.fail_not_found_writes.load(Ordering::SeqCst) {
            return Err(Self::injected("delete_by_video_id"));
        }
        self.inner.delete_by_video_id(video_id).await
    }
}

#[async_trait]
impl PrimaryStore for CountingStore {
    fn backend(&self) -> &'static str {
        "counting"
    }

    async fn scan_lyrics(&self, page: Page) -> Result<Vec<LyricRecord>> {
        self.inner.scan_lyrics(page).await
    }

    async fn find_translations(
        &self,
        video_id: &str,
        language: Option<&str>,
        page: Page,
    ) -> Result<Vec<TranslatedLyricRecord>> {
        self.inner.find_translations(video_id, language, page).await
    }
}
