//! Lyric orchestration service
//!
//! **Use cases:** fetch by video, fetch by id, save with de-duplication,
//! search with hydration, vote, plus the translation and reindex variants.
//!
//! # Flow
//! Each use case answers with an [`EnvelopeStream`]: one `InProgress`, then a
//! single terminal `Success` or `Error`. Stages run strictly in order
//! (validate → guard → store → side effects) and the first error ends the
//! chain with that error.
//!
//! # Side effects
//! Not-found cache updates and search-index writes are best-effort. They are
//! spawned on a task tracker owned by the service, so they outlive the
//! request that triggered them (dropping the stream does not abort a write
//! already in flight) and their failures are only logged. A save waits for
//! its not-found clear before answering; the index write and the miss
//! recorded by a fetch are not awaited. Until they finish, the not-found
//! cache and the search index may disagree with the primary store;
//! [`LyricService::settle`] waits for them.

use super::{DeduplicationGuard, NotFoundTracker, VoteMutator};
use crate::search::{self, SearchIndex};
use crate::store::{self, PrimaryStore, RecordStore};
use futures::stream::{self, StreamExt};
use lyricdb_common::config::{ServiceConfig, TomlConfig};
use lyricdb_common::envelope::{pipeline, EnvelopeStream};
use lyricdb_common::models::{
    LyricRecord, NewLyric, NewTranslation, Page, TranslatedLyricRecord,
};
use lyricdb_common::{Error, Result};
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio_util::task::TaskTracker;
use tracing::{debug, info, warn};

/// Page size used when rebuilding the search index
const REINDEX_BATCH: u32 = 200;

struct Inner {
    store: Arc<dyn PrimaryStore>,
    index: Arc<dyn SearchIndex>,
    guard: DeduplicationGuard<dyn PrimaryStore>,
    tracker: NotFoundTracker<dyn PrimaryStore>,
    votes: VoteMutator<dyn PrimaryStore>,
    config: ServiceConfig,
    background: TaskTracker,
    accepting: AtomicBool,
}

/// Entry point for every lyric use case. Cheap to clone.
#[derive(Clone)]
pub struct LyricService {
    inner: Arc<Inner>,
}

impl LyricService {
    pub fn new(
        store: Arc<dyn PrimaryStore>,
        index: Arc<dyn SearchIndex>,
        config: ServiceConfig,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                guard: DeduplicationGuard::new(Arc::clone(&store)),
                tracker: NotFoundTracker::new(Arc::clone(&store)),
                votes: VoteMutator::new(Arc::clone(&store)),
                store,
                index,
                config,
                background: TaskTracker::new(),
                accepting: AtomicBool::new(true),
            }),
        }
    }

    /// Open the configured store and index adapters
    pub async fn from_config(config: &TomlConfig) -> Result<Self> {
        let store = store::open_store(config).await?;
        let index = search::open_index(config).await?;
        info!(
            backend = store.backend(),
            hydration_concurrency = config.service.hydration_concurrency,
            "Lyric service ready"
        );
        Ok(Self::new(store, index, config.service.clone()))
    }

    pub fn store(&self) -> &Arc<dyn PrimaryStore> {
        &self.inner.store
    }

    pub fn index(&self) -> &Arc<dyn SearchIndex> {
        &self.inner.index
    }

    // ------------------------------------------------------------------
    // Lyrics
    // ------------------------------------------------------------------

    /// Lyrics for a video.
    ///
    /// An empty result is a `Success`, and records a not-found entry in the
    /// background. A store failure is a `ServerError`.
    pub fn fetch_by_video_id(&self, video_id: &str) -> EnvelopeStream<Vec<LyricRecord>> {
        let service = self.clone();
        let video_id = video_id.to_string();
        pipeline(async move { service.run_fetch_by_video_id(video_id).await })
    }

    /// One lyric by id; `NotFound` when absent
    pub fn fetch_by_id(&self, id: &str) -> EnvelopeStream<LyricRecord> {
        let service = self.clone();
        let id = id.to_string();
        pipeline(async move {
            RecordStore::<LyricRecord>::find_by_id(service.inner.store.as_ref(), &id)
                .await?
                .ok_or_else(|| Error::NotFound(format!("lyric {}", id)))
        })
    }

    /// Validate, de-duplicate and store a lyric submission.
    ///
    /// On success the not-found entry for the video is cleared before the
    /// stream answers and the search document is indexed in the background.
    /// On any error neither side effect runs.
    pub fn save(&self, submission: NewLyric) -> EnvelopeStream<LyricRecord> {
        let service = self.clone();
        pipeline(async move { service.run_save(submission).await })
    }

    /// Full-text search over title, artist and album.
    ///
    /// Hits whose record cannot be loaded are dropped rather than failing the
    /// whole search; an empty hydrated result is `NotFound`.
    pub fn search(
        &self,
        query: &str,
        limit: Option<u32>,
        offset: Option<u32>,
    ) -> EnvelopeStream<Vec<LyricRecord>> {
        let service = self.clone();
        let query = query.to_string();
        let page = Page::from_options(
            limit,
            offset,
            self.inner.config.default_page_size,
            self.inner.config.max_page_size,
        );
        pipeline(async move { service.run_search(query, page).await })
    }

    /// Add `delta` to a lyric's vote
    pub fn vote(&self, id: &str, delta: i64) -> EnvelopeStream<LyricRecord> {
        let service = self.clone();
        let id = id.to_string();
        pipeline(async move { service.inner.votes.apply_vote::<LyricRecord>(&id, delta).await })
    }

    // ------------------------------------------------------------------
    // Translations
    // ------------------------------------------------------------------

    /// Translations for a video, optionally in one language. Empty is `Success`.
    pub fn fetch_translations(
        &self,
        video_id: &str,
        language: Option<&str>,
    ) -> EnvelopeStream<Vec<TranslatedLyricRecord>> {
        let service = self.clone();
        let video_id = video_id.to_string();
        let language = language.map(|l| l.trim().to_ascii_lowercase());
        pipeline(async move {
            let page = Page::new(service.inner.config.max_page_size, 0);
            let found = service
                .inner
                .store
                .find_translations(&video_id, language.as_deref(), page)
                .await?;
            debug!(video_id = %video_id, language = ?language, count = found.len(), "Fetched translations");
            Ok(found)
        })
    }

    /// Validate, de-duplicate and store a translation submission
    pub fn save_translation(
        &self,
        submission: NewTranslation,
    ) -> EnvelopeStream<TranslatedLyricRecord> {
        let service = self.clone();
        pipeline(async move {
            let record = submission.into_record()?;
            service.inner.guard.guarded_save(record).await
        })
    }

    /// Add `delta` to a translation's vote
    pub fn vote_translation(&self, id: &str, delta: i64) -> EnvelopeStream<TranslatedLyricRecord> {
        let service = self.clone();
        let id = id.to_string();
        pipeline(async move {
            service
                .inner
                .votes
                .apply_vote::<TranslatedLyricRecord>(&id, delta)
                .await
        })
    }

    // ------------------------------------------------------------------
    // Maintenance
    // ------------------------------------------------------------------

    /// Rebuild the search index from the primary store.
    ///
    /// Terminates with the number of documents indexed. Documents that fail
    /// to index are logged and skipped; a store failure ends the rebuild.
    pub fn reindex(&self) -> EnvelopeStream<usize> {
        let service = self.clone();
        pipeline(async move { service.run_reindex().await })
    }

    /// Wait until every background side effect started so far has finished
    pub async fn settle(&self) {
        let background = &self.inner.background;
        background.close();
        background.wait().await;
        background.reopen();
    }

    /// Stop starting background side effects and wait for running ones
    pub async fn shutdown(&self) {
        self.inner.accepting.store(false, Ordering::SeqCst);
        self.inner.background.close();
        self.inner.background.wait().await;
        info!("Lyric service shut down");
    }

    // ------------------------------------------------------------------
    // Use case bodies
    // ------------------------------------------------------------------

    async fn run_fetch_by_video_id(&self, video_id: String) -> Result<Vec<LyricRecord>> {
        let page = Page::new(self.inner.config.max_page_size, 0);
        let found =
            RecordStore::<LyricRecord>::find_by_video_id(self.inner.store.as_ref(), &video_id, page)
                .await?;

        if found.is_empty() {
            debug!(video_id = %video_id, "No lyrics for video");
            let service = self.clone();
            let missing = video_id.clone();
            self.spawn_side_effect("record_miss", &video_id, async move {
                service.inner.tracker.record_miss(&missing).await.map(|_| ())
            });
        }

        Ok(found)
    }

    async fn run_save(&self, submission: NewLyric) -> Result<LyricRecord> {
        let record = submission.into_record()?;
        let saved = self.inner.guard.guarded_save(record).await?;

        let index = Arc::clone(&self.inner.index);
        let document = saved.search_document();
        self.spawn_side_effect("index_document", &saved.video_id, async move {
            index.index_document(&document).await.map(|_| ())
        });

        let service = self.clone();
        let video_id = saved.video_id.clone();
        let clear = self.spawn_side_effect("clear_on_hit", &saved.video_id, async move {
            service.inner.tracker.clear_on_hit(&video_id).await.map(|_| ())
        });
        if let Some(clear) = clear {
            // Failure was already logged by the task
            if let Err(e) = clear.await {
                warn!(video_id = %saved.video_id, error = %e, "Not-found clear task aborted");
            }
        }

        Ok(saved)
    }

    async fn run_search(&self, query: String, page: Page) -> Result<Vec<LyricRecord>> {
        if query.trim().is_empty() {
            return Err(Error::InvalidInput("search query must not be empty".to_string()));
        }

        let ids = self.inner.index.search(&query, page).await?;
        debug!(query = %query, hits = ids.len(), "Search index answered");

        let store = Arc::clone(&self.inner.store);
        let records: Vec<LyricRecord> = stream::iter(ids)
            .map(|id| {
                let store = Arc::clone(&store);
                async move {
                    let outcome = RecordStore::<LyricRecord>::find_by_id(store.as_ref(), &id).await;
                    (id, outcome)
                }
            })
            .buffered(self.inner.config.hydration_concurrency.max(1))
            .filter_map(|(id, outcome)| async move {
                match outcome {
                    Ok(Some(record)) => Some(record),
                    Ok(None) => {
                        debug!(id = %id, "Search hit has no stored record, dropping");
                        None
                    }
                    Err(e) => {
                        warn!(id = %id, error = %e, "Failed to load search hit, dropping");
                        None
                    }
                }
            })
            .collect()
            .await;

        if records.is_empty() {
            return Err(Error::NotFound(format!("no lyrics match {:?}", query)));
        }

        Ok(records)
    }

    async fn run_reindex(&self) -> Result<usize> {
        let mut page = Page::new(REINDEX_BATCH, 0);
        let mut indexed = 0usize;
        let mut failed = 0usize;

        loop {
            let batch = self.inner.store.scan_lyrics(page).await?;
            let batch_len = batch.len();

            for record in &batch {
                match self.inner.index.index_document(&record.search_document()).await {
                    Ok(_) => indexed += 1,
                    Err(e) => {
                        failed += 1;
                        warn!(id = %record.id, error = %e, "Failed to index document");
                    }
                }
            }

            if batch_len < page.limit as usize {
                break;
            }
            page = page.next();
        }

        info!(indexed, failed, "Search index rebuilt");
        Ok(indexed)
    }

    /// Run a best-effort side effect detached from the calling request.
    ///
    /// The handle may be awaited; dropping it leaves the task running.
    /// `None` once the service is shutting down.
    fn spawn_side_effect<F>(
        &self,
        effect: &'static str,
        video_id: &str,
        task: F,
    ) -> Option<JoinHandle<()>>
    where
        F: Future<Output = Result<()>> + Send + 'static,
    {
        if !self.inner.accepting.load(Ordering::SeqCst) {
            warn!(effect, video_id = %video_id, "Service shutting down, side effect skipped");
            return None;
        }

        let video_id = video_id.to_string();
        Some(self.inner.background.spawn(async move {
            if let Err(e) = task.await {
                warn!(effect, video_id = %video_id, error = %e, "Background side effect failed");
            }
        }))
    }
}
