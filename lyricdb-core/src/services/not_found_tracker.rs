//! Not-found cache maintenance
//!
//! A not-found entry is a derived cache of "no lyrics exist for this video".
//! It is written after a lookup misses and removed once lyrics for the video
//! are saved. A miss runs in the background and may land after a save for
//! the same video, so it re-reads the lyrics after writing and withdraws its
//! own entry when they exist.

use crate::store::{NotFoundStore, RecordStore};
use lyricdb_common::models::{LyricRecord, NotFoundRecord, Page};
use lyricdb_common::Result;
use std::sync::Arc;
use tracing::{debug, info};

pub struct NotFoundTracker<S: ?Sized> {
    store: Arc<S>,
}

impl<S> NotFoundTracker<S>
where
    S: NotFoundStore + RecordStore<LyricRecord> + ?Sized,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Remember that `video_id` has no lyrics.
    ///
    /// Returns `true` when a new entry was written and kept, `false` when one
    /// already existed (the original `added_date` is kept) or when lyrics
    /// appeared while the entry was being written.
    pub async fn record_miss(&self, video_id: &str) -> Result<bool> {
        if self.store.find_not_found(video_id).await?.is_some() {
            debug!(video_id = %video_id, "Not-found entry already present");
            return Ok(false);
        }

        self.store
            .insert_not_found(&NotFoundRecord::now(video_id))
            .await?;

        let lyrics = self
            .store
            .find_by_video_id(video_id, Page::new(1, 0))
            .await?;
        if !lyrics.is_empty() {
            self.store.delete_by_video_id(video_id).await?;
            info!(video_id = %video_id, "Lyrics saved during miss, withdrew not-found entry");
            return Ok(false);
        }

        info!(video_id = %video_id, "Recorded not-found entry");
        Ok(true)
    }

    /// Drop the not-found entry for `video_id`, if any
    pub async fn clear_on_hit(&self, video_id: &str) -> Result<bool> {
        let removed = self.store.delete_by_video_id(video_id).await?;
        if removed {
            info!(video_id = %video_id, "Cleared not-found entry");
        } else {
            debug!(video_id = %video_id, "No not-found entry to clear");
        }
        Ok(removed)
    }
}
