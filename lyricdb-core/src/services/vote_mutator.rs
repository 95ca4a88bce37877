//! Vote counter updates
//!
//! The existence check and the increment are separate calls, but the
//! increment itself is a single atomic store operation (`vote = vote + delta`),
//! so concurrent votes on one record are never lost. A record removed between
//! the two calls is reported as not found.

use crate::store::RecordStore;
use lyricdb_common::models::StoredRecord;
use lyricdb_common::{Error, Result};
use std::sync::Arc;
use tracing::{debug, info};

pub struct VoteMutator<S: ?Sized> {
    store: Arc<S>,
}

impl<S: ?Sized> VoteMutator<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Add `delta` to the vote of record `id` and return the updated record
    pub async fn apply_vote<R>(&self, id: &str, delta: i64) -> Result<R>
    where
        R: StoredRecord,
        S: RecordStore<R>,
    {
        let current = self
            .store
            .find_by_id(id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("{} {}", R::KIND, id)))?;
        debug!(kind = R::KIND, id = %id, vote = current.vote(), delta, "Applying vote");

        let updated = self
            .store
            .update_vote(id, delta)
            .await?
            .ok_or_else(|| Error::NotFound(format!("{} {}", R::KIND, id)))?;

        info!(kind = R::KIND, id = %id, vote = updated.vote(), "Vote applied");
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use lyricdb_common::models::{LyricRecord, NewLyric};

    async fn seeded() -> (Arc<MemoryStore>, LyricRecord) {
        let store = Arc::new(MemoryStore::new());
        let record = NewLyric {
            video_id: "vid".to_string(),
            song_title: "Song".to_string(),
            artist_name: "Artist".to_string(),
            album_name: None,
            duration_seconds: 100,
            plain_lyric: "words".to_string(),
            synced_lyrics: None,
            rich_sync_lyrics: None,
            contributor: "c".to_string(),
            contributor_email: "c@example.com".to_string(),
        }
        .into_record()
        .unwrap();
        RecordStore::<LyricRecord>::save(store.as_ref(), &record)
            .await
            .unwrap();
        (store, record)
    }

    #[tokio::test]
    async fn test_up_then_down_returns_to_zero() {
        let (store, record) = seeded().await;
        let votes = VoteMutator::new(store);

        let up: LyricRecord = votes.apply_vote(&record.id, 1).await.unwrap();
        assert_eq!(up.vote, 1);

        let down: LyricRecord = votes.apply_vote(&record.id, -1).await.unwrap();
        assert_eq!(down.vote, 0);
    }

    #[tokio::test]
    async fn test_arbitrary_delta() {
        let (store, record) = seeded().await;
        let votes = VoteMutator::new(store);

        let updated: LyricRecord = votes.apply_vote(&record.id, -7).await.unwrap();
        assert_eq!(updated.vote, -7);
    }

    #[tokio::test]
    async fn test_missing_record_is_not_found() {
        let (store, _) = seeded().await;
        let votes = VoteMutator::new(store);

        let err = votes
            .apply_vote::<LyricRecord>("does-not-exist", 1)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }
}
