//! Content-hash de-duplication in front of the primary store
//!
//! The guard looks up the record's content hash before saving and refuses to
//! store a second copy of identical content. It is a best-effort check, not a
//! uniqueness constraint: the lookup and the save are separate steps, so two
//! concurrent saves of the same content can both pass the lookup. The store
//! adapters close that gap with their own content-hash uniqueness check,
//! which surfaces as the same `Conflict`.
//!
//! A failed lookup does not block the write. The guard logs it and saves
//! anyway, trading a small chance of admitting a duplicate for write
//! availability while the hash lookup is unavailable.

use crate::store::RecordStore;
use lyricdb_common::models::StoredRecord;
use lyricdb_common::{Error, Result};
use std::sync::Arc;
use tracing::{debug, info, warn};

pub struct DeduplicationGuard<S: ?Sized> {
    store: Arc<S>,
}

impl<S: ?Sized> DeduplicationGuard<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Save `record` unless a record with the same content hash exists
    ///
    /// **Algorithm:**
    /// 1. Look up the content hash (computed when the record was built)
    /// 2. If found: fail with `Conflict`, nothing is written
    /// 3. If not found, or the lookup failed: save the record
    pub async fn guarded_save<R>(&self, record: R) -> Result<R>
    where
        R: StoredRecord,
        S: RecordStore<R>,
    {
        match self.store.find_by_content_hash(record.content_hash()).await {
            Ok(Some(existing)) => {
                info!(
                    kind = R::KIND,
                    content_hash = %record.content_hash(),
                    existing_id = %existing.id(),
                    "Duplicate content rejected"
                );
                return Err(Error::Conflict(format!("{} already exists", R::KIND)));
            }
            Ok(None) => {
                debug!(kind = R::KIND, content_hash = %record.content_hash(), "Content hash is unique");
            }
            Err(e) => {
                warn!(
                    kind = R::KIND,
                    content_hash = %record.content_hash(),
                    error = %e,
                    "Duplicate check failed, saving without it"
                );
            }
        }

        let saved = self.store.save(&record).await?;
        info!(kind = R::KIND, id = %saved.id(), video_id = %saved.video_id(), "Record saved");
        Ok(saved)
    }
}
