//! Search index double answering every query with a fixed id list

use async_trait::async_trait;
use lyricdb_common::models::{Page, SearchDocument};
use lyricdb_common::{Error, Result};
use lyricdb_core::search::SearchIndex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

#[derive(Default)]
pub struct ScriptedIndex {
    hits: Mutex<Vec<String>>,
    pub indexed: AtomicUsize,
    pub fail_search: AtomicBool,
}

impl ScriptedIndex {
    pub fn with_hits(ids: &[&str]) -> Self {
        let index = Self::default();
        *index.hits.lock().unwrap() = ids.iter().map(|id| id.to_string()).collect();
        index
    }
}

#[async_trait]
impl SearchIndex for ScriptedIndex {
    async fn index_document(&self, doc: &SearchDocument) -> Result<String> {
        self.indexed.fetch_add(1, Ordering::SeqCst);
        Ok(doc.id.clone())
    }

    async fn search(&self, _query: &str, _page: Page) -> Result<Vec<String>> {
        if self.fail_search.load(Ordering::SeqCst) {
            return Err(Error::Search("injected failure: search".to_string()));
        }
        Ok(self.hits.lock().unwrap().clone())
    }

    async fn delete_document(&self, id: &str) -> Result<String> {
        Ok(id.to_string())
    }
}
