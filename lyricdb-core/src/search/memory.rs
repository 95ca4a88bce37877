//! In-memory inverted index

use super::tokenizer::{document_tokens, tokenize};
use super::SearchIndex;
use async_trait::async_trait;
use lyricdb_common::models::{Page, SearchDocument};
use lyricdb_common::Result;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::ops::Bound;
use tokio::sync::RwLock;

#[derive(Default)]
struct Inner {
    documents: HashMap<String, SearchDocument>,
    /// token -> ids of documents containing it, ordered for prefix scans
    postings: BTreeMap<String, BTreeSet<String>>,
}

impl Inner {
    fn remove(&mut self, id: &str) -> bool {
        let Some(previous) = self.documents.remove(id) else {
            return false;
        };
        for token in document_tokens(&previous) {
            if let Some(ids) = self.postings.get_mut(&token) {
                ids.remove(id);
                if ids.is_empty() {
                    self.postings.remove(&token);
                }
            }
        }
        true
    }

    /// Ids of documents holding any token that starts with `prefix`
    fn prefix_matches(&self, prefix: &str) -> BTreeSet<&str> {
        self.postings
            .range::<str, _>((Bound::Included(prefix), Bound::Unbounded))
            .take_while(|(token, _)| token.starts_with(prefix))
            .flat_map(|(_, ids)| ids.iter().map(String::as_str))
            .collect()
    }
}

/// Search index kept in process memory.
///
/// Each query token matches as a prefix of document tokens. Documents are
/// scored by the number of distinct query tokens they match; ties are broken
/// by id.
#[derive(Default)]
pub struct MemorySearchIndex {
    inner: RwLock<Inner>,
}

impl MemorySearchIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.documents.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl SearchIndex for MemorySearchIndex {
    async fn index_document(&self, doc: &SearchDocument) -> Result<String> {
        let mut inner = self.inner.write().await;
        inner.remove(&doc.id);
        for token in document_tokens(doc) {
            inner
                .postings
                .entry(token)
                .or_default()
                .insert(doc.id.clone());
        }
        inner.documents.insert(doc.id.clone(), doc.clone());
        Ok(doc.id.clone())
    }

    async fn search(&self, query: &str, page: Page) -> Result<Vec<String>> {
        let mut query_tokens = tokenize(query);
        query_tokens.sort();
        query_tokens.dedup();

        let inner = self.inner.read().await;
        let mut scores: HashMap<&str, usize> = HashMap::new();
        for token in &query_tokens {
            for id in inner.prefix_matches(token) {
                *scores.entry(id).or_insert(0) += 1;
            }
        }

        let mut ranked: Vec<(&str, usize)> = scores.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));

        Ok(ranked
            .into_iter()
            .skip(page.offset as usize)
            .take(page.limit as usize)
            .map(|(id, _)| id.to_string())
            .collect())
    }

    async fn delete_document(&self, id: &str) -> Result<String> {
        self.inner.write().await.remove(id);
        Ok(id.to_string())
    }
}
