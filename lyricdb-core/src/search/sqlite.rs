//! SQLite FTS5 search index
//!
//! Lives in its own database so it can be dropped and rebuilt without touching
//! the primary store. User text never reaches FTS5 syntax directly: the query
//! is tokenized and every token is quoted as a prefix term, joined with `OR`.

use super::tokenizer::tokenize;
use super::SearchIndex;
use async_trait::async_trait;
use lyricdb_common::db;
use lyricdb_common::models::{Page, SearchDocument};
use lyricdb_common::{Error, Result};
use sqlx::SqlitePool;
use tracing::debug;

pub struct SqliteSearchIndex {
    pool: SqlitePool,
}

impl SqliteSearchIndex {
    /// Wrap `pool`, creating the FTS table if needed
    pub async fn new(pool: SqlitePool) -> Result<Self> {
        db::init_search_schema(&pool).await?;
        Ok(Self { pool })
    }
}

/// FTS5 MATCH expression for free text; `None` when nothing is searchable
fn match_expression(query: &str) -> Option<String> {
    let terms: Vec<String> = tokenize(query)
        .into_iter()
        .map(|token| format!("\"{}\"*", token.replace('"', "\"\"")))
        .collect();

    if terms.is_empty() {
        None
    } else {
        Some(terms.join(" OR "))
    }
}

fn search_error(context: &str, err: sqlx::Error) -> Error {
    Error::Search(format!("{}: {}", context, err))
}

#[async_trait]
impl SearchIndex for SqliteSearchIndex {
    async fn index_document(&self, doc: &SearchDocument) -> Result<String> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| search_error("begin index transaction", e))?;

        sqlx::query("DELETE FROM search_documents WHERE id = ?")
            .bind(&doc.id)
            .execute(&mut *tx)
            .await
            .map_err(|e| search_error("remove previous document", e))?;

        sqlx::query(
            r#"
            INSERT INTO search_documents (id, video_id, song_title, artist_name, album_name, duration_seconds)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&doc.id)
        .bind(&doc.video_id)
        .bind(&doc.song_title)
        .bind(&doc.artist_name)
        .bind(&doc.album_name)
        .bind(doc.duration_seconds)
        .execute(&mut *tx)
        .await
        .map_err(|e| search_error("insert document", e))?;

        tx.commit()
            .await
            .map_err(|e| search_error("commit index transaction", e))?;

        debug!(id = %doc.id, "Indexed search document");
        Ok(doc.id.clone())
    }

    async fn search(&self, query: &str, page: Page) -> Result<Vec<String>> {
        let Some(expression) = match_expression(query) else {
            return Ok(Vec::new());
        };

        let ids: Vec<String> = sqlx::query_scalar(
            r#"
            SELECT id FROM search_documents
            WHERE search_documents MATCH ?
            ORDER BY bm25(search_documents), id
            LIMIT ? OFFSET ?
            "#,
        )
        .bind(&expression)
        .bind(i64::from(page.limit))
        .bind(i64::from(page.offset))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| search_error("search query", e))?;

        debug!(query = %query, hits = ids.len(), "Search query complete");
        Ok(ids)
    }

    async fn delete_document(&self, id: &str) -> Result<String> {
        sqlx::query("DELETE FROM search_documents WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| search_error("delete document", e))?;
        Ok(id.to_string())
    }
}
