//! SQLite primary store (sqlx)
//!
//! Tables are created by [`lyricdb_common::db::init_primary_schema`]. The
//! UNIQUE index on `content_hash` backs up the check-then-save guard: a save
//! that races past the guard fails here with `Conflict` instead of storing a
//! duplicate. Votes use `SET vote = vote + ?` so concurrent votes never lose
//! updates.

use super::{vote_out_of_range, NotFoundStore, PrimaryStore, RecordStore};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use lyricdb_common::db;
use lyricdb_common::models::{LyricRecord, NotFoundRecord, Page, TranslatedLyricRecord};
use lyricdb_common::{Error, Result};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection, SqlitePool};
use tracing::debug;

const LYRIC_COLUMNS: &str = "id, video_id, song_title, artist_name, album_name, duration_seconds, \
     plain_lyric, synced_lyrics, rich_sync_lyrics, vote, contributor, contributor_email, content_hash";

const TRANSLATION_COLUMNS: &str =
    "id, video_id, language, translated_lyric, vote, contributor, contributor_email, content_hash";

/// Primary store backed by a SQLite pool
#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Wrap `pool`, creating the schema if needed
    pub async fn new(pool: SqlitePool) -> Result<Self> {
        db::init_primary_schema(&pool).await?;
        Ok(Self { pool })
    }
}

/// Add `delta` to the vote of row `id` in `table`.
///
/// `Ok(false)` when no row has `id`. SQLite turns an overflowing integer sum
/// into a REAL, so such an update matches nothing and is reported as
/// `InvalidInput`.
async fn add_vote(
    conn: &mut SqliteConnection,
    table: &str,
    id: &str,
    delta: i64,
) -> Result<bool> {
    let sql = format!(
        "UPDATE {} SET vote = vote + ?, updated_at = CURRENT_TIMESTAMP \
         WHERE id = ? AND typeof(vote + ?) = 'integer'",
        table
    );
    let updated = sqlx::query(&sql)
        .bind(delta)
        .bind(id)
        .bind(delta)
        .execute(&mut *conn)
        .await?;
    if updated.rows_affected() > 0 {
        return Ok(true);
    }

    let sql = format!("SELECT 1 FROM {} WHERE id = ?", table);
    let exists: Option<i64> = sqlx::query_scalar(&sql)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;
    match exists {
        Some(_) => Err(vote_out_of_range(id, delta)),
        None => Ok(false),
    }
}

fn lyric_from_row(row: &SqliteRow) -> Result<LyricRecord> {
    Ok(LyricRecord {
        id: row.try_get("id")?,
        video_id: row.try_get("video_id")?,
        song_title: row.try_get("song_title")?,
        artist_name: row.try_get("artist_name")?,
        album_name: row.try_get("album_name")?,
        duration_seconds: row.try_get("duration_seconds")?,
        plain_lyric: row.try_get("plain_lyric")?,
        synced_lyrics: row.try_get("synced_lyrics")?,
        rich_sync_lyrics: row.try_get("rich_sync_lyrics")?,
        vote: row.try_get("vote")?,
        contributor: row.try_get("contributor")?,
        contributor_email: row.try_get("contributor_email")?,
        content_hash: row.try_get("content_hash")?,
    })
}

fn translation_from_row(row: &SqliteRow) -> Result<TranslatedLyricRecord> {
    Ok(TranslatedLyricRecord {
        id: row.try_get("id")?,
        video_id: row.try_get("video_id")?,
        language: row.try_get("language")?,
        translated_lyric: row.try_get("translated_lyric")?,
        vote: row.try_get("vote")?,
        contributor: row.try_get("contributor")?,
        contributor_email: row.try_get("contributor_email")?,
        content_hash: row.try_get("content_hash")?,
    })
}

/// Translate a unique-index violation into `Conflict`
fn map_write_error(kind: &str, content_hash: &str, err: sqlx::Error) -> Error {
    let is_unique = err
        .as_database_error()
        .map(|db_err| db_err.is_unique_violation())
        .unwrap_or(false);

    if is_unique {
        Error::Conflict(format!(
            "{} with content hash {} already exists",
            kind, content_hash
        ))
    } else {
        Error::Database(err)
    }
}

#[async_trait]
impl RecordStore<LyricRecord> for SqliteStore {
    async fn find_by_id(&self, id: &str) -> Result<Option<LyricRecord>> {
        let sql = format!("SELECT {} FROM lyrics WHERE id = ?", LYRIC_COLUMNS);
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(lyric_from_row).transpose()
    }

    async fn find_by_video_id(&self, video_id: &str, page: Page) -> Result<Vec<LyricRecord>> {
        let sql = format!(
            "SELECT {} FROM lyrics WHERE video_id = ? ORDER BY vote DESC, id ASC LIMIT ? OFFSET ?",
            LYRIC_COLUMNS
        );
        let rows = sqlx::query(&sql)
            .bind(video_id)
            .bind(i64::from(page.limit))
            .bind(i64::from(page.offset))
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(lyric_from_row).collect()
    }

    async fn find_by_content_hash(&self, hash: &str) -> Result<Option<LyricRecord>> {
        let sql = format!("SELECT {} FROM lyrics WHERE content_hash = ?", LYRIC_COLUMNS);
        let row = sqlx::query(&sql)
            .bind(hash)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(lyric_from_row).transpose()
    }

    async fn save(&self, record: &LyricRecord) -> Result<LyricRecord> {
        sqlx::query(
            r#"
            INSERT INTO lyrics (
                id, video_id, song_title, artist_name, album_name, duration_seconds,
                plain_lyric, synced_lyrics, rich_sync_lyrics, vote,
                contributor, contributor_email, content_hash
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                video_id = excluded.video_id,
                song_title = excluded.song_title,
                artist_name = excluded.artist_name,
                album_name = excluded.album_name,
                duration_seconds = excluded.duration_seconds,
                plain_lyric = excluded.plain_lyric,
                synced_lyrics = excluded.synced_lyrics,
                rich_sync_lyrics = excluded.rich_sync_lyrics,
                vote = excluded.vote,
                contributor = excluded.contributor,
                contributor_email = excluded.contributor_email,
                content_hash = excluded.content_hash,
                updated_at = CURRENT_TIMESTAMP
            "#,
        )
        .bind(&record.id)
        .bind(&record.video_id)
        .bind(&record.song_title)
        .bind(&record.artist_name)
        .bind(&record.album_name)
        .bind(record.duration_seconds)
        .bind(&record.plain_lyric)
        .bind(&record.synced_lyrics)
        .bind(&record.rich_sync_lyrics)
        .bind(record.vote)
        .bind(&record.contributor)
        .bind(&record.contributor_email)
        .bind(&record.content_hash)
        .execute(&self.pool)
        .await
        .map_err(|e| map_write_error("lyric", &record.content_hash, e))?;

        debug!(id = %record.id, video_id = %record.video_id, "Saved lyric row");
        Ok(record.clone())
    }

    async fn update_vote(&self, id: &str, delta: i64) -> Result<Option<LyricRecord>> {
        let mut tx = self.pool.begin().await?;

        if !add_vote(&mut tx, "lyrics", id, delta).await? {
            tx.rollback().await?;
            return Ok(None);
        }

        let sql = format!("SELECT {} FROM lyrics WHERE id = ?", LYRIC_COLUMNS);
        let row = sqlx::query(&sql).bind(id).fetch_one(&mut *tx).await?;
        let record = lyric_from_row(&row)?;
        tx.commit().await?;

        Ok(Some(record))
    }
}

#[async_trait]
impl RecordStore<TranslatedLyricRecord> for SqliteStore {
    async fn find_by_id(&self, id: &str) -> Result<Option<TranslatedLyricRecord>> {
        let sql = format!(
            "SELECT {} FROM translated_lyrics WHERE id = ?",
            TRANSLATION_COLUMNS
        );
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(translation_from_row).transpose()
    }

    async fn find_by_video_id(
        &self,
        video_id: &str,
        page: Page,
    ) -> Result<Vec<TranslatedLyricRecord>> {
        self.find_translations(video_id, None, page).await
    }

    async fn find_by_content_hash(&self, hash: &str) -> Result<Option<TranslatedLyricRecord>> {
        let sql = format!(
            "SELECT {} FROM translated_lyrics WHERE content_hash = ?",
            TRANSLATION_COLUMNS
        );
        let row = sqlx::query(&sql)
            .bind(hash)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(translation_from_row).transpose()
    }

    async fn save(&self, record: &TranslatedLyricRecord) -> Result<TranslatedLyricRecord> {
        sqlx::query(
            r#"
            INSERT INTO translated_lyrics (
                id, video_id, language, translated_lyric, vote,
                contributor, contributor_email, content_hash
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                video_id = excluded.video_id,
                language = excluded.language,
                translated_lyric = excluded.translated_lyric,
                vote = excluded.vote,
                contributor = excluded.contributor,
                contributor_email = excluded.contributor_email,
                content_hash = excluded.content_hash,
                updated_at = CURRENT_TIMESTAMP
            "#,
        )
        .bind(&record.id)
        .bind(&record.video_id)
        .bind(&record.language)
        .bind(&record.translated_lyric)
        .bind(record.vote)
        .bind(&record.contributor)
        .bind(&record.contributor_email)
        .bind(&record.content_hash)
        .execute(&self.pool)
        .await
        .map_err(|e| map_write_error("translation", &record.content_hash, e))?;

        debug!(id = %record.id, video_id = %record.video_id, language = %record.language, "Saved translation row");
        Ok(record.clone())
    }

    async fn update_vote(&self, id: &str, delta: i64) -> Result<Option<TranslatedLyricRecord>> {
        let mut tx = self.pool.begin().await?;

        if !add_vote(&mut tx, "translated_lyrics", id, delta).await? {
            tx.rollback().await?;
            return Ok(None);
        }

        let sql = format!(
            "SELECT {} FROM translated_lyrics WHERE id = ?",
            TRANSLATION_COLUMNS
        );
        let row = sqlx::query(&sql).bind(id).fetch_one(&mut *tx).await?;
        let record = translation_from_row(&row)?;
        tx.commit().await?;

        Ok(Some(record))
    }
}

#[async_trait]
impl NotFoundStore for SqliteStore {
    async fn find_not_found(&self, video_id: &str) -> Result<Option<NotFoundRecord>> {
        let row: Option<(String, DateTime<Utc>)> =
            sqlx::query_as("SELECT video_id, added_date FROM not_found WHERE video_id = ?")
                .bind(video_id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(row.map(|(video_id, added_date)| NotFoundRecord {
            video_id,
            added_date,
        }))
    }

    async fn insert_not_found(&self, record: &NotFoundRecord) -> Result<()> {
        sqlx::query("INSERT OR IGNORE INTO not_found (video_id, added_date) VALUES (?, ?)")
            .bind(&record.video_id)
            .bind(record.added_date)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn delete_by_video_id(&self, video_id: &str) -> Result<bool> {
        let deleted = sqlx::query("DELETE FROM not_found WHERE video_id = ?")
            .bind(video_id)
            .execute(&self.pool)
            .await?;
        Ok(deleted.rows_affected() > 0)
    }
}

#[async_trait]
impl PrimaryStore for SqliteStore {
    fn backend(&self) -> &'static str {
        "sqlite"
    }

    async fn scan_lyrics(&self, page: Page) -> Result<Vec<LyricRecord>> {
        let sql = format!(
            "SELECT {} FROM lyrics ORDER BY id ASC LIMIT ? OFFSET ?",
            LYRIC_COLUMNS
        );
        let rows = sqlx::query(&sql)
            .bind(i64::from(page.limit))
            .bind(i64::from(page.offset))
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(lyric_from_row).collect()
    }

    async fn find_translations(
        &self,
        video_id: &str,
        language: Option<&str>,
        page: Page,
    ) -> Result<Vec<TranslatedLyricRecord>> {
        let sql = format!(
            "SELECT {} FROM translated_lyrics \
             WHERE video_id = ? AND (? IS NULL OR language = ?) \
             ORDER BY vote DESC, id ASC LIMIT ? OFFSET ?",
            TRANSLATION_COLUMNS
        );
        let rows = sqlx::query(&sql)
            .bind(video_id)
            .bind(language)
            .bind(language)
            .bind(i64::from(page.limit))
            .bind(i64::from(page.offset))
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(translation_from_row).collect()
    }
}
