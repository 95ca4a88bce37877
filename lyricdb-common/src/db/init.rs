//! Database initialization
//!
//! Opens SQLite pools and creates the primary-store and search-index schemas.
//! Every `create_*` function is idempotent and safe to run on each startup.

use crate::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::path::Path;
use std::time::Duration;
use tracing::info;

/// Current schema version recorded in `schema_version`
pub const SCHEMA_VERSION: i64 = 1;

/// Busy timeout applied to every on-disk connection
const BUSY_TIMEOUT_MS: u64 = 5000;

/// Open (creating if needed) an on-disk database
pub async fn open_database(db_path: &Path, max_connections: u32) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    // Applied to every pooled connection. WAL lets readers proceed while a
    // single writer commits.
    let options = SqliteConnectOptions::new()
        .filename(db_path)
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_millis(BUSY_TIMEOUT_MS));

    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections.max(1))
        .connect_with(options)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    Ok(pool)
}

/// Open a private in-memory database.
///
/// Every SQLite `:memory:` connection is its own database, so the pool is
/// pinned to one connection that is never recycled.
pub async fn open_in_memory() -> Result<SqlitePool> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await?;
    Ok(pool)
}

/// Create lyric, translation and not-found tables
pub async fn init_primary_schema(pool: &SqlitePool) -> Result<()> {
    create_schema_version_table(pool).await?;
    create_lyrics_table(pool).await?;
    create_translated_lyrics_table(pool).await?;
    create_not_found_table(pool).await?;
    record_schema_version(pool).await?;
    Ok(())
}

/// Create the full-text search table
pub async fn init_search_schema(pool: &SqlitePool) -> Result<()> {
    create_schema_version_table(pool).await?;
    create_search_documents_table(pool).await?;
    record_schema_version(pool).await?;
    Ok(())
}

async fn create_schema_version_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            applied_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn record_schema_version(pool: &SqlitePool) -> Result<()> {
    sqlx::query("INSERT OR IGNORE INTO schema_version (version) VALUES (?)")
        .bind(SCHEMA_VERSION)
        .execute(pool)
        .await?;
    Ok(())
}

/// Create the lyrics table
///
/// `content_hash` is UNIQUE so the store itself rejects duplicate content even
/// when two saves race past the de-duplication check.
pub async fn create_lyrics_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS lyrics (
            id TEXT PRIMARY KEY,
            video_id TEXT NOT NULL,
            song_title TEXT NOT NULL,
            artist_name TEXT NOT NULL,
            album_name TEXT,
            duration_seconds INTEGER NOT NULL,
            plain_lyric TEXT NOT NULL,
            synced_lyrics TEXT,
            rich_sync_lyrics TEXT,
            vote INTEGER NOT NULL DEFAULT 0,
            contributor TEXT NOT NULL,
            contributor_email TEXT NOT NULL,
            content_hash TEXT NOT NULL UNIQUE,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_lyrics_video_id ON lyrics(video_id)")
        .execute(pool)
        .await?;

    Ok(())
}

/// Create the translated_lyrics table
pub async fn create_translated_lyrics_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS translated_lyrics (
            id TEXT PRIMARY KEY,
            video_id TEXT NOT NULL,
            language TEXT NOT NULL,
            translated_lyric TEXT NOT NULL,
            vote INTEGER NOT NULL DEFAULT 0,
            contributor TEXT NOT NULL,
            contributor_email TEXT NOT NULL,
            content_hash TEXT NOT NULL UNIQUE,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_translated_lyrics_video_lang ON translated_lyrics(video_id, language)",
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Create the not_found table (one row per video id)
pub async fn create_not_found_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS not_found (
            video_id TEXT PRIMARY KEY,
            added_date TIMESTAMP NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Create the FTS5 table holding search documents
pub async fn create_search_documents_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE VIRTUAL TABLE IF NOT EXISTS search_documents USING fts5(
            id UNINDEXED,
            video_id UNINDEXED,
            song_title,
            artist_name,
            album_name,
            duration_seconds UNINDEXED
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}
