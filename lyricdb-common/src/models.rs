//! Lyric, translation and not-found records
//!
//! Stored records are only created from validated submissions
//! ([`NewLyric`], [`NewTranslation`]); the constructor assigns a fresh id and
//! computes the content hash once. Neither changes afterwards.

use crate::content_hash;
use crate::uuid_utils;
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Common accessors for records guarded by content hash
pub trait StoredRecord: Clone + Send + Sync + 'static {
    /// Human readable record kind, used in log and error messages
    const KIND: &'static str;

    fn id(&self) -> &str;
    fn video_id(&self) -> &str;
    fn content_hash(&self) -> &str;
    fn vote(&self) -> i64;
}

/// Lyrics for one video
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LyricRecord {
    pub id: String,
    pub video_id: String,
    pub song_title: String,
    pub artist_name: String,
    pub album_name: Option<String>,
    pub duration_seconds: i64,
    pub plain_lyric: String,
    /// Line-timed lyrics
    pub synced_lyrics: Option<String>,
    /// Word-timed lyrics
    pub rich_sync_lyrics: Option<String>,
    pub vote: i64,
    pub contributor: String,
    pub contributor_email: String,
    pub content_hash: String,
}

/// Lyric submission as received from a caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewLyric {
    pub video_id: String,
    pub song_title: String,
    pub artist_name: String,
    #[serde(default)]
    pub album_name: Option<String>,
    pub duration_seconds: i64,
    pub plain_lyric: String,
    #[serde(default)]
    pub synced_lyrics: Option<String>,
    #[serde(default)]
    pub rich_sync_lyrics: Option<String>,
    pub contributor: String,
    pub contributor_email: String,
}

impl NewLyric {
    pub fn validate(&self) -> Result<()> {
        require_non_blank("videoId", &self.video_id)?;
        require_non_blank("songTitle", &self.song_title)?;
        require_non_blank("artistName", &self.artist_name)?;
        require_non_blank("plainLyric", &self.plain_lyric)?;
        require_non_blank("contributor", &self.contributor)?;
        validate_email(&self.contributor_email)?;

        if self.duration_seconds < 0 {
            return Err(Error::InvalidInput(format!(
                "durationSeconds must not be negative: {}",
                self.duration_seconds
            )));
        }

        Ok(())
    }

    /// Validate and turn into a storable record
    pub fn into_record(self) -> Result<LyricRecord> {
        self.validate()?;
        let content_hash = content_hash::lyric_hash(
            &self.video_id,
            self.duration_seconds,
            &self.plain_lyric,
            self.synced_lyrics.as_deref(),
            self.rich_sync_lyrics.as_deref(),
        );

        Ok(LyricRecord {
            id: uuid_utils::new_record_id(),
            video_id: self.video_id,
            song_title: self.song_title,
            artist_name: self.artist_name,
            album_name: self.album_name,
            duration_seconds: self.duration_seconds,
            plain_lyric: self.plain_lyric,
            synced_lyrics: self.synced_lyrics,
            rich_sync_lyrics: self.rich_sync_lyrics,
            vote: 0,
            contributor: self.contributor,
            contributor_email: self.contributor_email,
            content_hash,
        })
    }
}

impl LyricRecord {
    /// Projection held by the search index
    pub fn search_document(&self) -> SearchDocument {
        SearchDocument {
            id: self.id.clone(),
            video_id: self.video_id.clone(),
            song_title: self.song_title.clone(),
            artist_name: self.artist_name.clone(),
            album_name: self.album_name.clone(),
            duration_seconds: self.duration_seconds,
        }
    }
}

impl StoredRecord for LyricRecord {
    const KIND: &'static str = "lyric";

    fn id(&self) -> &str {
        &self.id
    }

    fn video_id(&self) -> &str {
        &self.video_id
    }

    fn content_hash(&self) -> &str {
        &self.content_hash
    }

    fn vote(&self) -> i64 {
        self.vote
    }
}

/// Translated lyrics for one video in one language
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslatedLyricRecord {
    pub id: String,
    pub video_id: String,
    /// Two-letter lowercase language code
    pub language: String,
    /// Line-timed translation
    pub translated_lyric: String,
    pub vote: i64,
    pub contributor: String,
    pub contributor_email: String,
    pub content_hash: String,
}

/// Translation submission as received from a caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTranslation {
    pub video_id: String,
    pub language: String,
    pub translated_lyric: String,
    pub contributor: String,
    pub contributor_email: String,
}

impl NewTranslation {
    pub fn validate(&self) -> Result<()> {
        require_non_blank("videoId", &self.video_id)?;
        require_non_blank("translatedLyric", &self.translated_lyric)?;
        require_non_blank("contributor", &self.contributor)?;
        validate_email(&self.contributor_email)?;
        normalize_language(&self.language)?;
        Ok(())
    }

    pub fn into_record(self) -> Result<TranslatedLyricRecord> {
        self.validate()?;
        let language = normalize_language(&self.language)?;
        let content_hash =
            content_hash::translation_hash(&self.video_id, &language, &self.translated_lyric);

        Ok(TranslatedLyricRecord {
            id: uuid_utils::new_record_id(),
            video_id: self.video_id,
            language,
            translated_lyric: self.translated_lyric,
            vote: 0,
            contributor: self.contributor,
            contributor_email: self.contributor_email,
            content_hash,
        })
    }
}

impl StoredRecord for TranslatedLyricRecord {
    const KIND: &'static str = "translation";

    fn id(&self) -> &str {
        &self.id
    }

    fn video_id(&self) -> &str {
        &self.video_id
    }

    fn content_hash(&self) -> &str {
        &self.content_hash
    }

    fn vote(&self) -> i64 {
        self.vote
    }
}

/// Cache entry asserting that no lyrics exist for a video
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotFoundRecord {
    pub video_id: String,
    pub added_date: DateTime<Utc>,
}

impl NotFoundRecord {
    pub fn now(video_id: impl Into<String>) -> Self {
        Self {
            video_id: video_id.into(),
            added_date: Utc::now(),
        }
    }
}

/// Search index projection of a [`LyricRecord`]; never authoritative
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchDocument {
    pub id: String,
    pub video_id: String,
    pub song_title: String,
    pub artist_name: String,
    pub album_name: Option<String>,
    pub duration_seconds: i64,
}

/// Limit/offset window for list queries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub limit: u32,
    pub offset: u32,
}

impl Page {
    pub const DEFAULT_LIMIT: u32 = 20;

    pub fn new(limit: u32, offset: u32) -> Self {
        Self { limit, offset }
    }

    /// Page built from optional caller values, clamped to `max_limit`
    pub fn from_options(limit: Option<u32>, offset: Option<u32>, default_limit: u32, max_limit: u32) -> Self {
        let limit = limit.unwrap_or(default_limit).clamp(1, max_limit.max(1));
        Self {
            limit,
            offset: offset.unwrap_or(0),
        }
    }

    /// Following page of the same size
    pub fn next(self) -> Self {
        Self {
            limit: self.limit,
            offset: self.offset.saturating_add(self.limit),
        }
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::new(Self::DEFAULT_LIMIT, 0)
    }
}

/// Caller-facing vote direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteDirection {
    Up,
    Down,
}

impl VoteDirection {
    pub fn delta(self) -> i64 {
        match self {
            VoteDirection::Up => 1,
            VoteDirection::Down => -1,
        }
    }
}

fn require_non_blank(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::InvalidInput(format!("{} must not be empty", field)));
    }
    Ok(())
}

fn validate_email(email: &str) -> Result<()> {
    let trimmed = email.trim();
    match trimmed.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(()),
        _ => Err(Error::InvalidInput(format!(
            "contributorEmail is not a valid address: {:?}",
            email
        ))),
    }
}

/// Two ASCII letters, returned lowercase
fn normalize_language(language: &str) -> Result<String> {
    let trimmed = language.trim();
    if trimmed.len() == 2 && trimmed.chars().all(|c| c.is_ascii_alphabetic()) {
        Ok(trimmed.to_ascii_lowercase())
    } else {
        Err(Error::InvalidInput(format!(
            "language must be a two-letter code: {:?}",
            language
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn submission() -> NewLyric {
        NewLyric {
            video_id: "dQw4w9WgXcQ".to_string(),
            song_title: "Never Gonna Give You Up".to_string(),
            artist_name: "Rick Astley".to_string(),
            album_name: Some("Whenever You Need Somebody".to_string()),
            duration_seconds: 213,
            plain_lyric: "We're no strangers to love".to_string(),
            synced_lyrics: Some("[00:18.00]We're no strangers to love".to_string()),
            rich_sync_lyrics: None,
            contributor: "alice".to_string(),
            contributor_email: "alice@example.com".to_string(),
        }
    }

    #[test]
    fn test_into_record_assigns_id_hash_and_zero_vote() {
        let record = submission().into_record().unwrap();

        assert!(!record.id.is_empty());
        assert_eq!(record.vote, 0);
        assert_eq!(
            record.content_hash,
            content_hash::lyric_hash(
                "dQw4w9WgXcQ",
                213,
                "We're no strangers to love",
                Some("[00:18.00]We're no strangers to love"),
                None
            )
        );
    }

    #[test]
    fn test_same_content_same_hash_different_ids() {
        let a = submission().into_record().unwrap();
        let b = submission().into_record().unwrap();

        assert_eq!(a.content_hash, b.content_hash);
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_display_metadata_not_part_of_hash() {
        let a = submission().into_record().unwrap();
        let mut renamed = submission();
        renamed.song_title = "Different title".to_string();
        let b = renamed.into_record().unwrap();

        assert_eq!(a.content_hash, b.content_hash);
    }

    #[test]
    fn test_validation_rejects_blank_fields() {
        let mut bad = submission();
        bad.plain_lyric = "   ".to_string();
        assert!(matches!(bad.validate(), Err(Error::InvalidInput(_))));

        let mut bad = submission();
        bad.contributor_email = "not-an-email".to_string();
        assert!(matches!(bad.validate(), Err(Error::InvalidInput(_))));

        let mut bad = submission();
        bad.duration_seconds = -1;
        assert!(matches!(bad.into_record(), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_translation_language_normalized() {
        let record = NewTranslation {
            video_id: "vid".to_string(),
            language: "EN".to_string(),
            translated_lyric: "[00:01.00]hello".to_string(),
            contributor: "bob".to_string(),
            contributor_email: "bob@example.com".to_string(),
        }
        .into_record()
        .unwrap();

        assert_eq!(record.language, "en");
        assert_eq!(
            record.content_hash,
            content_hash::translation_hash("vid", "en", "[00:01.00]hello")
        );
    }

    #[test]
    fn test_translation_rejects_long_language_code() {
        let bad = NewTranslation {
            video_id: "vid".to_string(),
            language: "eng".to_string(),
            translated_lyric: "[00:01.00]hello".to_string(),
            contributor: "bob".to_string(),
            contributor_email: "bob@example.com".to_string(),
        };
        assert!(matches!(bad.validate(), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_page_from_options_clamps() {
        assert_eq!(Page::from_options(None, None, 20, 100), Page::new(20, 0));
        assert_eq!(Page::from_options(Some(500), Some(40), 20, 100), Page::new(100, 40));
        assert_eq!(Page::from_options(Some(0), None, 20, 100), Page::new(1, 0));
        assert_eq!(Page::new(10, 30).next(), Page::new(10, 40));
    }

    #[test]
    fn test_vote_direction_delta() {
        assert_eq!(VoteDirection::Up.delta(), 1);
        assert_eq!(VoteDirection::Down.delta(), -1);
    }

    #[test]
    fn test_serde_uses_camel_case() {
        let record = submission().into_record().unwrap();
        let json = serde_json::to_value(&record).unwrap();
        assert!(json.get("videoId").is_some());
        assert!(json.get("contentHash").is_some());
        assert!(json.get("syncedLyrics").is_some());
    }
}
