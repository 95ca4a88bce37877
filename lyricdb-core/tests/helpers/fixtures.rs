//! Submission and record fixtures

use lyricdb_common::models::{LyricRecord, NewLyric, NewTranslation};

/// Valid lyric submission; `plain` varies the content hash
pub fn lyric_submission(video_id: &str, title: &str, plain: &str) -> NewLyric {
    NewLyric {
        video_id: video_id.to_string(),
        song_title: title.to_string(),
        artist_name: "Test Artist".to_string(),
        album_name: Some("Test Album".to_string()),
        duration_seconds: 215,
        plain_lyric: plain.to_string(),
        synced_lyrics: None,
        rich_sync_lyrics: None,
        contributor: "tester".to_string(),
        contributor_email: "tester@example.com".to_string(),
    }
}

pub fn translation_submission(video_id: &str, language: &str, text: &str) -> NewTranslation {
    NewTranslation {
        video_id: video_id.to_string(),
        language: language.to_string(),
        translated_lyric: text.to_string(),
        contributor: "tester".to_string(),
        contributor_email: "tester@example.com".to_string(),
    }
}

/// Stored lyric with a fixed id, for tests that script search hits
pub fn seeded_lyric(id: &str, title: &str) -> LyricRecord {
    let mut record = lyric_submission(&format!("video-{}", id), title, &format!("lyric {}", id))
        .into_record()
        .unwrap();
    record.id = id.to_string();
    record
}
