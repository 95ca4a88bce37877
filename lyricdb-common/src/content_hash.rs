//! Content fingerprints used as de-duplication keys
//!
//! The digest is SHA-256 over the UTF-8 bytes of the fields joined with `-`,
//! hex encoded (64 characters). Optional fields that are absent are replaced
//! with [`ABSENT`] so that "no value" and "empty value" never collide.

use sha2::{Digest, Sha256};

/// Separator placed between fields before hashing
pub const SEPARATOR: &str = "-";

/// Stand-in for a missing optional field
pub const ABSENT: &str = "\u{0}absent\u{0}";

/// Hash an ordered list of fields
pub fn hash_fields<I, S>(fields: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut hasher = Sha256::new();
    for (index, field) in fields.into_iter().enumerate() {
        if index > 0 {
            hasher.update(SEPARATOR.as_bytes());
        }
        hasher.update(field.as_ref().as_bytes());
    }
    format!("{:x}", hasher.finalize())
}

/// Field value for hashing, mapping `None` to [`ABSENT`]
pub fn optional(value: Option<&str>) -> &str {
    value.unwrap_or(ABSENT)
}

/// Fingerprint of a lyric's immutable content
pub fn lyric_hash(
    video_id: &str,
    duration_seconds: i64,
    plain_lyric: &str,
    synced_lyrics: Option<&str>,
    rich_sync_lyrics: Option<&str>,
) -> String {
    let duration = duration_seconds.to_string();
    hash_fields([
        video_id,
        duration.as_str(),
        plain_lyric,
        optional(synced_lyrics),
        optional(rich_sync_lyrics),
    ])
}

/// Fingerprint of a translation's immutable content
pub fn translation_hash(video_id: &str, language: &str, translated_lyric: &str) -> String {
    hash_fields([video_id, language, translated_lyric])
}
