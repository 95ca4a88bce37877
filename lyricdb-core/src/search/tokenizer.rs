//! Query and document tokenization shared by the search adapters

use lyricdb_common::models::SearchDocument;

/// Lowercase alphanumeric runs, in order, duplicates kept
pub fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|word| !word.is_empty())
        .map(str::to_lowercase)
        .collect()
}

/// Searchable text of a document
pub fn document_tokens(doc: &SearchDocument) -> Vec<String> {
    let mut tokens = tokenize(&doc.song_title);
    tokens.extend(tokenize(&doc.artist_name));
    if let Some(album) = &doc.album_name {
        tokens.extend(tokenize(album));
    }
    tokens.sort();
    tokens.dedup();
    tokens
}
