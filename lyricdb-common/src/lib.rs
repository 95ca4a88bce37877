//! # lyricdb Common Library
//!
//! Shared code for the lyricdb crates including:
//! - Error taxonomy and the result envelope returned by every use case
//! - Content hashing for de-duplication
//! - Lyric, translation, not-found and search-document models
//! - Configuration loading
//! - SQLite schema setup

pub mod config;
pub mod content_hash;
#[cfg(feature = "sqlx")]
pub mod db;
pub mod envelope;
pub mod error;
pub mod models;
pub mod uuid_utils;

pub use envelope::{Envelope, EnvelopeError, EnvelopeStream};
pub use error::{Error, ErrorCode, Result};
