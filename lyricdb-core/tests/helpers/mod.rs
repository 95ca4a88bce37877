//! Test Helper Utilities
//!
//! Shared utilities for testing lyricdb-core

#![allow(dead_code)]

pub mod counting_store;
pub mod fixtures;
pub mod scripted_index;

// Re-export commonly used items
pub use counting_store::CountingStore;
pub use fixtures::{lyric_submission, seeded_lyric, translation_submission};
pub use scripted_index::ScriptedIndex;
