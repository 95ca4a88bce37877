//! # lyricdb core
//!
//! Persistence orchestration for the lyrics repository:
//! - `store` - primary store contracts with SQLite and in-memory adapters
//! - `search` - full-text search index contracts with FTS5 and in-memory adapters
//! - `services` - de-duplication, not-found tracking, voting and the
//!   [`LyricService`] use cases built on them
//!
//! Every use case answers with an [`EnvelopeStream`](lyricdb_common::EnvelopeStream).

pub mod search;
pub mod services;
pub mod store;

pub use search::{open_index, SearchIndex};
pub use services::LyricService;
pub use store::{open_store, NotFoundStore, PrimaryStore, RecordStore};
