//! Orchestration services
//!
//! The three building blocks (de-duplication, not-found tracking, vote
//! mutation) are generic over the store traits so they can be tested against
//! any adapter. [`LyricService`] composes them with the search index into the
//! public use cases.

pub mod dedup_guard;
pub mod lyric_service;
pub mod not_found_tracker;
pub mod vote_mutator;

pub use dedup_guard::DeduplicationGuard;
pub use lyric_service::LyricService;
pub use not_found_tracker::NotFoundTracker;
pub use vote_mutator::VoteMutator;
