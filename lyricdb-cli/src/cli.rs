//! Command-line arguments

use clap::{Args, Parser, Subcommand};
use lyricdb_common::models::VoteDirection;
use std::path::PathBuf;

/// Command-line arguments for lyricdb
#[derive(Parser, Debug)]
#[command(name = "lyricdb")]
#[command(about = "Lyrics repository: store, search, de-duplicate and vote on lyrics")]
#[command(version)]
pub struct Cli {
    /// Config file (falls back to LYRICDB_CONFIG, then the platform config dir)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Log filter, overrides the configured level (e.g. "debug", "lyricdb_core=trace")
    #[arg(long, global = true, env = "LYRICDB_LOG")]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    /// Lyrics stored for a video
    Fetch { video_id: String },

    /// One lyric by id
    Get { id: String },

    /// Submit lyrics from a JSON file
    Save { file: PathBuf },

    /// Full-text search over title, artist and album
    Search {
        query: String,

        #[arg(long)]
        limit: Option<u32>,

        #[arg(long)]
        offset: Option<u32>,
    },

    /// Up- or down-vote a lyric
    Vote {
        id: String,

        #[command(flatten)]
        direction: DirectionArg,
    },

    /// Translations stored for a video
    Translations {
        video_id: String,

        /// Two-letter language code
        #[arg(short, long)]
        language: Option<String>,
    },

    /// Submit a translation from a JSON file
    SaveTranslation { file: PathBuf },

    /// Up- or down-vote a translation
    VoteTranslation {
        id: String,

        #[command(flatten)]
        direction: DirectionArg,
    },

    /// Rebuild the search index from the primary store
    Reindex,
}

/// Exactly one of `--up` / `--down`
#[derive(Args, Debug, Clone, Copy, PartialEq, Eq)]
#[group(required = true, multiple = false)]
pub struct DirectionArg {
    #[arg(long)]
    pub up: bool,

    #[arg(long)]
    pub down: bool,
}

impl DirectionArg {
    pub fn vote(self) -> VoteDirection {
        if self.up {
            VoteDirection::Up
        } else {
            VoteDirection::Down
        }
    }
}
