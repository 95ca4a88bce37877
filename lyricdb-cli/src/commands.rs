//! Use-case dispatch and JSON output
//!
//! Each command drives one envelope stream to its terminal value and renders
//! that value as a single JSON document:
//!
//! ```json
//! {"status":"success","data":{...}}
//! {"status":"error","code":"CONFLICT","message":"..."}
//! ```

use crate::cli::Command;
use anyhow::{Context, Result};
use lyricdb_common::envelope::terminal;
use lyricdb_common::models::{NewLyric, NewTranslation};
use lyricdb_common::{EnvelopeError, EnvelopeStream, ErrorCode};
use lyricdb_core::LyricService;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;
use tracing::{debug, warn};

/// Terminal value of a command, ready for output
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum Outcome {
    Success { data: serde_json::Value },
    Error { code: ErrorCode, message: String },
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success { .. })
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("Failed to render output")
    }
}

impl From<EnvelopeError> for Outcome {
    fn from(err: EnvelopeError) -> Self {
        Outcome::Error {
            code: err.code_or_default(),
            message: err.message,
        }
    }
}

/// Run `command` against `service`.
///
/// Use-case failures become [`Outcome::Error`]; only local problems (an
/// unreadable input file, malformed JSON) are returned as `Err`.
pub async fn execute(service: &LyricService, command: Command) -> Result<Outcome> {
    debug!(?command, "Executing command");

    match command {
        Command::Fetch { video_id } => finish(service.fetch_by_video_id(&video_id)).await,
        Command::Get { id } => finish(service.fetch_by_id(&id)).await,
        Command::Save { file } => {
            let submission: NewLyric = read_json(&file)?;
            finish(service.save(submission)).await
        }
        Command::Search {
            query,
            limit,
            offset,
        } => finish(service.search(&query, limit, offset)).await,
        Command::Vote { id, direction } => {
            finish(service.vote(&id, direction.vote().delta())).await
        }
        Command::Translations { video_id, language } => {
            finish(service.fetch_translations(&video_id, language.as_deref())).await
        }
        Command::SaveTranslation { file } => {
            let submission: NewTranslation = read_json(&file)?;
            finish(service.save_translation(submission)).await
        }
        Command::VoteTranslation { id, direction } => {
            finish(service.vote_translation(&id, direction.vote().delta())).await
        }
        Command::Reindex => finish(service.reindex()).await,
    }
}

async fn finish<T: Serialize>(stream: EnvelopeStream<T>) -> Result<Outcome> {
    match terminal(stream).await {
        Ok(value) => {
            let data = serde_json::to_value(value).context("Failed to serialize result")?;
            Ok(Outcome::Success { data })
        }
        Err(err) => {
            if let Some(cause) = &err.cause {
                warn!(code = %err.code_or_default(), error = %cause, "Command failed");
            }
            Ok(err.into())
        }
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
}
