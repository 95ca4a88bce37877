//! Result envelope for asynchronous use cases
//!
//! Every public operation of the lyric service answers with a stream of
//! [`Envelope`] values. The stream contract:
//!
//! - `InProgress` may appear zero or more times, always before the terminal value
//! - exactly one terminal value (`Success` or `Error`) ends the stream
//! - nothing follows the terminal value
//!
//! Consumers must treat `InProgress` as non-terminal and keep polling. The only
//! constructor for [`EnvelopeStream`] is [`pipeline`], which emits the terminal
//! value as the last item of a generator, so the contract holds by construction.

use crate::error::{Error, ErrorCode, Result};
use futures::stream::{Stream, StreamExt};
use serde::Serialize;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// One state of an asynchronous operation
#[derive(Debug, Clone)]
pub enum Envelope<T> {
    /// Work is ongoing; carries no detail
    InProgress,
    /// Terminal success
    Success(T),
    /// Terminal failure
    Error(EnvelopeError),
}

/// Failure payload of a terminal envelope
#[derive(Debug, Clone, Serialize)]
pub struct EnvelopeError {
    /// Classification; `None` means unclassified (callers treat as server error)
    pub code: Option<ErrorCode>,
    pub message: String,
    /// Underlying error, kept for logging and diagnostics
    #[serde(skip)]
    pub cause: Option<Arc<Error>>,
}

impl EnvelopeError {
    /// Failure with a classification and no underlying cause
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code: Some(code),
            message: message.into(),
            cause: None,
        }
    }

    /// Classification, defaulting unclassified failures to `ServerError`
    pub fn code_or_default(&self) -> ErrorCode {
        self.code.unwrap_or(ErrorCode::ServerError)
    }
}

impl From<Error> for EnvelopeError {
    fn from(err: Error) -> Self {
        Self {
            code: Some(err.code()),
            message: err.to_string(),
            cause: Some(Arc::new(err)),
        }
    }
}

impl std::fmt::Display for EnvelopeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code_or_default(), self.message)
    }
}

impl<T> Envelope<T> {
    /// True for `Success` and `Error`
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Envelope::InProgress)
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Envelope::Success(_))
    }

    /// Transform the success payload, leaving other states untouched
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Envelope<U> {
        match self {
            Envelope::InProgress => Envelope::InProgress,
            Envelope::Success(value) => Envelope::Success(f(value)),
            Envelope::Error(err) => Envelope::Error(err),
        }
    }

    /// Chain a dependent step.
    ///
    /// An `Error` is returned unchanged and `f` never runs; a `Success`
    /// payload feeds `f`.
    pub fn and_then<U>(self, f: impl FnOnce(T) -> Envelope<U>) -> Envelope<U> {
        match self {
            Envelope::InProgress => Envelope::InProgress,
            Envelope::Success(value) => f(value),
            Envelope::Error(err) => Envelope::Error(err),
        }
    }

    /// Convert a terminal envelope into a `Result`; `None` for `InProgress`
    pub fn into_result(self) -> Option<std::result::Result<T, EnvelopeError>> {
        match self {
            Envelope::InProgress => None,
            Envelope::Success(value) => Some(Ok(value)),
            Envelope::Error(err) => Some(Err(err)),
        }
    }
}

impl<T> From<Result<T>> for Envelope<T> {
    fn from(outcome: Result<T>) -> Self {
        match outcome {
            Ok(value) => Envelope::Success(value),
            Err(err) => Envelope::Error(err.into()),
        }
    }
}

/// Boxed stream of envelopes returned by every use case
pub type EnvelopeStream<T> = Pin<Box<dyn Stream<Item = Envelope<T>> + Send>>;

/// Run `operation` as an envelope stream.
///
/// Emits `InProgress` once, then the terminal value of `operation`. The future
/// is polled only while the stream is polled; dropping the stream cancels it.
pub fn pipeline<T, F>(operation: F) -> EnvelopeStream<T>
where
    T: Send + 'static,
    F: Future<Output = Result<T>> + Send + 'static,
{
    Box::pin(async_stream::stream! {
        yield Envelope::InProgress;
        let outcome = operation.await;
        yield Envelope::from(outcome);
    })
}

/// Wait for the terminal value of an envelope stream.
///
/// `InProgress` items are skipped. A stream that ends without a terminal
/// value resolves to a `ServerError`.
pub async fn terminal<T>(mut stream: EnvelopeStream<T>) -> std::result::Result<T, EnvelopeError> {
    while let Some(envelope) = stream.next().await {
        if let Some(outcome) = envelope.into_result() {
            return outcome;
        }
    }
    Err(EnvelopeError::new(
        ErrorCode::ServerError,
        "operation ended without a terminal result",
    ))
}
