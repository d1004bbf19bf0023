//! Error types for tacomail API calls and mail waiting.

/// Boxed error type accepted from caller-supplied predicates.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors produced by tacomail API calls.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Transport failure or non-2xx HTTP status from the tacomail API.
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The response was valid JSON but missing an expected field.
    #[error("unexpected response shape: {0}")]
    ResponseParse(String),

    /// JSON (de)serialization failed.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors that terminate a wait call.
///
/// Timeout and cancellation are not errors; they are normal outcomes and
/// reported through [`crate::WaitOutcome`]. A `WaitError` means the wait
/// could not run to a verdict: the inbox poll failed, the caller's predicate
/// failed, or the wait was misconfigured.
#[derive(Debug, thiserror::Error)]
pub enum WaitError {
    /// An inbox poll failed. The wait stops at the first failed poll;
    /// retrying is left to the caller.
    #[error("inbox poll failed: {0}")]
    Transport(#[from] Error),

    /// The caller-supplied predicate returned an error.
    #[error("predicate failed: {0}")]
    Predicate(BoxError),

    /// The wait was invoked with arguments that cannot produce a poll.
    #[error("invalid wait arguments: {0}")]
    InvalidArguments(&'static str),
}
