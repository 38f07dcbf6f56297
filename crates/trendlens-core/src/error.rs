// ABOUTME: Error taxonomy for the analytics toolkit, shared across all operations.
// ABOUTME: Callers branch on the variant; the string boundary flattens it to one message.

use thiserror::Error;

/// Errors that can occur while ingesting records or running an operation.
///
/// Every operation either fully succeeds or reports exactly one of these;
/// there are no partial results.
#[derive(Debug, Error)]
pub enum AnalyticsError {
    /// The payload was not parseable JSON or did not have the expected shape.
    #[error("malformed input: {0}")]
    MalformedInput(String),

    /// One or more columns the operation requires are absent or mistyped.
    #[error("{0}")]
    MissingColumns(String),

    /// Fewer usable rows remained than the operation's fixed minimum.
    #[error("Insufficient data for forecasting")]
    InsufficientData,

    /// A numerical routine failed unexpectedly during fitting or statistics.
    #[error("computation failed: {0}")]
    Computation(String),
}

impl From<serde_json::Error> for AnalyticsError {
    fn from(err: serde_json::Error) -> Self {
        AnalyticsError::MalformedInput(err.to_string())
    }
}
