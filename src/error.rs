//! Error types for tracked record operations.

use crate::remote::{BatchItemResult, Request};
use crate::types::RecordId;
use thiserror::Error;

/// Main error type for record operations.
#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("Not configured: {0}")]
    NotConfigured(String),

    #[error("Record not found: {type_name} {id}")]
    NotFound { type_name: String, id: RecordId },

    #[error("Remote store error: {0}")]
    Remote(String),

    #[error("Precondition violated: {0}")]
    Precondition(String),

    #[error("Type mismatch: expected {expected}, got {type_name}")]
    TypeMismatch { type_name: String, expected: String },

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),

    #[error("{0}")]
    Invocation(String),

    /// A chunked submission stopped part way. Earlier chunks were committed
    /// and their results are kept; `unsent` was never submitted.
    #[error("Batch aborted after {submitted} requests: {source}")]
    BatchAborted {
        submitted: usize,
        results: Vec<BatchItemResult>,
        unsent: Vec<Request>,
        #[source]
        source: Box<TrackerError>,
    },
}

impl TrackerError {
    /// Convenience constructor for store-side failures.
    pub fn remote(message: impl Into<String>) -> Self {
        TrackerError::Remote(message.into())
    }
}

impl From<serde_json::Error> for TrackerError {
    fn from(e: serde_json::Error) -> Self {
        TrackerError::Serialization(e.to_string())
    }
}

/// Result type for record operations.
pub type Result<T> = std::result::Result<T, TrackerError>;
