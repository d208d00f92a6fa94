//! Test error types.

use thiserror::Error;

/// Errors that can occur during testing.
#[derive(Debug, Error)]
pub enum TestError {
    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The response has no body
    #[error("Response has no body")]
    MissingBody,

    /// The response body is not an error envelope
    #[error("Body is not an error envelope: {0}")]
    NotAnEnvelope(String),

    /// A wire-format response does not have the expected shape
    #[error("Invalid wire response: {0}")]
    InvalidWire(String),
}

impl TestError {
    /// Creates an invalid wire response error.
    pub fn invalid_wire(message: impl Into<String>) -> Self {
        Self::InvalidWire(message.into())
    }
}
