//! The error envelope returned on every failure path.
//!
//! ```json
//! {
//!   "errors": [
//!     { "message": "Human-readable error message" }
//!   ]
//! }
//! ```

use serde::{Deserialize, Serialize};

/// Body used when even the envelope cannot be rendered.
const FALLBACK_BODY: &str = r#"{"errors":[{"message":"Internal server error"}]}"#;

/// Serializable error envelope for failure responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    /// The reported errors. Responses built by the middleware carry exactly one.
    pub errors: Vec<ErrorEntry>,
}

/// A single entry of an [`ErrorEnvelope`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorEntry {
    /// Human-readable error message.
    pub message: String,
}

impl ErrorEnvelope {
    /// Creates an envelope with a single message.
    #[must_use]
    pub fn single(message: impl Into<String>) -> Self {
        Self {
            errors: vec![ErrorEntry {
                message: message.into(),
            }],
        }
    }

    /// Iterates over the messages in the envelope.
    pub fn messages(&self) -> impl Iterator<Item = &str> {
        self.errors.iter().map(|e| e.message.as_str())
    }

    /// Renders the envelope as compact JSON.
    ///
    /// The envelope only holds strings, so rendering cannot fail in practice;
    /// a fixed generic body is returned if it ever does.
    #[must_use]
    pub fn to_json_string(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| FALLBACK_BODY.to_string())
    }

    /// Parses an envelope out of a response body.
    ///
    /// Returns `None` if the body is not an error envelope.
    #[must_use]
    pub fn from_body(body: &str) -> Option<Self> {
        serde_json::from_str(body).ok()
    }
}
