//! Fault taxonomy for the middleware pipeline.
//!
//! Every failure the pipeline can observe is described by a
//! [`PipelineFault`]. Each fault belongs to a [`FaultKind`], which carries
//! the HTTP status used when the fault is turned into a response:
//!
//! | `FaultKind`       | Status | Raised by                               |
//! |-------------------|--------|-----------------------------------------|
//! | `Authorization`   | 401    | the authorize action                    |
//! | `Parse`           | 400    | the parse action                        |
//! | `Handler`         | 500    | the wrapped business handler            |
//! | `ErrorHandler`    | 500    | a user-supplied error translator        |
//! | `MalformedReturn` | 500    | a return value with no usable status    |
//! | `Serialization`   | 500    | a structured body that failed to render |
//!
//! Faults raised by user code are carried as [`anyhow::Error`], so actions and
//! handlers can use `?` and `anyhow::bail!` freely.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::envelope::ErrorEnvelope;

/// Message used when a stage needs an object event and gets something else.
pub const UNSUPPORTED_EVENT_MESSAGE: &str = "Middleware only supports events that are JSON objects";

/// Message used for handler faults when they are not exposed to callers.
pub const DEFAULT_INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

/// Categories of pipeline faults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FaultKind {
    /// The authorize action rejected the request.
    Authorization,
    /// The parse action rejected the payload.
    Parse,
    /// The business handler failed.
    Handler,
    /// A user-supplied error translator failed.
    ErrorHandler,
    /// A handler or translator returned something without a usable status.
    MalformedReturn,
    /// A structured response body could not be serialized.
    Serialization,
}

impl FaultKind {
    /// Returns the default HTTP status code for this kind of fault.
    #[must_use]
    pub const fn default_status_code(&self) -> u16 {
        match self {
            Self::Authorization => 401,
            Self::Parse => 400,
            Self::Handler | Self::ErrorHandler | Self::MalformedReturn | Self::Serialization => 500,
        }
    }

    /// Returns a stable snake_case name, used in log fields.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Authorization => "authorization",
            Self::Parse => "parse",
            Self::Handler => "handler",
            Self::ErrorHandler => "error_handler",
            Self::MalformedReturn => "malformed_return",
            Self::Serialization => "serialization",
        }
    }
}

/// A fault observed while running the pipeline.
///
/// The `Display` output of a fault is exactly the message placed in the
/// response's [`ErrorEnvelope`].
///
/// # Example
///
/// ```
/// use apigw_core::{FaultKind, PipelineFault};
///
/// let fault = PipelineFault::authorization(anyhow::anyhow!("token expired"));
/// assert_eq!(fault.kind(), FaultKind::Authorization);
/// assert_eq!(fault.status_code(), 401);
/// assert_eq!(fault.to_string(), "Unauthorized.\ntoken expired");
/// ```
#[derive(Error, Debug)]
pub enum PipelineFault {
    /// The authorize action failed.
    #[error("Unauthorized.\n{source}")]
    Authorization {
        /// The fault raised by the action.
        source: anyhow::Error,
    },

    /// The parse action failed.
    #[error("Bad request.\n{source}")]
    Parse {
        /// The fault raised by the action.
        source: anyhow::Error,
    },

    /// The wrapped handler failed.
    #[error("{source}")]
    Handler {
        /// The fault raised by the handler.
        source: anyhow::Error,
    },

    /// A user-supplied error translator failed while handling another fault.
    #[error("Unhandled exception in error handler ({stage}).\n{source}")]
    ErrorHandler {
        /// Name of the stage whose translator failed.
        stage: &'static str,
        /// The fault raised by the translator.
        source: anyhow::Error,
    },

    /// A return value did not carry a positive integer status.
    #[error(
        "Invalid handler return: expected an object with an integer status and an optional string-or-object body"
    )]
    MalformedReturn,

    /// A structured body could not be serialized.
    #[error("Error while returning response. Return body as string instead.\n{source}")]
    Serialization {
        /// The serializer error, or the panic raised by a `Serialize` impl.
        source: anyhow::Error,
    },
}

impl PipelineFault {
    /// Creates an authorization fault.
    #[must_use]
    pub fn authorization(source: anyhow::Error) -> Self {
        Self::Authorization { source }
    }

    /// Creates a parse fault.
    #[must_use]
    pub fn parse(source: anyhow::Error) -> Self {
        Self::Parse { source }
    }

    /// Creates a handler fault.
    #[must_use]
    pub fn handler(source: anyhow::Error) -> Self {
        Self::Handler { source }
    }

    /// Creates a fault for a failing error translator of `stage`.
    #[must_use]
    pub fn error_handler(stage: &'static str, source: anyhow::Error) -> Self {
        Self::ErrorHandler { stage, source }
    }

    /// Creates a serialization fault.
    #[must_use]
    pub fn serialization(source: impl Into<anyhow::Error>) -> Self {
        Self::Serialization {
            source: source.into(),
        }
    }

    /// Returns the fault kind.
    #[must_use]
    pub const fn kind(&self) -> FaultKind {
        match self {
            Self::Authorization { .. } => FaultKind::Authorization,
            Self::Parse { .. } => FaultKind::Parse,
            Self::Handler { .. } => FaultKind::Handler,
            Self::ErrorHandler { .. } => FaultKind::ErrorHandler,
            Self::MalformedReturn => FaultKind::MalformedReturn,
            Self::Serialization { .. } => FaultKind::Serialization,
        }
    }

    /// Returns the HTTP status code for this fault.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        self.kind().default_status_code()
    }

    /// Converts this fault into a single-message error envelope.
    #[must_use]
    pub fn to_envelope(&self) -> ErrorEnvelope {
        ErrorEnvelope::single(self.to_string())
    }
}
