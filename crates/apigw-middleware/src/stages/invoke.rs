//! Invoke stage.
//!
//! Calls the wrapped handler with the (possibly augmented) event and the
//! opaque invocation context. The handler has no error translator: a fault
//! or panic always becomes a 500 envelope. When handler errors are not
//! exposed, the envelope carries a fixed message instead and the fault is
//! only logged.

use apigw_core::{Event, PipelineFault, RawResult, DEFAULT_INTERNAL_ERROR_MESSAGE};
use tracing::error;

use crate::responder::{respond_error, respond_fault};
use crate::stage::{catch_fault, StageKind};

/// Stage 3: handler invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvokeStage {
    expose_errors: bool,
    internal_error_message: String,
}

impl Default for InvokeStage {
    fn default() -> Self {
        Self::new(true, DEFAULT_INTERNAL_ERROR_MESSAGE)
    }
}

impl InvokeStage {
    /// Creates the stage.
    #[must_use]
    pub fn new(expose_errors: bool, internal_error_message: impl Into<String>) -> Self {
        Self {
            expose_errors,
            internal_error_message: internal_error_message.into(),
        }
    }

    /// Returns which stage this is.
    #[must_use]
    pub const fn kind(&self) -> StageKind {
        StageKind::Invoke
    }

    /// Returns `true` if handler fault messages reach the response.
    #[must_use]
    pub const fn exposes_errors(&self) -> bool {
        self.expose_errors
    }

    /// Calls `handler`, turning faults and panics into a 500 result.
    pub fn run<H, C, R>(&self, handler: &H, event: &Event, context: C) -> RawResult
    where
        H: Fn(&Event, C) -> anyhow::Result<R>,
        R: Into<RawResult>,
    {
        match catch_fault(|| handler(event, context).map(Into::<RawResult>::into)) {
            Ok(raw) => raw,
            Err(source) => {
                let fault = PipelineFault::handler(source);
                error!(stage = self.kind().name(), error = %fault, "Handler failed");
                if self.expose_errors {
                    respond_fault(&fault).into()
                } else {
                    respond_error(&self.internal_error_message, fault.status_code()).into()
                }
            }
        }
    }
}
