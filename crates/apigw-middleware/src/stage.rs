//! Pipeline stage abstraction.
//!
//! The pipeline runs three stages in a fixed order:
//!
//! | Stage | Kind        | Action input                  | On success              |
//! |-------|-------------|-------------------------------|-------------------------|
//! | 1     | `Authorize` | `requestContext.authorizer`   | event passes unchanged  |
//! | 2     | `Parse`     | raw `body`                    | event gains parsed body |
//! | 3     | `Invoke`    | full event and context        | result becomes response |
//!
//! A failing action hands its fault to the stage's error translator, and
//! whatever the translator returns finishes the pipeline. A failing
//! translator is answered with a 500 naming the stage.

use apigw_core::{Event, FaultKind, PipelineFault, RawResult};
use serde_json::Value;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use tracing::error;

use crate::responder::respond_fault;

/// Action run by the authorize stage with the authorizer context.
///
/// Its return value is discarded; an `Err` rejects the request.
pub type AuthorizeAction = Arc<dyn Fn(Option<&Value>) -> anyhow::Result<()> + Send + Sync>;

/// Action run by the parse stage with the raw body.
///
/// Its return value is stored in the event under `middleware.body`.
pub type ParseAction = Arc<dyn Fn(Option<&Value>) -> anyhow::Result<Value> + Send + Sync>;

/// Converts a caught fault into a raw result.
pub type ErrorTranslator = Arc<dyn Fn(anyhow::Error) -> anyhow::Result<RawResult> + Send + Sync>;

/// Pipeline stage marker, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum StageKind {
    /// Stage 1: authorizer context validation
    Authorize = 1,
    /// Stage 2: payload parsing
    Parse = 2,
    /// Stage 3: handler invocation
    Invoke = 3,
}

impl StageKind {
    /// Returns the stage name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Authorize => "authorize",
            Self::Parse => "parse",
            Self::Invoke => "invoke",
        }
    }

    /// Returns all stages in order.
    #[must_use]
    pub const fn all() -> [StageKind; 3] {
        [Self::Authorize, Self::Parse, Self::Invoke]
    }

    /// Returns the kind of fault a failing action of this stage raises.
    #[must_use]
    pub const fn fault_kind(self) -> FaultKind {
        match self {
            Self::Authorize => FaultKind::Authorization,
            Self::Parse => FaultKind::Parse,
            Self::Invoke => FaultKind::Handler,
        }
    }
}

/// What a stage decided.
#[derive(Debug)]
pub enum StageOutcome {
    /// Continue with the next stage. `Some` carries an augmented copy of the
    /// event; `None` means the event passes through unchanged.
    Continue(Option<Event>),
    /// Stop the pipeline; the raw result is normalized and returned.
    Finish(RawResult),
}

/// A stage that runs before the handler.
///
/// Stages never fail: every fault is translated into a
/// [`StageOutcome::Finish`].
pub trait PipelineStage: Send + Sync {
    /// Returns which stage this is.
    fn kind(&self) -> StageKind;

    /// Returns `true` if the stage has an action configured.
    fn is_enabled(&self) -> bool;

    /// Runs the stage against the current event.
    fn run(&self, event: &Event) -> StageOutcome;
}

/// Runs user code, converting a panic into a fault.
pub(crate) fn catch_fault<T>(f: impl FnOnce() -> anyhow::Result<T>) -> anyhow::Result<T> {
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(result) => result,
        Err(payload) => Err(anyhow::anyhow!("panicked: {}", panic_message(&*payload))),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        *message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.as_str()
    } else {
        "unknown panic payload"
    }
}

/// Hands `fault` to `translator`, answering a failing translator with a 500.
pub(crate) fn translate_fault(
    kind: StageKind,
    translator: &ErrorTranslator,
    fault: anyhow::Error,
) -> RawResult {
    match catch_fault(|| translator(fault)) {
        Ok(raw) => raw,
        Err(secondary) => {
            let fault = PipelineFault::error_handler(kind.name(), secondary);
            error!(stage = kind.name(), error = %fault, "Error translator failed");
            respond_fault(&fault).into()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_stage_ordering() {
        assert!(StageKind::Authorize < StageKind::Parse);
        assert!(StageKind::Parse < StageKind::Invoke);
    }

    #[test]
    fn test_stage_names() {
        let names: Vec<&str> = StageKind::all().iter().map(|s| s.name()).collect();
        assert_eq!(names, vec!["authorize", "parse", "invoke"]);
    }

    #[test]
    fn test_fault_kinds() {
        assert_eq!(StageKind::Authorize.fault_kind().default_status_code(), 401);
        assert_eq!(StageKind::Parse.fault_kind().default_status_code(), 400);
        assert_eq!(StageKind::Invoke.fault_kind().default_status_code(), 500);
    }

    #[test]
    fn test_catch_fault_passes_results_through() {
        assert_eq!(catch_fault(|| Ok(3)).unwrap(), 3);
        let err = catch_fault::<()>(|| Err(anyhow::anyhow!("nope"))).unwrap_err();
        assert_eq!(err.to_string(), "nope");
    }

    #[test]
    fn test_catch_fault_converts_panics() {
        let err = catch_fault::<()>(|| panic!("kaboom")).unwrap_err();
        assert_eq!(err.to_string(), "panicked: kaboom");

        let code = 7;
        let err = catch_fault::<()>(|| panic!("code {code}")).unwrap_err();
        assert_eq!(err.to_string(), "panicked: code 7");
    }

    #[test]
    fn test_translate_fault_uses_translator_result() {
        let translator: ErrorTranslator =
            Arc::new(|_: anyhow::Error| Ok(RawResult::from(json!({ "statusCode": 403 }))));
        let raw = translate_fault(StageKind::Authorize, &translator, anyhow::anyhow!("x"));
        assert!(matches!(raw, RawResult::Value(v) if v == json!({ "statusCode": 403 })));
    }

    #[test]
    fn test_translate_fault_reports_failing_translator() {
        let translator: ErrorTranslator =
            Arc::new(|fault: anyhow::Error| -> anyhow::Result<RawResult> {
                Err(fault.context("translator broke"))
            });
        let raw = translate_fault(StageKind::Parse, &translator, anyhow::anyhow!("bad body"));

        let RawResult::Response(response) = raw else {
            panic!("expected a typed response");
        };
        assert_eq!(response.status(), 500);
    }
}
