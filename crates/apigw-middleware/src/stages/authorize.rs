//! Authorize stage.
//!
//! Runs the configured authorize action with the authorizer context found at
//! `requestContext.authorizer`. The action's return value is discarded; any
//! fault is handed to the authorize error translator, which by default
//! answers with a 401:
//!
//! ```json
//! { "errors": [ { "message": "Unauthorized.\n<fault>" } ] }
//! ```

use apigw_core::{Event, PipelineFault, RawResult, UNSUPPORTED_EVENT_MESSAGE};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

use crate::responder::respond_fault;
use crate::stage::{
    catch_fault, translate_fault, AuthorizeAction, ErrorTranslator, PipelineStage, StageKind,
    StageOutcome,
};

/// Stage 1: authorizer context validation.
#[derive(Clone)]
pub struct AuthorizeStage {
    action: Option<AuthorizeAction>,
    on_error: ErrorTranslator,
}

impl AuthorizeStage {
    /// Creates the stage. A missing translator falls back to
    /// [`AuthorizeStage::default_translator`].
    #[must_use]
    pub fn new(action: Option<AuthorizeAction>, on_error: Option<ErrorTranslator>) -> Self {
        Self {
            action,
            on_error: on_error.unwrap_or_else(Self::default_translator),
        }
    }

    /// The default translator: a 401 with an `"Unauthorized."` message.
    #[must_use]
    pub fn default_translator() -> ErrorTranslator {
        Arc::new(|fault: anyhow::Error| -> anyhow::Result<RawResult> {
            Ok(respond_fault(&PipelineFault::authorization(fault)).into())
        })
    }
}

impl fmt::Debug for AuthorizeStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthorizeStage")
            .field("enabled", &self.action.is_some())
            .finish_non_exhaustive()
    }
}

impl PipelineStage for AuthorizeStage {
    fn kind(&self) -> StageKind {
        StageKind::Authorize
    }

    fn is_enabled(&self) -> bool {
        self.action.is_some()
    }

    fn run(&self, event: &Event) -> StageOutcome {
        let Some(action) = &self.action else {
            return StageOutcome::Continue(None);
        };

        let result = if event.is_object() {
            catch_fault(|| action(event.authorizer_context()))
        } else {
            Err(anyhow::anyhow!(UNSUPPORTED_EVENT_MESSAGE))
        };

        match result {
            Ok(()) => StageOutcome::Continue(None),
            Err(fault) => {
                debug!(stage = self.kind().name(), error = %fault, "Authorization rejected");
                StageOutcome::Finish(translate_fault(self.kind(), &self.on_error, fault))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalizer::ResponseNormalizer;
    use serde_json::{json, Value};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn require_principal() -> AuthorizeAction {
        Arc::new(|ctx: Option<&Value>| {
            match ctx.and_then(|c| c.get("principalId")) {
                Some(_) => Ok(()),
                None => anyhow::bail!("missing principalId"),
            }
        })
    }

    fn finish(outcome: StageOutcome) -> RawResult {
        match outcome {
            StageOutcome::Finish(raw) => raw,
            StageOutcome::Continue(_) => panic!("expected the stage to finish"),
        }
    }

    #[test]
    fn test_disabled_stage_passes_through() {
        let stage = AuthorizeStage::new(None, None);
        assert!(!stage.is_enabled());
        assert!(matches!(stage.run(&Event::new(json!(42))), StageOutcome::Continue(None)));
    }

    #[test]
    fn test_accepts_valid_context() {
        let stage = AuthorizeStage::new(Some(require_principal()), None);
        let event = Event::new(json!({
            "requestContext": { "authorizer": { "principalId": "u-1" } }
        }));
        assert!(matches!(stage.run(&event), StageOutcome::Continue(None)));
    }

    #[test]
    fn test_rejection_uses_default_translator() {
        let stage = AuthorizeStage::new(Some(require_principal()), None);
        let response = ResponseNormalizer::default().normalize(finish(stage.run(&Event::empty())));

        assert_eq!(response.status(), 401);
        let message = &response.error_envelope().unwrap().errors[0].message;
        assert_eq!(message, "Unauthorized.\nmissing principalId");
    }

    #[test]
    fn test_action_sees_none_without_context() {
        let seen = Arc::new(AtomicUsize::new(0));
        let counter = seen.clone();
        let action: AuthorizeAction = Arc::new(move |ctx: Option<&Value>| {
            assert!(ctx.is_none());
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });

        let stage = AuthorizeStage::new(Some(action), None);
        let event = Event::new(json!({ "requestContext": { "authorizer": null } }));
        assert!(matches!(stage.run(&event), StageOutcome::Continue(None)));
        assert_eq!(seen.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_non_object_event_is_rejected() {
        let stage = AuthorizeStage::new(Some(Arc::new(|_: Option<&Value>| Ok(()))), None);
        let response =
            ResponseNormalizer::default().normalize(finish(stage.run(&Event::new(json!("raw")))));

        assert_eq!(response.status(), 401);
        assert!(response.error_envelope().unwrap().errors[0]
            .message
            .contains(UNSUPPORTED_EVENT_MESSAGE));
    }

    #[test]
    fn test_panicking_action_is_translated() {
        let action: AuthorizeAction = Arc::new(|_: Option<&Value>| panic!("authorizer exploded"));
        let stage = AuthorizeStage::new(Some(action), None);
        let response = ResponseNormalizer::default().normalize(finish(stage.run(&Event::empty())));

        assert_eq!(response.status(), 401);
        assert!(response.body().unwrap().contains("authorizer exploded"));
    }
}
