//! Parse stage.
//!
//! Runs the configured parse action with the raw `body` of the event and
//! continues with an augmented copy holding the payload under
//! `middleware.body`. Faults go to the parse error translator, which by
//! default answers with a 400 `"Bad request."` envelope.

use apigw_core::{Event, PipelineFault, RawResult, UNSUPPORTED_EVENT_MESSAGE};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

use crate::responder::respond_fault;
use crate::stage::{
    catch_fault, translate_fault, ErrorTranslator, ParseAction, PipelineStage, StageKind,
    StageOutcome,
};

/// Stage 2: payload parsing.
#[derive(Clone)]
pub struct ParseStage {
    action: Option<ParseAction>,
    on_error: ErrorTranslator,
}

impl ParseStage {
    /// Creates the stage. A missing translator falls back to
    /// [`ParseStage::default_translator`].
    #[must_use]
    pub fn new(action: Option<ParseAction>, on_error: Option<ErrorTranslator>) -> Self {
        Self {
            action,
            on_error: on_error.unwrap_or_else(Self::default_translator),
        }
    }

    /// The default translator: a 400 with a `"Bad request."` message.
    #[must_use]
    pub fn default_translator() -> ErrorTranslator {
        Arc::new(|fault: anyhow::Error| -> anyhow::Result<RawResult> {
            Ok(respond_fault(&PipelineFault::parse(fault)).into())
        })
    }
}

impl fmt::Debug for ParseStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParseStage")
            .field("enabled", &self.action.is_some())
            .finish_non_exhaustive()
    }
}

impl PipelineStage for ParseStage {
    fn kind(&self) -> StageKind {
        StageKind::Parse
    }

    fn is_enabled(&self) -> bool {
        self.action.is_some()
    }

    fn run(&self, event: &Event) -> StageOutcome {
        let Some(action) = &self.action else {
            return StageOutcome::Continue(None);
        };

        let result = if event.is_object() {
            catch_fault(|| action(event.body()))
        } else {
            Err(anyhow::anyhow!(UNSUPPORTED_EVENT_MESSAGE))
        };

        match result {
            Ok(payload) => StageOutcome::Continue(Some(event.with_parsed_body(payload))),
            Err(fault) => {
                debug!(stage = self.kind().name(), error = %fault, "Payload rejected");
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

    fn json_body() -> ParseAction {
        Arc::new(|body: Option<&Value>| -> anyhow::Result<Value> {
            match body {
                Some(Value::String(text)) => Ok(serde_json::from_str(text)?),
                Some(other) => Ok(other.clone()),
                None => anyhow::bail!("body is required"),
            }
        })
    }

    #[test]
    fn test_disabled_stage_passes_through() {
        let stage = ParseStage::new(None, None);
        assert!(!stage.is_enabled());
        assert!(matches!(stage.run(&Event::empty()), StageOutcome::Continue(None)));
    }

    #[test]
    fn test_success_augments_copy() {
        let stage = ParseStage::new(Some(json_body()), None);
        let event = Event::new(json!({ "body": "{\"name\":\"alice\"}" }));

        let StageOutcome::Continue(Some(augmented)) = stage.run(&event) else {
            panic!("expected an augmented event");
        };
        assert_eq!(augmented.parsed_body(), Some(&json!({ "name": "alice" })));
        assert!(event.parsed_body().is_none());
    }

    #[test]
    fn test_failure_uses_default_translator() {
        let stage = ParseStage::new(Some(json_body()), None);
        let event = Event::new(json!({ "body": "{not json" }));

        let StageOutcome::Finish(raw) = stage.run(&event) else {
            panic!("expected the stage to finish");
        };
        let response = ResponseNormalizer::default().normalize(raw);
        assert_eq!(response.status(), 400);
        assert!(response.error_envelope().unwrap().errors[0]
            .message
            .starts_with("Bad request.\n"));
    }

    #[test]
    fn test_null_body_is_none() {
        let stage = ParseStage::new(Some(json_body()), None);
        let event = Event::new(json!({ "body": null }));

        let StageOutcome::Finish(raw) = stage.run(&event) else {
            panic!("expected the stage to finish");
        };
        let response = ResponseNormalizer::default().normalize(raw);
        assert!(response.body().unwrap().contains("body is required"));
    }

    #[test]
    fn test_custom_translator_status() {
        let translator: ErrorTranslator =
            Arc::new(|fault: anyhow::Error| -> anyhow::Result<RawResult> {
                Ok(json!({ "statusCode": 422, "body": { "reason": fault.to_string() } }).into())
            });
        let stage = ParseStage::new(Some(json_body()), Some(translator));

        let StageOutcome::Finish(raw) = stage.run(&Event::empty()) else {
            panic!("expected the stage to finish");
        };
        let response = ResponseNormalizer::default().normalize(raw);
        assert_eq!(response.status(), 422);
        assert_eq!(response.body(), Some(r#"{"reason":"body is required"}"#));
    }
}
