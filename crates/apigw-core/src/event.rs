//! Gateway invocation events.
//!
//! An [`Event`] is the raw JSON document the gateway hands to a function. The
//! middleware only ever reads from it: stages that need to pass data forward
//! produce an augmented copy instead of mutating the caller's value.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Key holding the raw request body.
pub const BODY_KEY: &str = "body";

/// Key holding the request context object.
pub const REQUEST_CONTEXT_KEY: &str = "requestContext";

/// Key (inside the request context) holding the authorizer context.
pub const AUTHORIZER_KEY: &str = "authorizer";

/// Side-channel key under which the middleware stores its own data.
pub const MIDDLEWARE_KEY: &str = "middleware";

/// An incoming gateway event.
///
/// Events are usually JSON objects shaped like an API Gateway proxy request,
/// but any JSON value is accepted. Accessors return `None` rather than
/// failing when the expected structure is missing.
///
/// # Example
///
/// ```
/// use apigw_core::Event;
/// use serde_json::json;
///
/// let event = Event::new(json!({
///     "body": "{\"name\":\"alice\"}",
///     "requestContext": { "authorizer": { "principalId": "user-1" } }
/// }));
///
/// assert_eq!(event.body(), Some(&json!("{\"name\":\"alice\"}")));
/// assert_eq!(
///     event.authorizer_context(),
///     Some(&json!({ "principalId": "user-1" }))
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Event(Value);

impl Event {
    /// Wraps a JSON value as an event.
    #[must_use]
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    /// Creates an empty object event.
    #[must_use]
    pub fn empty() -> Self {
        Self(Value::Object(Map::new()))
    }

    /// Returns the underlying JSON value.
    #[must_use]
    pub fn as_value(&self) -> &Value {
        &self.0
    }

    /// Consumes the event and returns the underlying JSON value.
    #[must_use]
    pub fn into_value(self) -> Value {
        self.0
    }

    /// Returns `true` if the event is a JSON object.
    #[must_use]
    pub fn is_object(&self) -> bool {
        self.0.is_object()
    }

    /// Looks up a top-level field.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Returns the raw request body.
    ///
    /// A `null` body is reported as absent.
    #[must_use]
    pub fn body(&self) -> Option<&Value> {
        self.get(BODY_KEY).filter(|v| !v.is_null())
    }

    /// Returns the authorizer context found at `requestContext.authorizer`.
    ///
    /// Returns `None` if either level is missing, not an object, or `null`.
    #[must_use]
    pub fn authorizer_context(&self) -> Option<&Value> {
        self.get(REQUEST_CONTEXT_KEY)
            .and_then(Value::as_object)
            .and_then(|ctx| ctx.get(AUTHORIZER_KEY))
            .filter(|v| !v.is_null())
    }

    /// Returns the payload stored by the parse stage, if any.
    #[must_use]
    pub fn parsed_body(&self) -> Option<&Value> {
        self.get(MIDDLEWARE_KEY)
            .and_then(Value::as_object)
            .and_then(|mw| mw.get(BODY_KEY))
    }

    /// Returns a copy of this event with `middleware.body` set to `payload`.
    ///
    /// The original event is left untouched. Any existing `middleware` entry
    /// is replaced. A non-object event yields an object holding only the
    /// side-channel entry.
    #[must_use]
    pub fn with_parsed_body(&self, payload: Value) -> Self {
        let mut fields = self.0.as_object().cloned().unwrap_or_default();

        let mut side_channel = Map::new();
        side_channel.insert(BODY_KEY.to_string(), payload);
        fields.insert(MIDDLEWARE_KEY.to_string(), Value::Object(side_channel));

        Self(Value::Object(fields))
    }
}

impl From<Value> for Event {
    fn from(value: Value) -> Self {
        Self::new(value)
    }
}

impl From<Event> for Value {
    fn from(event: Event) -> Self {
        event.into_value()
    }
}
