//! Test event building.

use crate::error::TestError;
use apigw_core::event::{AUTHORIZER_KEY, BODY_KEY, REQUEST_CONTEXT_KEY};
use apigw_core::Event;
use serde::Serialize;
use serde_json::{Map, Value};

/// Builder for gateway events shaped like proxy requests.
///
/// # Example
///
/// ```
/// use apigw_test::EventBuilder;
/// use serde_json::json;
///
/// let event = EventBuilder::post("/users")
///     .principal("user-1")
///     .json_body(json!({ "name": "alice" }))
///     .build();
///
/// assert_eq!(event.body(), Some(&json!("{\"name\":\"alice\"}")));
/// assert_eq!(
///     event.authorizer_context(),
///     Some(&json!({ "principalId": "user-1" }))
/// );
/// ```
#[must_use]
#[derive(Debug, Clone, Default)]
pub struct EventBuilder {
    fields: Map<String, Value>,
}

impl EventBuilder {
    /// Creates an empty event builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a builder for a GET request.
    pub fn get(path: impl Into<String>) -> Self {
        Self::new().method("GET").path(path)
    }

    /// Creates a builder for a POST request.
    pub fn post(path: impl Into<String>) -> Self {
        Self::new().method("POST").path(path)
    }

    /// Sets `httpMethod`.
    pub fn method(self, method: impl Into<String>) -> Self {
        self.field("httpMethod", Value::String(method.into()))
    }

    /// Sets `path`.
    pub fn path(self, path: impl Into<String>) -> Self {
        self.field("path", Value::String(path.into()))
    }

    /// Adds a request header under `headers`.
    pub fn header(self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.nested("headers", name.into(), Value::String(value.into()))
    }

    /// Adds a query parameter under `queryStringParameters`.
    pub fn query(self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.nested("queryStringParameters", name.into(), Value::String(value.into()))
    }

    /// Sets a raw text body.
    pub fn body(self, body: impl Into<String>) -> Self {
        self.field(BODY_KEY, Value::String(body.into()))
    }

    /// Sets the body to the JSON text of `value`, the way the gateway
    /// delivers it.
    pub fn json_body(self, value: Value) -> Self {
        self.body(value.to_string())
    }

    /// Sets the body to the JSON text of any serializable value.
    pub fn try_json_body<T: Serialize>(self, value: &T) -> Result<Self, TestError> {
        Ok(self.body(serde_json::to_string(value)?))
    }

    /// Sets an already structured body.
    pub fn structured_body(self, value: Value) -> Self {
        self.field(BODY_KEY, value)
    }

    /// Sets the body to `null`.
    pub fn null_body(self) -> Self {
        self.field(BODY_KEY, Value::Null)
    }

    /// Sets `requestContext.authorizer`.
    pub fn authorizer(self, context: Value) -> Self {
        self.nested(REQUEST_CONTEXT_KEY, AUTHORIZER_KEY.to_string(), context)
    }

    /// Sets `requestContext.authorizer` to `{"principalId": id}`.
    pub fn principal(self, id: impl Into<String>) -> Self {
        let mut context = Map::new();
        context.insert("principalId".to_string(), Value::String(id.into()));
        self.authorizer(Value::Object(context))
    }

    /// Sets an arbitrary top-level field.
    pub fn field(mut self, key: impl Into<String>, value: Value) -> Self {
        self.fields.insert(key.into(), value);
        self
    }

    /// Builds the event.
    pub fn build(self) -> Event {
        Event::new(self.build_value())
    }

    /// Builds the event as a raw JSON value.
    pub fn build_value(self) -> Value {
        Value::Object(self.fields)
    }

    fn nested(mut self, parent: &str, key: String, value: Value) -> Self {
        let entry = self
            .fields
            .entry(parent.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        if !entry.is_object() {
            *entry = Value::Object(Map::new());
        }
        if let Value::Object(map) = entry {
            map.insert(key, value);
        }
        self
    }
}
