//! Raw and normalized responses.
//!
//! User code hands back a [`RawResult`]: either an untyped JSON value (the
//! shape a gateway handler traditionally returns) or a typed [`RawResponse`].
//! Nothing about a raw result is trusted. The middleware's normalizer turns
//! it into a [`NormalizedResponse`], the only shape that reaches the gateway.
//!
//! # Wire format
//!
//! ```json
//! {
//!   "statusCode": 200,
//!   "body": "{\"id\":\"123\"}",
//!   "headers": { "Access-Control-Allow-Origin": "*" }
//! }
//! ```
//!
//! `body` is omitted when the response has no body.

use serde::Serialize;
use serde_json::Value;
use std::fmt;

use crate::envelope::ErrorEnvelope;
use crate::headers::HeaderSet;

/// A value that can be rendered to JSON text.
///
/// Blanket-implemented for every [`Serialize`] type, so typed bodies can be
/// stored type-erased and serialized only when the response is normalized.
pub trait JsonBody {
    /// Renders the value as compact JSON.
    fn to_json_string(&self) -> serde_json::Result<String>;
}

impl<T: Serialize> JsonBody for T {
    fn to_json_string(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// The body of a typed [`RawResponse`].
pub enum Body {
    /// Text passed through unchanged.
    Text(String),
    /// An untyped JSON value, dispatched on its shape during normalization.
    Value(Value),
    /// A typed value serialized during normalization.
    Json(Box<dyn JsonBody>),
}

impl fmt::Debug for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => f.debug_tuple("Text").field(text).finish(),
            Self::Value(value) => f.debug_tuple("Value").field(value).finish(),
            Self::Json(_) => f.write_str("Json(..)"),
        }
    }
}

/// A typed raw response.
///
/// # Example
///
/// ```
/// use apigw_core::RawResponse;
///
/// #[derive(serde::Serialize)]
/// struct User {
///     id: String,
/// }
///
/// let response = RawResponse::new(201)
///     .with_header("Location", "/users/123")
///     .with_json(User { id: "123".to_string() });
///
/// assert_eq!(response.status(), 201);
/// ```
#[derive(Debug)]
pub struct RawResponse {
    status: u16,
    headers: HeaderSet,
    body: Option<Body>,
}

impl RawResponse {
    /// Creates a response with the given status and no body.
    #[must_use]
    pub fn new(status: u16) -> Self {
        Self {
            status,
            headers: HeaderSet::new(),
            body: None,
        }
    }

    /// Creates a `200 OK` response with no body.
    #[must_use]
    pub fn ok() -> Self {
        Self::new(200)
    }

    /// Adds a header.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Applies a set of headers on top of the current ones.
    #[must_use]
    pub fn with_headers(mut self, headers: &HeaderSet) -> Self {
        self.headers.extend_from(headers);
        self
    }

    /// Sets a text body.
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.body = Some(Body::Text(text.into()));
        self
    }

    /// Sets an untyped JSON body.
    #[must_use]
    pub fn with_value(mut self, value: Value) -> Self {
        self.body = Some(Body::Value(value));
        self
    }

    /// Sets a typed body, serialized when the response is normalized.
    #[must_use]
    pub fn with_json<T: Serialize + 'static>(mut self, body: T) -> Self {
        self.body = Some(Body::Json(Box::new(body)));
        self
    }

    /// Returns the status code.
    #[must_use]
    pub fn status(&self) -> u16 {
        self.status
    }

    /// Returns the headers.
    #[must_use]
    pub fn headers(&self) -> &HeaderSet {
        &self.headers
    }

    /// Returns the body, if any.
    #[must_use]
    pub fn body(&self) -> Option<&Body> {
        self.body.as_ref()
    }

    /// Splits the response into its parts.
    #[must_use]
    pub fn into_parts(self) -> (u16, HeaderSet, Option<Body>) {
        (self.status, self.headers, self.body)
    }
}

/// Whatever a handler or error translator produced, before normalization.
#[derive(Debug)]
pub enum RawResult {
    /// An untyped value, expected to look like
    /// `{"statusCode": <int>, "body": .., "headers": {..}}`.
    Value(Value),
    /// A typed response.
    Response(RawResponse),
}

impl From<Value> for RawResult {
    fn from(value: Value) -> Self {
        Self::Value(value)
    }
}

impl From<RawResponse> for RawResult {
    fn from(response: RawResponse) -> Self {
        Self::Response(response)
    }
}

impl From<NormalizedResponse> for RawResult {
    fn from(response: NormalizedResponse) -> Self {
        let mut raw = RawResponse::new(response.status).with_headers(&response.headers);
        if let Some(body) = response.body {
            raw = raw.with_text(body);
        }
        Self::Response(raw)
    }
}

/// The canonical response handed back to the gateway.
///
/// Invariants:
/// - `status` is positive.
/// - `body` is either absent or a non-empty string.
/// - `headers` is always present (possibly empty).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NormalizedResponse {
    #[serde(rename = "statusCode")]
    status: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    body: Option<String>,
    headers: HeaderSet,
}

impl NormalizedResponse {
    /// Creates a normalized response.
    ///
    /// An empty body is dropped and a zero status becomes 500, so the
    /// invariants hold for any input.
    #[must_use]
    pub fn new(status: u16, body: Option<String>, headers: HeaderSet) -> Self {
        Self {
            status: if status == 0 { 500 } else { status },
            body: body.filter(|b| !b.is_empty()),
            headers,
        }
    }

    /// Creates a response whose body is the given error envelope.
    #[must_use]
    pub fn from_envelope(status: u16, envelope: &ErrorEnvelope, headers: HeaderSet) -> Self {
        Self::new(status, Some(envelope.to_json_string()), headers)
    }

    /// Replaces the headers.
    #[must_use]
    pub fn with_headers(mut self, headers: HeaderSet) -> Self {
        self.headers = headers;
        self
    }

    /// Returns the status code.
    #[must_use]
    pub fn status(&self) -> u16 {
        self.status
    }

    /// Returns the status as an [`http::StatusCode`], if it is a valid one.
    #[must_use]
    pub fn status_code(&self) -> Option<http::StatusCode> {
        http::StatusCode::from_u16(self.status).ok()
    }

    /// Returns the body, if any.
    #[must_use]
    pub fn body(&self) -> Option<&str> {
        self.body.as_deref()
    }

    /// Returns the headers.
    #[must_use]
    pub fn headers(&self) -> &HeaderSet {
        &self.headers
    }

    /// Parses the body as an error envelope.
    #[must_use]
    pub fn error_envelope(&self) -> Option<ErrorEnvelope> {
        self.body().and_then(ErrorEnvelope::from_body)
    }

    /// Renders the response in its wire shape.
    #[must_use]
    pub fn to_json_value(&self) -> Value {
        let mut object = serde_json::Map::new();
        object.insert("statusCode".to_string(), Value::from(self.status));
        if let Some(body) = &self.body {
            object.insert("body".to_string(), Value::String(body.clone()));
        }
        let headers = self
            .headers
            .iter()
            .map(|(k, v)| (k.to_string(), Value::String(v.to_string())))
            .collect();
        object.insert("headers".to_string(), Value::Object(headers));
        Value::Object(object)
    }

    /// Splits the response into its parts.
    #[must_use]
    pub fn into_parts(self) -> (u16, Option<String>, HeaderSet) {
        (self.status, self.body, self.headers)
    }
}
