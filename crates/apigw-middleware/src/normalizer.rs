//! Response normalization.
//!
//! [`ResponseNormalizer`] is the single exit point of the pipeline. It takes
//! whatever user code produced and shapes it into a [`NormalizedResponse`],
//! and it never fails.
//!
//! ## Decision procedure
//!
//! The raw result is inspected in a fixed order:
//!
//! | Step | Check                                         | Outcome                               |
//! |------|-----------------------------------------------|---------------------------------------|
//! | 1    | not an object, or no positive `statusCode`    | 500 "Invalid handler return"          |
//! | 2    | `headers`                                     | merged over the default headers       |
//! | 3a   | body absent, `null` or `""`                   | no body                               |
//! | 3b   | body is an object, array or typed value       | compact JSON, or 500 on failure       |
//! | 3c   | body is a non-empty string                    | passed through                        |
//! | 3d   | body is a number or boolean                   | stringified                           |
//!
//! Headers are present on every path, fallbacks included.

use apigw_core::{Body, HeaderSet, JsonBody, NormalizedResponse, PipelineFault, RawResponse, RawResult};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::responder::respond_fault;
use crate::stage::catch_fault;

/// Raw field holding the status code.
pub const STATUS_KEY: &str = "statusCode";

/// Raw field holding the body.
pub const BODY_KEY: &str = "body";

/// Raw field holding the headers.
pub const HEADERS_KEY: &str = "headers";

/// The shape of a raw body, in dispatch order.
enum BodyShape {
    Absent,
    Structured(Box<dyn JsonBody>),
    Text(String),
    Scalar(String),
}

impl BodyShape {
    fn from_value(value: Option<Value>) -> Self {
        match value {
            None | Some(Value::Null) => Self::Absent,
            Some(Value::String(text)) if text.is_empty() => Self::Absent,
            Some(Value::String(text)) => Self::Text(text),
            Some(value @ (Value::Object(_) | Value::Array(_))) => Self::Structured(Box::new(value)),
            Some(scalar) => Self::Scalar(scalar.to_string()),
        }
    }

    fn from_body(body: Option<Body>) -> Self {
        match body {
            None => Self::Absent,
            Some(Body::Text(text)) if text.is_empty() => Self::Absent,
            Some(Body::Text(text)) => Self::Text(text),
            Some(Body::Value(value)) => Self::from_value(Some(value)),
            Some(Body::Json(body)) => Self::Structured(body),
        }
    }
}

/// Shapes raw results into normalized responses.
///
/// # Example
///
/// ```
/// use apigw_middleware::ResponseNormalizer;
/// use serde_json::json;
///
/// let normalizer = ResponseNormalizer::default();
///
/// let response = normalizer.normalize(json!({ "statusCode": 200, "body": { "a": 1 } }));
/// assert_eq!(response.status(), 200);
/// assert_eq!(response.body(), Some(r#"{"a":1}"#));
/// assert_eq!(response.headers().get("Access-Control-Allow-Origin"), Some("*"));
///
/// let malformed = normalizer.normalize(json!("not a response"));
/// assert_eq!(malformed.status(), 500);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseNormalizer {
    default_headers: HeaderSet,
}

impl Default for ResponseNormalizer {
    fn default() -> Self {
        Self::new(HeaderSet::cors_defaults())
    }
}

impl ResponseNormalizer {
    /// Creates a normalizer that applies `default_headers` to every response.
    #[must_use]
    pub fn new(default_headers: HeaderSet) -> Self {
        Self { default_headers }
    }

    /// Returns the default headers.
    #[must_use]
    pub fn default_headers(&self) -> &HeaderSet {
        &self.default_headers
    }

    /// Normalizes a raw result. Never fails.
    pub fn normalize(&self, raw: impl Into<RawResult>) -> NormalizedResponse {
        match raw.into() {
            RawResult::Value(value) => self.normalize_value(value),
            RawResult::Response(response) => self.normalize_response(response),
        }
    }

    fn normalize_value(&self, raw: Value) -> NormalizedResponse {
        let Value::Object(mut fields) = raw else {
            return self.malformed("return value is not an object");
        };
        let Some(status) = fields.get(STATUS_KEY).and_then(status_from_value) else {
            return self.malformed("missing or invalid statusCode");
        };

        let headers = self.default_headers.merged(&raw_headers(&mut fields));
        let body = BodyShape::from_value(fields.remove(BODY_KEY));
        assemble(status, body, headers)
    }

    fn normalize_response(&self, raw: RawResponse) -> NormalizedResponse {
        let (status, headers, body) = raw.into_parts();
        if status == 0 {
            return self.malformed("status is zero");
        }

        let headers = self.default_headers.merged(&headers);
        assemble(status, BodyShape::from_body(body), headers)
    }

    fn malformed(&self, reason: &'static str) -> NormalizedResponse {
        warn!(reason, "Malformed handler return");
        respond_fault(&PipelineFault::MalformedReturn).with_headers(self.default_headers.clone())
    }
}

fn status_from_value(value: &Value) -> Option<u16> {
    value
        .as_u64()
        .and_then(|n| u16::try_from(n).ok())
        .filter(|&n| n > 0)
}

fn raw_headers(fields: &mut Map<String, Value>) -> HeaderSet {
    match fields.remove(HEADERS_KEY) {
        None | Some(Value::Null) => HeaderSet::new(),
        Some(Value::Object(object)) => HeaderSet::from_json_lossy(&object),
        Some(other) => {
            warn!(headers = %other, "Ignoring non-object headers in handler return");
            HeaderSet::new()
        }
    }
}

fn assemble(status: u16, body: BodyShape, headers: HeaderSet) -> NormalizedResponse {
    let body = match body {
        BodyShape::Absent => None,
        BodyShape::Text(text) | BodyShape::Scalar(text) => Some(text),
        // User `Serialize` impls run here, so a panic is caught like any
        // other user fault.
        BodyShape::Structured(value) => match catch_fault(move || Ok(value.to_json_string()?)) {
            Ok(json) => Some(json),
            Err(source) => {
                let fault = PipelineFault::serialization(source);
                warn!(status, error = %fault, "Response body failed to serialize");
                return respond_fault(&fault).with_headers(headers);
            }
        },
    };

    debug!(status, has_body = body.is_some(), "Response normalized");
    NormalizedResponse::new(status, body, headers)
}
