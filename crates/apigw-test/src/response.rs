//! Test response wrapper.

use crate::error::TestError;
use apigw_core::{ErrorEnvelope, HeaderSet, NormalizedResponse};
use http::{HeaderName, HeaderValue, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fmt;

/// Keys allowed in the wire shape of a response.
const WIRE_KEYS: [&str; 3] = ["statusCode", "body", "headers"];

/// A normalized response with helper methods for assertions.
pub struct TestResponse {
    inner: NormalizedResponse,
}

impl TestResponse {
    /// Wraps a normalized response.
    pub fn new(inner: NormalizedResponse) -> Self {
        Self { inner }
    }

    /// Parses a response from its wire shape.
    ///
    /// Fails unless the value is an object with an integer `statusCode`, an
    /// optional string `body`, a string-to-string `headers` map, and nothing
    /// else.
    pub fn from_wire(value: &Value) -> Result<Self, TestError> {
        let object = value
            .as_object()
            .ok_or_else(|| TestError::invalid_wire("response is not an object"))?;

        if let Some(key) = object.keys().find(|k| !WIRE_KEYS.contains(&k.as_str())) {
            return Err(TestError::invalid_wire(format!("unexpected key '{key}'")));
        }

        let status = object
            .get("statusCode")
            .and_then(Value::as_u64)
            .and_then(|n| u16::try_from(n).ok())
            .filter(|&n| n > 0)
            .ok_or_else(|| TestError::invalid_wire("statusCode must be a positive integer"))?;

        let body = match object.get("body") {
            None => None,
            Some(Value::String(body)) if !body.is_empty() => Some(body.clone()),
            Some(other) => {
                return Err(TestError::invalid_wire(format!(
                    "body must be a non-empty string, got {other}"
                )))
            }
        };

        let mut headers = HeaderSet::new();
        let raw_headers = object
            .get("headers")
            .and_then(Value::as_object)
            .ok_or_else(|| TestError::invalid_wire("headers must be an object"))?;
        for (name, value) in raw_headers {
            let value = value
                .as_str()
                .ok_or_else(|| TestError::invalid_wire(format!("header '{name}' is not a string")))?;
            headers.insert(name.clone(), value);
        }

        Ok(Self::new(NormalizedResponse::new(status, body, headers)))
    }

    /// Returns the status code.
    #[must_use]
    pub fn status(&self) -> u16 {
        self.inner.status()
    }

    /// Returns the status as an [`http::StatusCode`], if valid.
    #[must_use]
    pub fn status_code(&self) -> Option<StatusCode> {
        self.inner.status_code()
    }

    /// Returns true if the status is 2xx.
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status())
    }

    /// Returns true if the status is 4xx.
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.status())
    }

    /// Returns true if the status is 5xx.
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        (500..600).contains(&self.status())
    }

    /// Returns the response headers.
    #[must_use]
    pub fn headers(&self) -> &HeaderSet {
        self.inner.headers()
    }

    /// Returns a header value, matching the name ignoring case.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.inner.headers().get(name)
    }

    /// Returns the body, if any.
    #[must_use]
    pub fn body(&self) -> Option<&str> {
        self.inner.body()
    }

    /// Returns the body, or an error if there is none.
    pub fn text(&self) -> Result<&str, TestError> {
        self.body().ok_or(TestError::MissingBody)
    }

    /// Deserializes the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, TestError> {
        Ok(serde_json::from_str(self.text()?)?)
    }

    /// Deserializes the body as a JSON Value.
    pub fn json_value(&self) -> Result<Value, TestError> {
        self.json()
    }

    /// Parses the body as an error envelope.
    pub fn error_envelope(&self) -> Result<ErrorEnvelope, TestError> {
        let body = self.text()?;
        ErrorEnvelope::from_body(body).ok_or_else(|| TestError::NotAnEnvelope(body.to_string()))
    }

    /// Returns the messages of the error envelope.
    pub fn error_messages(&self) -> Result<Vec<String>, TestError> {
        Ok(self
            .error_envelope()?
            .errors
            .into_iter()
            .map(|e| e.message)
            .collect())
    }

    /// Returns the wrapped response.
    #[must_use]
    pub fn into_inner(self) -> NormalizedResponse {
        self.inner
    }

    // Assertion methods

    /// Asserts that the status code equals the expected value.
    ///
    /// # Panics
    ///
    /// Panics if the status code doesn't match.
    pub fn assert_status(&self, expected: u16) -> &Self {
        assert_eq!(
            self.status(),
            expected,
            "Expected status {}, got {} (body: {:?})",
            expected,
            self.status(),
            self.body()
        );
        self
    }

    /// Asserts that the response is successful (2xx).
    ///
    /// # Panics
    ///
    /// Panics if the status is not 2xx.
    pub fn assert_success(&self) -> &Self {
        assert!(
            self.is_success(),
            "Expected success status, got {}",
            self.status()
        );
        self
    }

    /// Asserts that a header exists with the expected value.
    ///
    /// # Panics
    ///
    /// Panics if the header doesn't exist or doesn't match.
    pub fn assert_header(&self, name: impl AsRef<str>, expected: impl AsRef<str>) -> &Self {
        let name = name.as_ref();
        let expected = expected.as_ref();
        let actual = self
            .header(name)
            .unwrap_or_else(|| panic!("Header '{}' not found", name));
        assert_eq!(
            actual, expected,
            "Header '{}': expected '{}', got '{}'",
            name, expected, actual
        );
        self
    }

    /// Asserts that the default CORS headers are present.
    ///
    /// # Panics
    ///
    /// Panics if either header is missing.
    pub fn assert_default_headers(&self) -> &Self {
        for (name, value) in apigw_core::headers::DEFAULT_HEADERS {
            self.assert_header(name, value);
        }
        self
    }

    /// Asserts that the response has no body.
    ///
    /// # Panics
    ///
    /// Panics if a body is present.
    pub fn assert_no_body(&self) -> &Self {
        assert!(
            self.body().is_none(),
            "Expected no body, got: {:?}",
            self.body()
        );
        self
    }

    /// Asserts that the body contains the expected substring.
    ///
    /// # Panics
    ///
    /// Panics if the body is missing or doesn't contain the substring.
    pub fn assert_body_contains(&self, expected: impl AsRef<str>) -> &Self {
        let expected = expected.as_ref();
        let body = self.text().expect("Response should have a body");
        assert!(
            body.contains(expected),
            "Body should contain '{}', got: {}",
            expected,
            body
        );
        self
    }

    /// Asserts that the body equals the expected string.
    ///
    /// # Panics
    ///
    /// Panics if the body is missing or doesn't match.
    pub fn assert_body_eq(&self, expected: impl AsRef<str>) -> &Self {
        let body = self.text().expect("Response should have a body");
        assert_eq!(body, expected.as_ref(), "Body mismatch");
        self
    }

    /// Asserts that the JSON body matches the expected value.
    ///
    /// # Panics
    ///
    /// Panics if the JSON doesn't match.
    pub fn assert_json_eq(&self, expected: &Value) -> &Self {
        let actual = self.json_value().expect("Body should be valid JSON");
        assert_eq!(&actual, expected, "JSON body mismatch");
        self
    }

    /// Asserts that a JSON field exists and equals the expected value.
    ///
    /// # Panics
    ///
    /// Panics if the field doesn't exist or doesn't match.
    pub fn assert_json_field(&self, path: impl AsRef<str>, expected: &Value) -> &Self {
        let path = path.as_ref();
        let json = self.json_value().expect("Body should be valid JSON");
        let actual = json_path(&json, path).unwrap_or_else(|| {
            panic!("JSON path '{}' not found in: {:?}", path, json);
        });
        assert_eq!(
            actual, expected,
            "JSON field '{}': expected {:?}, got {:?}",
            path, expected, actual
        );
        self
    }

    /// Asserts that the body is a single-message error envelope whose
    /// message contains `expected`.
    ///
    /// # Panics
    ///
    /// Panics if the body is not an envelope, has more or fewer than one
    /// entry, or the message doesn't match.
    pub fn assert_error_contains(&self, expected: impl AsRef<str>) -> &Self {
        let expected = expected.as_ref();
        let messages = self
            .error_messages()
            .unwrap_or_else(|e| panic!("Expected an error envelope: {e}"));
        assert_eq!(messages.len(), 1, "Expected exactly one error, got {:?}", messages);
        assert!(
            messages[0].contains(expected),
            "Error message should contain '{}', got: {:?}",
            expected,
            messages[0]
        );
        self
    }

    /// Asserts the wire invariants: positive status, non-empty body when
    /// present, valid HTTP headers, and a serialized shape with only the
    /// `statusCode`, `body` and `headers` keys.
    ///
    /// # Panics
    ///
    /// Panics if any invariant is violated.
    pub fn assert_well_formed(&self) -> &Self {
        assert!(self.status() > 0, "Status must be positive");
        if let Some(body) = self.body() {
            assert!(!body.is_empty(), "Body must be absent rather than empty");
        }
        for (name, value) in self.headers().iter() {
            assert!(
                HeaderName::from_bytes(name.as_bytes()).is_ok(),
                "Invalid header name: {:?}",
                name
            );
            assert!(
                HeaderValue::from_str(value).is_ok(),
                "Invalid value for header '{}': {:?}",
                name,
                value
            );
        }

        let wire = serde_json::to_value(&self.inner).expect("Response should serialize");
        let reparsed = TestResponse::from_wire(&wire)
            .unwrap_or_else(|e| panic!("Serialized response is not well-formed: {e}"));
        assert_eq!(reparsed.inner, self.inner, "Wire round trip changed the response");
        self
    }
}

impl From<NormalizedResponse> for TestResponse {
    fn from(inner: NormalizedResponse) -> Self {
        Self::new(inner)
    }
}

impl fmt::Debug for TestResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestResponse")
            .field("status", &self.status())
            .field("headers", self.headers())
            .field("body", &self.body())
            .finish()
    }
}

/// Simple JSON path accessor.
fn json_path<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = value;
    for segment in path.split('.') {
        if segment.is_empty() {
            continue;
        }
        // Handle array indexing like "errors.0.message"
        if let Ok(index) = segment.parse::<usize>() {
            current = current.get(index)?;
        } else {
            current = current.get(segment)?;
        }
    }
    Some(current)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn create_response(status: u16, body: Option<&str>) -> TestResponse {
        TestResponse::new(NormalizedResponse::new(
            status,
            body.map(str::to_string),
            HeaderSet::cors_defaults(),
        ))
    }

    #[test]
    fn test_status() {
        let response = create_response(200, None);
        assert_eq!(response.status(), 200);
        assert_eq!(response.status_code(), Some(StatusCode::OK));
        assert!(response.is_success());
    }

    #[test]
    fn test_client_and_server_errors() {
        assert!(create_response(404, None).is_client_error());
        assert!(create_response(503, None).is_server_error());
        assert!(!create_response(503, None).is_success());
    }

    #[test]
    fn test_json() {
        let response = create_response(200, Some(r#"{"name":"Alice","age":30}"#));
        let value = response.json_value().unwrap();
        assert_eq!(value["name"], "Alice");
        assert_eq!(value["age"], 30);
    }

    #[test]
    fn test_missing_body() {
        let response = create_response(204, None);
        assert!(matches!(response.text(), Err(TestError::MissingBody)));
        response.assert_no_body();
    }

    #[test]
    fn test_error_envelope() {
        let response = create_response(400, Some(r#"{"errors":[{"message":"Bad request.\nx"}]}"#));
        assert_eq!(response.error_messages().unwrap(), vec!["Bad request.\nx"]);
        response.assert_error_contains("Bad request");

        let plain = create_response(200, Some("ok"));
        assert!(matches!(plain.error_envelope(), Err(TestError::NotAnEnvelope(_))));
    }

    #[test]
    fn test_assertions_chain() {
        create_response(200, Some(r#"{"user":{"name":"Alice"}}"#))
            .assert_status(200)
            .assert_success()
            .assert_default_headers()
            .assert_header("access-control-allow-origin", "*")
            .assert_body_contains("Alice")
            .assert_json_field("user.name", &json!("Alice"))
            .assert_json_eq(&json!({ "user": { "name": "Alice" } }))
            .assert_well_formed();
    }

    #[test]
    fn test_from_wire() {
        let response = TestResponse::from_wire(&json!({
            "statusCode": 201,
            "body": "created",
            "headers": { "X-A": "1" }
        }))
        .unwrap();
        response.assert_status(201).assert_body_eq("created").assert_header("x-a", "1");
    }

    #[test]
    fn test_from_wire_rejects_bad_shapes() {
        let cases = [
            json!("nope"),
            json!({ "statusCode": 0, "headers": {} }),
            json!({ "statusCode": 200 }),
            json!({ "statusCode": 200, "headers": {}, "body": 5 }),
            json!({ "statusCode": 200, "headers": {}, "body": "" }),
            json!({ "statusCode": 200, "headers": { "X": 1 } }),
            json!({ "statusCode": 200, "headers": {}, "extra": true }),
        ];
        for case in cases {
            assert!(
                matches!(TestResponse::from_wire(&case), Err(TestError::InvalidWire(_))),
                "{case} should be rejected"
            );
        }
    }

    #[test]
    #[should_panic(expected = "Expected status 404")]
    fn test_assert_status_panics() {
        create_response(200, None).assert_status(404);
    }
}
