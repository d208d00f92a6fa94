//! Response headers.
//!
//! [`HeaderSet`] is an ordered string-to-string map whose names compare
//! case-insensitively, the way HTTP header names do. Merging two sets is
//! right-biased: entries from the overriding set replace entries with the
//! same name (in any case) from the base set.
//!
//! ## Default headers
//!
//! Every normalized response starts from [`DEFAULT_HEADERS`], which allows
//! any origin and credentials:
//!
//! - `Access-Control-Allow-Origin: *`
//! - `Access-Control-Allow-Credentials: true`

use http::{HeaderName, HeaderValue};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};

/// `Access-Control-Allow-Origin` header.
pub const ALLOW_ORIGIN: &str = "Access-Control-Allow-Origin";

/// `Access-Control-Allow-Credentials` header.
pub const ALLOW_CREDENTIALS: &str = "Access-Control-Allow-Credentials";

/// Headers applied to every response unless overridden.
pub const DEFAULT_HEADERS: [(&str, &str); 2] = [(ALLOW_ORIGIN, "*"), (ALLOW_CREDENTIALS, "true")];

/// An ordered, case-insensitive set of response headers.
///
/// # Example
///
/// ```
/// use apigw_core::HeaderSet;
///
/// let defaults = HeaderSet::cors_defaults();
/// let overrides: HeaderSet = [("access-control-allow-origin", "https://app.example.com")]
///     .into_iter()
///     .collect();
///
/// let merged = defaults.merged(&overrides);
/// assert_eq!(merged.get("Access-Control-Allow-Origin"), Some("https://app.example.com"));
/// assert_eq!(merged.get("access-control-allow-credentials"), Some("true"));
/// assert_eq!(merged.len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(from = "IndexMap<String, String>")]
pub struct HeaderSet(IndexMap<String, String>);

impl HeaderSet {
    /// Creates an empty header set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a header set holding [`DEFAULT_HEADERS`].
    #[must_use]
    pub fn cors_defaults() -> Self {
        DEFAULT_HEADERS.into_iter().collect()
    }

    /// Builds a header set from a JSON object, never failing.
    ///
    /// String values are kept as-is, `null` entries are skipped, other
    /// scalars are stringified and structured values are rendered as compact
    /// JSON text.
    #[must_use]
    pub fn from_json_lossy(object: &Map<String, Value>) -> Self {
        let mut headers = Self::new();
        for (name, value) in object {
            let rendered = match value {
                Value::Null => continue,
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            headers.insert(name.clone(), rendered);
        }
        headers
    }

    /// Inserts a header, replacing any entry whose name matches ignoring
    /// ASCII case.
    ///
    /// The replaced entry keeps its position but takes the new spelling.
    /// Returns the previous value, if any.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) -> Option<String> {
        let name = name.into();
        let value = value.into();

        if let Some(index) = self.position(&name) {
            if let Some((_, previous)) = self.0.shift_remove_index(index) {
                self.0.shift_insert(index, name, value);
                return Some(previous);
            }
        }

        self.0.insert(name, value);
        None
    }

    /// Returns the value of a header, matching the name ignoring ASCII case.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.position(name)
            .and_then(|index| self.0.get_index(index))
            .map(|(_, value)| value.as_str())
    }

    /// Returns `true` if the header is present (ignoring ASCII case).
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// Returns the number of headers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if there are no headers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over `(name, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Returns a new set with `overrides` applied on top of `self`.
    #[must_use]
    pub fn merged(&self, overrides: &HeaderSet) -> HeaderSet {
        let mut merged = self.clone();
        merged.extend_from(overrides);
        merged
    }

    /// Applies every entry of `other` on top of `self`.
    pub fn extend_from(&mut self, other: &HeaderSet) {
        for (name, value) in other.iter() {
            self.insert(name, value);
        }
    }

    /// Returns the first entry that is not a valid HTTP header, if any.
    #[must_use]
    pub fn find_invalid(&self) -> Option<(&str, &str)> {
        self.iter().find(|(name, value)| {
            HeaderName::from_bytes(name.as_bytes()).is_err() || HeaderValue::from_str(value).is_err()
        })
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.0.keys().position(|k| k.eq_ignore_ascii_case(name))
    }
}

impl Serialize for HeaderSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.serialize(serializer)
    }
}

impl From<IndexMap<String, String>> for HeaderSet {
    fn from(map: IndexMap<String, String>) -> Self {
        map.into_iter().collect()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for HeaderSet {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut headers = Self::new();
        for (name, value) in iter {
            headers.insert(name, value);
        }
        headers
    }
}

impl<'a> IntoIterator for &'a HeaderSet {
    type Item = (&'a String, &'a String);
    type IntoIter = indexmap::map::Iter<'a, String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn test_cors_defaults() {
        let headers = HeaderSet::cors_defaults();
        assert_eq!(headers.get(ALLOW_ORIGIN), Some("*"));
        assert_eq!(headers.get(ALLOW_CREDENTIALS), Some("true"));
        assert_eq!(headers.len(), 2);
    }

    #[test]
    fn test_insert_is_case_insensitive() {
        let mut headers = HeaderSet::new();
        headers.insert("content-type", "text/plain");
        let previous = headers.insert("Content-Type", "application/json");

        assert_eq!(previous.as_deref(), Some("text/plain"));
        assert_eq!(headers.len(), 1);
        assert_eq!(headers.get("CONTENT-TYPE"), Some("application/json"));
        assert_eq!(headers.iter().next(), Some(("Content-Type", "application/json")));
    }

    #[test]
    fn test_replace_keeps_position() {
        let mut headers: HeaderSet = [("a", "1"), ("b", "2"), ("c", "3")].into_iter().collect();
        headers.insert("B", "20");
        let names: Vec<&str> = headers.iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["a", "B", "c"]);
    }

    #[test]
    fn test_merge_is_right_biased() {
        let base = HeaderSet::cors_defaults();
        let overrides: HeaderSet = [("X-Foo", "bar"), ("access-control-allow-origin", "https://a.example")]
            .into_iter()
            .collect();

        let merged = base.merged(&overrides);
        assert_eq!(merged.get("x-foo"), Some("bar"));
        assert_eq!(merged.get(ALLOW_ORIGIN), Some("https://a.example"));
        assert_eq!(merged.get(ALLOW_CREDENTIALS), Some("true"));
        assert_eq!(merged.len(), 3);

        // Inputs are untouched.
        assert_eq!(base.get(ALLOW_ORIGIN), Some("*"));
    }

    #[test]
    fn test_from_json_lossy() {
        let object = json!({
            "X-Text": "plain",
            "X-Number": 42,
            "X-Bool": false,
            "X-Null": null,
            "X-Object": { "a": 1 }
        });
        let headers = HeaderSet::from_json_lossy(object.as_object().unwrap());

        assert_eq!(headers.get("x-text"), Some("plain"));
        assert_eq!(headers.get("x-number"), Some("42"));
        assert_eq!(headers.get("x-bool"), Some("false"));
        assert!(!headers.contains("x-null"));
        assert_eq!(headers.get("x-object"), Some(r#"{"a":1}"#));
    }

    #[test]
    fn test_find_invalid() {
        assert!(HeaderSet::cors_defaults().find_invalid().is_none());

        let headers: HeaderSet = [("bad name", "v")].into_iter().collect();
        assert_eq!(headers.find_invalid(), Some(("bad name", "v")));

        let headers: HeaderSet = [("x-ok", "line\nbreak")].into_iter().collect();
        assert!(headers.find_invalid().is_some());
    }

    #[test]
    fn test_serde_round_trip_deduplicates() {
        let headers: HeaderSet =
            serde_json::from_str(r#"{"X-A":"1","x-a":"2","X-B":"3"}"#).unwrap();
        assert_eq!(headers.len(), 2);
        assert_eq!(headers.get("X-A"), Some("2"));
        assert_eq!(
            serde_json::to_value(&headers).unwrap(),
            json!({ "x-a": "2", "X-B": "3" })
        );
    }

    proptest! {
        #[test]
        fn merge_never_duplicates_names(
            base in proptest::collection::vec(("[a-zA-Z-]{1,8}", "[a-z]{0,4}"), 0..8),
            overrides in proptest::collection::vec(("[a-zA-Z-]{1,8}", "[a-z]{0,4}"), 0..8),
        ) {
            let base: HeaderSet = base.into_iter().collect();
            let overrides: HeaderSet = overrides.into_iter().collect();
            let merged = base.merged(&overrides);

            let mut seen = std::collections::HashSet::new();
            for (name, _) in merged.iter() {
                prop_assert!(seen.insert(name.to_ascii_lowercase()));
            }
            for (name, value) in overrides.iter() {
                prop_assert_eq!(merged.get(name), Some(value));
            }
        }
    }
}
