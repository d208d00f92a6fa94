//! # apigw-test
//!
//! Test utilities for apigw-toolbox, providing gateway event builders and
//! assertion helpers for normalized responses.
//!
//! ## Key Features
//!
//! - **Event Builder**: Fluent API for proxy-shaped gateway events
//! - **Response Assertions**: Helper methods for validating responses
//! - **Error Envelopes**: Direct access to `{"errors": [..]}` messages
//! - **Wire Checks**: Verify the `{statusCode, body, headers}` shape
//!
//! ## Example
//!
//! ```
//! use apigw_core::{HeaderSet, NormalizedResponse};
//! use apigw_test::{EventBuilder, TestResponse};
//! use serde_json::json;
//!
//! let event = EventBuilder::post("/users")
//!     .principal("user-1")
//!     .json_body(json!({ "name": "Alice" }))
//!     .build();
//! assert!(event.authorizer_context().is_some());
//!
//! let response = TestResponse::new(NormalizedResponse::new(
//!     201,
//!     Some(r#"{"id":"123"}"#.to_string()),
//!     HeaderSet::cors_defaults(),
//! ));
//!
//! response
//!     .assert_status(201)
//!     .assert_default_headers()
//!     .assert_json_field("id", &json!("123"))
//!     .assert_well_formed();
//! ```

#![doc(html_root_url = "https://docs.rs/apigw-test/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod error;
mod request;
mod response;

pub use error::TestError;
pub use request::EventBuilder;
pub use response::TestResponse;
