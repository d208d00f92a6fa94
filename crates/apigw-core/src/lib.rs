//! # apigw-core
//!
//! Core types for the apigw-toolbox middleware.
//!
//! This crate provides the data model shared by every other crate in the
//! workspace:
//!
//! - [`Event`] - The incoming gateway event (opaque JSON, read-only)
//! - [`RawResult`] - Whatever user code handed back, before normalization
//! - [`RawResponse`] - A typed raw result with a lazily serialized [`Body`]
//! - [`NormalizedResponse`] - The canonical `{statusCode, body, headers}` output
//! - [`HeaderSet`] - Case-insensitive, ordered response headers
//! - [`ErrorEnvelope`] - The `{"errors": [{"message": ..}]}` failure body
//! - [`PipelineFault`] - Fault taxonomy with default status codes

#![doc(html_root_url = "https://docs.rs/apigw-core/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod envelope;
mod error;
pub mod event;
pub mod headers;
mod response;

pub use envelope::{ErrorEntry, ErrorEnvelope};
pub use error::{
    FaultKind, PipelineFault, DEFAULT_INTERNAL_ERROR_MESSAGE, UNSUPPORTED_EVENT_MESSAGE,
};
pub use event::Event;
pub use headers::HeaderSet;
pub use response::{Body, JsonBody, NormalizedResponse, RawResponse, RawResult};
