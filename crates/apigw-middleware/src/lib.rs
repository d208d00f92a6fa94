//! # apigw-middleware
//!
//! Request/response normalization middleware for API gateway handlers.
//!
//! This crate wraps a business handler with a fixed-order pipeline and
//! guarantees that every invocation ends in a well-formed
//! [`NormalizedResponse`](apigw_core::NormalizedResponse), whatever the
//! handler returned, raised or panicked with.
//!
//! ## Pipeline Stages
//!
//! ```text
//! Event → Authorize → Parse → Invoke → Normalize → NormalizedResponse
//! ```
//!
//! | Stage | Name        | Purpose                                  | Default failure |
//! |-------|-------------|------------------------------------------|-----------------|
//! | 1     | `authorize` | Validate `requestContext.authorizer`     | 401             |
//! | 2     | `parse`     | Parse the body into `middleware.body`    | 400             |
//! | 3     | `invoke`    | Call the wrapped handler                 | 500             |
//!
//! ## Key Features
//!
//! - **Fixed Order**: Stages cannot be reordered, only skipped
//! - **Total**: No fault or panic escapes the pipeline
//! - **Single Exit**: Every raw result is normalized exactly once
//! - **Synchronous**: No runtime, no I/O, no shared mutable state
//!
//! ## Example
//!
//! ```
//! use apigw_core::Event;
//! use apigw_middleware::{Middleware, StageKind};
//! use serde_json::json;
//!
//! let stages = StageKind::all();
//! assert_eq!(stages.len(), 3);
//! assert_eq!(stages[0].name(), "authorize");
//!
//! let handler = Middleware::default()
//!     .wrap(|_event: &Event, _ctx: ()| Ok(json!({ "statusCode": 200 })));
//!
//! let response = handler.call(&Event::empty(), ());
//! assert_eq!(response.status(), 200);
//! assert!(response.body().is_none());
//! assert_eq!(response.headers().get("Access-Control-Allow-Origin"), Some("*"));
//! ```

#![doc(html_root_url = "https://docs.rs/apigw-middleware/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod normalizer;
pub mod pipeline;
pub mod responder;
pub mod stage;
pub mod stages;

// Re-export main types at crate root
pub use normalizer::ResponseNormalizer;
pub use pipeline::{Middleware, MiddlewareBuilder, MiddlewareConfig, WrappedHandler};
pub use responder::{respond_error, respond_fault};
pub use stage::{
    AuthorizeAction, ErrorTranslator, ParseAction, PipelineStage, StageKind, StageOutcome,
};
pub use stages::{AuthorizeStage, InvokeStage, ParseStage};
