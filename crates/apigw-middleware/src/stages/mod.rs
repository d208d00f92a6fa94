//! The three pipeline stages.
//!
//! 1. [`authorize`] - Validate the authorizer context
//! 2. [`parse`] - Parse the raw body into the event's side channel
//! 3. [`invoke`] - Call the wrapped handler

pub mod authorize;
pub mod invoke;
pub mod parse;

pub use authorize::AuthorizeStage;
pub use invoke::InvokeStage;
pub use parse::ParseStage;
