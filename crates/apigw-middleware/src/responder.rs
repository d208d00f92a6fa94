//! Error responder.
//!
//! The universal fallback: turns any fault into a minimal, valid
//! [`NormalizedResponse`] carrying a single-message [`ErrorEnvelope`].
//! Responses built here have no headers; the normalizer applies the default
//! headers on the way out.

use apigw_core::{ErrorEnvelope, HeaderSet, NormalizedResponse, PipelineFault};
use std::fmt;

/// Builds an error response from any displayable fault.
///
/// A status of `0` is coerced to 500.
///
/// # Example
///
/// ```
/// use apigw_middleware::respond_error;
///
/// let response = respond_error("token expired", 401);
/// assert_eq!(response.status(), 401);
/// assert_eq!(response.body(), Some(r#"{"errors":[{"message":"token expired"}]}"#));
/// ```
#[must_use]
pub fn respond_error<D>(fault: &D, status: u16) -> NormalizedResponse
where
    D: fmt::Display + ?Sized,
{
    let envelope = ErrorEnvelope::single(fault.to_string());
    NormalizedResponse::from_envelope(status, &envelope, HeaderSet::new())
}

/// Builds an error response for a pipeline fault, using its taxonomy status.
#[must_use]
pub fn respond_fault(fault: &PipelineFault) -> NormalizedResponse {
    respond_error(fault, fault.status_code())
}
