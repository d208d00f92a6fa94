//! # apigw
//!
//! **Response normalization for API gateway Lambda handlers**
//!
//! Wrap a handler once and every invocation returns a well-formed
//! `{statusCode, body, headers}` response:
//!
//! - **Optional authorization** of the authorizer context, failing with 401
//! - **Optional body parsing** into the event, failing with 400
//! - **Fault containment**: handler errors and panics become 500 envelopes
//! - **Default headers** (CORS by default) merged into every response
//!
//! ## Quick Start
//!
//! ```
//! use apigw::prelude::*;
//! use serde_json::{json, Value};
//!
//! let handler = Middleware::builder()
//!     .parse(|body: Option<&Value>| match body {
//!         Some(Value::String(text)) => Ok(serde_json::from_str(text)?),
//!         _ => Ok(Value::Null),
//!     })
//!     .build()
//!     .wrap(|event: &Event, _ctx: ()| {
//!         Ok(json!({ "statusCode": 200, "body": { "echo": event.parsed_body() } }))
//!     });
//!
//! let response = handler.call(&Event::new(json!({ "body": "{\"a\":1}" })), ());
//! assert_eq!(response.status(), 200);
//! assert_eq!(response.body(), Some(r#"{"echo":{"a":1}}"#));
//! ```
//!
//! ## From configuration
//!
//! ```no_run
//! use apigw::config::ConfigLoader;
//! use apigw::prelude::*;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ConfigLoader::new()
//!     .with_production()
//!     .with_env_prefix("APIGW")
//!     .load()?;
//!
//! apigw::init_logging_from_config(&config)?;
//!
//! let handler = apigw::middleware_from_config(&config)
//!     .build()
//!     .wrap(|_event: &Event, _ctx: ()| Ok(serde_json::json!({ "statusCode": 204 })));
//! # Ok(())
//! # }
//! ```
//!
//! ## Pipeline
//!
//! ```text
//! Event → Authorize → Parse → Invoke → Normalize → NormalizedResponse
//! ```

#![doc(html_root_url = "https://docs.rs/apigw/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Re-export core types
pub use apigw_core as core;

// Re-export the pipeline
pub use apigw_middleware as middleware;

// Re-export configuration
pub use apigw_config as config;

// Re-export logging setup
pub use apigw_telemetry as telemetry;

use apigw_config::ToolboxConfig;
use apigw_middleware::MiddlewareBuilder;
use apigw_telemetry::TelemetryResult;

/// Creates a middleware builder seeded from the response section of a
/// configuration.
///
/// Stage actions are code, not configuration; add them to the returned
/// builder before calling `build`.
#[must_use]
pub fn middleware_from_config(config: &ToolboxConfig) -> MiddlewareBuilder {
    let response = &config.response;
    MiddlewareBuilder::new()
        .default_headers(response.default_headers.clone())
        .expose_handler_errors(response.expose_handler_errors)
        .internal_error_message(response.internal_error_message.as_str())
}

/// Installs the global log subscriber described by the telemetry section.
///
/// # Errors
///
/// Returns `TelemetryError` if the log level does not parse or a subscriber
/// is already installed.
pub fn init_logging_from_config(config: &ToolboxConfig) -> TelemetryResult<()> {
    apigw_telemetry::init_telemetry(&config.telemetry.to_telemetry_config())
}

/// Prelude module for convenient imports.
///
/// ```
/// use apigw::prelude::*;
/// ```
pub mod prelude {
    pub use apigw_core::{
        Body, ErrorEnvelope, Event, HeaderSet, NormalizedResponse, PipelineFault, RawResponse,
        RawResult,
    };

    pub use apigw_middleware::{Middleware, MiddlewareBuilder, MiddlewareConfig, StageKind, WrappedHandler};

    pub use apigw_config::{ConfigLoader, ToolboxConfig};
}

#[cfg(test)]
mod tests {
    use super::*;
    use apigw_config::{LogFormat, ResponseConfig};
    use apigw_core::HeaderSet;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_middleware_from_default_config() {
        let builder = middleware_from_config(&ToolboxConfig::default());
        let config = builder.config();

        assert_eq!(config.default_headers, HeaderSet::cors_defaults());
        assert!(config.expose_handler_errors);
        assert_eq!(config.internal_error_message, "Internal server error");
        assert!(config.authorize.is_none());
        assert!(config.parse.is_none());
    }

    #[test]
    fn test_middleware_from_custom_config() {
        let config = ToolboxConfig::builder()
            .response(ResponseConfig {
                default_headers: [("X-Service", "orders")].into_iter().collect(),
                expose_handler_errors: false,
                internal_error_message: "Try again later".to_string(),
            })
            .build();

        let builder = middleware_from_config(&config);
        let seeded = builder.config();

        assert_eq!(seeded.default_headers.len(), 1);
        assert_eq!(seeded.default_headers.get("x-service"), Some("orders"));
        assert!(!seeded.expose_handler_errors);
        assert_eq!(seeded.internal_error_message, "Try again later");
    }

    #[test]
    fn test_init_logging_disabled() {
        let mut config = ToolboxConfig::development();
        config.telemetry.logging.enabled = false;
        assert_eq!(config.telemetry.logging.format, LogFormat::Pretty);

        assert!(init_logging_from_config(&config).is_ok());
    }
}
