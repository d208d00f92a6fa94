//! Typed configuration for apigw.
//!
//! Settings that differ between deployments (the default response headers,
//! whether handler errors reach callers, how logs are written) live in a
//! [`ToolboxConfig`] loaded in layers: defaults or a preset, then a TOML or
//! JSON file, then `PREFIX__SECTION__KEY` environment variables. Unknown
//! fields are rejected.
//!
//! # Example
//!
//! ```no_run
//! use apigw_config::ConfigLoader;
//!
//! # fn main() -> Result<(), apigw_config::ConfigError> {
//! let config = ConfigLoader::new()
//!     .with_file("apigw.toml")?
//!     .with_env_prefix("APIGW")
//!     .load()?;
//!
//! println!("service: {}", config.telemetry.service_name);
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration File Format
//!
//! ```toml
//! [response]
//! expose_handler_errors = false
//! internal_error_message = "Internal server error"
//!
//! [response.default_headers]
//! "Access-Control-Allow-Origin" = "https://app.example.com"
//! "Access-Control-Allow-Credentials" = "true"
//!
//! [telemetry]
//! service_name = "orders-api"
//! environment = "production"
//!
//! [telemetry.logging]
//! enabled = true
//! level = "info"
//! format = "json"
//! include_location = false
//! ```

#![doc(html_root_url = "https://docs.rs/apigw-config/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod config;
mod error;
mod loader;
mod schema;

pub use config::{ToolboxConfig, ToolboxConfigBuilder};
pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use schema::{LogFormat, LoggingConfig, ResponseConfig, TelemetryConfigSection};
