//! Structured logging for apigw.
//!
//! The pipeline crates only emit `tracing` events; this crate installs the
//! subscriber that turns them into output. Lambda runtimes ship stdout to
//! CloudWatch, so the production setup is one JSON object per line.
//!
//! # Event fields
//!
//! Pipeline events carry a small set of structured fields, listed in
//! [`logging::fields`]:
//!
//! | Field | Emitted by | Meaning |
//! |-------|------------|---------|
//! | `stage` | stages, composer | Stage that produced the event |
//! | `status` | normalizer | Status code of the produced response |
//! | `error` | stages, normalizer | Display form of the caught fault |
//! | `has_body` | normalizer | Whether the response carries a body |
//!
//! # Example
//!
//! ```rust,no_run
//! use apigw_telemetry::{init_telemetry, TelemetryConfig};
//!
//! let config = TelemetryConfig::builder()
//!     .service_name("orders-api")
//!     .environment("production")
//!     .build();
//!
//! init_telemetry(&config).expect("logging already initialized");
//! ```

#![doc(html_root_url = "https://docs.rs/apigw-telemetry/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod config;
pub mod error;
pub mod logging;

pub use config::{TelemetryConfig, TelemetryConfigBuilder};
pub use error::TelemetryError;
pub use logging::{create_env_filter, init_logging, LogConfig};

/// Result type for telemetry operations.
pub type TelemetryResult<T> = Result<T, TelemetryError>;

/// Initializes logging for a service.
///
/// A global subscriber can only be installed once per process; a second call
/// fails with [`TelemetryError::LoggingInit`].
///
/// # Errors
///
/// Returns `TelemetryError` if the log level does not parse or a subscriber
/// is already installed.
pub fn init_telemetry(config: &TelemetryConfig) -> TelemetryResult<()> {
    init_logging(&config.logging)?;

    tracing::info!(
        service.name = %config.service_name,
        service.version = %config.service_version,
        deployment.environment = %config.environment,
        "Telemetry initialized"
    );

    Ok(())
}
