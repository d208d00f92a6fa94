//! Configuration section types.

use apigw_core::{HeaderSet, DEFAULT_INTERNAL_ERROR_MESSAGE};
use apigw_telemetry::{LogConfig, TelemetryConfig};
use serde::{Deserialize, Serialize};

/// Response section.
///
/// Controls what every wrapped handler's responses look like.
///
/// # Example
///
/// ```
/// use apigw_config::ResponseConfig;
///
/// let config = ResponseConfig::default();
/// assert_eq!(config.default_headers.get("Access-Control-Allow-Origin"), Some("*"));
/// assert!(config.expose_handler_errors);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ResponseConfig {
    /// Headers applied to every response. Handler headers are merged on top.
    ///
    /// Setting this table replaces the CORS defaults entirely.
    #[serde(default = "HeaderSet::cors_defaults")]
    pub default_headers: HeaderSet,

    /// Whether a handler fault's message is sent to the caller.
    #[serde(default = "default_true")]
    pub expose_handler_errors: bool,

    /// Message sent instead of a handler fault when errors are hidden.
    #[serde(default = "default_internal_error_message")]
    pub internal_error_message: String,
}

impl Default for ResponseConfig {
    fn default() -> Self {
        Self {
            default_headers: HeaderSet::cors_defaults(),
            expose_handler_errors: true,
            internal_error_message: default_internal_error_message(),
        }
    }
}

fn default_internal_error_message() -> String {
    DEFAULT_INTERNAL_ERROR_MESSAGE.to_string()
}

/// Log output format.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// One JSON object per line.
    #[default]
    Json,
    /// Multi-line human-readable output.
    Pretty,
}

/// Logging subsection of [`TelemetryConfigSection`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Enable logging.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Filter directive (e.g., "info", "warn,apigw_middleware=debug").
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format.
    #[serde(default)]
    pub format: LogFormat,

    /// Include file and line in log output.
    #[serde(default)]
    pub include_location: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            level: default_log_level(),
            format: LogFormat::default(),
            include_location: false,
        }
    }
}

impl LoggingConfig {
    /// Converts to the logging crate's configuration.
    #[must_use]
    pub fn to_log_config(&self, service_name: &str) -> LogConfig {
        let base = match self.format {
            LogFormat::Json => LogConfig::production(),
            LogFormat::Pretty => LogConfig::development(),
        };

        LogConfig {
            enabled: self.enabled,
            level: self.level.clone(),
            file_line_info: self.include_location,
            service_name: service_name.to_string(),
            ..base
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Telemetry section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct TelemetryConfigSection {
    /// Service name reported in logs.
    #[serde(default = "default_service_name")]
    pub service_name: String,

    /// Service version. Defaults to the library version when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_version: Option<String>,

    /// Deployment environment.
    #[serde(default = "default_environment")]
    pub environment: String,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for TelemetryConfigSection {
    fn default() -> Self {
        Self {
            service_name: default_service_name(),
            service_version: None,
            environment: default_environment(),
            logging: LoggingConfig::default(),
        }
    }
}

impl TelemetryConfigSection {
    /// Converts to the telemetry crate's configuration.
    #[must_use]
    pub fn to_telemetry_config(&self) -> TelemetryConfig {
        let mut builder = TelemetryConfig::builder()
            .service_name(self.service_name.as_str())
            .environment(self.environment.as_str())
            .logging(self.logging.to_log_config(&self.service_name));

        if let Some(version) = &self.service_version {
            builder = builder.service_version(version.as_str());
        }

        builder.build()
    }
}

fn default_service_name() -> String {
    "apigw-service".to_string()
}

fn default_environment() -> String {
    "development".to_string()
}

fn default_true() -> bool {
    true
}
