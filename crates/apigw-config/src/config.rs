//! Root configuration type.

use serde::{Deserialize, Serialize};

use crate::{ConfigError, LogFormat, ResponseConfig, TelemetryConfigSection};

/// Complete apigw configuration.
///
/// Use [`ConfigLoader`](crate::ConfigLoader) to load it from files and
/// environment variables.
///
/// # Example
///
/// ```
/// use apigw_config::ToolboxConfig;
///
/// let config = ToolboxConfig::default();
/// assert!(config.response.expose_handler_errors);
/// assert_eq!(config.telemetry.logging.level, "info");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(deny_unknown_fields)]
pub struct ToolboxConfig {
    /// Response shaping.
    #[serde(default)]
    pub response: ResponseConfig,

    /// Logging and service identity.
    #[serde(default)]
    pub telemetry: TelemetryConfigSection,
}

impl ToolboxConfig {
    /// Create a new configuration builder.
    #[must_use]
    pub fn builder() -> ToolboxConfigBuilder {
        ToolboxConfigBuilder::new()
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if:
    /// - A default header name or value is not valid HTTP
    /// - The internal error message is empty
    /// - The service name is empty
    /// - The log level is empty or not a valid filter directive
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some((name, value)) = self.response.default_headers.find_invalid() {
            return Err(ConfigError::invalid_value(
                "response.default_headers",
                format!("invalid header {name:?}: {value:?}"),
            ));
        }

        if self.response.internal_error_message.trim().is_empty() {
            return Err(ConfigError::invalid_value(
                "response.internal_error_message",
                "must not be empty",
            ));
        }

        if self.telemetry.service_name.trim().is_empty() {
            return Err(ConfigError::invalid_value(
                "telemetry.service_name",
                "must not be empty",
            ));
        }

        let level = &self.telemetry.logging.level;
        if level.trim().is_empty() {
            return Err(ConfigError::invalid_value(
                "telemetry.logging.level",
                "must not be empty",
            ));
        }
        apigw_telemetry::create_env_filter(level)
            .map_err(|e| ConfigError::invalid_value("telemetry.logging.level", e.to_string()))?;

        Ok(())
    }

    /// Local development preset.
    ///
    /// - Pretty logs at `debug` with source locations
    /// - Handler errors exposed
    ///
    /// ```
    /// use apigw_config::{LogFormat, ToolboxConfig};
    ///
    /// let config = ToolboxConfig::development();
    /// assert_eq!(config.telemetry.logging.format, LogFormat::Pretty);
    /// ```
    #[must_use]
    pub fn development() -> Self {
        let mut config = Self::default();

        config.telemetry.environment = "development".to_string();
        config.telemetry.logging.level = "debug".to_string();
        config.telemetry.logging.format = LogFormat::Pretty;
        config.telemetry.logging.include_location = true;

        config.response.expose_handler_errors = true;

        config
    }

    /// Production preset.
    ///
    /// - JSON logs at `info`
    /// - Handler errors hidden behind the internal error message
    #[must_use]
    pub fn production() -> Self {
        let mut config = Self::default();

        config.telemetry.environment = "production".to_string();
        config.telemetry.logging.level = "info".to_string();
        config.telemetry.logging.format = LogFormat::Json;
        config.telemetry.logging.include_location = false;

        config.response.expose_handler_errors = false;

        config
    }
}

/// Builder for [`ToolboxConfig`].
#[derive(Debug, Default)]
pub struct ToolboxConfigBuilder {
    response: Option<ResponseConfig>,
    telemetry: Option<TelemetryConfigSection>,
}

impl ToolboxConfigBuilder {
    /// Create a new builder with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the response configuration.
    #[must_use]
    pub fn response(mut self, response: ResponseConfig) -> Self {
        self.response = Some(response);
        self
    }

    /// Set the telemetry configuration.
    #[must_use]
    pub fn telemetry(mut self, telemetry: TelemetryConfigSection) -> Self {
        self.telemetry = Some(telemetry);
        self
    }

    /// Build the configuration. Unset sections use their defaults.
    #[must_use]
    pub fn build(self) -> ToolboxConfig {
        ToolboxConfig {
            response: self.response.unwrap_or_default(),
            telemetry: self.telemetry.unwrap_or_default(),
        }
    }

    /// Build and validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if validation fails.
    pub fn build_validated(self) -> Result<ToolboxConfig, ConfigError> {
        let config = self.build();
        config.validate()?;
        Ok(config)
    }
}
