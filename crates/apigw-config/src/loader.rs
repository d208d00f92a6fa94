//! Layered configuration loading.

use std::env;
use std::fs;
use std::path::Path;

use crate::{ConfigError, LogFormat, ToolboxConfig};

/// Configuration loader with layered approach.
///
/// Later layers override earlier ones:
/// 1. Default values or a preset
/// 2. Configuration file (TOML or JSON) or string
/// 3. Environment variables
///
/// A file replaces the preset as a whole; fields it leaves out take their
/// built-in defaults.
///
/// # Environment variables
///
/// Variables use the format `PREFIX__SECTION__KEY`. With prefix `APIGW`:
///
/// | Variable | Field |
/// |----------|-------|
/// | `APIGW__RESPONSE__EXPOSE_HANDLER_ERRORS` | `response.expose_handler_errors` |
/// | `APIGW__RESPONSE__INTERNAL_ERROR_MESSAGE` | `response.internal_error_message` |
/// | `APIGW__RESPONSE__HEADERS__X_API_VERSION` | header `X-Api-Version` |
/// | `APIGW__TELEMETRY__SERVICE_NAME` | `telemetry.service_name` |
/// | `APIGW__TELEMETRY__SERVICE_VERSION` | `telemetry.service_version` |
/// | `APIGW__TELEMETRY__ENVIRONMENT` | `telemetry.environment` |
/// | `APIGW__TELEMETRY__LOGGING__ENABLED` | `telemetry.logging.enabled` |
/// | `APIGW__TELEMETRY__LOGGING__LEVEL` | `telemetry.logging.level` |
/// | `APIGW__TELEMETRY__LOGGING__FORMAT` | `telemetry.logging.format` |
/// | `APIGW__TELEMETRY__LOGGING__INCLUDE_LOCATION` | `telemetry.logging.include_location` |
///
/// Header variables are added on top of the configured default headers;
/// underscores in the name become hyphens.
///
/// # Example
///
/// ```no_run
/// use apigw_config::ConfigLoader;
///
/// # fn main() -> Result<(), apigw_config::ConfigError> {
/// let config = ConfigLoader::new()
///     .with_production()
///     .with_optional_file("apigw.toml")?
///     .with_dotenv()?
///     .with_env_prefix("APIGW")
///     .load()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct ConfigLoader {
    config: ToolboxConfig,
    env_prefix: Option<String>,
}

impl ConfigLoader {
    /// Create a new configuration loader starting from defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset to default configuration values.
    #[must_use]
    pub fn with_defaults(mut self) -> Self {
        self.config = ToolboxConfig::default();
        self
    }

    /// Start from the development preset.
    ///
    /// ```
    /// use apigw_config::ConfigLoader;
    ///
    /// let config = ConfigLoader::new().with_development().load().unwrap();
    /// assert_eq!(config.telemetry.logging.level, "debug");
    /// ```
    #[must_use]
    pub fn with_development(mut self) -> Self {
        self.config = ToolboxConfig::development();
        self
    }

    /// Start from the production preset.
    #[must_use]
    pub fn with_production(mut self) -> Self {
        self.config = ToolboxConfig::production();
        self
    }

    /// Load configuration from a file.
    ///
    /// The format is chosen by extension: `.toml` or `.json`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - The file does not exist or cannot be read
    /// - The extension is not `.toml` or `.json`
    /// - The contents do not parse, or contain unknown fields
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::file_not_found(path));
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::read_error(path, e))?;
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default();

        self.config = parse(&content, extension).map_err(|e| match e {
            ConfigError::UnsupportedFormat(_) => {
                ConfigError::UnsupportedFormat(path.display().to_string())
            }
            other => other,
        })?;
        Ok(self)
    }

    /// Load configuration from a file if it exists.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file exists but cannot be loaded.
    pub fn with_optional_file<P: AsRef<Path>>(self, path: P) -> Result<Self, ConfigError> {
        if path.as_ref().exists() {
            self.with_file(path)
        } else {
            Ok(self)
        }
    }

    /// Load configuration from a string in the given format (`"toml"` or
    /// `"json"`).
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the format is unknown or parsing fails.
    ///
    /// # Example
    ///
    /// ```
    /// use apigw_config::ConfigLoader;
    ///
    /// let toml = r#"
    ///     [response]
    ///     expose_handler_errors = false
    /// "#;
    ///
    /// let config = ConfigLoader::new()
    ///     .with_string(toml, "toml")
    ///     .unwrap()
    ///     .load()
    ///     .unwrap();
    ///
    /// assert!(!config.response.expose_handler_errors);
    /// ```
    pub fn with_string(mut self, content: &str, format: &str) -> Result<Self, ConfigError> {
        self.config = parse(content, format)?;
        Ok(self)
    }

    /// Set the environment variable prefix for overrides.
    #[must_use]
    pub fn with_env_prefix(mut self, prefix: &str) -> Self {
        self.env_prefix = Some(prefix.to_uppercase());
        self
    }

    /// Load variables from a `.env` file in the current directory or its
    /// parents, if one exists. Variables already set are not overwritten.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Dotenv` if a `.env` file is found but cannot be
    /// parsed.
    pub fn with_dotenv(self) -> Result<Self, ConfigError> {
        match dotenvy::dotenv() {
            Ok(_) => Ok(self),
            Err(e) if e.not_found() => Ok(self),
            Err(e) => Err(e.into()),
        }
    }

    /// Load variables from a specific env file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file does not exist or cannot be parsed.
    pub fn with_dotenv_file<P: AsRef<Path>>(self, path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::file_not_found(path));
        }
        dotenvy::from_path(path)?;
        Ok(self)
    }

    /// Apply environment overrides and validate.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if an environment variable does not parse or
    /// the final configuration is invalid.
    pub fn load(self) -> Result<ToolboxConfig, ConfigError> {
        let config = self.load_unvalidated()?;
        config.validate()?;
        Ok(config)
    }

    /// Apply environment overrides without validating.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if an environment variable does not parse.
    pub fn load_unvalidated(mut self) -> Result<ToolboxConfig, ConfigError> {
        if let Some(prefix) = self.env_prefix.take() {
            self.apply_env_overrides(&prefix)?;
        }
        Ok(self.config)
    }

    fn apply_env_overrides(&mut self, prefix: &str) -> Result<(), ConfigError> {
        let scoped = format!("{prefix}__");
        let mut vars: Vec<(String, String)> = env::vars().filter(|(k, _)| k.starts_with(&scoped)).collect();
        // Header variables insert in a stable order.
        vars.sort();

        for (key, value) in vars {
            self.apply_env_var(&key, &value, prefix)?;
        }

        Ok(())
    }

    fn apply_env_var(&mut self, key: &str, value: &str, prefix: &str) -> Result<(), ConfigError> {
        let key_without_prefix = key
            .strip_prefix(prefix)
            .and_then(|k| k.strip_prefix("__"))
            .ok_or_else(|| ConfigError::env_parse_error(key, "invalid key format"))?;

        let parts: Vec<&str> = key_without_prefix.split("__").collect();
        let response = &mut self.config.response;
        let telemetry = &mut self.config.telemetry;

        match parts.as_slice() {
            ["RESPONSE", "EXPOSE_HANDLER_ERRORS"] => {
                response.expose_handler_errors = parse_bool(value)
                    .ok_or_else(|| ConfigError::env_parse_error(key, "expected boolean"))?;
            }
            ["RESPONSE", "INTERNAL_ERROR_MESSAGE"] => {
                response.internal_error_message = value.to_string();
            }
            ["RESPONSE", "HEADERS", name] => {
                if name.is_empty() {
                    return Err(ConfigError::env_parse_error(key, "missing header name"));
                }
                response.default_headers.insert(header_name_from_env(name), value);
            }

            ["TELEMETRY", "SERVICE_NAME"] => {
                telemetry.service_name = value.to_string();
            }
            ["TELEMETRY", "SERVICE_VERSION"] => {
                telemetry.service_version = (!value.is_empty()).then(|| value.to_string());
            }
            ["TELEMETRY", "ENVIRONMENT"] => {
                telemetry.environment = value.to_string();
            }

            ["TELEMETRY", "LOGGING", "ENABLED"] => {
                telemetry.logging.enabled = parse_bool(value)
                    .ok_or_else(|| ConfigError::env_parse_error(key, "expected boolean"))?;
            }
            ["TELEMETRY", "LOGGING", "LEVEL"] => {
                telemetry.logging.level = value.to_string();
            }
            ["TELEMETRY", "LOGGING", "FORMAT"] => {
                telemetry.logging.format = match value.to_lowercase().as_str() {
                    "json" => LogFormat::Json,
                    "pretty" => LogFormat::Pretty,
                    _ => {
                        return Err(ConfigError::env_parse_error(
                            key,
                            "expected 'json' or 'pretty'",
                        ))
                    }
                };
            }
            ["TELEMETRY", "LOGGING", "INCLUDE_LOCATION"] => {
                telemetry.logging.include_location = parse_bool(value)
                    .ok_or_else(|| ConfigError::env_parse_error(key, "expected boolean"))?;
            }

            // Unrecognized keys are left for other consumers of the prefix.
            _ => {}
        }

        Ok(())
    }
}

fn parse(content: &str, format: &str) -> Result<ToolboxConfig, ConfigError> {
    match format.to_lowercase().as_str() {
        "toml" => Ok(toml::from_str(content)?),
        "json" => Ok(serde_json::from_str(content)?),
        _ => Err(ConfigError::UnsupportedFormat(format.to_string())),
    }
}

/// Parse a boolean from a string.
fn parse_bool(s: &str) -> Option<bool> {
    match s.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// `X_API_VERSION` becomes `X-Api-Version`.
fn header_name_from_env(name: &str) -> String {
    name.split('_')
        .map(|segment| {
            let mut chars = segment.chars();
            chars.next().map_or_else(String::new, |first| {
                first.to_ascii_uppercase().to_string() + &chars.as_str().to_ascii_lowercase()
            })
        })
        .collect::<Vec<_>>()
        .join("-")
}
