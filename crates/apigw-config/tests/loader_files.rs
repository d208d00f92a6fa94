//! File and `.env` loading against real files on disk.

use std::io::Write;

use apigw_config::{ConfigError, ConfigLoader, LogFormat, ToolboxConfig};
use pretty_assertions::assert_eq;
use tempfile::{Builder, NamedTempFile};

fn temp_file(suffix: &str, content: &str) -> NamedTempFile {
    let mut file = Builder::new().suffix(suffix).tempfile().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[test]
fn toml_file_is_loaded() {
    let file = temp_file(
        ".toml",
        r#"
        [response]
        expose_handler_errors = false

        [response.default_headers]
        "Access-Control-Allow-Origin" = "*"
        "X-Service" = "orders"

        [telemetry]
        service_name = "orders-api"
        "#,
    );

    let config = ConfigLoader::new().with_file(file.path()).unwrap().load().unwrap();

    assert!(!config.response.expose_handler_errors);
    assert_eq!(config.response.default_headers.len(), 2);
    assert_eq!(config.response.default_headers.get("x-service"), Some("orders"));
    assert_eq!(config.telemetry.service_name, "orders-api");
}

#[test]
fn json_file_is_loaded() {
    let file = temp_file(
        ".json",
        r#"{"telemetry": {"environment": "staging", "logging": {"format": "pretty"}}}"#,
    );

    let config = ConfigLoader::new().with_file(file.path()).unwrap().load().unwrap();

    assert_eq!(config.telemetry.environment, "staging");
    assert_eq!(config.telemetry.logging.format, LogFormat::Pretty);
    assert_eq!(config.response, ToolboxConfig::default().response);
}

#[test]
fn file_replaces_preset() {
    let file = temp_file(".toml", "[telemetry]\nservice_name = \"orders-api\"\n");

    let config = ConfigLoader::new()
        .with_development()
        .with_file(file.path())
        .unwrap()
        .load()
        .unwrap();

    assert_eq!(config.telemetry.logging.level, "info");
}

#[test]
fn unsupported_extension_names_the_file() {
    let file = temp_file(".yaml", "response: {}\n");

    let err = ConfigLoader::new().with_file(file.path()).unwrap_err();
    match err {
        ConfigError::UnsupportedFormat(name) => assert!(name.ends_with(".yaml")),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn invalid_toml_is_reported() {
    let file = temp_file(".toml", "[response\n");
    let err = ConfigLoader::new().with_file(file.path()).unwrap_err();
    assert!(matches!(err, ConfigError::TomlError(_)));
}

#[test]
fn unknown_field_in_file_is_rejected() {
    let file = temp_file(".json", r#"{"response": {"cors": true}}"#);
    let err = ConfigLoader::new().with_file(file.path()).unwrap_err();
    assert!(matches!(err, ConfigError::JsonError(_)));
}

#[test]
fn optional_file_present_is_loaded() {
    let file = temp_file(".toml", "[response]\ninternal_error_message = \"Oops\"\n");

    let config = ConfigLoader::new()
        .with_optional_file(file.path())
        .unwrap()
        .load()
        .unwrap();

    assert_eq!(config.response.internal_error_message, "Oops");
}

#[test]
fn dotenv_file_feeds_env_overrides() {
    let file = temp_file(
        ".env",
        "APIGW_DOTENV_IT__TELEMETRY__SERVICE_NAME=from-dotenv\n\
         APIGW_DOTENV_IT__RESPONSE__HEADERS__CACHE_CONTROL=no-store\n",
    );

    let config = ConfigLoader::new()
        .with_dotenv_file(file.path())
        .unwrap()
        .with_env_prefix("APIGW_DOTENV_IT")
        .load()
        .unwrap();

    assert_eq!(config.telemetry.service_name, "from-dotenv");
    assert_eq!(config.response.default_headers.get("Cache-Control"), Some("no-store"));
    assert_eq!(config.response.default_headers.len(), 3);
}

#[test]
fn missing_dotenv_file_is_an_error() {
    let err = ConfigLoader::new()
        .with_dotenv_file("/nonexistent/.env")
        .unwrap_err();
    assert!(matches!(err, ConfigError::FileNotFound { .. }));
}

#[test]
fn invalid_env_value_fails_load() {
    std::env::set_var("APIGW_BAD_ENV_IT__TELEMETRY__LOGGING__ENABLED", "perhaps");

    let err = ConfigLoader::new()
        .with_env_prefix("APIGW_BAD_ENV_IT")
        .load()
        .unwrap_err();

    assert!(matches!(err, ConfigError::EnvParseError { .. }));
}
