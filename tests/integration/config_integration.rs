//! Integration tests for Configuration System

use ctxsync::config::ConfigLoader;
use ctxsync::{ApiError, SessionClient};
use std::time::Duration;
use tempfile::TempDir;

#[test]
fn test_config_file_builds_client() {
    let temp_dir = TempDir::new().unwrap();
    let config_file = temp_dir.path().join("client.toml");
    std::fs::write(
        &config_file,
        r#"
endpoint = "https://sessions.example.com/v1"
api_key = "test-key"
request_timeout_secs = 20

[sync]
poll_interval_ms = 750
clear_timeout_secs = 120
"#,
    )
    .unwrap();

    let config = ConfigLoader::load_from_file(&config_file).unwrap();
    assert!(config.validate().is_ok());
    assert_eq!(config.request_timeout_secs, 20);

    let client = SessionClient::from_config(&config).unwrap();
    assert_eq!(client.settings().poll_interval(), Duration::from_millis(750));
    assert_eq!(client.settings().sync_timeout(), Duration::from_secs(225));
    assert_eq!(client.settings().clear_timeout(), Duration::from_secs(120));
}

#[test]
fn test_missing_api_key_is_a_config_error() {
    let temp_dir = TempDir::new().unwrap();
    let config_file = temp_dir.path().join("client.toml");
    std::fs::write(&config_file, "endpoint = \"https://sessions.example.com\"\n").unwrap();

    let config = ConfigLoader::load_from_file(&config_file).unwrap();
    assert!(matches!(
        SessionClient::from_config(&config),
        Err(ApiError::ConfigError(msg)) if msg.contains("API key")
    ));
}

#[test]
fn test_invalid_values_are_all_reported() {
    let temp_dir = TempDir::new().unwrap();
    let config_file = temp_dir.path().join("client.toml");
    std::fs::write(
        &config_file,
        r#"
endpoint = "sessions.example.com"
connect_timeout_secs = 0

[sync]
sync_timeout_secs = 0

[logging]
output = "syslog"
"#,
    )
    .unwrap();

    let config = ConfigLoader::load_from_file(&config_file).unwrap();
    let errors = config.validate().unwrap_err();
    assert_eq!(errors.len(), 4);
}

#[test]
fn test_missing_explicit_file_fails() {
    let temp_dir = TempDir::new().unwrap();
    assert!(ConfigLoader::load_from_file(&temp_dir.path().join("absent.toml")).is_err());
}
