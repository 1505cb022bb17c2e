//! Integration tests for the config file as the `socket` commands use it.
//!
//! Covers the load paths of `main` (strict for API commands, lenient for
//! `login`, `logout` and `config`) and the edit cycle of `config set|unset`.

use std::fs;

use serial_test::serial;
use tempfile::TempDir;

use socket_core::config::{ConfigKey, SocketConfig};
use socket_core::error::{ConfigError, SocketError};

#[tokio::test]
async fn test_config_load_valid_toml() {
    // Given: A valid config file
    let temp_dir = TempDir::new().expect("should create temp dir");
    let config_path = temp_dir.path().join("config.toml");

    let valid_config = r#"
[general]
log_level = "info"
log_format = "json"

[api]
token = "sktsec_abcdefghijkl"
base_url = "https://api.socket.dev/v0/"

[org]
default = "acme"
"#;

    fs::write(&config_path, valid_config).expect("should write config");

    // When: Loading the config
    let config = SocketConfig::load(&config_path)
        .await
        .expect("valid config should load successfully");

    // Then: Values come from the file
    assert_eq!(config.default_org(), Some("acme"));
    assert_eq!(config.general.log_format, "json");
}

#[tokio::test]
async fn test_config_load_malformed_toml() {
    // Given: A malformed TOML file
    let temp_dir = TempDir::new().expect("should create temp dir");
    let config_path = temp_dir.path().join("bad.toml");

    fs::write(&config_path, "[general\nlog_level = \"info\"\n").expect("should write bad config");

    // When: Loading the config
    let result = SocketConfig::load(&config_path).await;

    // Then: Should fail with a parse error
    assert!(
        matches!(
            result,
            Err(SocketError::Config(ConfigError::ParseFailed { .. }))
        ),
        "malformed TOML should fail to load"
    );
}

#[tokio::test]
async fn test_config_load_missing_file_gives_defaults() {
    // Given: A path that does not exist yet (first run before `login`)
    let temp_dir = TempDir::new().expect("should create temp dir");
    let config_path = temp_dir.path().join("nested").join("config.toml");

    // When: Loading the file as it is stored
    let config = SocketConfig::from_file_or_default(&config_path)
        .await
        .expect("missing file should yield defaults");

    // Then: Defaults, no token
    assert_eq!(config, SocketConfig::default());
    assert!(config.token().is_none());
}

#[tokio::test]
async fn test_config_load_empty_file() {
    // Given: An empty config file
    let temp_dir = TempDir::new().expect("should create temp dir");
    let config_path = temp_dir.path().join("empty.toml");
    fs::write(&config_path, "").expect("should write empty file");

    // When: Loading the config
    let config = SocketConfig::from_file(&config_path)
        .await
        .expect("empty file should parse");

    // Then: Every section falls back to its defaults
    assert_eq!(config, SocketConfig::default());
}

#[tokio::test]
async fn test_invalid_value_fails_strict_load_only() {
    // Given: A file with an unknown log level
    let temp_dir = TempDir::new().expect("should create temp dir");
    let config_path = temp_dir.path().join("config.toml");
    fs::write(&config_path, "[general]\nlog_level = \"loud\"\n").expect("should write config");

    // When: Loading strictly and leniently
    let strict = SocketConfig::load(&config_path).await;
    let lenient = SocketConfig::from_file_or_default(&config_path).await;

    // Then: Only the strict path rejects it, so `config set` can repair the file
    assert!(strict.is_err(), "invalid log level should fail validation");
    let mut lenient = lenient.expect("lenient load should parse");
    lenient
        .set(ConfigKey::LogLevel, "debug")
        .expect("repaired value should validate");
}

#[tokio::test]
async fn test_config_set_then_reload() {
    // Given: An empty config directory
    let temp_dir = TempDir::new().expect("should create temp dir");
    let config_path = temp_dir.path().join("socket").join("config.toml");

    // When: Setting values by their command keys and saving
    let mut config = SocketConfig::from_file_or_default(&config_path)
        .await
        .expect("defaults");
    config
        .set(ConfigKey::parse("default-org").expect("known key"), "acme")
        .expect("set org");
    config
        .set(ConfigKey::parse("api_timeout").expect("known key"), "15")
        .expect("set timeout");
    config.save(&config_path).await.expect("should save");

    // Then: A fresh load sees them
    let reloaded = SocketConfig::from_file(&config_path).await.expect("reload");
    assert_eq!(reloaded.default_org(), Some("acme"));
    assert_eq!(reloaded.api.timeout_secs, 15);
}

#[tokio::test]
async fn test_config_unset_restores_default() {
    // Given: A saved config with a custom base URL
    let temp_dir = TempDir::new().expect("should create temp dir");
    let config_path = temp_dir.path().join("config.toml");
    let mut config = SocketConfig::default();
    config
        .set(ConfigKey::ApiBaseUrl, "http://localhost:8080/v0/")
        .expect("set url");
    config.save(&config_path).await.expect("should save");

    // When: Unsetting it
    let mut config = SocketConfig::from_file(&config_path).await.expect("load");
    config.unset(ConfigKey::ApiBaseUrl);
    config.save(&config_path).await.expect("should save");

    // Then: The default is back
    let reloaded = SocketConfig::from_file(&config_path).await.expect("reload");
    assert_eq!(reloaded.api.base_url, SocketConfig::default().api.base_url);
}

#[test]
fn test_unknown_key_lists_valid_keys() {
    let err = ConfigKey::parse("colour").expect_err("unknown key");
    let message = err.to_string();
    assert!(message.contains("colour"));
    assert!(message.contains("defaultOrg"));
}

#[test]
fn test_redacted_config_hides_token() {
    let mut config = SocketConfig::default();
    config
        .set(ConfigKey::ApiToken, "sktsec_abcdefghijkl")
        .expect("set token");

    let shown = config.redacted();
    assert!(!shown.api.token.contains("abcdefgh"));
    assert!(shown.api.token.ends_with("ijkl"));
    assert!(ConfigKey::ApiToken.is_sensitive());
}

#[tokio::test]
#[serial]
async fn test_env_token_is_not_persisted() {
    // Given: A token in the environment and none in the file
    let temp_dir = TempDir::new().expect("should create temp dir");
    let config_path = temp_dir.path().join("config.toml");
    // SAFETY: env mutation is serialised with #[serial].
    unsafe { std::env::set_var("SOCKET_CLI_API_TOKEN", "sktsec_fromenv_1234") };

    // When: Loading effective config, then editing the stored one
    let effective = SocketConfig::load(&config_path).await;
    let mut stored = SocketConfig::from_file_or_default(&config_path)
        .await
        .expect("defaults");
    stored
        .set(ConfigKey::DefaultOrg, "acme")
        .expect("set org");
    let saved = stored.save(&config_path).await;

    // SAFETY: see above.
    unsafe { std::env::remove_var("SOCKET_CLI_API_TOKEN") };

    // Then: The env token is effective but never written to disk
    let effective = effective.expect("load with env");
    assert_eq!(effective.token(), Some("sktsec_fromenv_1234"));
    saved.expect("should save");
    let content = fs::read_to_string(&config_path).expect("read back");
    assert!(!content.contains("sktsec_fromenv_1234"));
}
