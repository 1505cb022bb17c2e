//! Local CLI configuration -- `config.toml` parsing, env overrides and persistence
//!
//! [`SocketConfig`] holds the API token, API endpoint settings, the default
//! organization and logging preferences.
//!
//! # Precedence
//! 1. CLI flags (applied by the binary)
//! 2. Environment variables (`SOCKET_CLI_API_TOKEN`, `SOCKET_SECURITY_API_KEY`, ...)
//! 3. The config file
//! 4. Defaults (`Default` impls)
//!
//! # Example
//! ```no_run
//! # async fn example() -> Result<(), socket_core::error::SocketError> {
//! use socket_core::config::SocketConfig;
//!
//! let path = SocketConfig::resolve_path(None)?;
//! let config = SocketConfig::load(&path).await?;
//!
//! let config = SocketConfig::parse("[api]\ntoken = \"sktsec_abc\"")?;
//! # Ok(())
//! # }
//! ```

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{ConfigError, SocketError};

/// Default Socket API root.
pub const DEFAULT_API_BASE_URL: &str = "https://api.socket.dev/v0/";

/// Env var pointing at an alternative config file.
pub const CONFIG_PATH_ENV: &str = "SOCKET_CLI_CONFIG";

/// Token env vars, first match wins.
const TOKEN_ENV_KEYS: [&str; 3] = [
    "SOCKET_CLI_API_TOKEN",
    "SOCKET_SECURITY_API_TOKEN",
    "SOCKET_SECURITY_API_KEY",
];
const BASE_URL_ENV_KEYS: [&str; 2] = ["SOCKET_CLI_API_BASE_URL", "SOCKET_SECURITY_API_BASE_URL"];
const PROXY_ENV_KEYS: [&str; 2] = ["SOCKET_CLI_API_PROXY", "SOCKET_SECURITY_API_PROXY"];

/// Persisted CLI configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SocketConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub org: OrgConfig,
}

impl SocketConfig {
    /// Works out which file to use: explicit path, then `$SOCKET_CLI_CONFIG`,
    /// then `<platform config dir>/config.toml`.
    pub fn resolve_path(explicit: Option<&Path>) -> Result<PathBuf, ConfigError> {
        if let Some(path) = explicit {
            return Ok(path.to_path_buf());
        }
        if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
            if !path.trim().is_empty() {
                return Ok(PathBuf::from(path));
            }
        }
        directories::ProjectDirs::from("dev", "socket", "socket")
            .map(|dirs| dirs.config_dir().join("config.toml"))
            .ok_or(ConfigError::NoConfigDir)
    }

    /// Loads the file (defaults when it does not exist), applies env
    /// overrides and validates.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, SocketError> {
        let mut config = Self::from_file_or_default(path).await?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Loads the file without env overrides. Fails if it does not exist.
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, SocketError> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                SocketError::Config(ConfigError::FileNotFound {
                    path: path.display().to_string(),
                })
            } else {
                SocketError::Io(e)
            }
        })?;
        Self::parse(&content)
    }

    /// Like [`from_file`](Self::from_file) but a missing file yields defaults.
    ///
    /// This is the form to mutate and [`save`](Self::save): it never picks up
    /// env overrides, so secrets from the environment are not persisted.
    pub async fn from_file_or_default(path: impl AsRef<Path>) -> Result<Self, SocketError> {
        match Self::from_file(path.as_ref()).await {
            Ok(config) => Ok(config),
            Err(SocketError::Config(ConfigError::FileNotFound { path })) => {
                debug!(path = %path, "no config file, using defaults");
                Ok(Self::default())
            }
            Err(e) => Err(e),
        }
    }

    /// Parses a TOML document.
    pub fn parse(toml_str: &str) -> Result<Self, SocketError> {
        toml::from_str(toml_str).map_err(|e| {
            SocketError::Config(ConfigError::ParseFailed {
                reason: e.to_string(),
            })
        })
    }

    /// Writes the config as TOML, creating parent directories.
    pub async fn save(&self, path: impl AsRef<Path>) -> Result<(), SocketError> {
        let path = path.as_ref();
        let content = toml::to_string_pretty(self).map_err(|e| ConfigError::WriteFailed {
            reason: e.to_string(),
        })?;
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        tokio::fs::write(path, content).await?;
        debug!(path = %path.display(), "config saved");
        Ok(())
    }

    /// Applies environment variable overrides.
    pub fn apply_env_overrides(&mut self) {
        override_first(&mut self.api.token, &TOKEN_ENV_KEYS);
        override_first(&mut self.api.base_url, &BASE_URL_ENV_KEYS);
        override_first(&mut self.api.proxy, &PROXY_ENV_KEYS);
        override_u64(&mut self.api.timeout_secs, "SOCKET_CLI_API_TIMEOUT");
        override_first(&mut self.org.default, &["SOCKET_CLI_ORG_SLUG"]);
        override_first(&mut self.general.log_level, &["SOCKET_CLI_LOG_LEVEL"]);
    }

    /// Validates value ranges and enumerations.
    pub fn validate(&self) -> Result<(), SocketError> {
        let valid_levels = ["trace", "debug", "info", "warn", "error", "off"];
        if !valid_levels.contains(&self.general.log_level.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "general.log_level".to_owned(),
                reason: format!("must be one of: {}", valid_levels.join(", ")),
            }
            .into());
        }

        let valid_formats = ["json", "pretty"];
        if !valid_formats.contains(&self.general.log_format.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "general.log_format".to_owned(),
                reason: format!("must be one of: {}", valid_formats.join(", ")),
            }
            .into());
        }

        if !(self.api.base_url.starts_with("https://") || self.api.base_url.starts_with("http://"))
        {
            return Err(ConfigError::InvalidValue {
                field: "api.base_url".to_owned(),
                reason: "must be an http:// or https:// URL".to_owned(),
            }
            .into());
        }

        if !self.api.proxy.is_empty()
            && !(self.api.proxy.starts_with("http://")
                || self.api.proxy.starts_with("https://")
                || self.api.proxy.starts_with("socks5://"))
        {
            return Err(ConfigError::InvalidValue {
                field: "api.proxy".to_owned(),
                reason: "must be an http://, https:// or socks5:// URL".to_owned(),
            }
            .into());
        }

        if self.api.timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "api.timeout_secs".to_owned(),
                reason: "must be greater than 0".to_owned(),
            }
            .into());
        }

        Ok(())
    }

    /// Token if one is configured.
    pub fn token(&self) -> Option<&str> {
        non_empty(&self.api.token)
    }

    /// Default organization slug if one is configured.
    pub fn default_org(&self) -> Option<&str> {
        non_empty(&self.org.default)
    }

    /// Reads a single value by its `config` command key.
    pub fn get(&self, key: ConfigKey) -> String {
        match key {
            ConfigKey::ApiToken => self.api.token.clone(),
            ConfigKey::ApiBaseUrl => self.api.base_url.clone(),
            ConfigKey::ApiProxy => self.api.proxy.clone(),
            ConfigKey::ApiTimeout => self.api.timeout_secs.to_string(),
            ConfigKey::DefaultOrg => self.org.default.clone(),
            ConfigKey::LogLevel => self.general.log_level.clone(),
            ConfigKey::LogFormat => self.general.log_format.clone(),
        }
    }

    /// Sets a single value by its `config` command key, then validates.
    pub fn set(&mut self, key: ConfigKey, value: &str) -> Result<(), SocketError> {
        let value = value.trim();
        match key {
            ConfigKey::ApiToken => self.api.token = value.to_owned(),
            ConfigKey::ApiBaseUrl => self.api.base_url = value.to_owned(),
            ConfigKey::ApiProxy => self.api.proxy = value.to_owned(),
            ConfigKey::ApiTimeout => {
                self.api.timeout_secs =
                    value.parse::<u64>().map_err(|_| ConfigError::InvalidValue {
                        field: "api.timeout_secs".to_owned(),
                        reason: format!("'{value}' is not a number of seconds"),
                    })?;
            }
            ConfigKey::DefaultOrg => self.org.default = value.to_owned(),
            ConfigKey::LogLevel => self.general.log_level = value.to_lowercase(),
            ConfigKey::LogFormat => self.general.log_format = value.to_lowercase(),
        }
        self.validate()
    }

    /// Resets a single value to its default.
    pub fn unset(&mut self, key: ConfigKey) {
        let defaults = Self::default();
        match key {
            ConfigKey::ApiToken => self.api.token = defaults.api.token,
            ConfigKey::ApiBaseUrl => self.api.base_url = defaults.api.base_url,
            ConfigKey::ApiProxy => self.api.proxy = defaults.api.proxy,
            ConfigKey::ApiTimeout => self.api.timeout_secs = defaults.api.timeout_secs,
            ConfigKey::DefaultOrg => self.org.default = defaults.org.default,
            ConfigKey::LogLevel => self.general.log_level = defaults.general.log_level,
            ConfigKey::LogFormat => self.general.log_format = defaults.general.log_format,
        }
    }

    /// Copy safe to print: the token is masked.
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        copy.api.token = redact_token(&self.api.token);
        copy
    }
}

/// General settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// trace, debug, info, warn, error, off
    pub log_level: String,
    /// json or pretty
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "warn".to_owned(),
            log_format: "pretty".to_owned(),
        }
    }
}

/// API connection settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// API token (`sktsec_...`); empty when logged out
    pub token: String,
    pub base_url: String,
    /// Optional proxy URL
    pub proxy: String,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            token: String::new(),
            base_url: DEFAULT_API_BASE_URL.to_owned(),
            proxy: String::new(),
            timeout_secs: 60,
        }
    }
}

/// Organization defaults
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrgConfig {
    /// Slug used when `--org` is not given
    pub default: String,
}

/// Keys accepted by `socket config get|set|unset`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigKey {
    ApiToken,
    ApiBaseUrl,
    ApiProxy,
    ApiTimeout,
    DefaultOrg,
    LogLevel,
    LogFormat,
}

impl ConfigKey {
    pub const ALL: [ConfigKey; 7] = [
        Self::ApiToken,
        Self::ApiBaseUrl,
        Self::ApiProxy,
        Self::ApiTimeout,
        Self::DefaultOrg,
        Self::LogLevel,
        Self::LogFormat,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ApiToken => "apiToken",
            Self::ApiBaseUrl => "apiBaseUrl",
            Self::ApiProxy => "apiProxy",
            Self::ApiTimeout => "apiTimeout",
            Self::DefaultOrg => "defaultOrg",
            Self::LogLevel => "logLevel",
            Self::LogFormat => "logFormat",
        }
    }

    /// Parses a key, accepting camelCase, kebab-case and snake_case spellings.
    pub fn parse(s: &str) -> Result<Self, ConfigError> {
        let normalized: String = s
            .chars()
            .filter(|c| *c != '-' && *c != '_')
            .collect::<String>()
            .to_lowercase();
        Self::ALL
            .into_iter()
            .find(|k| k.as_str().to_lowercase() == normalized)
            .ok_or_else(|| ConfigError::UnknownKey {
                key: s.to_owned(),
                expected: Self::ALL
                    .iter()
                    .map(|k| k.as_str())
                    .collect::<Vec<_>>()
                    .join(", "),
            })
    }

    /// Values of this key are secrets.
    pub fn is_sensitive(&self) -> bool {
        matches!(self, Self::ApiToken)
    }
}

impl fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Masks all but the last four characters of a token.
pub fn redact_token(token: &str) -> String {
    if token.is_empty() {
        return String::new();
    }
    let visible: String = token
        .chars()
        .rev()
        .take(4)
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();
    if token.chars().count() <= 8 {
        return "***REDACTED***".to_owned();
    }
    format!("***REDACTED***{visible}")
}

fn non_empty(s: &str) -> Option<&str> {
    let trimmed = s.trim();
    if trimmed.is_empty() { None } else { Some(trimmed) }
}

// --- env override helpers ---

fn override_first(target: &mut String, env_keys: &[&str]) {
    for key in env_keys {
        if let Ok(val) = std::env::var(key) {
            if !val.trim().is_empty() {
                *target = val.trim().to_owned();
                return;
            }
        }
    }
}

fn override_u64(target: &mut u64, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<u64>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse u64 from env var, ignoring"
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn default_config_has_sane_values() {
        let config = SocketConfig::default();
        assert_eq!(config.general.log_level, "warn");
        assert_eq!(config.general.log_format, "pretty");
        assert_eq!(config.api.base_url, DEFAULT_API_BASE_URL);
        assert_eq!(config.api.timeout_secs, 60);
        assert!(config.token().is_none());
        assert!(config.default_org().is_none());
    }

    #[test]
    fn default_config_passes_validation() {
        SocketConfig::default().validate().unwrap();
    }

    #[test]
    fn parse_empty_toml_uses_defaults() {
        let config = SocketConfig::parse("").unwrap();
        assert_eq!(config, SocketConfig::default());
    }

    #[test]
    fn parse_partial_toml_merges_with_defaults() {
        let toml = r#"
[api]
token = "sktsec_abcdef123456"

[org]
default = "acme"
"#;
        let config = SocketConfig::parse(toml).unwrap();
        assert_eq!(config.token(), Some("sktsec_abcdef123456"));
        assert_eq!(config.default_org(), Some("acme"));
        assert_eq!(config.api.base_url, DEFAULT_API_BASE_URL);
        assert_eq!(config.general.log_format, "pretty");
    }

    #[test]
    fn parse_invalid_toml_returns_error() {
        let err = SocketConfig::parse("invalid = [[[toml").unwrap_err();
        assert!(matches!(
            err,
            SocketError::Config(ConfigError::ParseFailed { .. })
        ));
    }

    #[test]
    fn validate_rejects_invalid_log_level() {
        let mut config = SocketConfig::default();
        config.general.log_level = "verbose".to_owned();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("log_level"));
    }

    #[test]
    fn validate_rejects_non_http_base_url() {
        let mut config = SocketConfig::default();
        config.api.base_url = "ftp://api.socket.dev".to_owned();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("base_url"));
    }

    #[test]
    fn validate_rejects_zero_timeout() {
        let mut config = SocketConfig::default();
        config.api.timeout_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_bad_proxy_scheme() {
        let mut config = SocketConfig::default();
        config.api.proxy = "proxy.local:8080".to_owned();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("api.proxy"));
    }

    #[test]
    fn blank_token_is_treated_as_missing() {
        let mut config = SocketConfig::default();
        config.api.token = "   ".to_owned();
        assert!(config.token().is_none());
    }

    #[test]
    fn config_key_parses_spellings() {
        assert_eq!(ConfigKey::parse("apiToken").unwrap(), ConfigKey::ApiToken);
        assert_eq!(ConfigKey::parse("api-token").unwrap(), ConfigKey::ApiToken);
        assert_eq!(ConfigKey::parse("default_org").unwrap(), ConfigKey::DefaultOrg);
        assert!(matches!(
            ConfigKey::parse("colour"),
            Err(ConfigError::UnknownKey { .. })
        ));
    }

    #[test]
    fn set_get_unset_roundtrip() {
        let mut config = SocketConfig::default();
        config.set(ConfigKey::DefaultOrg, "acme").unwrap();
        assert_eq!(config.get(ConfigKey::DefaultOrg), "acme");
        config.set(ConfigKey::ApiTimeout, "15").unwrap();
        assert_eq!(config.api.timeout_secs, 15);
        config.unset(ConfigKey::ApiTimeout);
        assert_eq!(config.api.timeout_secs, 60);
        config.unset(ConfigKey::DefaultOrg);
        assert!(config.default_org().is_none());
    }

    #[test]
    fn set_rejects_invalid_values() {
        let mut config = SocketConfig::default();
        assert!(config.set(ConfigKey::ApiTimeout, "soon").is_err());
        assert!(config.set(ConfigKey::LogFormat, "xml").is_err());
    }

    #[test]
    fn redact_token_keeps_last_four() {
        assert_eq!(redact_token(""), "");
        assert_eq!(redact_token("short"), "***REDACTED***");
        assert_eq!(redact_token("sktsec_0123456789"), "***REDACTED***6789");
    }

    #[test]
    fn redacted_config_hides_token() {
        let mut config = SocketConfig::default();
        config.api.token = "sktsec_supersecret".to_owned();
        let shown = config.redacted();
        assert!(!shown.api.token.contains("supersecret"));
        assert_eq!(config.api.token, "sktsec_supersecret");
    }

    #[test]
    #[serial]
    fn env_token_precedence() {
        // SAFETY: env mutation is serialised with #[serial].
        unsafe {
            std::env::set_var("SOCKET_SECURITY_API_KEY", "from-key");
            std::env::set_var("SOCKET_CLI_API_TOKEN", "from-cli");
        }
        let mut config = SocketConfig::default();
        config.apply_env_overrides();
        assert_eq!(config.token(), Some("from-cli"));
        unsafe {
            std::env::remove_var("SOCKET_CLI_API_TOKEN");
        }
        let mut config = SocketConfig::default();
        config.apply_env_overrides();
        assert_eq!(config.token(), Some("from-key"));
        unsafe {
            std::env::remove_var("SOCKET_SECURITY_API_KEY");
        }
    }

    #[test]
    #[serial]
    fn env_timeout_invalid_keeps_original() {
        // SAFETY: env mutation is serialised with #[serial].
        unsafe { std::env::set_var("SOCKET_CLI_API_TIMEOUT", "later") };
        let mut config = SocketConfig::default();
        config.apply_env_overrides();
        assert_eq!(config.api.timeout_secs, 60);
        unsafe { std::env::remove_var("SOCKET_CLI_API_TIMEOUT") };
    }

    #[test]
    fn config_serialize_roundtrip() {
        let mut config = SocketConfig::default();
        config.org.default = "acme".to_owned();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed = SocketConfig::parse(&toml_str).unwrap();
        assert_eq!(config, parsed);
    }

    #[tokio::test]
    async fn from_file_not_found() {
        let err = SocketConfig::from_file("/nonexistent/path/config.toml")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            SocketError::Config(ConfigError::FileNotFound { .. })
        ));
    }

    #[tokio::test]
    async fn from_file_or_default_tolerates_missing_file() {
        let config = SocketConfig::from_file_or_default("/nonexistent/path/config.toml")
            .await
            .unwrap();
        assert_eq!(config, SocketConfig::default());
    }

    #[test]
    fn resolve_path_prefers_explicit() {
        let path = SocketConfig::resolve_path(Some(Path::new("/tmp/socket.toml"))).unwrap();
        assert_eq!(path, PathBuf::from("/tmp/socket.toml"));
    }
}
