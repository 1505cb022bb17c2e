//! Error types shared by every socket crate

/// Top-level error for core operations (config loading, persisted state).
#[derive(Debug, thiserror::Error)]
pub enum SocketError {
    /// Configuration problem
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// I/O error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Config file could not be found where one was explicitly requested
    #[error("config file not found: {path}")]
    FileNotFound { path: String },

    /// TOML could not be parsed
    #[error("failed to parse config: {reason}")]
    ParseFailed { reason: String },

    /// Config could not be serialised back to TOML
    #[error("failed to write config: {reason}")]
    WriteFailed { reason: String },

    /// A value failed validation
    #[error("invalid config value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },

    /// `config get/set/unset` was given a key that does not exist
    #[error("unknown config key '{key}' (expected one of: {expected})")]
    UnknownKey { key: String, expected: String },

    /// No platform config directory and no explicit path
    #[error("could not determine a config directory for this platform")]
    NoConfigDir,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_converts_into_socket_error() {
        let err: SocketError = ConfigError::ParseFailed {
            reason: "bad toml".to_owned(),
        }
        .into();
        assert!(matches!(err, SocketError::Config(_)));
        assert_eq!(err.to_string(), "config error: failed to parse config: bad toml");
    }

    #[test]
    fn unknown_key_lists_expected_keys() {
        let err = ConfigError::UnknownKey {
            key: "color".to_owned(),
            expected: "apiToken, defaultOrg".to_owned(),
        };
        let msg = err.to_string();
        assert!(msg.contains("'color'"));
        assert!(msg.contains("apiToken, defaultOrg"));
    }
}
