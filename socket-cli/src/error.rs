//! CLI-specific error types and exit code mapping

use socket_api::{ApiError, Failure};
use socket_core::error::SocketError;

/// CLI-specific error type.
///
/// Each variant carries enough context for a user-friendly message.
/// The `exit_code()` method maps errors to the process exit code.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Invalid arguments or input that clap could not catch.
    #[error("{0}")]
    Usage(String),

    /// Socket API failure.
    #[error("{0}")]
    Api(#[from] ApiError),

    /// A subcommand-specific operation failed.
    #[error("{0}")]
    Command(String),

    /// `scan report` found alerts at or above the report level.
    #[error("scan is not healthy: {0}")]
    Unhealthy(String),

    /// A Markdown report could not be formatted.
    #[error("report formatting error: {0}")]
    Format(#[from] std::fmt::Error),

    /// JSON serialisation failed during output rendering.
    #[error("json output error: {0}")]
    JsonSerialize(#[from] serde_json::Error),

    /// IO error (stdin read, stdout write, etc.).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Wrapped domain error from socket-core.
    #[error("{0}")]
    Core(#[from] SocketError),
}

impl CliError {
    /// Map the error to a process exit code.
    ///
    /// | Code | Meaning                            |
    /// |------|------------------------------------|
    /// | 0    | Success                            |
    /// | 1    | Runtime, API or unhealthy scan     |
    /// | 2    | Usage or configuration error       |
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Usage(_) => 2,
            Self::Core(SocketError::Config(_)) => 2,
            Self::Api(ApiError::InvalidRequest(_)) => 2,
            Self::Api(_)
            | Self::Command(_)
            | Self::Unhealthy(_)
            | Self::Format(_)
            | Self::JsonSerialize(_)
            | Self::Io(_)
            | Self::Core(_) => 1,
        }
    }

    /// The command already printed its payload before failing.
    ///
    /// Only the exit code reports these; JSON mode prints no failure object
    /// after the payload.
    pub fn payload_rendered(&self) -> bool {
        matches!(self, Self::Unhealthy(_))
    }

    /// Uniform `{ ok: false, message, cause }` form of this error.
    pub fn to_failure(&self) -> Failure {
        match self {
            Self::Api(e) => e.to_failure(),
            Self::Usage(msg) => Failure::new("Invalid input", Some(msg.clone())),
            Self::Core(e) => Failure::new("Configuration error", Some(e.to_string())),
            Self::Unhealthy(msg) => Failure::new("Scan is not healthy", Some(msg.clone())),
            Self::Command(msg) => Failure::new("Command failed", Some(msg.clone())),
            Self::Format(e) => Failure::new("Unable to render output", Some(e.to_string())),
            Self::JsonSerialize(e) => Failure::new("Unable to render output", Some(e.to_string())),
            Self::Io(e) => Failure::new("I/O error", Some(e.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use socket_core::error::ConfigError;

    #[test]
    fn test_exit_code_usage_error() {
        let err = CliError::Usage("no organization".to_owned());
        assert_eq!(err.exit_code(), 2, "usage error should return exit code 2");
    }

    #[test]
    fn test_exit_code_config_error() {
        let core_err: CliError = SocketError::Config(ConfigError::ParseFailed {
            reason: "bad".to_owned(),
        })
        .into();
        assert_eq!(core_err.exit_code(), 2, "core config error should return exit code 2");
    }

    #[test]
    fn test_exit_code_api_errors() {
        let auth = CliError::Api(ApiError::Auth {
            status: 401,
            message: "nope".to_owned(),
        });
        assert_eq!(auth.exit_code(), 1, "auth error should return exit code 1");

        let http = CliError::Api(ApiError::Http {
            status: 500,
            message: "boom".to_owned(),
            cause: None,
        });
        assert_eq!(http.exit_code(), 1, "http error should return exit code 1");
    }

    #[test]
    fn test_exit_code_unhealthy() {
        let err = CliError::Unhealthy("3 alerts".to_owned());
        assert_eq!(err.exit_code(), 1, "unhealthy scan should return exit code 1");
    }

    #[test]
    fn test_exit_code_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "pipe closed");
        let err = CliError::Io(io_err);
        assert_eq!(err.exit_code(), 1, "io error should return exit code 1");
    }

    #[test]
    fn test_exit_code_json_serialize_error() {
        let json_err = serde_json::from_str::<serde_json::Value>("{invalid json")
            .expect_err("should fail parsing");
        let err = CliError::JsonSerialize(json_err);
        assert_eq!(err.exit_code(), 1, "json serialize error should return exit code 1");
    }

    #[test]
    fn test_error_display_config() {
        let err: CliError = SocketError::Config(ConfigError::ParseFailed {
            reason: "invalid TOML syntax".to_owned(),
        })
        .into();
        let display_str = format!("{}", err);
        assert!(display_str.contains("invalid TOML syntax"), "should include error message");
        assert_eq!(err.to_failure().message, "Configuration error");
    }

    #[test]
    fn test_only_unhealthy_scan_has_rendered_payload() {
        assert!(CliError::Unhealthy("1 alert(s)".to_owned()).payload_rendered());
        assert!(!CliError::Usage("bad".to_owned()).payload_rendered());
        assert!(!CliError::Command("failed".to_owned()).payload_rendered());
    }

    #[test]
    fn test_error_display_api_auth_hint() {
        let err = CliError::Api(ApiError::Auth {
            status: 403,
            message: "Insufficient permissions".to_owned(),
        });
        assert!(err.to_string().contains("socket login"));
    }

    #[test]
    fn test_failure_from_api_error_keeps_cause() {
        let err = CliError::Api(ApiError::Http {
            status: 404,
            message: "Repository not found".to_owned(),
            cause: None,
        });
        let failure = err.to_failure();
        assert!(!failure.ok);
        assert_eq!(failure.cause.as_deref(), Some("Repository not found"));
    }

    #[test]
    fn test_failure_from_command_error() {
        let failure = CliError::Command("no manifest files found".to_owned()).to_failure();
        assert_eq!(failure.message, "Command failed");
        assert_eq!(failure.cause.as_deref(), Some("no manifest files found"));
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let cli_err: CliError = io_err.into();
        match cli_err {
            CliError::Io(e) => {
                assert_eq!(e.kind(), std::io::ErrorKind::PermissionDenied);
            }
            _ => panic!("expected Io error variant"),
        }
    }
}
