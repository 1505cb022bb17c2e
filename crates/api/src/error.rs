//! API error types
//!
//! HTTP 401/403 become [`ApiError::Auth`] so the CLI can print a login hint.
//! Everything else can be flattened into a [`Failure`], the uniform
//! `{ ok: false, message, cause }` object printed in JSON mode.

use serde::{Deserialize, Serialize};

/// Errors produced by [`SocketClient`](crate::SocketClient) and the response decoders.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Token missing, invalid or lacking permission
    #[error("Socket API authentication failed (HTTP {status}): {message}. Run `socket login` to set a valid API token")]
    Auth { status: u16, message: String },

    /// Non-success status other than 401/403
    #[error("Socket API request failed (HTTP {status}): {message}")]
    Http {
        status: u16,
        message: String,
        cause: Option<String>,
    },

    /// Body could not be decoded into the expected shape
    #[error("Invalid Socket API response: {cause}")]
    InvalidResponse { cause: String },

    /// Connection, TLS or timeout failure
    #[error("network error: {0}")]
    Network(String),

    /// No token configured
    #[error("no API token configured. Run `socket login` or set SOCKET_CLI_API_TOKEN")]
    MissingToken,

    /// Request could not be built from the given input
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Local file I/O while preparing an upload
    #[error("io error: {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
}

impl ApiError {
    /// Short headline for the failure.
    pub fn message(&self) -> String {
        match self {
            Self::Auth { .. } | Self::MissingToken => "Authentication failed".to_owned(),
            Self::Http { status, .. } => format!("Socket API returned an error ({status})"),
            Self::InvalidResponse { .. } => "Invalid Socket API response".to_owned(),
            Self::Network(_) => "Unable to reach the Socket API".to_owned(),
            Self::InvalidRequest(_) => "Invalid request".to_owned(),
            Self::Io { .. } => "Unable to read local files".to_owned(),
        }
    }

    /// Detail behind the headline.
    pub fn cause(&self) -> Option<String> {
        match self {
            Self::Auth { message, .. } => Some(format!(
                "{message}. Run `socket login` to set a valid API token"
            )),
            Self::MissingToken => {
                Some("Run `socket login` or set SOCKET_CLI_API_TOKEN".to_owned())
            }
            Self::Http { message, cause, .. } => match cause {
                Some(cause) => Some(format!("{message} ({cause})")),
                None => Some(message.clone()),
            },
            Self::InvalidResponse { cause } => Some(cause.clone()),
            Self::Network(reason) | Self::InvalidRequest(reason) => Some(reason.clone()),
            Self::Io { path, source } => Some(format!("{path}: {source}")),
        }
    }

    /// Whether this is an authentication/authorization failure.
    pub fn is_auth(&self) -> bool {
        matches!(self, Self::Auth { .. } | Self::MissingToken)
    }

    pub fn to_failure(&self) -> Failure {
        Failure::new(self.message(), self.cause())
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            ApiError::InvalidResponse {
                cause: e.to_string(),
            }
        } else {
            ApiError::Network(e.to_string())
        }
    }
}

/// Uniform failure result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Failure {
    pub ok: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cause: Option<String>,
}

impl Failure {
    pub fn new(message: impl Into<String>, cause: Option<String>) -> Self {
        Self {
            ok: false,
            message: message.into(),
            cause,
        }
    }
}
