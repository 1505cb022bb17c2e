//! Shared building blocks for the socket CLI workspace.
//!
//! - [`config`]: local `config.toml` with env overrides ([`SocketConfig`])
//! - [`error`]: [`SocketError`] and [`ConfigError`]
//! - [`types`]: [`PolicyAction`] and [`AlertSeverity`]

pub mod config;
pub mod error;
pub mod types;

pub use config::{ConfigKey, SocketConfig};
pub use error::{ConfigError, SocketError};
pub use types::{AlertSeverity, PolicyAction};

/// Version reported in the `User-Agent` header.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
