//! Command handlers -- one module per subcommand

pub mod analytics;
pub mod audit_log;
pub mod config;
pub mod dependencies;
pub mod login;
pub mod logout;
pub mod organization;
pub mod package;
pub mod repos;
pub mod scan;
pub mod threat_feed;

/// Placeholder for empty optional cells.
pub(crate) fn or_dash(value: Option<&str>) -> &str {
    value.filter(|v| !v.is_empty()).unwrap_or("-")
}
