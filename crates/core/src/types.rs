//! Domain enums shared by the api, report and cli crates.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Action an organization's security policy assigns to an alert type.
///
/// The `Ord` implementation follows strictness:
/// `Defer < Ignore < Monitor < Warn < Error`. The same ordering is used as the
/// minimum report level when folding reports.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum PolicyAction {
    /// Defer to the parent organization's policy
    #[default]
    Defer,
    /// Explicitly ignored
    Ignore,
    /// Recorded but not surfaced
    Monitor,
    /// Surfaced as a warning
    Warn,
    /// Blocking
    Error,
}

impl PolicyAction {
    /// All actions from least to most strict.
    pub const ALL: [PolicyAction; 5] = [
        Self::Defer,
        Self::Ignore,
        Self::Monitor,
        Self::Warn,
        Self::Error,
    ];

    /// Parses an action name, ignoring case.
    pub fn from_str_loose(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "defer" => Some(Self::Defer),
            "ignore" => Some(Self::Ignore),
            "monitor" => Some(Self::Monitor),
            "warn" | "warning" => Some(Self::Warn),
            "error" => Some(Self::Error),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Defer => "defer",
            Self::Ignore => "ignore",
            Self::Monitor => "monitor",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }

    /// `true` if `self` is strictly stricter than `other`.
    pub fn is_stricter_than(&self, other: &PolicyAction) -> bool {
        self > other
    }
}

impl fmt::Display for PolicyAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Alert severity as reported by the Socket API.
///
/// The API spells medium as `middle`.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum AlertSeverity {
    #[default]
    Low,
    #[serde(alias = "medium")]
    Middle,
    High,
    Critical,
}

impl AlertSeverity {
    pub fn from_str_loose(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "low" => Some(Self::Low),
            "middle" | "medium" | "med" => Some(Self::Middle),
            "high" => Some(Self::High),
            "critical" | "crit" => Some(Self::Critical),
            _ => None,
        }
    }

    /// Action used for an alert whose type has no policy rule and which
    /// carries no action of its own.
    pub fn default_action(&self) -> PolicyAction {
        match self {
            Self::Critical => PolicyAction::Error,
            Self::High => PolicyAction::Warn,
            Self::Middle => PolicyAction::Monitor,
            Self::Low => PolicyAction::Ignore,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Middle => "middle",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }
}

impl fmt::Display for AlertSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
