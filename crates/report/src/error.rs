//! Report errors

use crate::fold::Fold;

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    /// Unknown `--fold` value
    #[error("invalid fold '{0}' (expected one of: none, file, type, version, pkg, all)")]
    InvalidFold(String),

    /// Unknown `--report-level` value
    #[error("invalid report level '{0}' (expected one of: defer, ignore, monitor, warn, error)")]
    InvalidLevel(String),

    /// A folded report cannot be unfolded to a finer granularity
    #[error("cannot refold a '{from}' report to '{to}'")]
    CannotRefold { from: Fold, to: Fold },
}
