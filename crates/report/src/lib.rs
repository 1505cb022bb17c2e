//! Report building for the socket CLI.
//!
//! Everything here is a pure transformation over already-fetched API data:
//!
//! - [`index`]: [`ArtifactIndex`], artifacts of one scan by id
//! - [`policy`]: [`PolicyTable`], the action each alert resolves to
//! - [`fold`]: [`generate_report`], alert folding to a [`Fold`] granularity
//! - [`diff`]: [`compare_scans`], local comparison of two scans
//! - [`score`]: Markdown package score reports
//! - [`markdown`]: table helper shared by the renderers

pub mod diff;
pub mod error;
pub mod fold;
pub mod index;
pub mod markdown;
pub mod policy;
pub mod score;

pub use diff::{ScanComparison, compare_scans};
pub use error::ReportError;
pub use fold::{
    Fold, Report, ReportLeaf, ReportNode, ReportOptions, ReportedAlert, ShortReport,
    generate_report, parse_report_level,
};
pub use index::ArtifactIndex;
pub use markdown::md_table;
pub use policy::PolicyTable;
pub use score::{build_deep_report, build_shallow_report};
