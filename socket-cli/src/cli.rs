//! CLI argument parsing using clap derive API
//!
//! This module defines the command-line interface structure using clap's derive macros.
//! It is purely declarative with no side effects or I/O.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use socket_core::types::PolicyAction;
use socket_report::{Fold, parse_report_level};

/// socket -- supply-chain security for your dependencies.
///
/// Use `socket <COMMAND> --help` for subcommand details.
#[derive(Parser, Debug)]
#[command(name = "socket", version, about, long_about = None)]
pub struct Cli {
    /// Path to the config file (default: platform config dir, or $SOCKET_CLI_CONFIG).
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Override log level (trace, debug, info, warn, error).
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Print machine-readable JSON.
    #[arg(long, global = true, conflicts_with = "markdown")]
    pub json: bool,

    /// Print Markdown.
    #[arg(long, global = true)]
    pub markdown: bool,

    /// Organization slug (default: config `defaultOrg`, or the only organization of the token).
    #[arg(long, global = true)]
    pub org: Option<String>,

    /// Validate input and stop before contacting the API or writing files.
    #[arg(long, global = true)]
    pub dry_run: bool,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    pub fn output_format(&self) -> OutputFormat {
        if self.json {
            OutputFormat::Json
        } else if self.markdown {
            OutputFormat::Markdown
        } else {
            OutputFormat::Text
        }
    }
}

/// Supported output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable text output.
    Text,
    /// Machine-readable JSON.
    Json,
    /// Markdown, for pasting into issues and pull requests.
    Markdown,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Store an API token in the local config.
    Login(LoginArgs),

    /// Remove the stored API token.
    Logout,

    /// Read and write local configuration.
    Config(ConfigArgs),

    /// Organizations and their policies.
    #[command(alias = "organizations")]
    Organization(OrganizationArgs),

    /// Full scans: create, inspect, report and diff.
    Scan(ScanArgs),

    /// Repositories registered with Socket.
    Repos(ReposArgs),

    /// Alert analytics for the organization or one repository.
    Analytics(AnalyticsArgs),

    /// Organization audit log.
    AuditLog(AuditLogArgs),

    /// Package scores.
    Package(PackageArgs),

    /// Dependencies used across the organization.
    Dependencies(DependenciesArgs),

    /// Malicious package threat feed.
    ThreatFeed(ThreatFeedArgs),
}

// ---- login ----

/// Verify an API token and store it.
#[derive(Args, Debug)]
pub struct LoginArgs {
    /// API token (read from stdin when omitted).
    #[arg(long)]
    pub api_token: Option<String>,

    /// Alternative API base URL.
    #[arg(long)]
    pub api_base_url: Option<String>,

    /// Proxy for API requests.
    #[arg(long)]
    pub api_proxy: Option<String>,
}

// ---- config ----

#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show every key with its effective value.
    List {
        /// Show the token unredacted.
        #[arg(long)]
        full: bool,
    },
    /// Print one value.
    Get {
        /// Key (apiToken, apiBaseUrl, apiProxy, apiTimeout, defaultOrg, logLevel, logFormat).
        key: String,
    },
    /// Store one value.
    Set { key: String, value: String },
    /// Reset one value to its default.
    Unset { key: String },
}

// ---- organization ----

#[derive(Args, Debug)]
pub struct OrganizationArgs {
    #[command(subcommand)]
    pub action: OrganizationAction,
}

#[derive(Subcommand, Debug)]
pub enum OrganizationAction {
    /// Organizations visible to the token.
    List,
    /// Show an organization policy.
    Policy {
        #[arg(value_enum)]
        kind: PolicyKind,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PolicyKind {
    Security,
    License,
}

// ---- scan ----

#[derive(Args, Debug)]
pub struct ScanArgs {
    #[command(subcommand)]
    pub action: ScanAction,
}

#[derive(Subcommand, Debug)]
pub enum ScanAction {
    /// Upload manifest files and create a full scan.
    Create(ScanCreateArgs),
    /// List full scans.
    List(ScanListArgs),
    /// Print the artifacts of a full scan.
    View {
        scan_id: String,
    },
    /// Print the metadata of a full scan.
    Metadata {
        scan_id: String,
    },
    /// Delete a full scan.
    #[command(alias = "delete")]
    Del {
        scan_id: String,
    },
    /// Fold the alerts of a full scan against the organization policy.
    Report(ScanReportArgs),
    /// Compare two full scans.
    Diff(ScanDiffArgs),
}

#[derive(Args, Debug)]
pub struct ScanCreateArgs {
    /// Files or directories to search for manifests.
    #[arg(default_value = ".")]
    pub targets: Vec<PathBuf>,

    /// Repository name.
    #[arg(long)]
    pub repo: String,

    /// Branch name.
    #[arg(long)]
    pub branch: String,

    #[arg(long)]
    pub commit_message: Option<String>,

    #[arg(long)]
    pub commit_hash: Option<String>,

    #[arg(long)]
    pub pull_request: Option<u64>,

    /// Comma-separated committers.
    #[arg(long)]
    pub committers: Option<String>,

    /// Make this branch the repository's default branch.
    #[arg(long)]
    pub make_default_branch: bool,

    /// Use this scan for the repository's alerts page.
    #[arg(long)]
    pub set_as_alerts_page: bool,

    /// Temporary scan, not shown in the dashboard.
    #[arg(long)]
    pub tmp: bool,

    /// Print the folded report of the new scan.
    #[arg(long)]
    pub report: bool,

    #[command(flatten)]
    pub report_options: ReportFlags,
}

#[derive(Args, Debug, Clone)]
pub struct ReportFlags {
    /// Fold granularity (none, type, file, version, pkg, all).
    #[arg(long, default_value = "none")]
    pub fold: Fold,

    /// Minimum policy action to report (defer, ignore, monitor, warn, error).
    #[arg(long, default_value = "warn", value_parser = parse_report_level)]
    pub report_level: PolicyAction,

    /// Only print whether the scan is healthy.
    #[arg(long)]
    pub short: bool,
}

#[derive(Args, Debug)]
pub struct ScanListArgs {
    /// Sort field (name, created_at).
    #[arg(long, default_value = "created_at")]
    pub sort: String,

    /// Sort direction (asc, desc).
    #[arg(long, default_value = "desc")]
    pub direction: String,

    #[arg(long, default_value_t = 30)]
    pub per_page: u32,

    #[arg(long, default_value_t = 1)]
    pub page: u32,

    /// Only scans created after this unix timestamp.
    #[arg(long)]
    pub from_time: Option<String>,

    #[arg(long)]
    pub branch: Option<String>,

    #[arg(long)]
    pub repo: Option<String>,
}

#[derive(Args, Debug)]
pub struct ScanReportArgs {
    pub scan_id: String,

    #[command(flatten)]
    pub report_options: ReportFlags,
}

#[derive(Args, Debug)]
pub struct ScanDiffArgs {
    /// Earlier scan id.
    pub before: String,
    /// Later scan id.
    pub after: String,

    /// Compare the artifact streams locally instead of using the diff endpoint.
    #[arg(long)]
    pub local: bool,
}

// ---- repos ----

#[derive(Args, Debug)]
pub struct ReposArgs {
    #[command(subcommand)]
    pub action: ReposAction,
}

#[derive(Subcommand, Debug)]
pub enum ReposAction {
    /// Register a repository.
    Create(RepoCreateArgs),
    /// List repositories.
    List(RepoListArgs),
    /// Show one repository.
    View { slug: String },
    /// Change repository settings.
    Update(RepoUpdateArgs),
    /// Delete a repository.
    #[command(alias = "delete")]
    Del { slug: String },
}

#[derive(Args, Debug, Clone, Default)]
pub struct RepoFields {
    #[arg(long)]
    pub description: Option<String>,

    #[arg(long)]
    pub homepage: Option<String>,

    #[arg(long)]
    pub default_branch: Option<String>,

    /// public or private.
    #[arg(long)]
    pub visibility: Option<String>,
}

#[derive(Args, Debug)]
pub struct RepoCreateArgs {
    /// Repository name.
    pub name: String,

    #[command(flatten)]
    pub fields: RepoFields,
}

#[derive(Args, Debug)]
pub struct RepoUpdateArgs {
    /// Repository slug.
    pub slug: String,

    /// New name.
    #[arg(long)]
    pub name: Option<String>,

    #[command(flatten)]
    pub fields: RepoFields,
}

#[derive(Args, Debug)]
pub struct RepoListArgs {
    #[arg(long, default_value = "created_at")]
    pub sort: String,

    #[arg(long, default_value = "desc")]
    pub direction: String,

    #[arg(long, default_value_t = 30)]
    pub per_page: u32,

    #[arg(long, default_value_t = 1)]
    pub page: u32,
}

// ---- analytics ----

#[derive(Args, Debug)]
pub struct AnalyticsArgs {
    #[arg(long, value_enum, default_value = "org")]
    pub scope: AnalyticsScope,

    /// Repository name (required with `--scope repo`).
    #[arg(long)]
    pub repo: Option<String>,

    /// Days of history (7, 30 or 90).
    #[arg(long, default_value_t = 7, value_parser = parse_days)]
    pub time: u32,
}

fn parse_days(s: &str) -> Result<u32, String> {
    match s.trim() {
        "7" => Ok(7),
        "30" => Ok(30),
        "90" => Ok(90),
        other => Err(format!("'{other}' is not one of 7, 30, 90")),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum AnalyticsScope {
    Org,
    Repo,
}

// ---- audit log ----

#[derive(Args, Debug)]
pub struct AuditLogArgs {
    /// Event type filter.
    #[arg(long = "type")]
    pub event_type: Option<String>,

    #[arg(long, default_value_t = 30)]
    pub per_page: u32,

    #[arg(long, default_value_t = 1)]
    pub page: u32,
}

// ---- package ----

#[derive(Args, Debug)]
pub struct PackageArgs {
    #[command(subcommand)]
    pub action: PackageAction,
}

#[derive(Subcommand, Debug)]
pub enum PackageAction {
    /// Deep score of a package and its dependency tree.
    Score {
        /// Package URL, e.g. pkg:npm/express@4.19.2
        purl: String,
    },
    /// Shallow scores of one or more packages.
    Shallow {
        #[arg(required = true)]
        purls: Vec<String>,
    },
}

// ---- dependencies ----

#[derive(Args, Debug)]
pub struct DependenciesArgs {
    #[arg(long, default_value_t = 50)]
    pub limit: u32,

    #[arg(long, default_value_t = 0)]
    pub offset: u32,
}

// ---- threat feed ----

#[derive(Args, Debug)]
pub struct ThreatFeedArgs {
    /// Page cursor from a previous response.
    #[arg(long)]
    pub page: Option<String>,

    #[arg(long, default_value_t = 30)]
    pub per_page: u32,

    /// Sort direction (asc, desc).
    #[arg(long, default_value = "desc")]
    pub direction: String,

    /// Threat type filter (mal, vuln, typo, ...).
    #[arg(long)]
    pub filter: Option<String>,
}
