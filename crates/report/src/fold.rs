//! Alert folding.
//!
//! [`generate_report`] evaluates every alert of a scan against the policy
//! table, drops alerts below the report level and files the rest into a tree
//! keyed ecosystem -> package -> version -> file -> alert type. The tree is
//! cut at the depth named by [`Fold`]; everything below the cut is merged into
//! one [`ReportLeaf`].
//!
//! Leaves keep the full list of alerts they absorbed, so folding never loses
//! an alert, only the structure around it.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use socket_api::models::{Alert, Artifact};
use socket_core::types::{AlertSeverity, PolicyAction};

use crate::error::ReportError;
use crate::index::ArtifactIndex;
use crate::policy::PolicyTable;

/// Key used when an alert is not tied to a file.
pub const UNKNOWN_FILE: &str = "<unknown>";

/// Granularity of a report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Fold {
    /// One leaf per alert type and location
    #[default]
    None,
    /// One leaf per alert type within a file
    Type,
    /// One leaf per file
    File,
    /// One leaf per package version
    Version,
    /// One leaf per package
    Pkg,
    /// One leaf per ecosystem
    All,
}

impl Fold {
    pub const ALL: [Fold; 6] = [
        Self::None,
        Self::Type,
        Self::File,
        Self::Version,
        Self::Pkg,
        Self::All,
    ];

    /// Number of key levels above a leaf.
    pub fn depth(&self) -> usize {
        match self {
            Self::All => 1,
            Self::Pkg => 2,
            Self::Version => 3,
            Self::File => 4,
            Self::Type | Self::None => 5,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Type => "type",
            Self::File => "file",
            Self::Version => "version",
            Self::Pkg => "pkg",
            Self::All => "all",
        }
    }
}

impl fmt::Display for Fold {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Fold {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "none" => Ok(Self::None),
            "type" => Ok(Self::Type),
            "file" => Ok(Self::File),
            "version" => Ok(Self::Version),
            "pkg" | "package" => Ok(Self::Pkg),
            "all" => Ok(Self::All),
            _ => Err(ReportError::InvalidFold(s.to_owned())),
        }
    }
}

/// Parses a `--report-level` value.
pub fn parse_report_level(s: &str) -> Result<PolicyAction, ReportError> {
    PolicyAction::from_str_loose(s).ok_or_else(|| ReportError::InvalidLevel(s.to_owned()))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportOptions {
    pub fold: Fold,
    /// Alerts below this action are left out
    pub report_level: PolicyAction,
    #[serde(default)]
    pub short: bool,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            fold: Fold::None,
            report_level: PolicyAction::Warn,
            short: false,
        }
    }
}

/// An alert as it appears in a report, tagged with its package.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportedAlert {
    /// Package URL of the artifact carrying the alert
    pub package: String,
    #[serde(rename = "type")]
    pub alert_type: String,
    #[serde(default)]
    pub key: String,
    pub severity: AlertSeverity,
    /// Action after policy evaluation
    pub action: PolicyAction,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<u64>,
}

impl ReportedAlert {
    fn new(artifact: &Artifact, alert: &Alert, action: PolicyAction) -> Self {
        Self {
            package: artifact.purl(),
            alert_type: alert.alert_type.clone(),
            key: alert.key.clone(),
            severity: alert.severity,
            action,
            file: alert.file.clone(),
            start: alert.start,
            end: alert.end,
        }
    }
}

/// Everything folded below one key path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReportLeaf {
    /// Strictest action among the alerts
    pub policy: PolicyAction,
    /// Sorted, without duplicates
    pub alerts: Vec<ReportedAlert>,
    /// Manifest files that pulled the packages in
    pub manifest: Vec<String>,
    pub url: String,
}

impl ReportLeaf {
    fn merge(&mut self, other: ReportLeaf) {
        self.policy = self.policy.max(other.policy);
        self.alerts.extend(other.alerts);
        self.alerts.sort();
        self.alerts.dedup();
        self.manifest.extend(other.manifest);
        self.manifest.sort();
        self.manifest.dedup();
    }
}

/// A node of the report tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ReportNode {
    Leaf(ReportLeaf),
    Branch(BTreeMap<String, ReportNode>),
}

/// Folded scan report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub healthy: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub org_slug: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scan_id: Option<String>,
    pub options: ReportOptions,
    pub alerts: BTreeMap<String, ReportNode>,
}

/// `--short` form of a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShortReport {
    pub healthy: bool,
}

impl Report {
    pub fn with_scan(mut self, org_slug: impl Into<String>, scan_id: impl Into<String>) -> Self {
        self.org_slug = Some(org_slug.into());
        self.scan_id = Some(scan_id.into());
        self
    }

    pub fn short(&self) -> ShortReport {
        ShortReport {
            healthy: self.healthy,
        }
    }

    /// Every leaf with the key path leading to it, in key order.
    pub fn leaves(&self) -> Vec<(Vec<&str>, &ReportLeaf)> {
        let mut out = Vec::new();
        for (key, node) in &self.alerts {
            collect_leaves(node, vec![key.as_str()], &mut out);
        }
        out
    }

    /// All alerts in the report.
    pub fn alert_count(&self) -> usize {
        self.leaves().iter().map(|(_, leaf)| leaf.alerts.len()).sum()
    }

    /// Folds this report further. Only coarser folds are possible, and
    /// `none` and `type` cannot be converted into each other.
    pub fn refold(&self, fold: Fold) -> Result<Report, ReportError> {
        let from = self.options.fold;
        let allowed = fold == from || fold.depth() < from.depth();
        if !allowed {
            return Err(ReportError::CannotRefold { from, to: fold });
        }

        let mut alerts = BTreeMap::new();
        for (path, leaf) in self.leaves() {
            let path: Vec<String> = path
                .into_iter()
                .take(fold.depth())
                .map(str::to_owned)
                .collect();
            let mut leaf = leaf.clone();
            leaf.url = leaf_url(&path);
            insert_leaf(&mut alerts, &path, leaf);
        }

        Ok(Report {
            healthy: alerts.is_empty(),
            org_slug: self.org_slug.clone(),
            scan_id: self.scan_id.clone(),
            options: ReportOptions {
                fold,
                ..self.options
            },
            alerts,
        })
    }
}

fn collect_leaves<'r>(
    node: &'r ReportNode,
    path: Vec<&'r str>,
    out: &mut Vec<(Vec<&'r str>, &'r ReportLeaf)>,
) {
    match node {
        ReportNode::Leaf(leaf) => out.push((path, leaf)),
        ReportNode::Branch(children) => {
            for (key, child) in children {
                let mut child_path = path.clone();
                child_path.push(key.as_str());
                collect_leaves(child, child_path, out);
            }
        }
    }
}

/// Folds the alerts of `artifacts` into a report.
pub fn generate_report(
    artifacts: &[Artifact],
    policy: &PolicyTable,
    options: &ReportOptions,
) -> Report {
    let index = ArtifactIndex::new(artifacts);
    let mut alerts: BTreeMap<String, ReportNode> = BTreeMap::new();
    let mut kept = 0usize;
    let mut dropped = 0usize;

    for artifact in index.iter() {
        let manifest = manifest_files(artifact);

        for alert in &artifact.alerts {
            let action = policy.action_for(alert);
            if action < options.report_level {
                dropped += 1;
                continue;
            }
            kept += 1;

            let path = alert_path(artifact, alert, options.fold);
            let leaf = ReportLeaf {
                policy: action,
                alerts: vec![ReportedAlert::new(artifact, alert, action)],
                manifest: manifest.clone(),
                url: leaf_url(&path),
            };
            insert_leaf(&mut alerts, &path, leaf);
        }
    }

    tracing::debug!(
        artifacts = index.len(),
        kept,
        dropped,
        fold = %options.fold,
        level = %options.report_level,
        "report folded"
    );

    Report {
        healthy: alerts.is_empty(),
        org_slug: None,
        scan_id: None,
        options: *options,
        alerts,
    }
}

fn manifest_files(artifact: &Artifact) -> Vec<String> {
    let mut files: Vec<String> = artifact
        .manifest_files
        .iter()
        .map(|m| m.file.clone())
        .collect();
    files.sort();
    files.dedup();
    files
}

/// Key path of an alert, cut at the fold depth.
fn alert_path(artifact: &Artifact, alert: &Alert, fold: Fold) -> Vec<String> {
    let file = alert
        .file
        .clone()
        .filter(|f| !f.is_empty())
        .unwrap_or_else(|| UNKNOWN_FILE.to_owned());
    let last = match (fold, alert.start, alert.end) {
        (Fold::None, Some(start), Some(end)) => format!("{} at {start}:{end}", alert.alert_type),
        _ => alert.alert_type.clone(),
    };

    let mut path = vec![
        artifact.ecosystem.clone(),
        artifact.full_name(),
        artifact.version.clone(),
        file,
        last,
    ];
    path.truncate(fold.depth());
    path
}

/// socket.dev page for the deepest package information on a path.
fn leaf_url(path: &[String]) -> String {
    match path {
        [] => "https://socket.dev".to_owned(),
        [ecosystem] => format!("https://socket.dev/{ecosystem}"),
        [ecosystem, name] => format!("https://socket.dev/{ecosystem}/package/{name}"),
        [ecosystem, name, version, ..] if version.is_empty() => {
            format!("https://socket.dev/{ecosystem}/package/{name}")
        }
        [ecosystem, name, version, ..] => {
            format!("https://socket.dev/{ecosystem}/package/{name}/overview/{version}")
        }
    }
}

fn insert_leaf(tree: &mut BTreeMap<String, ReportNode>, path: &[String], leaf: ReportLeaf) {
    let Some((key, rest)) = path.split_first() else {
        return;
    };

    if rest.is_empty() {
        match tree.get_mut(key) {
            Some(ReportNode::Leaf(existing)) => existing.merge(leaf),
            Some(ReportNode::Branch(_)) => {
                tracing::warn!(key = %key, "report key is already a branch, dropping leaf");
            }
            None => {
                tree.insert(key.clone(), ReportNode::Leaf(leaf));
            }
        }
        return;
    }

    let node = tree
        .entry(key.clone())
        .or_insert_with(|| ReportNode::Branch(BTreeMap::new()));
    match node {
        ReportNode::Branch(children) => insert_leaf(children, rest, leaf),
        ReportNode::Leaf(_) => {
            tracing::warn!(key = %key, "report key is already a leaf, dropping nested alert");
        }
    }
}
