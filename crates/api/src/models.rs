//! Response and request shapes of the Socket REST API.
//!
//! Fields the API may omit carry `#[serde(default)]`; only the fields the
//! CLI reads or re-emits are modelled.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use socket_core::types::{AlertSeverity, PolicyAction};

// ---- artifacts ----

/// A resolved package version reported by a scan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Artifact {
    #[serde(default)]
    pub id: String,
    /// Ecosystem (`npm`, `pypi`, `maven`, ...)
    #[serde(rename = "type")]
    pub ecosystem: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    pub name: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub direct: bool,
    #[serde(default)]
    pub dev: bool,
    #[serde(default)]
    pub manifest_files: Vec<ManifestFileRef>,
    #[serde(default)]
    pub top_level_ancestors: Vec<String>,
    #[serde(default)]
    pub dependencies: Vec<String>,
    #[serde(default)]
    pub alerts: Vec<Alert>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<PackageScore>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license: Option<String>,
}

impl Artifact {
    /// `namespace/name`, or just `name` without a namespace.
    pub fn full_name(&self) -> String {
        match self.namespace.as_deref() {
            Some(ns) if !ns.is_empty() => format!("{ns}/{}", self.name),
            _ => self.name.clone(),
        }
    }

    /// Package URL, e.g. `pkg:npm/%40babel/core@7.0.0` style without encoding.
    pub fn purl(&self) -> String {
        if self.version.is_empty() {
            format!("pkg:{}/{}", self.ecosystem, self.full_name())
        } else {
            format!("pkg:{}/{}@{}", self.ecosystem, self.full_name(), self.version)
        }
    }

    /// socket.dev overview page for this package version.
    pub fn overview_url(&self) -> String {
        let mut url = format!(
            "https://socket.dev/{}/package/{}",
            self.ecosystem,
            self.full_name()
        );
        if !self.version.is_empty() {
            url.push_str("/overview/");
            url.push_str(&self.version);
        }
        url
    }
}

impl fmt::Display for Artifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{} ({})", self.full_name(), self.version, self.ecosystem)
    }
}

/// Manifest that pulled an artifact in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestFileRef {
    pub file: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<u64>,
}

/// A finding attached to an artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    #[serde(default)]
    pub key: String,
    #[serde(rename = "type")]
    pub alert_type: String,
    #[serde(default)]
    pub severity: AlertSeverity,
    #[serde(default)]
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<u64>,
    /// Action the API already resolved for this alert, when it sends one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<PolicyAction>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub props: Option<serde_json::Value>,
}

/// Score sub-fields of an artifact, each in `0.0..=1.0`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PackageScore {
    pub supply_chain: f64,
    pub quality: f64,
    pub maintenance: f64,
    pub vulnerability: f64,
    pub license: f64,
    pub overall: f64,
}

// ---- policies ----

/// Organization security policy: alert type -> action.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SecurityPolicy {
    pub security_policy_rules: BTreeMap<String, PolicyRule>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub security_policy_default: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PolicyRule {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<PolicyAction>,
}

/// Organization license policy. The shape varies by plan, so it is kept as
/// an ordered JSON object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LicensePolicy(pub BTreeMap<String, serde_json::Value>);

// ---- organizations ----

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrganizationsResponse {
    #[serde(default)]
    pub organizations: BTreeMap<String, Organization>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Organization {
    pub id: String,
    pub name: Option<String>,
    pub image: Option<String>,
    pub plan: String,
    pub slug: String,
}

// ---- full scans ----

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FullScan {
    pub id: String,
    pub created_at: String,
    pub updated_at: String,
    pub organization_id: String,
    pub organization_slug: Option<String>,
    pub repository_id: String,
    pub repository_slug: Option<String>,
    pub repo: Option<String>,
    pub branch: Option<String>,
    pub commit_message: Option<String>,
    pub commit_hash: Option<String>,
    pub pull_request: Option<u64>,
    pub committers: Vec<String>,
    pub html_report_url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FullScanList {
    #[serde(default)]
    pub results: Vec<FullScan>,
    #[serde(rename = "nextPage", default)]
    pub next_page: Option<u64>,
}

/// Query for `GET orgs/{org}/full-scans`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FullScanQuery {
    pub sort: Option<String>,
    pub direction: Option<String>,
    pub per_page: Option<u32>,
    pub page: Option<u32>,
    pub from: Option<String>,
    pub branch: Option<String>,
    pub repo: Option<String>,
}

impl FullScanQuery {
    pub fn pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        push_opt(&mut pairs, "sort", self.sort.clone());
        push_opt(&mut pairs, "direction", self.direction.clone());
        push_opt(&mut pairs, "per_page", self.per_page.map(|v| v.to_string()));
        push_opt(&mut pairs, "page", self.page.map(|v| v.to_string()));
        push_opt(&mut pairs, "from", self.from.clone());
        push_opt(&mut pairs, "branch", self.branch.clone());
        push_opt(&mut pairs, "repo", self.repo.clone());
        pairs
    }
}

/// Query parameters for `POST orgs/{org}/full-scans`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CreateScanParams {
    pub repo: String,
    pub branch: String,
    pub commit_message: Option<String>,
    pub commit_hash: Option<String>,
    pub pull_request: Option<u64>,
    pub committers: Option<String>,
    pub make_default_branch: bool,
    pub set_as_pending_head: bool,
    pub tmp: bool,
}

impl CreateScanParams {
    pub fn pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![("repo", self.repo.clone()), ("branch", self.branch.clone())];
        push_opt(&mut pairs, "commit_message", self.commit_message.clone());
        push_opt(&mut pairs, "commit_hash", self.commit_hash.clone());
        push_opt(
            &mut pairs,
            "pull_request",
            self.pull_request.map(|v| v.to_string()),
        );
        push_opt(&mut pairs, "committers", self.committers.clone());
        pairs.push(("make_default_branch", self.make_default_branch.to_string()));
        pairs.push(("set_as_pending_head", self.set_as_pending_head.to_string()));
        pairs.push(("tmp", self.tmp.to_string()));
        pairs
    }
}

/// Server-side diff of two full scans.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FullScanDiff {
    pub before: FullScan,
    pub after: FullScan,
    pub diff_report_url: Option<String>,
    #[serde(rename = "directDependenciesChanged")]
    pub direct_dependencies_changed: bool,
    pub artifacts: DiffArtifacts,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiffArtifacts {
    pub added: Vec<Artifact>,
    pub removed: Vec<Artifact>,
    pub unchanged: Vec<Artifact>,
    pub replaced: Vec<Artifact>,
    pub updated: Vec<Artifact>,
}

// ---- repositories ----

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Repository {
    pub id: String,
    pub created_at: String,
    pub updated_at: String,
    pub slug: String,
    pub name: String,
    pub head_full_scan_id: Option<String>,
    pub description: Option<String>,
    pub homepage: Option<String>,
    pub visibility: String,
    pub archived: bool,
    pub default_branch: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RepositoryList {
    #[serde(default)]
    pub results: Vec<Repository>,
    #[serde(rename = "nextPage", default)]
    pub next_page: Option<u64>,
}

/// Body for creating or updating a repository.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RepoParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub homepage: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_branch: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visibility: Option<String>,
}

/// Query for `GET orgs/{org}/repos`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RepoQuery {
    pub sort: Option<String>,
    pub direction: Option<String>,
    pub per_page: Option<u32>,
    pub page: Option<u32>,
}

impl RepoQuery {
    pub fn pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        push_opt(&mut pairs, "sort", self.sort.clone());
        push_opt(&mut pairs, "direction", self.direction.clone());
        push_opt(&mut pairs, "per_page", self.per_page.map(|v| v.to_string()));
        push_opt(&mut pairs, "page", self.page.map(|v| v.to_string()));
        pairs
    }
}

// ---- analytics ----

/// One day of org or repo alert analytics.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyticsRow {
    pub created_at: String,
    pub repository_name: Option<String>,
    pub total_critical_alerts: u64,
    pub total_high_alerts: u64,
    pub total_medium_alerts: u64,
    pub total_low_alerts: u64,
    pub total_critical_added: u64,
    pub total_high_added: u64,
    pub total_medium_added: u64,
    pub total_low_added: u64,
    pub total_critical_prevented: u64,
    pub total_high_prevented: u64,
    pub total_medium_prevented: u64,
    pub total_low_prevented: u64,
    pub top_five_alert_types: BTreeMap<String, u64>,
}

// ---- audit log ----

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuditLogPage {
    #[serde(default)]
    pub results: Vec<AuditLogEvent>,
    #[serde(rename = "nextPage", default)]
    pub next_page: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuditLogEvent {
    pub event_id: String,
    pub created_at: String,
    #[serde(rename = "type")]
    pub event_type: String,
    pub user_email: Option<String>,
    pub ip_address: Option<String>,
    pub country_code: Option<String>,
    pub payload: Option<serde_json::Value>,
}

/// Query for `GET orgs/{org}/audit-log`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AuditLogQuery {
    pub event_type: Option<String>,
    pub per_page: Option<u32>,
    pub page: Option<u32>,
}

impl AuditLogQuery {
    pub fn pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        push_opt(&mut pairs, "type", self.event_type.clone());
        push_opt(&mut pairs, "per_page", self.per_page.map(|v| v.to_string()));
        push_opt(&mut pairs, "page", self.page.map(|v| v.to_string()));
        pairs
    }
}

// ---- package scores ----

/// Deep score of a package and its transitive closure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PurlScore {
    pub purl: String,
    #[serde(rename = "self")]
    pub own: OwnScore,
    pub transitively: TransitiveScore,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OwnScore {
    pub purl: String,
    pub score: ScoreBreakdown,
    pub capabilities: Vec<String>,
    pub alerts: Vec<ScoreAlert>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TransitiveScore {
    pub dependency_count: u64,
    pub func: String,
    pub score: ScoreBreakdown,
    /// Score category -> purl of the weakest dependency in it
    pub lowest: BTreeMap<String, String>,
    pub capabilities: Vec<String>,
    pub alerts: Vec<ScoreAlert>,
}

/// Scores on a 0-100 scale.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ScoreBreakdown {
    pub supply_chain: f64,
    pub maintenance: f64,
    pub quality: f64,
    pub vulnerability: f64,
    pub license: f64,
    pub overall: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreAlert {
    pub name: String,
    pub severity: AlertSeverity,
    pub category: String,
    pub example: String,
}

// ---- dependencies ----

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DependencySearch {
    pub end: bool,
    pub rows: Vec<DependencyRow>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DependencyRow {
    pub namespace: Option<String>,
    pub name: String,
    pub version: String,
    #[serde(rename = "type")]
    pub ecosystem: String,
    pub direct: bool,
    pub repository: String,
    pub branch: String,
}

// ---- threat feed ----

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ThreatFeedPage {
    #[serde(default)]
    pub results: Vec<ThreatFeedItem>,
    #[serde(rename = "nextPage", default)]
    pub next_page: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ThreatFeedItem {
    pub id: u64,
    pub created_at: String,
    pub updated_at: String,
    pub threat_type: String,
    pub purl: String,
    pub location_html_url: String,
    pub package_html_url: String,
    pub removed_at: Option<String>,
    pub needs_human_review: bool,
    pub description: Option<String>,
}

/// Query for `GET orgs/{org}/threat-feed`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ThreatFeedQuery {
    pub page: Option<String>,
    pub per_page: Option<u32>,
    pub direction: Option<String>,
    pub filter: Option<String>,
}

impl ThreatFeedQuery {
    pub fn pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        push_opt(&mut pairs, "page", self.page.clone());
        push_opt(&mut pairs, "per_page", self.per_page.map(|v| v.to_string()));
        push_opt(&mut pairs, "direction", self.direction.clone());
        push_opt(&mut pairs, "filter", self.filter.clone());
        pairs
    }
}

// ---- supported manifest files ----

/// `GET report/supported`: ecosystem -> manifest kind -> filename pattern.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SupportedFiles(pub BTreeMap<String, BTreeMap<String, SupportedPattern>>);

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupportedPattern {
    pub pattern: String,
}

impl SupportedFiles {
    /// Every pattern across all ecosystems.
    pub fn patterns(&self) -> Vec<String> {
        let mut patterns: Vec<String> = self
            .0
            .values()
            .flat_map(|kinds| kinds.values().map(|p| p.pattern.clone()))
            .collect();
        patterns.sort();
        patterns.dedup();
        patterns
    }
}

fn push_opt(pairs: &mut Vec<(&'static str, String)>, key: &'static str, value: Option<String>) {
    if let Some(value) = value {
        if !value.is_empty() {
            pairs.push((key, value));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn artifact_json() -> &'static str {
        r#"{
            "id": "a1",
            "type": "npm",
            "namespace": "@babel",
            "name": "core",
            "version": "7.24.0",
            "direct": true,
            "manifestFiles": [{"file": "package-lock.json", "start": 10, "end": 20}],
            "topLevelAncestors": [],
            "alerts": [
                {"key": "k1", "type": "networkAccess", "severity": "middle", "category": "supplyChainRisk", "file": "lib/index.js", "start": 3, "end": 9}
            ],
            "score": {"supplyChain": 0.9, "quality": 0.8, "maintenance": 0.7, "vulnerability": 1.0, "license": 1.0, "overall": 0.75}
        }"#
    }

    #[test]
    fn artifact_deserializes_camel_case_fields() {
        let artifact: Artifact = serde_json::from_str(artifact_json()).unwrap();
        assert_eq!(artifact.ecosystem, "npm");
        assert_eq!(artifact.full_name(), "@babel/core");
        assert_eq!(artifact.manifest_files[0].file, "package-lock.json");
        assert_eq!(artifact.alerts[0].severity, AlertSeverity::Middle);
        assert_eq!(artifact.alerts[0].file.as_deref(), Some("lib/index.js"));
        assert_eq!(artifact.score.as_ref().unwrap().supply_chain, 0.9);
    }

    #[test]
    fn artifact_requires_type_and_name() {
        let result = serde_json::from_str::<Artifact>(r#"{"error": {"message": "nope"}}"#);
        assert!(result.is_err());
    }

    #[test]
    fn artifact_urls() {
        let artifact: Artifact = serde_json::from_str(artifact_json()).unwrap();
        assert_eq!(artifact.purl(), "pkg:npm/@babel/core@7.24.0");
        assert_eq!(
            artifact.overview_url(),
            "https://socket.dev/npm/package/@babel/core/overview/7.24.0"
        );
    }

    #[test]
    fn security_policy_parses_rules() {
        let json = r#"{
            "securityPolicyRules": {
                "didYouMean": {"action": "error"},
                "unknownRule": {}
            },
            "securityPolicyDefault": "medium"
        }"#;
        let policy: SecurityPolicy = serde_json::from_str(json).unwrap();
        assert_eq!(
            policy.security_policy_rules["didYouMean"].action,
            Some(PolicyAction::Error)
        );
        assert_eq!(policy.security_policy_rules["unknownRule"].action, None);
    }

    #[test]
    fn create_scan_params_pairs_skip_empty_values() {
        let params = CreateScanParams {
            repo: "web".to_owned(),
            branch: "main".to_owned(),
            commit_message: Some(String::new()),
            pull_request: Some(42),
            ..Default::default()
        };
        let pairs = params.pairs();
        assert!(pairs.contains(&("repo", "web".to_owned())));
        assert!(pairs.contains(&("pull_request", "42".to_owned())));
        assert!(!pairs.iter().any(|(k, _)| *k == "commit_message"));
        assert!(pairs.contains(&("tmp", "false".to_owned())));
    }

    #[test]
    fn supported_files_patterns_are_sorted_and_unique() {
        let json = r#"{
            "npm": {"packagejson": {"pattern": "package.json"}, "packagelockjson": {"pattern": "package-lock.json"}},
            "pypi": {"requirements": {"pattern": "*requirements.txt"}, "pyproject": {"pattern": "pyproject.toml"}},
            "other": {"dup": {"pattern": "package.json"}}
        }"#;
        let supported: SupportedFiles = serde_json::from_str(json).unwrap();
        assert_eq!(
            supported.patterns(),
            vec![
                "*requirements.txt",
                "package-lock.json",
                "package.json",
                "pyproject.toml"
            ]
        );
    }

    #[test]
    fn full_scan_list_reads_next_page() {
        let json = r#"{"results": [{"id": "s1", "branch": "main", "committers": ["ana"]}], "nextPage": 2}"#;
        let list: FullScanList = serde_json::from_str(json).unwrap();
        assert_eq!(list.results.len(), 1);
        assert_eq!(list.next_page, Some(2));
        assert_eq!(list.results[0].branch.as_deref(), Some("main"));
    }
}
