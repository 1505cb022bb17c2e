//! Local comparison of two scans.
//!
//! Packages are matched by ecosystem and name. A package whose set of
//! resolved versions changed counts as updated rather than removed and added.
//! Alerts are matched by package, type and file, ignoring the version, so an
//! alert that survives an upgrade is neither introduced nor resolved.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use socket_api::models::Artifact;
use socket_core::types::AlertSeverity;

use crate::index::ArtifactIndex;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PackageRef {
    pub ecosystem: String,
    pub name: String,
    pub version: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionChange {
    pub ecosystem: String,
    pub name: String,
    pub before: Vec<String>,
    pub after: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ComparedAlert {
    pub ecosystem: String,
    pub name: String,
    #[serde(rename = "type")]
    pub alert_type: String,
    pub severity: AlertSeverity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
}

/// Result of [`compare_scans`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanComparison {
    pub added: Vec<PackageRef>,
    pub removed: Vec<PackageRef>,
    pub updated: Vec<VersionChange>,
    /// Packages present with identical versions in both scans
    pub unchanged: usize,
    pub introduced_alerts: Vec<ComparedAlert>,
    pub resolved_alerts: Vec<ComparedAlert>,
}

impl ScanComparison {
    pub fn has_changes(&self) -> bool {
        !(self.added.is_empty()
            && self.removed.is_empty()
            && self.updated.is_empty()
            && self.introduced_alerts.is_empty()
            && self.resolved_alerts.is_empty())
    }
}

type PackageKey = (String, String);

fn versions_by_package(index: &ArtifactIndex<'_>) -> BTreeMap<PackageKey, BTreeSet<String>> {
    let mut map: BTreeMap<PackageKey, BTreeSet<String>> = BTreeMap::new();
    for artifact in index.iter() {
        map.entry((artifact.ecosystem.clone(), artifact.full_name()))
            .or_default()
            .insert(artifact.version.clone());
    }
    map
}

fn alert_set(index: &ArtifactIndex<'_>) -> BTreeSet<ComparedAlert> {
    index
        .iter()
        .flat_map(|artifact| {
            artifact.alerts.iter().map(move |alert| ComparedAlert {
                ecosystem: artifact.ecosystem.clone(),
                name: artifact.full_name(),
                alert_type: alert.alert_type.clone(),
                severity: alert.severity,
                file: alert.file.clone(),
            })
        })
        .collect()
}

fn package_refs(key: &PackageKey, versions: &BTreeSet<String>) -> impl Iterator<Item = PackageRef> {
    let (ecosystem, name) = key.clone();
    versions.clone().into_iter().map(move |version| PackageRef {
        ecosystem: ecosystem.clone(),
        name: name.clone(),
        version,
    })
}

/// Compares the artifacts of two scans.
pub fn compare_scans(before: &[Artifact], after: &[Artifact]) -> ScanComparison {
    let before_index = ArtifactIndex::new(before);
    let after_index = ArtifactIndex::new(after);
    let before_pkgs = versions_by_package(&before_index);
    let after_pkgs = versions_by_package(&after_index);

    let mut comparison = ScanComparison::default();

    for (key, versions) in &after_pkgs {
        match before_pkgs.get(key) {
            None => comparison.added.extend(package_refs(key, versions)),
            Some(old) if old == versions => comparison.unchanged += 1,
            Some(old) => comparison.updated.push(VersionChange {
                ecosystem: key.0.clone(),
                name: key.1.clone(),
                before: old.iter().cloned().collect(),
                after: versions.iter().cloned().collect(),
            }),
        }
    }
    for (key, versions) in &before_pkgs {
        if !after_pkgs.contains_key(key) {
            comparison.removed.extend(package_refs(key, versions));
        }
    }

    let before_alerts = alert_set(&before_index);
    let after_alerts = alert_set(&after_index);
    comparison.introduced_alerts = after_alerts.difference(&before_alerts).cloned().collect();
    comparison.resolved_alerts = before_alerts.difference(&after_alerts).cloned().collect();

    tracing::debug!(
        added = comparison.added.len(),
        removed = comparison.removed.len(),
        updated = comparison.updated.len(),
        unchanged = comparison.unchanged,
        "scans compared"
    );
    comparison
}
