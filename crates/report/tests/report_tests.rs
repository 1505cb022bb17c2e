//! Folding properties over a realistic multi-ecosystem scan.

use std::collections::BTreeSet;

use serde_json::json;

use socket_api::models::Artifact;
use socket_core::PolicyAction;
use socket_report::{
    Fold, PolicyTable, Report, ReportOptions, ReportedAlert, generate_report,
};

fn scan() -> Vec<Artifact> {
    serde_json::from_value(json!([
        {
            "id": "1", "type": "npm", "name": "lodahs", "version": "0.0.1", "direct": true,
            "manifestFiles": [{"file": "package.json"}],
            "alerts": [
                {"key": "a1", "type": "didYouMean", "severity": "critical"},
                {"key": "a2", "type": "troll", "severity": "high", "file": "index.js", "start": 3, "end": 9},
                {"key": "a3", "type": "networkAccess", "severity": "middle", "file": "index.js", "start": 12, "end": 20}
            ]
        },
        {
            "id": "2", "type": "npm", "namespace": "@acme", "name": "utils", "version": "2.1.0",
            "manifestFiles": [{"file": "package-lock.json"}, {"file": "package.json"}],
            "alerts": [
                {"key": "b1", "type": "shellAccess", "severity": "middle", "file": "bin/run.js", "start": 1, "end": 2},
                {"key": "b2", "type": "installScripts", "severity": "high", "file": "package.json", "action": "ignore"},
                {"key": "b3", "type": "envVars", "severity": "low", "file": "lib/env.js"}
            ]
        },
        {
            "id": "3", "type": "npm", "namespace": "@acme", "name": "utils", "version": "2.2.0",
            "alerts": [
                {"key": "c1", "type": "troll", "severity": "high", "file": "index.js", "start": 1, "end": 1},
                {"key": "c2", "type": "troll", "severity": "high", "file": "index.js", "start": 40, "end": 41}
            ]
        },
        {
            "id": "4", "type": "pypi", "name": "requests", "version": "2.31.0",
            "alerts": [
                {"key": "d1", "type": "criticalCVE", "severity": "critical", "file": "requests/api.py"},
                {"key": "d2", "type": "unmaintained", "severity": "low"}
            ]
        },
        {
            "id": "5", "type": "pypi", "name": "clean", "version": "1.0.0",
            "alerts": []
        }
    ]))
    .expect("scan fixture")
}

fn policy() -> PolicyTable {
    PolicyTable::new()
        .with_rule("shellAccess", PolicyAction::Error)
        .with_rule("unmaintained", PolicyAction::Monitor)
}

fn options(fold: Fold, report_level: PolicyAction) -> ReportOptions {
    ReportOptions {
        fold,
        report_level,
        short: false,
    }
}

/// Alerts at or above `level`, computed directly from the scan.
fn expected_alerts(
    artifacts: &[Artifact],
    table: &PolicyTable,
    level: PolicyAction,
) -> BTreeSet<ReportedAlert> {
    artifacts
        .iter()
        .flat_map(|artifact| {
            artifact.alerts.iter().filter_map(move |alert| {
                let action = table.action_for(alert);
                (action >= level).then(|| ReportedAlert {
                    package: artifact.purl(),
                    alert_type: alert.alert_type.clone(),
                    key: alert.key.clone(),
                    severity: alert.severity,
                    action,
                    file: alert.file.clone(),
                    start: alert.start,
                    end: alert.end,
                })
            })
        })
        .collect()
}

fn reported_alerts(report: &Report) -> BTreeSet<ReportedAlert> {
    report
        .leaves()
        .into_iter()
        .flat_map(|(_, leaf)| leaf.alerts.iter().cloned())
        .collect()
}

#[test]
fn union_of_folded_alerts_matches_threshold_set() {
    let artifacts = scan();
    let table = policy();
    for fold in Fold::ALL {
        for level in PolicyAction::ALL {
            let report = generate_report(&artifacts, &table, &options(fold, level));
            assert_eq!(
                reported_alerts(&report),
                expected_alerts(&artifacts, &table, level),
                "fold={fold} level={level}"
            );
        }
    }
}

#[test]
fn healthy_iff_empty() {
    let artifacts = scan();
    let table = policy();
    for fold in Fold::ALL {
        for level in PolicyAction::ALL {
            let report = generate_report(&artifacts, &table, &options(fold, level));
            assert_eq!(report.healthy, report.alerts.is_empty(), "fold={fold} level={level}");
        }
    }

    let all = scan();
    let report = generate_report(&all[4..], &table, &options(Fold::None, PolicyAction::Defer));
    assert!(report.healthy);
}

#[test]
fn folding_is_deterministic() {
    let artifacts = scan();
    let mut reversed = scan();
    reversed.reverse();
    let table = policy();

    for fold in Fold::ALL {
        let opts = options(fold, PolicyAction::Warn);
        let a = generate_report(&artifacts, &table, &opts);
        let b = generate_report(&reversed, &table, &opts);
        assert_eq!(a, b, "fold={fold}");
        assert_eq!(
            serde_json::to_string(&a).expect("serialize"),
            serde_json::to_string(&b).expect("serialize")
        );
    }
}

#[test]
fn refolding_is_idempotent_and_matches_direct_fold() {
    let artifacts = scan();
    let table = policy();
    let finest = generate_report(&artifacts, &table, &options(Fold::Type, PolicyAction::Monitor));

    for fold in [Fold::Type, Fold::File, Fold::Version, Fold::Pkg, Fold::All] {
        let direct = generate_report(&artifacts, &table, &options(fold, PolicyAction::Monitor));
        let refolded = finest.refold(fold).expect("coarser fold");
        assert_eq!(refolded, direct, "fold={fold}");
        assert_eq!(refolded.refold(fold).expect("same fold"), refolded);
    }
}

#[test]
fn warn_level_keeps_critical_and_high_only() {
    let artifact: Vec<Artifact> = serde_json::from_value(json!([{
        "id": "x", "type": "npm", "name": "lodahs", "version": "0.0.1",
        "alerts": [
            {"key": "1", "type": "didYouMean", "severity": "critical"},
            {"key": "2", "type": "troll", "severity": "high"},
            {"key": "3", "type": "networkAccess", "severity": "middle"}
        ]
    }]))
    .expect("fixture");

    let report = generate_report(
        &artifact,
        &PolicyTable::new(),
        &options(Fold::Type, PolicyAction::Warn),
    );
    let types: BTreeSet<String> = reported_alerts(&report)
        .into_iter()
        .map(|a| a.alert_type)
        .collect();
    assert_eq!(
        types,
        BTreeSet::from(["didYouMean".to_owned(), "troll".to_owned()])
    );

    let escalated = PolicyTable::new().with_rule("networkAccess", PolicyAction::Error);
    let report = generate_report(&artifact, &escalated, &options(Fold::Type, PolicyAction::Warn));
    assert_eq!(reported_alerts(&report).len(), 3);
}

#[test]
fn alert_level_actions_are_respected() {
    // installScripts is high severity, but the alert itself says ignore
    let artifacts = scan();
    let report = generate_report(&artifacts, &policy(), &options(Fold::Type, PolicyAction::Warn));
    assert!(
        !reported_alerts(&report)
            .iter()
            .any(|a| a.alert_type == "installScripts")
    );
}

#[test]
fn json_round_trip_preserves_report() {
    let artifacts = scan();
    let table = policy();
    for fold in Fold::ALL {
        let report = generate_report(&artifacts, &table, &options(fold, PolicyAction::Ignore))
            .with_scan("acme", "scan-42");
        let json = serde_json::to_string_pretty(&report).expect("serialize");
        let back: Report = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, report, "fold={fold}");
    }
}

#[test]
fn report_json_shape() {
    let artifacts = scan();
    let report = generate_report(&artifacts, &policy(), &options(Fold::Pkg, PolicyAction::Error))
        .with_scan("acme", "scan-42");
    let value = serde_json::to_value(&report).expect("serialize");

    assert_eq!(value["healthy"], false);
    assert_eq!(value["orgSlug"], "acme");
    assert_eq!(value["scanId"], "scan-42");
    assert_eq!(value["options"]["fold"], "pkg");
    assert_eq!(value["options"]["reportLevel"], "error");

    let utils = &value["alerts"]["npm"]["@acme/utils"];
    assert_eq!(utils["policy"], "error");
    assert_eq!(utils["alerts"][0]["type"], "shellAccess");
    assert_eq!(
        utils["manifest"],
        json!(["package-lock.json", "package.json"])
    );
    assert_eq!(value["alerts"]["pypi"]["requests"]["alerts"][0]["type"], "criticalCVE");
    assert!(value["alerts"]["pypi"].get("clean").is_none());
}
