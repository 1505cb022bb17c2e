//! Package score reports (`socket package score` / `socket package shallow`).
//!
//! The deep score endpoint reports scores on a 0-100 scale, the batch
//! endpoint on 0-1. Both are printed as whole percentages.

use std::fmt::{self, Write as _};

use socket_api::models::{Artifact, PurlScore, ScoreAlert, ScoreBreakdown};
use socket_core::types::AlertSeverity;

use crate::markdown::md_table;

/// 0-1 fraction to a whole percentage.
pub fn fraction_to_percent(value: f64) -> u32 {
    (value.clamp(0.0, 1.0) * 100.0).round() as u32
}

/// 0-100 score to a whole percentage.
pub fn clamp_percent(value: f64) -> u32 {
    value.clamp(0.0, 100.0).round() as u32
}

fn score_lines(out: &mut String, score: &ScoreBreakdown) -> fmt::Result {
    writeln!(out, "- Overall: {}", clamp_percent(score.overall))?;
    writeln!(out, "- Maintenance: {}", clamp_percent(score.maintenance))?;
    writeln!(out, "- Quality: {}", clamp_percent(score.quality))?;
    writeln!(out, "- Supply Chain: {}", clamp_percent(score.supply_chain))?;
    writeln!(out, "- Vulnerability: {}", clamp_percent(score.vulnerability))?;
    writeln!(out, "- License: {}", clamp_percent(score.license))
}

fn capability_lines(out: &mut String, capabilities: &[String], none_text: &str) -> fmt::Result {
    if capabilities.is_empty() {
        return writeln!(out, "{none_text}");
    }
    let mut sorted = capabilities.to_vec();
    sorted.sort();
    sorted.dedup();
    for capability in sorted {
        writeln!(out, "- {capability}")?;
    }
    Ok(())
}

fn severity_rank(severity: AlertSeverity) -> std::cmp::Reverse<AlertSeverity> {
    std::cmp::Reverse(severity)
}

fn alert_table(alerts: &[ScoreAlert], with_example: bool) -> String {
    let mut sorted: Vec<&ScoreAlert> = alerts.iter().collect();
    sorted.sort_by(|a, b| {
        severity_rank(a.severity)
            .cmp(&severity_rank(b.severity))
            .then_with(|| a.name.cmp(&b.name))
    });

    if with_example {
        let rows: Vec<Vec<String>> = sorted
            .iter()
            .map(|a| {
                vec![
                    a.severity.to_string(),
                    a.name.clone(),
                    a.category.clone(),
                    a.example.clone(),
                ]
            })
            .collect();
        md_table(&["Severity", "Alert name", "Category", "Example package"], &rows)
    } else {
        let rows: Vec<Vec<String>> = sorted
            .iter()
            .map(|a| vec![a.severity.to_string(), a.name.clone(), a.category.clone()])
            .collect();
        md_table(&["Severity", "Alert name", "Category"], &rows)
    }
}

/// Markdown report for a package and its full dependency tree.
pub fn build_deep_report(score: &PurlScore) -> Result<String, fmt::Error> {
    let purl = if score.purl.is_empty() {
        score.own.purl.as_str()
    } else {
        score.purl.as_str()
    };
    let transitive = &score.transitively;
    let mut out = String::new();

    writeln!(out, "# Complete Package Score\n")?;
    writeln!(
        out,
        "Socket report for the package *\"{purl}\"* and its *{}* direct and transitive \
         dependencies.\n",
        transitive.dependency_count
    )?;
    writeln!(
        out,
        "The shallow score covers the package alone; the deep score aggregates the package \
         with every transitive dependency.\n"
    )?;

    writeln!(out, "## Package itself\n")?;
    writeln!(out, "### Shallow Score\n")?;
    score_lines(&mut out, &score.own.score)?;
    writeln!(out)?;
    writeln!(out, "### Capabilities\n")?;
    capability_lines(&mut out, &score.own.capabilities, "This package has no capabilities.")?;
    writeln!(out)?;
    writeln!(out, "### Alerts for this package\n")?;
    if score.own.alerts.is_empty() {
        writeln!(out, "There are no alerts for this package.")?;
    } else {
        out.push_str(&alert_table(&score.own.alerts, false));
    }
    writeln!(out)?;

    writeln!(out, "## Transitive Package Results\n")?;
    writeln!(
        out,
        "Results for the package and all its {} dependencies.\n",
        transitive.dependency_count
    )?;
    writeln!(out, "### Deep Score\n")?;
    if !transitive.func.is_empty() {
        writeln!(out, "Aggregated with `{}`.\n", transitive.func)?;
    }
    score_lines(&mut out, &transitive.score)?;
    writeln!(out)?;
    writeln!(out, "### Capabilities\n")?;
    capability_lines(
        &mut out,
        &transitive.capabilities,
        "No capabilities were found in any dependency.",
    )?;
    writeln!(out)?;
    writeln!(out, "### Alerts\n")?;
    if transitive.alerts.is_empty() {
        writeln!(out, "There are no alerts in the dependency tree.")?;
    } else {
        out.push_str(&alert_table(&transitive.alerts, true));
    }
    writeln!(out)?;

    if !transitive.lowest.is_empty() {
        writeln!(out, "### Lowest scoring dependencies\n")?;
        let rows: Vec<Vec<String>> = transitive
            .lowest
            .iter()
            .map(|(category, purl)| vec![category.clone(), purl.clone()])
            .collect();
        out.push_str(&md_table(&["Category", "Package"], &rows));
    }

    Ok(out)
}

fn score_row(name: &str, fraction: f64) -> Vec<String> {
    vec![name.to_owned(), fraction_to_percent(fraction).to_string()]
}

/// Markdown report for packages fetched without their dependencies.
pub fn build_shallow_report(artifacts: &[Artifact]) -> Result<String, fmt::Error> {
    let mut out = String::new();
    writeln!(out, "# Shallow Package Report\n")?;
    writeln!(
        out,
        "Scores for {} package(s), excluding their dependencies.\n",
        artifacts.len()
    )?;

    if artifacts.is_empty() {
        writeln!(out, "No packages were returned.")?;
        return Ok(out);
    }

    for artifact in artifacts {
        writeln!(out, "## {}\n", artifact.purl())?;
        writeln!(out, "- Name: {}", artifact.full_name())?;
        writeln!(out, "- Version: {}", artifact.version)?;
        writeln!(out, "- Ecosystem: {}", artifact.ecosystem)?;
        if let Some(license) = artifact.license.as_deref().filter(|l| !l.is_empty()) {
            writeln!(out, "- License: {license}")?;
        }
        writeln!(out, "- Page: {}\n", artifact.overview_url())?;

        match &artifact.score {
            Some(score) => {
                let rows = vec![
                    score_row("Overall", score.overall),
                    score_row("Maintenance", score.maintenance),
                    score_row("Quality", score.quality),
                    score_row("Supply Chain", score.supply_chain),
                    score_row("Vulnerability", score.vulnerability),
                    score_row("License", score.license),
                ];
                out.push_str(&md_table(&["Score", "Value"], &rows));
            }
            None => writeln!(out, "No score available.")?,
        }
        writeln!(out)?;

        if artifact.alerts.is_empty() {
            writeln!(out, "No alerts.\n")?;
        } else {
            let mut alerts: Vec<_> = artifact.alerts.iter().collect();
            alerts.sort_by(|a, b| {
                severity_rank(a.severity)
                    .cmp(&severity_rank(b.severity))
                    .then_with(|| a.alert_type.cmp(&b.alert_type))
            });
            let rows: Vec<Vec<String>> = alerts
                .iter()
                .map(|a| {
                    vec![
                        a.severity.to_string(),
                        a.alert_type.clone(),
                        a.category.clone(),
                        a.file.clone().unwrap_or_default(),
                    ]
                })
                .collect();
            out.push_str(&md_table(&["Severity", "Alert", "Category", "File"], &rows));
            writeln!(out)?;
        }
    }

    Ok(out)
}
