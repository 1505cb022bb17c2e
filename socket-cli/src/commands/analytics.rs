//! `socket analytics` command handler

use std::collections::BTreeMap;
use std::io::Write;

use serde::Serialize;

use socket_api::models::AnalyticsRow;
use socket_report::md_table;

use crate::cli::{AnalyticsArgs, AnalyticsScope};
use crate::context::Context;
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Execute the `analytics` command.
pub async fn execute(
    args: AnalyticsArgs,
    ctx: &Context,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    let repo = match (args.scope, args.repo) {
        (AnalyticsScope::Repo, Some(repo)) if !repo.trim().is_empty() => Some(repo),
        (AnalyticsScope::Repo, _) => {
            return Err(CliError::Usage("--scope repo requires --repo".to_owned()));
        }
        (AnalyticsScope::Org, Some(_)) => {
            return Err(CliError::Usage("--repo is only valid with --scope repo".to_owned()));
        }
        (AnalyticsScope::Org, None) => None,
    };

    let scope = repo.clone().unwrap_or_else(|| "organization".to_owned());
    if ctx.bail_if_dry_run(format!("fetch {}-day analytics for {scope}", args.time), writer)? {
        return Ok(());
    }

    let client = ctx.client()?;
    let rows = match &repo {
        Some(repo) => client.repo_analytics(repo, args.time).await?,
        None => client.org_analytics(args.time).await?,
    };

    writer.render(&Analytics::new(scope, args.time, rows))
}

/// Alert totals over the requested window.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Analytics {
    pub scope: String,
    pub days: u32,
    /// Alert types by how often they appear in the daily top five
    pub top_alert_types: BTreeMap<String, u64>,
    pub rows: Vec<AnalyticsRow>,
}

impl Analytics {
    pub fn new(scope: String, days: u32, rows: Vec<AnalyticsRow>) -> Self {
        let mut top_alert_types = BTreeMap::new();
        for row in &rows {
            for (alert_type, count) in &row.top_five_alert_types {
                *top_alert_types.entry(alert_type.clone()).or_insert(0) += count;
            }
        }
        Self {
            scope,
            days,
            top_alert_types,
            rows,
        }
    }

    fn table(&self) -> Vec<Vec<String>> {
        self.rows
            .iter()
            .map(|r| {
                vec![
                    date_of(&r.created_at).to_owned(),
                    r.total_critical_alerts.to_string(),
                    r.total_high_alerts.to_string(),
                    r.total_medium_alerts.to_string(),
                    r.total_low_alerts.to_string(),
                    (r.total_critical_added
                        + r.total_high_added
                        + r.total_medium_added
                        + r.total_low_added)
                        .to_string(),
                    (r.total_critical_prevented
                        + r.total_high_prevented
                        + r.total_medium_prevented
                        + r.total_low_prevented)
                        .to_string(),
                ]
            })
            .collect()
    }

    /// Top alert types, most frequent first.
    fn ranked_types(&self) -> Vec<(&str, u64)> {
        let mut ranked: Vec<(&str, u64)> = self
            .top_alert_types
            .iter()
            .map(|(t, c)| (t.as_str(), *c))
            .collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(b.0)));
        ranked.truncate(5);
        ranked
    }
}

const HEADERS: [&str; 7] = ["Date", "Critical", "High", "Medium", "Low", "Added", "Prevented"];

/// `2024-05-01T00:00:00.000Z` -> `2024-05-01`
fn date_of(timestamp: &str) -> &str {
    timestamp.split('T').next().unwrap_or(timestamp)
}

impl Render for Analytics {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        writeln!(w, "Analytics for {} (last {} days)", self.scope, self.days)?;
        if self.rows.is_empty() {
            return writeln!(w, "No data.");
        }
        writeln!(w)?;
        writeln!(
            w,
            "{:<12} {:>9} {:>9} {:>9} {:>9} {:>9} {:>10}",
            HEADERS[0], HEADERS[1], HEADERS[2], HEADERS[3], HEADERS[4], HEADERS[5], HEADERS[6]
        )?;
        for row in self.table() {
            writeln!(
                w,
                "{:<12} {:>9} {:>9} {:>9} {:>9} {:>9} {:>10}",
                row[0], row[1], row[2], row[3], row[4], row[5], row[6]
            )?;
        }
        let ranked = self.ranked_types();
        if !ranked.is_empty() {
            writeln!(w, "\nTop alert types:")?;
            for (alert_type, count) in ranked {
                writeln!(w, "  {alert_type:<32} {count}")?;
            }
        }
        Ok(())
    }

    fn render_markdown(&self, w: &mut dyn Write) -> std::io::Result<()> {
        writeln!(w, "# Analytics for {} (last {} days)\n", self.scope, self.days)?;
        if self.rows.is_empty() {
            return writeln!(w, "No data.");
        }
        write!(w, "{}", md_table(&HEADERS, &self.table()))?;

        let ranked: Vec<Vec<String>> = self
            .ranked_types()
            .into_iter()
            .map(|(t, c)| vec![t.to_owned(), c.to_string()])
            .collect();
        if !ranked.is_empty() {
            writeln!(w, "\n## Top alert types\n")?;
            write!(w, "{}", md_table(&["Alert type", "Count"], &ranked))?;
        }
        Ok(())
    }
}
