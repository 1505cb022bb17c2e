//! `socket threat-feed` command handler

use std::io::Write;

use socket_api::models::{ThreatFeedPage, ThreatFeedQuery};
use socket_report::md_table;

use crate::cli::ThreatFeedArgs;
use crate::context::Context;
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Execute the `threat-feed` command.
pub async fn execute(
    args: ThreatFeedArgs,
    ctx: &Context,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    let direction = args.direction.to_lowercase();
    if direction != "asc" && direction != "desc" {
        return Err(CliError::Usage(format!(
            "invalid direction '{}' (expected: asc, desc)",
            args.direction
        )));
    }
    if ctx.bail_if_dry_run("fetch threat feed", writer)? {
        return Ok(());
    }

    let client = ctx.client()?;
    let org = ctx.resolve_org(&client).await?;
    let query = ThreatFeedQuery {
        page: args.page,
        per_page: Some(args.per_page),
        direction: Some(direction),
        filter: args.filter,
    };
    let page = client.threat_feed(&org, &query).await?;
    writer.render(&page)
}

fn threat_rows(page: &ThreatFeedPage) -> Vec<Vec<String>> {
    page.results
        .iter()
        .map(|t| {
            vec![
                t.created_at.clone(),
                t.threat_type.clone(),
                t.purl.clone(),
                if t.removed_at.is_some() { "removed" } else { "live" }.to_owned(),
                t.location_html_url.clone(),
            ]
        })
        .collect()
}

impl Render for ThreatFeedPage {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        if self.results.is_empty() {
            return writeln!(w, "No threats.");
        }
        for item in &self.results {
            let status = if item.removed_at.is_some() {
                "removed".dimmed()
            } else {
                "live".red()
            };
            writeln!(
                w,
                "{} {:<8} {} [{}]",
                item.created_at, item.threat_type, item.purl, status
            )?;
            if let Some(description) = item.description.as_deref().filter(|d| !d.is_empty()) {
                writeln!(w, "    {description}")?;
            }
        }
        if let Some(next) = self.next_page.as_deref().filter(|n| !n.is_empty()) {
            writeln!(w, "\nNext page: --page {next}")?;
        }
        Ok(())
    }

    fn render_markdown(&self, w: &mut dyn Write) -> std::io::Result<()> {
        writeln!(w, "# Threat feed\n")?;
        write!(
            w,
            "{}",
            md_table(&["Detected", "Type", "Package", "Status", "Details"], &threat_rows(self))
        )
    }
}
