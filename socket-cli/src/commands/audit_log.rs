//! `socket audit-log` command handler

use std::io::Write;

use socket_api::models::{AuditLogPage, AuditLogQuery};
use socket_report::md_table;

use crate::cli::AuditLogArgs;
use crate::commands::or_dash;
use crate::context::Context;
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Execute the `audit-log` command.
pub async fn execute(
    args: AuditLogArgs,
    ctx: &Context,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    if args.per_page == 0 || args.page == 0 {
        return Err(CliError::Usage("--per-page and --page start at 1".to_owned()));
    }
    if ctx.bail_if_dry_run("fetch audit log", writer)? {
        return Ok(());
    }

    let client = ctx.client()?;
    let org = ctx.resolve_org(&client).await?;
    let query = AuditLogQuery {
        event_type: args.event_type,
        per_page: Some(args.per_page),
        page: Some(args.page),
    };
    let page = client.audit_log(&org, &query).await?;
    writer.render(&page)
}

fn event_rows(page: &AuditLogPage) -> Vec<Vec<&str>> {
    page.results
        .iter()
        .map(|e| {
            vec![
                e.created_at.as_str(),
                e.event_type.as_str(),
                or_dash(e.user_email.as_deref()),
                or_dash(e.ip_address.as_deref()),
            ]
        })
        .collect()
}

impl Render for AuditLogPage {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        if self.results.is_empty() {
            return writeln!(w, "No audit log events.");
        }
        writeln!(w, "{:<26} {:<28} {:<32} IP", "Time", "Event", "User")?;
        writeln!(w, "{}", "-".repeat(104))?;
        for row in event_rows(self) {
            writeln!(w, "{:<26} {:<28} {:<32} {}", row[0], row[1], row[2], row[3])?;
        }
        if let Some(next) = self.next_page.as_deref().filter(|n| !n.is_empty()) {
            writeln!(w, "\nNext page: {next}")?;
        }
        Ok(())
    }

    fn render_markdown(&self, w: &mut dyn Write) -> std::io::Result<()> {
        writeln!(w, "# Audit log\n")?;
        write!(w, "{}", md_table(&["Time", "Event", "User", "IP"], &event_rows(self)))
    }
}
