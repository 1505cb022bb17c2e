//! `socket dependencies` command handler

use std::io::Write;

use serde::Serialize;

use socket_api::models::{DependencyRow, DependencySearch};
use socket_report::md_table;

use crate::cli::DependenciesArgs;
use crate::context::Context;
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Execute the `dependencies` command.
pub async fn execute(
    args: DependenciesArgs,
    ctx: &Context,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    if args.limit == 0 {
        return Err(CliError::Usage("--limit must be at least 1".to_owned()));
    }
    if ctx.bail_if_dry_run(
        format!("search dependencies (limit {}, offset {})", args.limit, args.offset),
        writer,
    )? {
        return Ok(());
    }

    let client = ctx.client()?;
    let search = client.search_dependencies(args.limit, args.offset).await?;
    writer.render(&Dependencies {
        limit: args.limit,
        offset: args.offset,
        search,
    })
}

#[derive(Serialize)]
pub struct Dependencies {
    pub limit: u32,
    pub offset: u32,
    #[serde(flatten)]
    pub search: DependencySearch,
}

fn dependency_rows(rows: &[DependencyRow]) -> Vec<Vec<String>> {
    rows.iter()
        .map(|d| {
            let name = match d.namespace.as_deref() {
                Some(ns) if !ns.is_empty() => format!("{ns}/{}", d.name),
                _ => d.name.clone(),
            };
            vec![
                d.ecosystem.clone(),
                name,
                d.version.clone(),
                if d.direct { "direct" } else { "transitive" }.to_owned(),
                d.repository.clone(),
                d.branch.clone(),
            ]
        })
        .collect()
}

const HEADERS: [&str; 6] = ["Ecosystem", "Name", "Version", "Dependency", "Repository", "Branch"];

impl Render for Dependencies {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        if self.search.rows.is_empty() {
            return writeln!(w, "No dependencies.");
        }
        writeln!(
            w,
            "{:<10} {:<36} {:<14} {:<11} {:<24} {}",
            HEADERS[0], HEADERS[1], HEADERS[2], HEADERS[3], HEADERS[4], HEADERS[5]
        )?;
        for row in dependency_rows(&self.search.rows) {
            writeln!(
                w,
                "{:<10} {:<36} {:<14} {:<11} {:<24} {}",
                row[0], row[1], row[2], row[3], row[4], row[5]
            )?;
        }
        if !self.search.end {
            writeln!(w, "\nMore results: --offset {}", self.offset + self.limit)?;
        }
        Ok(())
    }

    fn render_markdown(&self, w: &mut dyn Write) -> std::io::Result<()> {
        writeln!(w, "# Dependencies\n")?;
        write!(w, "{}", md_table(&HEADERS, &dependency_rows(&self.search.rows)))
    }
}
