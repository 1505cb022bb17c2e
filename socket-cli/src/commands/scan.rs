//! `socket scan` command handler

use std::io::Write;
use std::path::PathBuf;

use serde::Serialize;
use tracing::{info, warn};

use socket_api::manifest::DEFAULT_MAX_MANIFEST_SIZE;
use socket_api::models::{
    Artifact, CreateScanParams, FullScan, FullScanDiff, FullScanList, FullScanQuery,
};
use socket_api::{ManifestMatcher, NdjsonBatch, SocketClient, discover_manifests};
use socket_report::{
    PolicyTable, Report, ReportOptions, ScanComparison, ShortReport, compare_scans,
    generate_report, md_table,
};

use crate::cli::{ReportFlags, ScanAction, ScanArgs, ScanCreateArgs, ScanDiffArgs, ScanListArgs};
use crate::commands::or_dash;
use crate::context::Context;
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Execute the `scan` command.
pub async fn execute(args: ScanArgs, ctx: &Context, writer: &OutputWriter) -> Result<(), CliError> {
    match args.action {
        ScanAction::Create(args) => execute_create(args, ctx, writer).await,
        ScanAction::List(args) => execute_list(args, ctx, writer).await,
        ScanAction::View { scan_id } => execute_view(&scan_id, ctx, writer).await,
        ScanAction::Metadata { scan_id } => execute_metadata(&scan_id, ctx, writer).await,
        ScanAction::Del { scan_id } => execute_delete(&scan_id, ctx, writer).await,
        ScanAction::Report(args) => {
            if ctx.bail_if_dry_run(format!("report on scan {}", args.scan_id), writer)? {
                return Ok(());
            }
            let client = ctx.client()?;
            let org = ctx.resolve_org(&client).await?;
            let report =
                build_report(&client, &org, &args.scan_id, &args.report_options).await?;
            emit_report(report, args.report_options.short, writer)
        }
        ScanAction::Diff(args) => execute_diff(args, ctx, writer).await,
    }
}

fn report_options(flags: &ReportFlags) -> ReportOptions {
    ReportOptions {
        fold: flags.fold,
        report_level: flags.report_level,
        short: flags.short,
    }
}

/// Fetches the artifacts and security policy of a scan and folds them.
///
/// Unlike `scan view`, a single unparsable line fails the report: a report
/// built on missing artifacts could claim a scan is healthy when it is not.
async fn build_report(
    client: &SocketClient,
    org: &str,
    scan_id: &str,
    flags: &ReportFlags,
) -> Result<Report, CliError> {
    let artifacts = client.full_scan_artifacts(org, scan_id).await?.into_strict()?;
    let policy = client.security_policy(org).await?;
    let table = PolicyTable::from(&policy);

    let report =
        generate_report(&artifacts, &table, &report_options(flags)).with_scan(org, scan_id);
    info!(
        scan = %scan_id,
        artifacts = artifacts.len(),
        alerts = report.alert_count(),
        healthy = report.healthy,
        "report generated"
    );
    Ok(report)
}

/// Fails when the report has alerts at or above its report level.
fn check_health(report: &Report) -> Result<(), CliError> {
    if report.healthy {
        Ok(())
    } else {
        Err(CliError::Unhealthy(format!(
            "{} alert(s) at or above '{}'",
            report.alert_count(),
            report.options.report_level
        )))
    }
}

/// Prints the report, then fails when it is not healthy.
fn emit_report(report: Report, short: bool, writer: &OutputWriter) -> Result<(), CliError> {
    let health = check_health(&report);
    writer.render(&ReportView::new(report, short))?;
    health
}

/// Warns about every line of an artifact stream that could not be decoded.
fn warn_partial(scan_id: &str, batch: &NdjsonBatch<Artifact>) {
    for error in &batch.errors {
        warn!(
            scan = %scan_id,
            line = error.line,
            reason = %error.reason,
            "skipping unparsable artifact"
        );
    }
    if !batch.is_complete() {
        warn!(
            scan = %scan_id,
            skipped = batch.errors.len(),
            "scan output is incomplete"
        );
    }
}

// ---- create ----

/// Directory upload names are relative to: the target itself when there is
/// exactly one directory, the working directory otherwise.
fn upload_root(targets: &[PathBuf]) -> PathBuf {
    match targets {
        [only] if only.is_dir() => only.clone(),
        _ => PathBuf::from("."),
    }
}

async fn manifest_matcher(client: &SocketClient) -> ManifestMatcher {
    match client.supported_files().await {
        Ok(supported) => {
            let matcher = ManifestMatcher::from_supported(&supported);
            if matcher.patterns().is_empty() {
                ManifestMatcher::default()
            } else {
                matcher
            }
        }
        Err(e) => {
            warn!(error = %e, "could not fetch supported manifest files, using built-in list");
            ManifestMatcher::default()
        }
    }
}

fn find_manifests(
    targets: &[PathBuf],
    matcher: &ManifestMatcher,
) -> Result<Vec<PathBuf>, CliError> {
    let files = discover_manifests(targets, matcher, DEFAULT_MAX_MANIFEST_SIZE);
    if files.is_empty() {
        let shown: Vec<String> = targets.iter().map(|t| t.display().to_string()).collect();
        return Err(CliError::Command(format!(
            "no manifest files found in {}",
            shown.join(", ")
        )));
    }
    Ok(files)
}

async fn execute_create(
    args: ScanCreateArgs,
    ctx: &Context,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    if args.repo.trim().is_empty() || args.branch.trim().is_empty() {
        return Err(CliError::Usage("--repo and --branch must not be empty".to_owned()));
    }

    if ctx.dry_run {
        let files = find_manifests(&args.targets, &ManifestMatcher::default())?;
        ctx.bail_if_dry_run(
            format!(
                "upload {} manifest file(s) for {}@{}",
                files.len(),
                args.repo,
                args.branch
            ),
            writer,
        )?;
        return Ok(());
    }

    let client = ctx.client()?;
    let org = ctx.resolve_org(&client).await?;
    let matcher = manifest_matcher(&client).await;
    let files = find_manifests(&args.targets, &matcher)?;
    let root = upload_root(&args.targets);
    info!(org = %org, files = files.len(), root = %root.display(), "creating full scan");

    let params = CreateScanParams {
        repo: args.repo.clone(),
        branch: args.branch.clone(),
        commit_message: args.commit_message.clone(),
        commit_hash: args.commit_hash.clone(),
        pull_request: args.pull_request,
        committers: args.committers.clone(),
        make_default_branch: args.make_default_branch,
        set_as_pending_head: args.set_as_alerts_page,
        tmp: args.tmp,
    };
    let scan = client.create_full_scan(&org, &params, &root, &files).await?;
    info!(scan = %scan.id, "full scan created");

    let report = if args.report {
        Some(build_report(&client, &org, &scan.id, &args.report_options).await?)
    } else {
        None
    };
    let health = report.as_ref().map_or(Ok(()), check_health);

    writer.render(&ScanCreated {
        scan,
        files: files.iter().map(|f| f.display().to_string()).collect(),
        report: report.map(|r| ReportView::new(r, args.report_options.short)),
    })?;
    health
}

// ---- list / view / metadata / delete ----

async fn execute_list(
    args: ScanListArgs,
    ctx: &Context,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    if ctx.bail_if_dry_run("list full scans", writer)? {
        return Ok(());
    }
    let client = ctx.client()?;
    let org = ctx.resolve_org(&client).await?;
    let query = FullScanQuery {
        sort: Some(args.sort),
        direction: Some(args.direction),
        per_page: Some(args.per_page),
        page: Some(args.page),
        from: args.from_time,
        branch: args.branch,
        repo: args.repo,
    };
    let list = client.list_full_scans(&org, &query).await?;
    writer.render(&list)
}

async fn execute_view(
    scan_id: &str,
    ctx: &Context,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    if ctx.bail_if_dry_run(format!("view scan {scan_id}"), writer)? {
        return Ok(());
    }
    let client = ctx.client()?;
    let org = ctx.resolve_org(&client).await?;
    let batch = client.full_scan_artifacts(&org, scan_id).await?;
    warn_partial(scan_id, &batch);

    writer.render(&ScanView {
        scan_id: scan_id.to_owned(),
        skipped_lines: batch.errors.len(),
        artifacts: batch.items,
    })
}

async fn execute_metadata(
    scan_id: &str,
    ctx: &Context,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    if ctx.bail_if_dry_run(format!("show metadata of scan {scan_id}"), writer)? {
        return Ok(());
    }
    let client = ctx.client()?;
    let org = ctx.resolve_org(&client).await?;
    let scan = client.full_scan_metadata(&org, scan_id).await?;
    writer.render(&scan)
}

async fn execute_delete(
    scan_id: &str,
    ctx: &Context,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    if ctx.bail_if_dry_run(format!("delete scan {scan_id}"), writer)? {
        return Ok(());
    }
    let client = ctx.client()?;
    let org = ctx.resolve_org(&client).await?;
    client.delete_full_scan(&org, scan_id).await?;
    info!(scan = %scan_id, "full scan deleted");
    writer.render(&ScanDeleted {
        scan_id: scan_id.to_owned(),
        deleted: true,
    })
}

// ---- diff ----

async fn execute_diff(
    args: ScanDiffArgs,
    ctx: &Context,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    if args.before == args.after {
        return Err(CliError::Usage(
            "before and after must be different scans".to_owned(),
        ));
    }
    if ctx.bail_if_dry_run(format!("diff scans {} and {}", args.before, args.after), writer)? {
        return Ok(());
    }
    let client = ctx.client()?;
    let org = ctx.resolve_org(&client).await?;

    if args.local {
        let before = client.full_scan_artifacts(&org, &args.before).await?.into_strict()?;
        let after = client.full_scan_artifacts(&org, &args.after).await?.into_strict()?;
        let comparison = compare_scans(&before, &after);
        return writer.render(&LocalDiff {
            before: args.before,
            after: args.after,
            comparison,
        });
    }

    let diff = client.full_scan_diff(&org, &args.before, &args.after).await?;
    writer.render(&diff)
}

// ---- payloads ----

#[derive(Serialize)]
pub struct ScanCreated {
    #[serde(flatten)]
    pub scan: FullScan,
    pub files: Vec<String>,
    /// Present with `--report`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<ReportView>,
}

impl Render for ScanCreated {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        writeln!(w, "Created full scan {}", self.scan.id.bold())?;
        writeln!(w, "Uploaded {} manifest file(s):", self.files.len())?;
        for file in &self.files {
            writeln!(w, "  {file}")?;
        }
        if let Some(url) = &self.scan.html_report_url {
            writeln!(w, "Report: {url}")?;
        }
        if let Some(report) = &self.report {
            writeln!(w)?;
            report.render_text(w)?;
        }
        Ok(())
    }

    fn render_markdown(&self, w: &mut dyn Write) -> std::io::Result<()> {
        writeln!(w, "# Full scan {}\n", self.scan.id)?;
        writeln!(w, "Uploaded {} manifest file(s).\n", self.files.len())?;
        if let Some(url) = &self.scan.html_report_url {
            writeln!(w, "Report: <{url}>\n")?;
        }
        match &self.report {
            Some(report) => report.render_markdown(w),
            None => Ok(()),
        }
    }
}

/// A report as printed: every folded alert, or only `{ healthy }` with `--short`.
#[derive(Serialize)]
#[serde(untagged)]
pub enum ReportView {
    Full(Report),
    Short(ShortReport),
}

impl ReportView {
    pub fn new(report: Report, short: bool) -> Self {
        if short {
            Self::Short(report.short())
        } else {
            Self::Full(report)
        }
    }
}

impl Render for ReportView {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        match self {
            Self::Full(report) => report.render_text(w),
            Self::Short(short) => short.render_text(w),
        }
    }

    fn render_markdown(&self, w: &mut dyn Write) -> std::io::Result<()> {
        match self {
            Self::Full(report) => report.render_markdown(w),
            Self::Short(short) => short.render_markdown(w),
        }
    }
}

/// Artifacts of one scan. `skipped_lines` counts lines that failed to decode.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanView {
    pub scan_id: String,
    pub skipped_lines: usize,
    pub artifacts: Vec<Artifact>,
}

impl ScanView {
    fn rows(&self) -> Vec<Vec<String>> {
        self.artifacts
            .iter()
            .map(|a| {
                vec![
                    a.purl(),
                    if a.direct { "direct" } else { "transitive" }.to_owned(),
                    a.alerts.len().to_string(),
                ]
            })
            .collect()
    }
}

impl Render for ScanView {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        writeln!(w, "Scan {} ({} artifacts)", self.scan_id.bold(), self.artifacts.len())?;
        if self.skipped_lines > 0 {
            writeln!(
                w,
                "{}",
                format!("warning: {} line(s) could not be parsed", self.skipped_lines).yellow()
            )?;
        }
        writeln!(w)?;
        for row in self.rows() {
            writeln!(w, "{:<60} {:<11} {} alert(s)", row[0], row[1], row[2])?;
        }
        Ok(())
    }

    fn render_markdown(&self, w: &mut dyn Write) -> std::io::Result<()> {
        writeln!(w, "# Scan {}\n", self.scan_id)?;
        if self.skipped_lines > 0 {
            writeln!(w, "> {} line(s) could not be parsed\n", self.skipped_lines)?;
        }
        write!(w, "{}", md_table(&["Package", "Dependency", "Alerts"], &self.rows()))
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanDeleted {
    pub scan_id: String,
    pub deleted: bool,
}

impl Render for ScanDeleted {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        writeln!(w, "Deleted full scan {}", self.scan_id)
    }
}

/// Result of `scan diff --local`.
#[derive(Serialize)]
pub struct LocalDiff {
    pub before: String,
    pub after: String,
    #[serde(flatten)]
    pub comparison: ScanComparison,
}

impl Render for LocalDiff {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        let c = &self.comparison;
        writeln!(w, "Diff {} -> {}", self.before, self.after)?;
        if !c.has_changes() {
            return writeln!(w, "No changes ({} unchanged packages).", c.unchanged);
        }
        for pkg in &c.added {
            let line = format!("+ pkg:{}/{}@{}", pkg.ecosystem, pkg.name, pkg.version);
            writeln!(w, "{}", line.green())?;
        }
        for pkg in &c.removed {
            let line = format!("- pkg:{}/{}@{}", pkg.ecosystem, pkg.name, pkg.version);
            writeln!(w, "{}", line.red())?;
        }
        for change in &c.updated {
            writeln!(
                w,
                "~ pkg:{}/{} {} -> {}",
                change.ecosystem,
                change.name,
                change.before.join(", "),
                change.after.join(", ")
            )?;
        }
        writeln!(w, "{} unchanged", c.unchanged)?;
        for alert in &c.introduced_alerts {
            writeln!(
                w,
                "{} {} ({}) in {}/{}",
                "introduced".red(),
                alert.alert_type,
                alert.severity.as_str(),
                alert.ecosystem,
                alert.name
            )?;
        }
        for alert in &c.resolved_alerts {
            writeln!(
                w,
                "{} {} ({}) in {}/{}",
                "resolved".green(),
                alert.alert_type,
                alert.severity.as_str(),
                alert.ecosystem,
                alert.name
            )?;
        }
        Ok(())
    }

    fn render_markdown(&self, w: &mut dyn Write) -> std::io::Result<()> {
        let c = &self.comparison;
        writeln!(w, "# Diff {} -> {}\n", self.before, self.after)?;

        let mut rows: Vec<Vec<String>> = Vec::new();
        for pkg in &c.added {
            rows.push(vec![
                "added".to_owned(),
                format!("pkg:{}/{}", pkg.ecosystem, pkg.name),
                pkg.version.clone(),
            ]);
        }
        for pkg in &c.removed {
            rows.push(vec![
                "removed".to_owned(),
                format!("pkg:{}/{}", pkg.ecosystem, pkg.name),
                pkg.version.clone(),
            ]);
        }
        for change in &c.updated {
            rows.push(vec![
                "updated".to_owned(),
                format!("pkg:{}/{}", change.ecosystem, change.name),
                format!("{} -> {}", change.before.join(", "), change.after.join(", ")),
            ]);
        }
        write!(w, "{}", md_table(&["Change", "Package", "Version"], &rows))?;
        writeln!(w, "\n{} unchanged package(s)\n", c.unchanged)?;

        let alert_rows: Vec<Vec<String>> = c
            .introduced_alerts
            .iter()
            .map(|a| ("introduced", a))
            .chain(c.resolved_alerts.iter().map(|a| ("resolved", a)))
            .map(|(status, a)| {
                vec![
                    status.to_owned(),
                    a.alert_type.clone(),
                    a.severity.as_str().to_owned(),
                    format!("pkg:{}/{}", a.ecosystem, a.name),
                ]
            })
            .collect();
        if !alert_rows.is_empty() {
            writeln!(w, "## Alerts\n")?;
            write!(w, "{}", md_table(&["Status", "Type", "Severity", "Package"], &alert_rows))?;
        }
        Ok(())
    }
}

impl Render for FullScanDiff {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        writeln!(w, "Diff {} -> {}", self.before.id, self.after.id)?;
        if let Some(url) = &self.diff_report_url {
            writeln!(w, "Report: {url}")?;
        }
        writeln!(
            w,
            "Direct dependencies changed: {}",
            if self.direct_dependencies_changed { "yes" } else { "no" }
        )?;
        let a = &self.artifacts;
        writeln!(
            w,
            "added {}, removed {}, updated {}, replaced {}, unchanged {}",
            a.added.len(),
            a.removed.len(),
            a.updated.len(),
            a.replaced.len(),
            a.unchanged.len()
        )?;
        for artifact in &a.added {
            writeln!(w, "{}", format!("+ {}", artifact.purl()).green())?;
        }
        for artifact in &a.removed {
            writeln!(w, "{}", format!("- {}", artifact.purl()).red())?;
        }
        for artifact in a.updated.iter().chain(&a.replaced) {
            writeln!(w, "~ {}", artifact.purl())?;
        }
        Ok(())
    }

    fn render_markdown(&self, w: &mut dyn Write) -> std::io::Result<()> {
        writeln!(w, "# Diff {} -> {}\n", self.before.id, self.after.id)?;
        if let Some(url) = &self.diff_report_url {
            writeln!(w, "[Full report]({url})\n")?;
        }
        let a = &self.artifacts;
        let groups = [
            ("added", &a.added),
            ("removed", &a.removed),
            ("updated", &a.updated),
            ("replaced", &a.replaced),
        ];
        let rows: Vec<Vec<String>> = groups
            .iter()
            .flat_map(|(change, artifacts)| {
                artifacts.iter().map(move |artifact| vec![change.to_string(), artifact.purl()])
            })
            .collect();
        write!(w, "{}", md_table(&["Change", "Package"], &rows))?;
        writeln!(w, "\n{} unchanged artifact(s)", a.unchanged.len())
    }
}

impl Render for FullScanList {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        if self.results.is_empty() {
            return writeln!(w, "No full scans.");
        }
        writeln!(w, "{:<38} {:<24} {:<20} Created", "ID", "Repository", "Branch")?;
        writeln!(w, "{}", "-".repeat(108))?;
        for scan in &self.results {
            writeln!(
                w,
                "{:<38} {:<24} {:<20} {}",
                scan.id,
                or_dash(scan.repo.as_deref()),
                or_dash(scan.branch.as_deref()),
                scan.created_at
            )?;
        }
        if let Some(next) = self.next_page {
            writeln!(w, "\nNext page: {next}")?;
        }
        Ok(())
    }

    fn render_markdown(&self, w: &mut dyn Write) -> std::io::Result<()> {
        let rows: Vec<Vec<&str>> = self
            .results
            .iter()
            .map(|s| {
                vec![
                    s.id.as_str(),
                    or_dash(s.repo.as_deref()),
                    or_dash(s.branch.as_deref()),
                    s.created_at.as_str(),
                ]
            })
            .collect();
        writeln!(w, "# Full scans\n")?;
        write!(w, "{}", md_table(&["ID", "Repository", "Branch", "Created"], &rows))
    }
}

impl Render for FullScan {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        writeln!(w, "ID:             {}", self.id)?;
        writeln!(w, "Created:        {}", self.created_at)?;
        writeln!(w, "Updated:        {}", self.updated_at)?;
        writeln!(w, "Organization:   {}", or_dash(self.organization_slug.as_deref()))?;
        writeln!(w, "Repository:     {}", or_dash(self.repo.as_deref()))?;
        writeln!(w, "Branch:         {}", or_dash(self.branch.as_deref()))?;
        writeln!(w, "Commit:         {}", or_dash(self.commit_hash.as_deref()))?;
        writeln!(w, "Commit message: {}", or_dash(self.commit_message.as_deref()))?;
        if let Some(pr) = self.pull_request {
            writeln!(w, "Pull request:   {pr}")?;
        }
        if !self.committers.is_empty() {
            writeln!(w, "Committers:     {}", self.committers.join(", "))?;
        }
        if let Some(url) = &self.html_report_url {
            writeln!(w, "Report:         {url}")?;
        }
        Ok(())
    }
}

impl Render for Report {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        let scan = self.scan_id.as_deref().unwrap_or("scan");
        let status = if self.healthy {
            "healthy".green().bold()
        } else {
            "unhealthy".red().bold()
        };
        writeln!(w, "Report for {scan}: {status}")?;
        writeln!(
            w,
            "Fold: {}, report level: {}",
            self.options.fold, self.options.report_level
        )?;

        let leaves = self.leaves();
        if leaves.is_empty() {
            return writeln!(w, "No alerts at or above '{}'.", self.options.report_level);
        }
        writeln!(w)?;
        for (path, leaf) in leaves {
            writeln!(w, "{} [{}]", path.join(" > ").bold(), leaf.policy)?;
            for alert in &leaf.alerts {
                let location = match (&alert.file, alert.start, alert.end) {
                    (Some(file), Some(start), Some(end)) => format!(" at {file}:{start}-{end}"),
                    (Some(file), _, _) => format!(" in {file}"),
                    _ => String::new(),
                };
                writeln!(
                    w,
                    "  - {} ({}, {}) {}{}",
                    alert.alert_type,
                    alert.severity.as_str(),
                    alert.action,
                    alert.package,
                    location
                )?;
            }
            if !leaf.manifest.is_empty() {
                writeln!(w, "  manifest: {}", leaf.manifest.join(", "))?;
            }
            writeln!(w, "  {}", leaf.url)?;
        }
        Ok(())
    }

    fn render_markdown(&self, w: &mut dyn Write) -> std::io::Result<()> {
        let scan = self.scan_id.as_deref().unwrap_or("scan");
        writeln!(w, "# Report for {scan}\n")?;
        writeln!(
            w,
            "Healthy: {}. Fold: `{}`, report level: `{}`.\n",
            if self.healthy { "yes" } else { "no" },
            self.options.fold,
            self.options.report_level
        )?;

        let rows: Vec<Vec<String>> = self
            .leaves()
            .into_iter()
            .map(|(path, leaf)| {
                let mut types: Vec<&str> =
                    leaf.alerts.iter().map(|a| a.alert_type.as_str()).collect();
                types.sort_unstable();
                types.dedup();
                vec![
                    path.join(" > "),
                    leaf.policy.to_string(),
                    types.join(", "),
                    leaf.manifest.join(", "),
                    leaf.url.clone(),
                ]
            })
            .collect();
        if rows.is_empty() {
            return writeln!(w, "No alerts at or above `{}`.", self.options.report_level);
        }
        write!(w, "{}", md_table(&["Location", "Policy", "Alerts", "Manifest", "URL"], &rows))
    }
}

impl Render for ShortReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        writeln!(w, "{}", if self.healthy { "healthy" } else { "unhealthy" })
    }
}
