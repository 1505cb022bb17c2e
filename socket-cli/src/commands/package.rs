//! `socket package` command handler

use std::io::Write;

use serde::Serialize;
use tracing::warn;

use socket_api::models::{Artifact, PurlScore};
use socket_report::{build_deep_report, build_shallow_report};

use crate::cli::{PackageAction, PackageArgs};
use crate::context::Context;
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Execute the `package` command.
pub async fn execute(
    args: PackageArgs,
    ctx: &Context,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    match args.action {
        PackageAction::Score { purl } => {
            let purl = normalize_purl(&purl)?;
            if ctx.bail_if_dry_run(format!("fetch deep score of {purl}"), writer)? {
                return Ok(());
            }
            let client = ctx.client()?;
            let org = ctx.resolve_org(&client).await?;
            let score = client.purl_score(&org, &purl).await?;
            let markdown = build_deep_report(&score)?;
            writer.render(&DeepScore { score, markdown })
        }
        PackageAction::Shallow { purls } => {
            let purls = purls
                .iter()
                .map(|p| normalize_purl(p))
                .collect::<Result<Vec<_>, _>>()?;
            let action = format!("fetch shallow score of {} package(s)", purls.len());
            if ctx.bail_if_dry_run(action, writer)? {
                return Ok(());
            }
            let client = ctx.client()?;
            let batch = client.batch_package_fetch(&purls).await?;
            for error in &batch.errors {
                warn!(line = error.line, reason = %error.reason, "skipping unparsable package");
            }
            let markdown = build_shallow_report(&batch.items)?;
            writer.render(&ShallowScore {
                packages: batch.items,
                markdown,
            })
        }
    }
}

/// Accepts `pkg:eco/name@version` or the shorthand `eco/name@version`.
fn normalize_purl(input: &str) -> Result<String, CliError> {
    let input = input.trim();
    let purl = if input.starts_with("pkg:") {
        input.to_owned()
    } else {
        format!("pkg:{input}")
    };
    let body = &purl["pkg:".len()..];
    match body.split_once('/') {
        Some((eco, name)) if !eco.is_empty() && !name.is_empty() => Ok(purl),
        _ => Err(CliError::Usage(format!(
            "'{input}' is not a package URL (expected pkg:<ecosystem>/<name>@<version>)"
        ))),
    }
}

/// Deep score of one package. JSON output is the API response.
#[derive(Serialize)]
pub struct DeepScore {
    #[serde(flatten)]
    pub score: PurlScore,
    #[serde(skip)]
    pub markdown: String,
}

impl Render for DeepScore {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        write!(w, "{}", self.markdown)
    }
}

#[derive(Serialize)]
pub struct ShallowScore {
    pub packages: Vec<Artifact>,
    #[serde(skip)]
    pub markdown: String,
}

impl Render for ShallowScore {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        write!(w, "{}", self.markdown)
    }
}
