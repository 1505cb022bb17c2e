//! `socket config` command handler

use std::io::Write;

use serde::Serialize;
use tracing::info;

use socket_core::config::{ConfigKey, SocketConfig, redact_token};

use crate::cli::{ConfigAction, ConfigArgs};
use crate::context::Context;
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Execute the `config` command.
///
/// `list` and `get` show effective values (env overrides included).
/// `set` and `unset` edit the file only.
pub async fn execute(
    args: ConfigArgs,
    ctx: &Context,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    match args.action {
        ConfigAction::List { full } => execute_list(ctx, full, writer),
        ConfigAction::Get { key } => execute_get(ctx, &key, writer),
        ConfigAction::Set { key, value } => {
            execute_set(ctx, &key, Some(value.as_str()), writer).await
        }
        ConfigAction::Unset { key } => execute_set(ctx, &key, None, writer).await,
    }
}

fn parse_key(key: &str) -> Result<ConfigKey, CliError> {
    ConfigKey::parse(key).map_err(|e| CliError::Usage(e.to_string()))
}

fn display_value(config: &SocketConfig, key: ConfigKey, full: bool) -> String {
    let value = config.get(key);
    if key.is_sensitive() && !full {
        redact_token(&value)
    } else {
        value
    }
}

fn execute_list(ctx: &Context, full: bool, writer: &OutputWriter) -> Result<(), CliError> {
    let entries = ConfigKey::ALL
        .iter()
        .map(|key| ConfigEntry {
            key: key.as_str().to_owned(),
            value: display_value(&ctx.config, *key, full),
        })
        .collect();

    writer.render(&ConfigListing {
        source: ctx.config_path.display().to_string(),
        entries,
    })
}

fn execute_get(ctx: &Context, key: &str, writer: &OutputWriter) -> Result<(), CliError> {
    let key = parse_key(key)?;
    writer.render(&ConfigEntry {
        key: key.as_str().to_owned(),
        value: display_value(&ctx.config, key, false),
    })
}

/// `set` with a value, `unset` without one.
async fn execute_set(
    ctx: &Context,
    key: &str,
    value: Option<&str>,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    let key = parse_key(key)?;
    let mut stored = SocketConfig::from_file_or_default(&ctx.config_path).await?;
    match value {
        Some(value) => stored.set(key, value)?,
        None => stored.unset(key),
    }

    let verb = if value.is_some() { "set" } else { "unset" };
    if ctx.bail_if_dry_run(
        format!("{verb} {key} in {}", ctx.config_path.display()),
        writer,
    )? {
        return Ok(());
    }

    stored.save(&ctx.config_path).await?;
    info!(key = %key, path = %ctx.config_path.display(), "config {verb}");

    writer.render(&ConfigEntry {
        key: key.as_str().to_owned(),
        value: display_value(&stored, key, false),
    })
}

#[derive(Serialize)]
pub struct ConfigEntry {
    pub key: String,
    pub value: String,
}

impl Render for ConfigEntry {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        if self.value.is_empty() {
            writeln!(w, "{}: (not set)", self.key)
        } else {
            writeln!(w, "{}: {}", self.key, self.value)
        }
    }
}

/// All keys with their effective values.
#[derive(Serialize)]
pub struct ConfigListing {
    pub source: String,
    pub entries: Vec<ConfigEntry>,
}

impl Render for ConfigListing {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        writeln!(w, "Config: {}", self.source.bold())?;
        for entry in &self.entries {
            entry.render_text(w)?;
        }
        Ok(())
    }

    fn render_markdown(&self, w: &mut dyn Write) -> std::io::Result<()> {
        let rows: Vec<Vec<&str>> = self
            .entries
            .iter()
            .map(|e| vec![e.key.as_str(), crate::commands::or_dash(Some(e.value.as_str()))])
            .collect();
        writeln!(w, "# Config\n\nSource: `{}`\n", self.source)?;
        write!(w, "{}", socket_report::md_table(&["Key", "Value"], &rows))
    }
}
