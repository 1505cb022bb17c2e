//! `socket logout` command handler

use std::io::Write;

use serde::Serialize;
use tracing::info;

use socket_core::config::{ConfigKey, SocketConfig};

use crate::context::Context;
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Execute the `logout` command: forget the token and the default org.
pub async fn execute(ctx: &Context, writer: &OutputWriter) -> Result<(), CliError> {
    let mut stored = SocketConfig::from_file_or_default(&ctx.config_path).await?;
    let had_token = stored.token().is_some();

    if ctx.bail_if_dry_run(
        format!("remove API token from {}", ctx.config_path.display()),
        writer,
    )? {
        return Ok(());
    }

    stored.unset(ConfigKey::ApiToken);
    stored.unset(ConfigKey::DefaultOrg);
    stored.save(&ctx.config_path).await?;
    info!(path = %ctx.config_path.display(), "API token removed");

    writer.render(&LogoutResult {
        config_path: ctx.config_path.display().to_string(),
        removed: had_token,
    })
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogoutResult {
    pub config_path: String,
    /// Whether a token was stored before
    pub removed: bool,
}

impl Render for LogoutResult {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        if self.removed {
            writeln!(w, "Logged out. API token removed from {}", self.config_path)
        } else {
            writeln!(w, "No API token was stored in {}", self.config_path)
        }
    }
}
