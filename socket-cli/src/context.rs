//! Per-invocation state shared by the command handlers.

use std::path::PathBuf;

use tracing::{debug, info};

use socket_api::{ClientOptions, SocketClient};
use socket_core::config::SocketConfig;

use crate::error::CliError;
use crate::output::{DryRun, OutputWriter};

/// Effective configuration plus the global flags that affect every command.
pub struct Context {
    /// Config file with env overrides applied.
    pub config: SocketConfig,
    /// File that `login`, `logout` and `config set` write back to.
    pub config_path: PathBuf,
    /// `--org`
    pub org_flag: Option<String>,
    /// `--dry-run`
    pub dry_run: bool,
}

impl Context {
    /// API client for the configured token and endpoint.
    pub fn client(&self) -> Result<SocketClient, CliError> {
        let options = ClientOptions::from_config(&self.config)?;
        Ok(SocketClient::new(options)?)
    }

    /// Organization slug that needs no API call: `--org`, then the default.
    pub fn known_org(&self) -> Option<&str> {
        self.org_flag
            .as_deref()
            .filter(|org| !org.trim().is_empty())
            .or_else(|| self.config.default_org())
    }

    /// Organization to act on: `--org`, then the configured default, then the
    /// only organization visible to the token.
    pub async fn resolve_org(&self, client: &SocketClient) -> Result<String, CliError> {
        if let Some(org) = self.known_org() {
            return Ok(org.to_owned());
        }

        let response = client.organizations().await?;
        let mut slugs: Vec<String> = response
            .organizations
            .into_values()
            .map(|org| org.slug)
            .collect();
        slugs.sort();

        match slugs.len() {
            1 => {
                let slug = slugs.remove(0);
                debug!(org = %slug, "using the only organization of the token");
                Ok(slug)
            }
            0 => Err(CliError::Usage(
                "the API token has no organizations".to_owned(),
            )),
            _ => Err(CliError::Usage(format!(
                "the API token has access to several organizations ({}), pass --org or set defaultOrg",
                slugs.join(", ")
            ))),
        }
    }

    /// Under `--dry-run`, logs the action, prints the dry-run notice and
    /// returns true. The caller returns without doing the work.
    pub fn bail_if_dry_run(
        &self,
        action: impl Into<String>,
        writer: &OutputWriter,
    ) -> Result<bool, CliError> {
        if !self.dry_run {
            return Ok(false);
        }
        let action = action.into();
        info!(action = %action, "dry run, skipping");
        writer.render(&DryRun::new(action))?;
        Ok(true)
    }
}
