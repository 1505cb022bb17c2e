//! socket -- command-line client for the Socket supply-chain security platform.

mod cli;
mod commands;
mod context;
mod error;
mod logging;
mod output;

use std::process::ExitCode;

use clap::Parser;
use tracing::{debug, warn};

use socket_core::config::{GeneralConfig, SocketConfig};
use socket_core::error::SocketError;

use cli::{Cli, Commands};
use context::Context;
use error::CliError;
use output::OutputWriter;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let writer = OutputWriter::new(cli.output_format());

    match run(cli, &writer).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            writer.render_failure(&e);
            ExitCode::from(e.exit_code() as u8)
        }
    }
}

async fn run(cli: Cli, writer: &OutputWriter) -> Result<(), CliError> {
    let config_path = SocketConfig::resolve_path(cli.config.as_deref()).map_err(SocketError::from)?;

    // Commands that edit the config file must still run when it holds
    // invalid values, otherwise there is no way to repair it.
    let edits_config = matches!(
        cli.command,
        Commands::Login(_) | Commands::Logout | Commands::Config(_)
    );
    let config = if edits_config {
        let mut config = SocketConfig::from_file_or_default(&config_path).await?;
        config.apply_env_overrides();
        config
    } else {
        SocketConfig::load(&config_path).await?
    };

    let invalid = config.validate().err();
    let general = if invalid.is_some() {
        GeneralConfig::default()
    } else {
        config.general.clone()
    };
    logging::init_tracing(&general, cli.log_level.as_deref())
        .map_err(|e| CliError::Usage(e.to_string()))?;
    if let Some(e) = invalid {
        warn!(error = %e, "config is invalid, using default logging settings");
    }
    debug!(path = %config_path.display(), "config loaded");

    let ctx = Context {
        config,
        config_path,
        org_flag: cli.org,
        dry_run: cli.dry_run,
    };

    match cli.command {
        Commands::Login(args) => commands::login::execute(args, &ctx, writer).await,
        Commands::Logout => commands::logout::execute(&ctx, writer).await,
        Commands::Config(args) => commands::config::execute(args, &ctx, writer).await,
        Commands::Organization(args) => commands::organization::execute(args, &ctx, writer).await,
        Commands::Scan(args) => commands::scan::execute(args, &ctx, writer).await,
        Commands::Repos(args) => commands::repos::execute(args, &ctx, writer).await,
        Commands::Analytics(args) => commands::analytics::execute(args, &ctx, writer).await,
        Commands::AuditLog(args) => commands::audit_log::execute(args, &ctx, writer).await,
        Commands::Package(args) => commands::package::execute(args, &ctx, writer).await,
        Commands::Dependencies(args) => commands::dependencies::execute(args, &ctx, writer).await,
        Commands::ThreatFeed(args) => commands::threat_feed::execute(args, &ctx, writer).await,
    }
}
