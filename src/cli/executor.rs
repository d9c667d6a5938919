//! Command executor for dispatching CLI commands
//!
//! This module provides the main entry point for executing CLI commands
//! after parsing and configuration loading.

use super::handlers::{CheckCommandHandler, ServeCommandHandler};
use super::parser::{Cli, Commands};
use crate::config::{Environment, Settings};
use crate::error::AppResult;

/// Execute a CLI command with the given settings
///
/// No subcommand means `serve`.
///
/// # Errors
/// Returns errors from command handlers
pub async fn execute_command(
    cli: &Cli,
    settings: Settings,
    environment: Environment,
) -> AppResult<()> {
    match &cli.command {
        Some(Commands::Serve { dry_run, .. }) => {
            warn_privileged_port(&settings);
            ServeCommandHandler::new(settings, environment)
                .execute(*dry_run)
                .await
        }
        None => ServeCommandHandler::new(settings, environment).execute(false).await,
        Some(Commands::Check {
            provider,
            allow_notification,
        }) => {
            CheckCommandHandler::new(&settings)
                .execute(provider.map(Into::into), *allow_notification)
                .await
        }
    }
}

fn warn_privileged_port(settings: &Settings) {
    if settings.server.port < 1024 {
        tracing::warn!(
            port = settings.server.port,
            "Binding to a port below 1024 typically requires root privileges"
        );
    }
}
