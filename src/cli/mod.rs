//! CLI module for push-gateway
//!
//! This module provides command-line interface functionality including:
//! - Argument parsing with clap
//! - Configuration merging (CLI args + config files)
//! - Command handlers for serve and check operations

pub mod config_merger;
pub mod executor;
pub mod handlers;
pub mod parser;
pub mod validation;

pub use config_merger::ConfigurationMerger;
pub use executor::execute_command;
pub use parser::{Cli, Commands, Environment, LogLevel, ProviderArg};

use crate::config::Settings;
use crate::logger::{LoggerConfig, init_logger};

/// Loads configuration and applies CLI overrides.
///
/// # Errors
/// Returns error if configuration loading, merging, or validation fails
pub fn load_and_merge_config(cli: &Cli) -> anyhow::Result<(Settings, crate::config::Environment)> {
    let merger = ConfigurationMerger::from_cli(cli)
        .map_err(|e| anyhow::anyhow!("Configuration error: {}", e))?;

    let settings = merger
        .merge_cli_args(cli)
        .map_err(|e| anyhow::anyhow!("Configuration merge error: {}", e))?;

    Ok((settings, merger.environment()))
}

/// Logger configuration after the global `--verbose`/`--quiet` flags.
///
/// An explicit `serve --log-level` wins over both flags.
pub fn logger_config(cli: &Cli, settings: &Settings) -> anyhow::Result<LoggerConfig> {
    let config = settings
        .logger
        .clone()
        .into_logger_config()
        .map_err(|e| anyhow::anyhow!("Logger configuration error: {}", e))?;

    Ok(match cli.log_level() {
        Some(_) => config,
        None if cli.verbose => config.verbose(),
        None if cli.quiet => config.quiet(),
        None => config,
    })
}

/// Initialize logger from settings and global flags
pub fn init_logger_from_settings(cli: &Cli, settings: &Settings) -> anyhow::Result<()> {
    let config = logger_config(cli, settings)?;
    init_logger(&config).map_err(|e| anyhow::anyhow!("Logger initialization error: {}", e))
}
