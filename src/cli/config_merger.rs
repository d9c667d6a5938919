//! Configuration merger for CLI arguments and config files
//!
//! Loads the layered configuration selected by `--config`/`--env` and
//! applies the command-line overrides on top.

use std::path::Path;

use super::parser::{Cli, Commands};
use crate::config::{ConfigError, ConfigLoader, Environment, Settings};

/// Applies CLI overrides to file-based configuration.
pub struct ConfigurationMerger {
    base_config: Settings,
    environment: Environment,
}

impl ConfigurationMerger {
    pub fn new(base_config: Settings, environment: Environment) -> Self {
        Self {
            base_config,
            environment,
        }
    }

    /// Loads configuration the way the CLI asks for it.
    ///
    /// `--config` reads exactly one file; otherwise the layered loader is
    /// used. `--env` overrides `PUSH_APP_ENV` in both cases.
    ///
    /// # Errors
    /// Returns ConfigError if configuration loading or validation fails
    pub fn from_cli(cli: &Cli) -> Result<Self, ConfigError> {
        let loader = match cli.config.as_deref() {
            Some(path) => {
                Self::validate_config_file_access(path)?;
                ConfigLoader::with_file(path)
            }
            None => ConfigLoader::new()?,
        };
        let loader = match cli.env {
            Some(env) => loader.with_environment(env.into()),
            None => loader,
        };

        let settings = loader.load()?;
        Ok(Self::new(settings, loader.environment()))
    }

    fn validate_config_file_access(path: &Path) -> Result<(), ConfigError> {
        if !path.is_file() {
            return Err(ConfigError::validation(
                "config_file",
                format!("Configuration file does not exist: '{}'", path.display()),
            ));
        }

        std::fs::File::open(path).map(|_| ()).map_err(|e| {
            ConfigError::validation(
                "config_file",
                format!("Cannot read configuration file '{}': {}", path.display(), e),
            )
        })
    }

    /// Merge CLI arguments with the base configuration
    ///
    /// Command-specific overrides (`serve --host/--port/--log-level`) win
    /// over every file and environment source. Global `--verbose`/`--quiet`
    /// are applied later, to the logger configuration.
    pub fn merge_cli_args(&self, cli: &Cli) -> Result<Settings, ConfigError> {
        let mut config = self.base_config.clone();

        if let Some(Commands::Serve {
            host,
            port,
            log_level,
            dry_run: _,
        }) = &cli.command
        {
            if let Some(host_addr) = host {
                config.server.host = host_addr.clone();
            }

            if let Some(port_num) = port {
                config.server.port = *port_num;
            }

            if let Some(level) = log_level {
                config.logger.level = level.as_str().to_string();
            }
        }

        config.validate()?;

        Ok(config)
    }

    pub fn config(&self) -> &Settings {
        &self.base_config
    }

    /// Environment the configuration was loaded for
    pub fn environment(&self) -> Environment {
        self.environment
    }
}
