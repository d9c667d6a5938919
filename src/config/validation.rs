//! Configuration validation logic
//!
//! Provider credentials are deliberately absent from these checks: an empty
//! token or device key only disables the matching provider at startup.

use crate::config::error::ConfigError;
use crate::config::settings::{
    FileSettings, LoggerSettings, ProvidersConfig, PushSettings, ServerConfig, Settings,
};

/// Valid log levels
const VALID_LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Valid log formats
const VALID_LOG_FORMATS: &[&str] = &["full", "compact", "json"];

/// Upper bound for the inter-call pause of a batch push
const MAX_BATCH_DELAY_MS: u64 = 60_000;

impl ServerConfig {
    /// Port must be non-zero and host must not be blank.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.port == 0 {
            return Err(ConfigError::validation(
                "server.port",
                "Port must be between 1 and 65535. Please specify a valid port number.",
            ));
        }

        if self.host.trim().is_empty() {
            return Err(ConfigError::validation(
                "server.host",
                "Host address cannot be empty.",
            ));
        }

        Ok(())
    }
}

impl FileSettings {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.enabled && self.path.trim().is_empty() {
            return Err(ConfigError::validation(
                "logger.file.path",
                "File path is required when file logging is enabled.",
            ));
        }

        if !VALID_LOG_FORMATS.contains(&self.format.to_lowercase().as_str()) {
            return Err(ConfigError::validation(
                "logger.file.format",
                format!(
                    "Invalid log format '{}'. Valid formats are: {}",
                    self.format,
                    VALID_LOG_FORMATS.join(", ")
                ),
            ));
        }

        Ok(())
    }
}

impl LoggerSettings {
    /// Validates level, outputs and file settings.
    ///
    /// The level may be a bare level or an `EnvFilter` directive such as
    /// `info,push_gateway=debug`; only bare levels are checked against the
    /// known list.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let level = self.level.to_lowercase();
        if !level.contains('=') && !VALID_LOG_LEVELS.contains(&level.as_str()) {
            return Err(ConfigError::validation(
                "logger.level",
                format!(
                    "Invalid log level '{}'. Valid levels are: {}",
                    self.level,
                    VALID_LOG_LEVELS.join(", ")
                ),
            ));
        }

        if !self.console.enabled && !self.file.enabled {
            return Err(ConfigError::validation(
                "logger",
                "At least one output (console or file) must be enabled.",
            ));
        }

        self.file.validate()
    }
}

impl PushSettings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.send_timeout_secs == 0 {
            return Err(ConfigError::validation(
                "push.send_timeout_secs",
                "Send timeout must be greater than 0 seconds.",
            ));
        }

        if self.validate_timeout_secs == 0 {
            return Err(ConfigError::validation(
                "push.validate_timeout_secs",
                "Validation timeout must be greater than 0 seconds.",
            ));
        }

        if self.batch_delay_ms > MAX_BATCH_DELAY_MS {
            return Err(ConfigError::validation(
                "push.batch_delay_ms",
                format!("Batch delay cannot exceed {} ms.", MAX_BATCH_DELAY_MS),
            ));
        }

        Ok(())
    }
}

impl ProvidersConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let api_base = self.telegram.api_base.trim();
        if !(api_base.starts_with("http://") || api_base.starts_with("https://")) {
            return Err(ConfigError::validation(
                "providers.telegram.api_base",
                format!(
                    "Telegram API base must be an http(s) URL, got '{}'.",
                    self.telegram.api_base
                ),
            ));
        }

        Ok(())
    }
}

impl Settings {
    /// Validates every section, stopping at the first failure.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.server.validate()?;
        self.logger.validate()?;
        self.push.validate()?;
        self.providers.validate()?;
        Ok(())
    }
}
