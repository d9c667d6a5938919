//! Configuration settings structures for push-gateway
//!
//! Every field carries a serde default so the service can start from
//! environment variables alone, without any TOML file on disk.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::config::error::ConfigError;
use crate::logger::{ConsoleConfig, FileConfig, LogFormat, LoggerConfig};

// ============================================================================
// Default value functions
// ============================================================================

fn default_app_name() -> String {
    "push-gateway".to_string()
}

fn default_app_version() -> String {
    crate::pkg_version().to_string()
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3019
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

fn default_log_path() -> String {
    "logs/push-gateway.log".to_string()
}

fn default_log_format() -> String {
    "json".to_string()
}

fn default_batch_delay_ms() -> u64 {
    100
}

fn default_send_timeout_secs() -> u64 {
    10
}

fn default_validate_timeout_secs() -> u64 {
    5
}

fn default_telegram_api_base() -> String {
    "https://api.telegram.org".to_string()
}

// ============================================================================
// Application / Server
// ============================================================================

/// Application basic information configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationConfig {
    #[serde(default = "default_app_name")]
    pub name: String,

    #[serde(default = "default_app_version")]
    pub version: String,
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            name: default_app_name(),
            version: default_app_version(),
        }
    }
}

/// Axum HTTP server configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
}

impl ServerConfig {
    /// Get the full server address as "host:port"
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

// ============================================================================
// Logger Settings
// ============================================================================

/// Console output settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsoleSettings {
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default = "default_true")]
    pub colored: bool,
}

impl Default for ConsoleSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            colored: true,
        }
    }
}

/// File output settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileSettings {
    #[serde(default)]
    pub enabled: bool,

    #[serde(default = "default_log_path")]
    pub path: String,

    /// Append to an existing file instead of truncating it
    #[serde(default = "default_true")]
    pub append: bool,

    /// Log format: "full", "compact", or "json"
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for FileSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            path: default_log_path(),
            append: true,
            format: default_log_format(),
        }
    }
}

/// Logger configuration as it appears in configuration files
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggerSettings {
    /// Log level or full `EnvFilter` directive
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default)]
    pub console: ConsoleSettings,

    #[serde(default)]
    pub file: FileSettings,
}

impl Default for LoggerSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            console: ConsoleSettings::default(),
            file: FileSettings::default(),
        }
    }
}

impl LoggerSettings {
    /// Converts the file representation into the runtime `LoggerConfig`.
    pub fn into_logger_config(self) -> Result<LoggerConfig, ConfigError> {
        let format = self
            .file
            .format
            .parse::<LogFormat>()
            .map_err(|e| ConfigError::validation("logger.file.format", e.to_string()))?;

        let console = ConsoleConfig {
            enabled: self.console.enabled,
            colored: self.console.colored,
        };
        let file = FileConfig {
            enabled: self.file.enabled,
            path: PathBuf::from(self.file.path),
            append: self.file.append,
            format,
        };

        LoggerConfig::new(console, file, self.level)
            .map_err(|e| ConfigError::validation("logger", e.to_string()))
    }
}

// ============================================================================
// Push dispatch settings
// ============================================================================

/// Outbound call policy shared by both providers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushSettings {
    /// Pause between consecutive calls of a multi-target push, in milliseconds.
    /// Not derived from any documented provider rate limit.
    #[serde(default = "default_batch_delay_ms")]
    pub batch_delay_ms: u64,

    /// Timeout for message and notification sends, in seconds
    #[serde(default = "default_send_timeout_secs")]
    pub send_timeout_secs: u64,

    /// Timeout for configuration self-test calls, in seconds
    #[serde(default = "default_validate_timeout_secs")]
    pub validate_timeout_secs: u64,
}

impl Default for PushSettings {
    fn default() -> Self {
        Self {
            batch_delay_ms: default_batch_delay_ms(),
            send_timeout_secs: default_send_timeout_secs(),
            validate_timeout_secs: default_validate_timeout_secs(),
        }
    }
}

// ============================================================================
// Provider credentials
// ============================================================================

/// Telegram Bot API credentials
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TelegramSettings {
    /// Bot token; empty disables the provider
    #[serde(default)]
    pub bot_token: String,

    /// Bot API base URL
    #[serde(default = "default_telegram_api_base")]
    pub api_base: String,
}

impl Default for TelegramSettings {
    fn default() -> Self {
        Self {
            bot_token: String::new(),
            api_base: default_telegram_api_base(),
        }
    }
}

impl std::fmt::Debug for TelegramSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramSettings")
            .field("bot_token", &redact(&self.bot_token))
            .field("api_base", &self.api_base)
            .finish()
    }
}

/// Bark server credentials
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BarkSettings {
    /// Bark server URL; scheme is optional
    #[serde(default)]
    pub server_url: String,

    /// Default device key; empty disables the provider
    #[serde(default)]
    pub device_key: String,
}

impl std::fmt::Debug for BarkSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BarkSettings")
            .field("server_url", &self.server_url)
            .field("device_key", &redact(&self.device_key))
            .finish()
    }
}

/// Credentials for every supported provider
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProvidersConfig {
    #[serde(default)]
    pub telegram: TelegramSettings,

    #[serde(default)]
    pub bark: BarkSettings,
}

/// Marker shown in place of a configured secret.
pub const REDACTED: &str = "***configured";

/// Returns the redaction marker for a non-empty secret, `None` otherwise.
pub fn redact(secret: &str) -> Option<&'static str> {
    (!secret.is_empty()).then_some(REDACTED)
}

// ============================================================================
// Main Settings Structure
// ============================================================================

/// Complete application settings
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub application: ApplicationConfig,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub logger: LoggerSettings,

    #[serde(default)]
    pub push: PushSettings,

    #[serde(default)]
    pub providers: ProvidersConfig,
}
