//! CLI argument parsing with clap
//!
//! This module defines the command-line interface structure using clap,
//! including all commands, arguments, and their documentation.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use crate::services::push::ProviderKind;

/// HTTP gateway forwarding push requests to Telegram and Bark
#[derive(Parser, Debug)]
#[command(name = "push-gateway")]
#[command(about = "HTTP gateway forwarding push requests to Telegram and Bark")]
#[command(long_about = "
push-gateway accepts a generic push request over HTTP and forwards it to a
Telegram bot or a Bark device, returning a uniform JSON result.

EXAMPLES:
    # Start the server with default configuration
    push-gateway serve

    # Start server on custom host and port
    push-gateway serve --host 0.0.0.0 --port 8080

    # Use custom configuration file
    push-gateway --config /path/to/config.toml serve

    # Check configuration without starting server
    push-gateway serve --dry-run

    # Verify the Telegram bot token
    push-gateway check --provider telegram

    # Verify Bark by sending a real test notification
    push-gateway check --provider bark --allow-notification

Provider credentials are read from TELEGRAM_BOT_TOKEN, BARK_SERVER_URL and
BARK_DEVICE_KEY, or from PUSH_PROVIDERS__* variables and config files.
")]
#[command(version = crate::clap_long_version())]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Configuration file path
    ///
    /// Load exactly this TOML file instead of the layered config directory.
    /// Environment variables still override its values.
    #[arg(short, long, value_name = "FILE", value_parser = super::validation::validate_config_file_path)]
    pub config: Option<PathBuf>,

    /// Override environment detection
    ///
    /// Selects which `{environment}.toml` is layered over the defaults.
    /// Takes precedence over PUSH_APP_ENV.
    #[arg(short, long, value_enum)]
    pub env: Option<Environment>,

    /// Enable verbose logging
    ///
    /// Raises the log level to debug. Cannot be used with --quiet.
    #[arg(short, long)]
    pub verbose: bool,

    /// Only log warnings and errors
    ///
    /// Cannot be used with --verbose.
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the web server (default)
    ///
    /// Examples:
    ///   push-gateway serve                           # Start with defaults
    ///   push-gateway serve --host 0.0.0.0 --port 80 # Bind to all interfaces on port 80
    ///   push-gateway serve --dry-run                 # Validate config without starting
    Serve {
        /// Host address to bind to
        ///
        /// Use 127.0.0.1 for localhost only, or 0.0.0.0 to accept connections from any interface.
        ///
        /// Default: 127.0.0.1
        #[arg(long, value_name = "ADDRESS", value_parser = super::validation::validate_host_address)]
        host: Option<String>,

        /// Port number to listen on
        ///
        /// Overrides PORT and server.port.
        ///
        /// Default: 3019
        #[arg(short, long, value_name = "PORT", value_parser = super::validation::validate_port)]
        port: Option<u16>,

        /// Log level override
        ///
        /// Takes precedence over configuration files and the global --verbose/--quiet flags.
        #[arg(long, value_enum)]
        log_level: Option<LogLevel>,

        /// Validate configuration and exit
        ///
        /// Reports which providers would be enabled without binding a port.
        #[arg(long)]
        dry_run: bool,
    },
    /// Verify provider credentials against the live APIs
    ///
    /// Telegram is checked with getMe. Bark has no read-only endpoint, so its
    /// check sends a real "Configuration test" notification and only runs
    /// with --allow-notification.
    ///
    /// Examples:
    ///   push-gateway check                                      # All providers
    ///   push-gateway check --provider bark --allow-notification
    Check {
        /// Only check this provider
        #[arg(long, value_enum)]
        provider: Option<ProviderArg>,

        /// Allow checks that deliver a real notification
        #[arg(long)]
        allow_notification: bool,
    },
}

/// Environment options
#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum Environment {
    #[value(name = "development", alias = "dev")]
    Development,
    #[value(name = "test")]
    Test,
    #[value(name = "staging", alias = "stage")]
    Staging,
    #[value(name = "production", alias = "prod")]
    Production,
}

/// Log level options
#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum LogLevel {
    #[value(name = "error")]
    Error,
    #[value(name = "warn", alias = "warning")]
    Warn,
    #[value(name = "info")]
    Info,
    #[value(name = "debug")]
    Debug,
    #[value(name = "trace")]
    Trace,
}

/// Provider options
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProviderArg {
    #[value(name = "telegram", alias = "chatbot")]
    Telegram,
    #[value(name = "bark", alias = "devicepush")]
    Bark,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

impl Cli {
    /// Command-level log level, if any
    pub fn log_level(&self) -> Option<LogLevel> {
        match &self.command {
            Some(Commands::Serve { log_level, .. }) => *log_level,
            _ => None,
        }
    }
}

impl From<Environment> for crate::config::Environment {
    fn from(env: Environment) -> Self {
        match env {
            Environment::Development => crate::config::Environment::Development,
            Environment::Test => crate::config::Environment::Test,
            Environment::Staging => crate::config::Environment::Staging,
            Environment::Production => crate::config::Environment::Production,
        }
    }
}

impl From<ProviderArg> for ProviderKind {
    fn from(provider: ProviderArg) -> Self {
        match provider {
            ProviderArg::Telegram => ProviderKind::Telegram,
            ProviderArg::Bark => ProviderKind::Bark,
        }
    }
}
