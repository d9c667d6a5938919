//! Configuration loader for push-gateway
//!
//! This module provides the `ConfigLoader` struct that handles loading
//! configuration from multiple sources with proper precedence.

use std::path::{Path, PathBuf};

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, Environment, File, FileFormat};

use crate::config::environment::Environment as AppEnvironment;
use crate::config::error::ConfigError;
use crate::config::settings::Settings;

/// Environment variable for configuration directory
pub const CONFIG_DIR_ENV: &str = "PUSH_CONFIG_DIR";

/// Environment variable for a single configuration file
pub const CONFIG_FILE_ENV: &str = "PUSH_CONFIG_FILE";

/// Default configuration directory
const DEFAULT_CONFIG_DIR: &str = "config";

/// Environment variable prefix for layered overrides
const ENV_PREFIX: &str = "PUSH";

/// Separator for nested configuration keys in environment variables
const ENV_SEPARATOR: &str = "__";

/// Conventional variables understood without the `PUSH_` prefix, mapped to
/// their configuration keys. They take precedence over every file layer.
const CONVENTIONAL_VARS: &[(&str, &str)] = &[
    ("TELEGRAM_BOT_TOKEN", "providers.telegram.bot_token"),
    ("BARK_SERVER_URL", "providers.bark.server_url"),
    ("BARK_DEVICE_KEY", "providers.bark.device_key"),
];

/// Loads `Settings` from layered sources.
///
/// Priority, lowest first:
/// 1. `default.toml`
/// 2. `{environment}.toml`
/// 3. `local.toml`
/// 4. `PUSH_*` environment variables (`PUSH_SERVER__PORT` -> `server.port`)
/// 5. `TELEGRAM_BOT_TOKEN`, `BARK_SERVER_URL`, `BARK_DEVICE_KEY`, `PORT`
///
/// Every file layer is optional; a bare environment is enough to start.
#[derive(Debug)]
pub struct ConfigLoader {
    config_dir: PathBuf,
    /// When set, only this file is read instead of the directory layers
    config_file: Option<PathBuf>,
    environment: AppEnvironment,
}

impl ConfigLoader {
    /// Creates a loader from `PUSH_CONFIG_DIR`, `PUSH_CONFIG_FILE` and `PUSH_APP_ENV`.
    ///
    /// # Errors
    ///
    /// Returns an error if both `PUSH_CONFIG_DIR` and `PUSH_CONFIG_FILE` are set.
    pub fn new() -> Result<Self, ConfigError> {
        let config_dir_var = std::env::var(CONFIG_DIR_ENV).ok();
        let config_file = std::env::var(CONFIG_FILE_ENV).ok().map(PathBuf::from);

        if config_file.is_some() && config_dir_var.is_some() {
            return Err(ConfigError::mutual_exclusivity(
                "PUSH_CONFIG_DIR and PUSH_CONFIG_FILE cannot both be set. \
                 Use PUSH_CONFIG_DIR for layered configuration or \
                 PUSH_CONFIG_FILE for a single configuration file.",
            ));
        }

        Ok(Self {
            config_dir: config_dir_var
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_DIR)),
            config_file,
            environment: AppEnvironment::from_env(),
        })
    }

    /// Creates a loader reading exactly one file, bypassing the directory layers.
    pub fn with_file(path: impl Into<PathBuf>) -> Self {
        Self {
            config_dir: PathBuf::from(DEFAULT_CONFIG_DIR),
            config_file: Some(path.into()),
            environment: AppEnvironment::from_env(),
        }
    }

    /// Overrides the environment used to pick `{environment}.toml`.
    pub fn with_environment(mut self, environment: AppEnvironment) -> Self {
        self.environment = environment;
        self
    }

    pub fn environment(&self) -> AppEnvironment {
        self.environment
    }

    /// Loads, deserializes and validates the settings.
    pub fn load(&self) -> Result<Settings, ConfigError> {
        let config = self.build_config()?;
        let settings: Settings = config.try_deserialize().map_err(|e| {
            ConfigError::ParseError(format!("Failed to deserialize configuration: {}", e))
        })?;

        settings.validate()?;

        Ok(settings)
    }

    fn build_config(&self) -> Result<Config, ConfigError> {
        let builder = Config::builder();

        let builder = match self.config_file {
            Some(ref config_file) => Self::add_file_source(builder, config_file, true)?,
            None => self.build_layered_config(builder)?,
        };

        let builder = Self::add_env_source(builder);
        let builder = Self::add_conventional_overrides(builder)?;

        builder.build().map_err(ConfigError::from)
    }

    fn build_layered_config(
        &self,
        builder: ConfigBuilder<DefaultState>,
    ) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        let default_path = self.config_dir.join("default.toml");
        let builder = Self::add_file_source(builder, &default_path, false)?;

        let env_path = self
            .config_dir
            .join(format!("{}.toml", self.environment.as_str()));
        let builder = Self::add_file_source(builder, &env_path, false)?;

        let local_path = self.config_dir.join("local.toml");
        Self::add_file_source(builder, &local_path, false)
    }

    fn add_file_source(
        builder: ConfigBuilder<DefaultState>,
        path: &Path,
        required: bool,
    ) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        if required && !path.exists() {
            return Err(ConfigError::file_not_found(format!(
                "Required configuration file not found: {}",
                path.display()
            )));
        }

        let path = path.to_str().ok_or_else(|| {
            ConfigError::ParseError(format!("Non UTF-8 configuration path: {}", path.display()))
        })?;

        Ok(builder.add_source(File::new(path, FileFormat::Toml).required(required)))
    }

    /// `PUSH_*` variables, `__` separating nested keys.
    fn add_env_source(builder: ConfigBuilder<DefaultState>) -> ConfigBuilder<DefaultState> {
        builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator(ENV_SEPARATOR)
                .ignore_empty(true)
                .try_parsing(true),
        )
    }

    fn add_conventional_overrides(
        builder: ConfigBuilder<DefaultState>,
    ) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        let mut builder = builder;
        for (var, key) in CONVENTIONAL_VARS {
            let value = std::env::var(var).ok().filter(|v| !v.trim().is_empty());
            builder = builder.set_override_option(*key, value)?;
        }

        let port = std::env::var("PORT").ok().and_then(|p| p.trim().parse::<i64>().ok());
        Ok(builder.set_override_option("server.port", port)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::sync::Mutex;
    use tempfile::TempDir;

    // Serializes tests that mutate process environment variables
    static TEST_MUTEX: Mutex<()> = Mutex::new(());

    const MANAGED_VARS: &[&str] = &[
        CONFIG_DIR_ENV,
        CONFIG_FILE_ENV,
        "PUSH_APP_ENV",
        "PUSH_SERVER__PORT",
        "PUSH_PROVIDERS__BARK__DEVICE_KEY",
        "TELEGRAM_BOT_TOKEN",
        "BARK_SERVER_URL",
        "BARK_DEVICE_KEY",
        "PORT",
    ];

    fn setup_config_dir(files: &[(&str, &str)]) -> TempDir {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        for (name, content) in files {
            fs::write(temp_dir.path().join(name), content).expect("Failed to write config file");
        }
        temp_dir
    }

    /// Restores every touched variable on drop
    struct EnvGuard {
        vars_to_restore: Vec<(String, Option<String>)>,
    }

    impl EnvGuard {
        /// Starts from a clean slate for all variables the loader reads.
        fn clean() -> Self {
            let mut guard = Self {
                vars_to_restore: Vec::new(),
            };
            for var in MANAGED_VARS {
                guard.remove(var);
            }
            guard
        }

        fn set(&mut self, key: &str, value: &str) {
            self.vars_to_restore
                .push((key.to_string(), std::env::var(key).ok()));
            unsafe {
                std::env::set_var(key, value);
            }
        }

        fn remove(&mut self, key: &str) {
            self.vars_to_restore
                .push((key.to_string(), std::env::var(key).ok()));
            unsafe {
                std::env::remove_var(key);
            }
        }
    }

    impl Drop for EnvGuard {
        fn drop(&mut self) {
            for (key, original) in self.vars_to_restore.iter().rev() {
                unsafe {
                    match original {
                        Some(value) => std::env::set_var(key, value),
                        None => std::env::remove_var(key),
                    }
                }
            }
        }
    }

    #[test]
    fn test_mutual_exclusivity_error() {
        let _lock = TEST_MUTEX.lock().unwrap();
        let mut env = EnvGuard::clean();
        env.set(CONFIG_DIR_ENV, "/custom/config");
        env.set(CONFIG_FILE_ENV, "/custom/config/push.toml");

        match ConfigLoader::new() {
            Err(ConfigError::MutualExclusivityError(msg)) => {
                assert!(msg.contains("PUSH_CONFIG_DIR"));
                assert!(msg.contains("PUSH_CONFIG_FILE"));
            }
            other => panic!("Expected MutualExclusivityError, got {:?}", other),
        }
    }

    #[test]
    fn test_load_without_any_files_uses_defaults() {
        let _lock = TEST_MUTEX.lock().unwrap();
        let mut env = EnvGuard::clean();
        let temp_dir = setup_config_dir(&[]);
        env.set(CONFIG_DIR_ENV, temp_dir.path().to_str().unwrap());

        let settings = ConfigLoader::new().unwrap().load().unwrap();

        assert_eq!(settings.server.port, 3019);
        assert_eq!(settings.push.batch_delay_ms, 100);
        assert!(settings.providers.telegram.bot_token.is_empty());
    }

    #[test]
    fn test_environment_file_overrides_default() {
        let _lock = TEST_MUTEX.lock().unwrap();
        let mut env = EnvGuard::clean();
        let temp_dir = setup_config_dir(&[
            (
                "default.toml",
                "[server]\nhost = \"127.0.0.1\"\nport = 3019\n\n[push]\nbatch_delay_ms = 100\n",
            ),
            ("production.toml", "[server]\nhost = \"0.0.0.0\"\n"),
        ]);
        env.set(CONFIG_DIR_ENV, temp_dir.path().to_str().unwrap());
        env.set("PUSH_APP_ENV", "production");

        let settings = ConfigLoader::new().unwrap().load().unwrap();

        assert_eq!(settings.server.host, "0.0.0.0");
        assert_eq!(settings.server.port, 3019);
    }

    #[test]
    fn test_prefixed_env_overrides_files() {
        let _lock = TEST_MUTEX.lock().unwrap();
        let mut env = EnvGuard::clean();
        let temp_dir = setup_config_dir(&[(
            "default.toml",
            "[server]\nport = 3019\n\n[providers.bark]\nserver_url = \"bark.example.com\"\n",
        )]);
        env.set(CONFIG_DIR_ENV, temp_dir.path().to_str().unwrap());
        env.set("PUSH_SERVER__PORT", "9000");
        env.set("PUSH_PROVIDERS__BARK__DEVICE_KEY", "devkey");

        let settings = ConfigLoader::new().unwrap().load().unwrap();

        assert_eq!(settings.server.port, 9000);
        assert_eq!(settings.providers.bark.server_url, "bark.example.com");
        assert_eq!(settings.providers.bark.device_key, "devkey");
    }

    #[test]
    fn test_conventional_vars_are_applied() {
        let _lock = TEST_MUTEX.lock().unwrap();
        let mut env = EnvGuard::clean();
        let temp_dir = setup_config_dir(&[]);
        env.set(CONFIG_DIR_ENV, temp_dir.path().to_str().unwrap());
        env.set("TELEGRAM_BOT_TOKEN", "123456:ABC-DEF");
        env.set("BARK_SERVER_URL", "https://bark.example.com");
        env.set("BARK_DEVICE_KEY", "key123");
        env.set("PORT", "4000");

        let settings = ConfigLoader::new().unwrap().load().unwrap();

        assert_eq!(settings.providers.telegram.bot_token, "123456:ABC-DEF");
        assert_eq!(settings.providers.bark.server_url, "https://bark.example.com");
        assert_eq!(settings.providers.bark.device_key, "key123");
        assert_eq!(settings.server.port, 4000);
    }

    #[test]
    fn test_blank_conventional_var_is_ignored() {
        let _lock = TEST_MUTEX.lock().unwrap();
        let mut env = EnvGuard::clean();
        let temp_dir = setup_config_dir(&[(
            "default.toml",
            "[providers.telegram]\nbot_token = \"from-file\"\n",
        )]);
        env.set(CONFIG_DIR_ENV, temp_dir.path().to_str().unwrap());
        env.set("TELEGRAM_BOT_TOKEN", "  ");

        let settings = ConfigLoader::new().unwrap().load().unwrap();

        assert_eq!(settings.providers.telegram.bot_token, "from-file");
    }

    #[test]
    fn test_single_file_mode_requires_file() {
        let _lock = TEST_MUTEX.lock().unwrap();
        let _env = EnvGuard::clean();

        let result = ConfigLoader::with_file("/definitely/not/here.toml").load();

        assert!(matches!(result, Err(ConfigError::FileNotFound(_))));
    }

    #[test]
    fn test_invalid_values_fail_validation() {
        let _lock = TEST_MUTEX.lock().unwrap();
        let _env = EnvGuard::clean();
        let temp_dir = setup_config_dir(&[("push.toml", "[push]\nsend_timeout_secs = 0\n")]);

        let result = ConfigLoader::with_file(temp_dir.path().join("push.toml")).load();

        assert!(matches!(result, Err(ConfigError::ValidationError { .. })));
    }
}
