//! Serve command handler
//!
//! Handles the serve command including dry-run validation and server startup.

use crate::config::{Environment, Settings};
use crate::error::AppResult;
use crate::server::Server;
use crate::services::Services;
use crate::services::push::ProviderKind;

/// Handler for the serve command
pub struct ServeCommandHandler {
    config: Settings,
    environment: Environment,
}

impl ServeCommandHandler {
    pub fn new(config: Settings, environment: Environment) -> Self {
        Self {
            config,
            environment,
        }
    }

    /// Runs the server, or only validates the configuration on a dry run.
    ///
    /// # Errors
    /// - Configuration validation errors
    /// - Bind and server runtime errors (if not dry-run)
    pub async fn execute(self, dry_run: bool) -> AppResult<()> {
        if dry_run {
            return self.validate_only();
        }

        Server::new(self.config, self.environment).run().await?;
        Ok(())
    }

    /// Validate configuration without starting the server
    pub fn validate_only(&self) -> AppResult<()> {
        self.config.validate()?;

        println!("✓ Configuration is valid ({})", self.environment);
        println!("✓ Server would bind to: {}", self.config.server.address());

        let services = Services::new(&self.config);
        for kind in ProviderKind::ALL {
            if services.push.is_available(kind) {
                println!("✓ {} provider enabled", kind);
            } else {
                println!("- {} provider disabled (not configured)", kind);
            }
        }

        println!("Dry run completed successfully - configuration is ready for deployment");
        Ok(())
    }

    pub fn config(&self) -> &Settings {
        &self.config
    }
}
