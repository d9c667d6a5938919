//! Server module for managing HTTP server lifecycle
//!
//! This module handles server initialization, startup, and graceful shutdown.

use tokio::net::TcpListener;
use tokio::signal;

use crate::api::routes::create_router;
use crate::config::{Environment, Settings, redact};
use crate::services::push::ProviderKind;
use crate::state::AppState;

/// HTTP server manager
pub struct Server {
    settings: Settings,
    environment: Environment,
}

impl Server {
    pub fn new(settings: Settings, environment: Environment) -> Self {
        Self {
            settings,
            environment,
        }
    }

    /// Logs the effective configuration without secrets.
    pub fn log_configuration(&self) {
        let settings = &self.settings;

        tracing::info!(
            app_name = %settings.application.name,
            app_version = %settings.application.version,
            environment = %self.environment.as_str(),
            "Application starting"
        );

        tracing::info!(
            host = %settings.server.host,
            port = %settings.server.port,
            "Server configuration loaded"
        );

        tracing::info!(
            level = %settings.logger.level,
            console_enabled = %settings.logger.console.enabled,
            file_enabled = %settings.logger.file.enabled,
            "Logger configuration loaded"
        );

        tracing::info!(
            batch_delay_ms = settings.push.batch_delay_ms,
            send_timeout_secs = settings.push.send_timeout_secs,
            validate_timeout_secs = settings.push.validate_timeout_secs,
            "Push configuration loaded"
        );

        tracing::info!(
            telegram_api_base = %settings.providers.telegram.api_base,
            telegram_token = ?redact(&settings.providers.telegram.bot_token),
            bark_server_url = %settings.providers.bark.server_url,
            bark_device_key = ?redact(&settings.providers.bark.device_key),
            "Provider configuration loaded"
        );
    }

    /// Start the server and run until shutdown signal
    ///
    /// # Errors
    /// - Address binding errors
    /// - Server runtime errors
    pub async fn run(self) -> anyhow::Result<()> {
        self.log_configuration();

        let state = AppState::new(&self.settings);
        for kind in ProviderKind::ALL {
            tracing::info!(
                provider = %kind,
                available = state.services.push.is_available(kind),
                "Provider status"
            );
        }

        let router = create_router(state);
        tracing::info!("Router configured");

        let address = self.settings.server.address();
        let listener = TcpListener::bind(&address).await.map_err(|e| {
            tracing::error!(error = %e, address = %address, "Failed to bind to address");
            anyhow::anyhow!("Failed to bind to {}: {}", address, e)
        })?;

        tracing::info!(address = %address, "Server listening");

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Server shutdown complete");

        Ok(())
    }
}

/// Waits for a shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
