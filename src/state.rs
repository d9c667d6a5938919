//! Application state for Axum web framework.
//!
//! Contains shared services and resources that are accessible
//! across all request handlers.

use crate::config::Settings;
use crate::config::settings::ApplicationConfig;
use crate::services::Services;

/// Application state containing all shared services and resources.
///
/// Cloning is cheap since the push dispatcher sits behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// All business logic services
    pub services: Services,
    /// Name and version reported by `GET /`
    pub application: ApplicationConfig,
}

impl AppState {
    /// Builds the services from the loaded settings.
    ///
    /// Providers with missing credentials are left unavailable; this never
    /// fails.
    pub fn new(settings: &Settings) -> Self {
        Self {
            services: Services::new(settings),
            application: settings.application.clone(),
        }
    }
}
