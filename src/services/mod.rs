//! Service layer.
//!
//! Services are built once at startup and shared with the handlers through
//! the application state.

pub mod push;

pub use push::PushDispatcher;

use crate::config::Settings;

/// Aggregates all services for convenient access.
///
/// Cloning is cheap since every service holds its state behind an `Arc`.
#[derive(Clone)]
pub struct Services {
    pub push: PushDispatcher,
}

impl Services {
    /// Builds the services and initializes the provider clients.
    pub fn new(settings: &Settings) -> Self {
        let push = PushDispatcher::new(settings.providers.clone(), settings.push.clone());
        push.initialize();
        Self { push }
    }
}
