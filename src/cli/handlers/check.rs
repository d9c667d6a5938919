//! Check command handler
//!
//! Runs each provider's self-test against the live API and prints the outcome.

use crate::config::Settings;
use crate::error::{AppError, AppResult};
use crate::services::Services;
use crate::services::push::{ProviderKind, SelfTestReport};

/// Outcome of one provider check
#[derive(Debug, PartialEq, Eq)]
pub enum CheckStatus {
    Passed,
    Failed(String),
    /// The check would deliver a real notification
    Skipped,
    /// No credentials; only reported when checking every provider
    NotConfigured,
}

/// Handler for the check command
pub struct CheckCommandHandler {
    services: Services,
}

impl CheckCommandHandler {
    pub fn new(config: &Settings) -> Self {
        Self {
            services: Services::new(config),
        }
    }

    /// Checks one provider, or all of them when `provider` is `None`.
    ///
    /// An explicitly requested provider that is not configured counts as a
    /// failure.
    ///
    /// # Errors
    /// Returns a configuration error naming every provider that failed.
    pub async fn execute(
        &self,
        provider: Option<ProviderKind>,
        allow_notification: bool,
    ) -> AppResult<()> {
        let kinds = match provider {
            Some(kind) => vec![kind],
            None => ProviderKind::ALL.to_vec(),
        };

        let mut failed = Vec::new();
        for kind in kinds {
            let status = self
                .check(kind, allow_notification, provider.is_some())
                .await;
            match &status {
                CheckStatus::Passed => println!("✓ {}: credentials verified", kind),
                CheckStatus::Failed(error) => {
                    println!("✗ {}: {}", kind, error);
                    failed.push(kind);
                }
                CheckStatus::Skipped => println!(
                    "- {}: skipped, the check sends a real notification (use --allow-notification)",
                    kind
                ),
                CheckStatus::NotConfigured => println!("- {}: not configured", kind),
            }
        }

        if failed.is_empty() {
            return Ok(());
        }

        let names: Vec<&str> = failed.iter().map(ProviderKind::as_str).collect();
        Err(AppError::configuration(
            "providers",
            format!("Provider check failed: {}", names.join(", ")),
        ))
    }

    /// Runs the self-test of a single provider.
    pub async fn check(
        &self,
        kind: ProviderKind,
        allow_notification: bool,
        required: bool,
    ) -> CheckStatus {
        if !self.services.push.is_available(kind) && !required {
            return CheckStatus::NotConfigured;
        }

        match self.services.push.self_test(kind, allow_notification).await {
            None => CheckStatus::Skipped,
            Some(SelfTestReport { valid: true, .. }) => CheckStatus::Passed,
            Some(SelfTestReport { error, .. }) => {
                CheckStatus::Failed(error.unwrap_or_else(|| "Validation failed".to_string()))
            }
        }
    }
}
