//! Provider managers.
//!
//! Each manager builds its client once from configuration. A missing or
//! unusable setting leaves the provider unavailable for the life of the
//! process; the other provider is unaffected.

use async_trait::async_trait;
use serde::Serialize;
use utoipa::ToSchema;

use super::bark::BarkClient;
use super::provider::{ProviderKind, PushProvider, SelfTestReport};
use super::telegram::TelegramClient;
use crate::config::{BarkSettings, PushSettings, TelegramSettings, redact};

/// Redacted view of the Telegram configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TelegramConfigSummary {
    /// `***configured` when a token is set
    pub bot_token: Option<&'static str>,
    pub api_base: String,
}

/// Redacted view of the Bark configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BarkConfigSummary {
    pub server_url: Option<String>,
    /// `***configured` when a default device key is set
    pub device_key: Option<&'static str>,
}

pub struct TelegramManager {
    client: Option<TelegramClient>,
    summary: TelegramConfigSummary,
}

impl TelegramManager {
    pub fn new(settings: &TelegramSettings, push: &PushSettings) -> Self {
        let client = TelegramClient::from_settings(settings, push);
        match client {
            Some(_) => tracing::info!("Telegram provider initialized"),
            None => tracing::warn!("Telegram bot token not configured, Telegram push disabled"),
        }

        Self {
            client,
            summary: TelegramConfigSummary {
                bot_token: redact(settings.bot_token.trim()),
                api_base: settings.api_base.clone(),
            },
        }
    }

    pub fn client(&self) -> Option<&TelegramClient> {
        self.client.as_ref()
    }

    pub fn config_summary(&self) -> &TelegramConfigSummary {
        &self.summary
    }
}

#[async_trait]
impl PushProvider for TelegramManager {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Telegram
    }

    fn is_available(&self) -> bool {
        self.client.is_some()
    }

    async fn self_test(&self, _allow_side_effects: bool) -> Option<SelfTestReport> {
        match &self.client {
            Some(client) => Some(client.validate().await),
            None => Some(SelfTestReport::invalid("Telegram bot token not configured")),
        }
    }
}

pub struct BarkManager {
    client: Option<BarkClient>,
    summary: BarkConfigSummary,
}

impl BarkManager {
    pub fn new(settings: &BarkSettings, push: &PushSettings) -> Self {
        let client = match BarkClient::from_settings(settings, push) {
            Ok(client) => {
                tracing::info!(server = %client.server(), "Bark provider initialized");
                Some(client)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Bark not configured, Bark push disabled");
                None
            }
        };

        let server_url = settings.server_url.trim();
        Self {
            summary: BarkConfigSummary {
                server_url: client
                    .as_ref()
                    .map(|c| c.server().to_string())
                    .or_else(|| (!server_url.is_empty()).then(|| server_url.to_string())),
                device_key: redact(settings.device_key.trim()),
            },
            client,
        }
    }

    pub fn client(&self) -> Option<&BarkClient> {
        self.client.as_ref()
    }

    pub fn config_summary(&self) -> &BarkConfigSummary {
        &self.summary
    }
}

#[async_trait]
impl PushProvider for BarkManager {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Bark
    }

    fn is_available(&self) -> bool {
        self.client.is_some()
    }

    /// The Bark check sends a visible notification, so it only runs when allowed.
    async fn self_test(&self, allow_side_effects: bool) -> Option<SelfTestReport> {
        match &self.client {
            Some(client) if allow_side_effects => Some(client.validate_config().await),
            Some(_) => None,
            None => Some(SelfTestReport::invalid("Bark server URL or device key not configured")),
        }
    }
}
