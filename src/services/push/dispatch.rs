//! Unified dispatch: routes a push to the provider named by its kind.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, OnceLock};

use futures::FutureExt;
use serde::Serialize;
use utoipa::ToSchema;

use super::manager::{BarkConfigSummary, BarkManager, TelegramConfigSummary, TelegramManager};
use super::provider::{BatchEntry, ProviderKind, PushOptions, PushProvider, PushResult, SelfTestReport};
use crate::config::{ProvidersConfig, PushSettings};
use crate::error::{AppError, AppResult};

/// Recipients of a Telegram push.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatTargets {
    Single(String),
    Multiple(Vec<String>),
}

/// A validated push, shaped for its provider.
#[derive(Debug, Clone, PartialEq)]
pub enum PushParams {
    Telegram {
        message: String,
        targets: ChatTargets,
        options: PushOptions,
    },
    Bark {
        title: String,
        body: String,
        /// `None` sends to the configured default device
        device_keys: Option<Vec<String>>,
        options: PushOptions,
    },
}

impl PushParams {
    pub fn kind(&self) -> ProviderKind {
        match self {
            PushParams::Telegram { .. } => ProviderKind::Telegram,
            PushParams::Bark { .. } => ProviderKind::Bark,
        }
    }
}

/// Result of one dispatched push.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    Single(PushResult),
    Batch(Vec<BatchEntry>),
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TelegramStatus {
    pub available: bool,
    pub config: TelegramConfigSummary,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BarkStatus {
    pub available: bool,
    pub config: BarkConfigSummary,
}

/// Availability and redacted configuration of every provider
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PushStatus {
    pub telegram: TelegramStatus,
    pub bark: BarkStatus,
}

struct Managers {
    telegram: TelegramManager,
    bark: BarkManager,
}

struct DispatcherInner {
    providers: ProvidersConfig,
    push: PushSettings,
    managers: OnceLock<Managers>,
}

/// Single entry point for sending pushes.
///
/// Cheap to clone; clones share the same provider clients.
#[derive(Clone)]
pub struct PushDispatcher {
    inner: Arc<DispatcherInner>,
}

impl PushDispatcher {
    pub fn new(providers: ProvidersConfig, push: PushSettings) -> Self {
        Self {
            inner: Arc::new(DispatcherInner {
                providers,
                push,
                managers: OnceLock::new(),
            }),
        }
    }

    /// Builds both provider managers. Later calls are no-ops.
    pub fn initialize(&self) {
        let managers = self.managers();
        tracing::info!(
            telegram = managers.telegram.is_available(),
            bark = managers.bark.is_available(),
            "Push providers initialized"
        );
    }

    fn managers(&self) -> &Managers {
        self.inner.managers.get_or_init(|| Managers {
            telegram: TelegramManager::new(&self.inner.providers.telegram, &self.inner.push),
            bark: BarkManager::new(&self.inner.providers.bark, &self.inner.push),
        })
    }

    fn provider(&self, kind: ProviderKind) -> &dyn PushProvider {
        let managers = self.managers();
        match kind {
            ProviderKind::Telegram => &managers.telegram,
            ProviderKind::Bark => &managers.bark,
        }
    }

    pub fn is_available(&self, kind: ProviderKind) -> bool {
        self.provider(kind).is_available()
    }

    pub fn status(&self) -> PushStatus {
        let managers = self.managers();
        PushStatus {
            telegram: TelegramStatus {
                available: managers.telegram.is_available(),
                config: managers.telegram.config_summary().clone(),
            },
            bark: BarkStatus {
                available: managers.bark.is_available(),
                config: managers.bark.config_summary().clone(),
            },
        }
    }

    /// Sends one push.
    ///
    /// Fails only with `ServiceUnavailable`. Any other fault raised while
    /// sending, panics included, comes back as a failed result with code
    /// `PUSH_ERROR`.
    pub async fn dispatch(&self, params: PushParams) -> AppResult<DispatchOutcome> {
        let kind = params.kind();
        if !self.is_available(kind) {
            return Err(AppError::ServiceUnavailable { provider: kind });
        }

        match AssertUnwindSafe(self.deliver(params)).catch_unwind().await {
            Ok(Ok(outcome)) => Ok(outcome),
            Ok(Err(e)) => {
                let message = describe(&e);
                tracing::warn!(provider = %kind, error = %message, "Push dispatch failed");
                Ok(DispatchOutcome::Single(PushResult::push_error(message)))
            }
            Err(panic) => {
                let message = panic_message(panic.as_ref());
                tracing::error!(provider = %kind, error = %message, "Push dispatch panicked");
                Ok(DispatchOutcome::Single(PushResult::push_error(message)))
            }
        }
    }

    async fn deliver(&self, params: PushParams) -> AppResult<DispatchOutcome> {
        let managers = self.managers();
        match params {
            PushParams::Telegram {
                message,
                targets,
                options,
            } => {
                let client = managers.telegram.client().ok_or(AppError::ServiceUnavailable {
                    provider: ProviderKind::Telegram,
                })?;
                Ok(match targets {
                    ChatTargets::Single(chat_id) => {
                        DispatchOutcome::Single(client.send(&chat_id, &message, &options).await)
                    }
                    ChatTargets::Multiple(chat_ids) => DispatchOutcome::Batch(
                        client.send_multiple(&chat_ids, &message, &options).await,
                    ),
                })
            }
            PushParams::Bark {
                title,
                body,
                device_keys,
                options,
            } => {
                let client = managers.bark.client().ok_or(AppError::ServiceUnavailable {
                    provider: ProviderKind::Bark,
                })?;
                Ok(match device_keys {
                    Some(keys) => DispatchOutcome::Batch(
                        client.send_multiple(&keys, &title, &body, &options).await?,
                    ),
                    None => DispatchOutcome::Single(client.send(&title, &body, &options).await),
                })
            }
        }
    }

    /// Sends several pushes one after another, in order.
    pub async fn dispatch_all(
        &self,
        requests: Vec<PushParams>,
    ) -> Vec<(ProviderKind, AppResult<DispatchOutcome>)> {
        let mut outcomes = Vec::with_capacity(requests.len());
        for params in requests {
            let kind = params.kind();
            outcomes.push((kind, self.dispatch(params).await));
        }
        outcomes
    }

    /// Runs the provider's configuration check.
    ///
    /// `None` means the check was skipped because it would send a real
    /// notification and `allow_side_effects` is false.
    pub async fn self_test(
        &self,
        kind: ProviderKind,
        allow_side_effects: bool,
    ) -> Option<SelfTestReport> {
        self.provider(kind).self_test(allow_side_effects).await
    }
}

fn describe(error: &AppError) -> String {
    match std::error::Error::source(error) {
        Some(source) => format!("{}: {}", error, source),
        None => error.to_string(),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unexpected panic while sending".to_string()
    }
}
