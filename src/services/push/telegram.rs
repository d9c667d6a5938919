//! Telegram Bot API client.
//!
//! Sends text messages through `sendMessage` and checks the token with
//! `getMe`. Uses the global `HTTP_CLIENT`; each call carries its own timeout.

use std::time::Duration;

use serde_json::{Value, json};

use super::provider::{
    BatchEntry, FailureKind, MessageId, PushFailure, PushOptions, PushResult, SelfTestReport,
    preview,
};
use crate::config::{PushSettings, TelegramSettings};
use crate::external::{HTTP_CLIENT, fetch_json};

const PROVIDER_NAME: &str = "Telegram";
const DEFAULT_PARSE_MODE: &str = "HTML";

/// Option keys mapped onto Bot API fields; everything else passes through as-is.
const MAPPED_OPTIONS: &[(&str, &str)] = &[
    ("parseMode", "parse_mode"),
    ("disableWebPagePreview", "disable_web_page_preview"),
    ("disableNotification", "disable_notification"),
];

/// Fields owned by the client that options may not replace
const RESERVED_FIELDS: &[&str] = &["chat_id", "text"];

/// Client bound to one bot token.
#[derive(Clone)]
pub struct TelegramClient {
    api_base: String,
    token: String,
    send_timeout: Duration,
    validate_timeout: Duration,
    batch_delay: Duration,
}

impl std::fmt::Debug for TelegramClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramClient")
            .field("api_base", &self.api_base)
            .field("send_timeout", &self.send_timeout)
            .finish_non_exhaustive()
    }
}

impl TelegramClient {
    /// Returns `None` when no bot token is configured.
    pub fn from_settings(settings: &TelegramSettings, push: &PushSettings) -> Option<Self> {
        let token = settings.bot_token.trim();
        if token.is_empty() {
            return None;
        }

        Some(Self {
            api_base: settings.api_base.trim().trim_end_matches('/').to_string(),
            token: token.to_string(),
            send_timeout: Duration::from_secs(push.send_timeout_secs),
            validate_timeout: Duration::from_secs(push.validate_timeout_secs),
            batch_delay: Duration::from_millis(push.batch_delay_ms),
        })
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.api_base, self.token, method)
    }

    /// Builds the `sendMessage` payload.
    fn build_payload(&self, chat_id: &str, text: &str, options: &PushOptions) -> Value {
        let mut payload = json!({
            "chat_id": chat_id,
            "text": text,
            "parse_mode": DEFAULT_PARSE_MODE,
            "disable_web_page_preview": false,
            "disable_notification": false,
        });

        for (key, value) in options {
            let field = MAPPED_OPTIONS
                .iter()
                .find(|(option, _)| option == key)
                .map(|(_, field)| *field)
                .unwrap_or(key.as_str());
            if RESERVED_FIELDS.contains(&field) || value.is_null() {
                continue;
            }
            payload[field] = value.clone();
        }

        payload
    }

    /// Sends one message to one chat.
    pub async fn send(&self, chat_id: &str, text: &str, options: &PushOptions) -> PushResult {
        if chat_id.trim().is_empty() {
            return PushResult::failed(FailureKind::InvalidInput, "Chat id must not be empty");
        }
        if text.is_empty() {
            return PushResult::failed(FailureKind::InvalidInput, "Message text must not be empty");
        }

        tracing::info!(
            chat_id = %chat_id,
            message = %preview(text, 50),
            "Sending Telegram message"
        );

        let request = HTTP_CLIENT
            .post(self.method_url("sendMessage"))
            .timeout(self.send_timeout)
            .json(&self.build_payload(chat_id, text, options));

        let result = match fetch_json(request).await {
            Ok((status, body)) => interpret_reply(status.as_u16(), &body),
            Err(e) => PushResult::Failed(PushFailure::from_external(PROVIDER_NAME, &e)),
        };

        match &result {
            PushResult::Delivered { message_id } => {
                tracing::info!(chat_id = %chat_id, message_id = %message_id, "Telegram message delivered");
            }
            PushResult::Failed(failure) => {
                tracing::warn!(
                    chat_id = %chat_id,
                    reason = ?failure.kind,
                    error = %failure.error,
                    "Telegram message failed"
                );
            }
        }

        result
    }

    /// Sends the same message to each chat in order, pausing between calls.
    ///
    /// Every chat is attempted; a failure does not stop the batch.
    pub async fn send_multiple(
        &self,
        chat_ids: &[String],
        text: &str,
        options: &PushOptions,
    ) -> Vec<BatchEntry> {
        let mut entries = Vec::with_capacity(chat_ids.len());

        for (index, chat_id) in chat_ids.iter().enumerate() {
            if index > 0 && !self.batch_delay.is_zero() {
                tokio::time::sleep(self.batch_delay).await;
            }
            let result = self.send(chat_id, text, options).await;
            entries.push(BatchEntry {
                target_id: chat_id.clone(),
                result,
            });
        }

        entries
    }

    /// Checks the token with `getMe`.
    pub async fn validate(&self) -> SelfTestReport {
        let request = HTTP_CLIENT
            .get(self.method_url("getMe"))
            .timeout(self.validate_timeout);

        match fetch_json(request).await {
            Ok((_, body)) if body["ok"].as_bool() == Some(true) => {
                SelfTestReport::valid(Some(body["result"].clone()))
            }
            Ok((status, body)) => SelfTestReport::invalid(
                body["description"]
                    .as_str()
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("HTTP {}", status.as_u16())),
            ),
            Err(e) => SelfTestReport::invalid(e.to_string()),
        }
    }
}

/// Turns a Bot API reply into a `PushResult`.
fn interpret_reply(status: u16, body: &Value) -> PushResult {
    if body["ok"].as_bool() == Some(true) {
        return match MessageId::from_json(&body["result"]["message_id"]) {
            Some(id) => PushResult::delivered(id),
            None => PushResult::Failed(
                PushFailure::new(FailureKind::Unknown, "Reply is missing result.message_id")
                    .with_details(body.to_string()),
            ),
        };
    }

    let error = body["description"]
        .as_str()
        .map(str::to_string)
        .unwrap_or_else(|| format!("HTTP {}", status));

    PushResult::Failed(PushFailure::new(FailureKind::Provider, error).with_details(body.to_string()))
}
