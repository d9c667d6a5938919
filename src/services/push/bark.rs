//! Bark device-push client.
//!
//! Each client is bound to one server and one device key. A push is a single
//! GET with title and body as path segments:
//! `{server}/{device_key}/{title}/{body}?sound=&icon=&group=&url=&level=`.
//!
//! Bark API Reference: https://github.com/Finb/Bark

use std::time::Duration;

use reqwest::Url;
use serde_json::Value;

use super::provider::{
    BatchEntry, FailureKind, MessageId, PushFailure, PushOptions, PushResult, SelfTestReport,
    preview,
};
use crate::config::{BarkSettings, PushSettings};
use crate::error::{AppError, AppResult};
use crate::external::{HTTP_CLIENT, fetch_json};

const PROVIDER_NAME: &str = "Bark";

/// Options forwarded as query parameters, in this order
const QUERY_OPTIONS: &[&str] = &["sound", "icon", "group", "url", "level"];

const SELF_TEST_TITLE: &str = "Configuration test";
const SELF_TEST_BODY: &str = "push-gateway can reach this device.";

/// Client bound to one Bark server and device key.
#[derive(Clone)]
pub struct BarkClient {
    server: Url,
    device_key: String,
    send_timeout: Duration,
    validate_timeout: Duration,
    batch_delay: Duration,
}

impl std::fmt::Debug for BarkClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BarkClient")
            .field("server", &self.server.as_str())
            .finish_non_exhaustive()
    }
}

impl BarkClient {
    /// Builds a client, failing when the server or the device key is empty.
    pub fn new(server_url: &str, device_key: &str, push: &PushSettings) -> AppResult<Self> {
        let device_key = device_key.trim();
        if device_key.is_empty() {
            return Err(AppError::configuration(
                "providers.bark.device_key",
                "Bark device key is empty",
            ));
        }

        Ok(Self {
            server: normalize_server_url(server_url)?,
            device_key: device_key.to_string(),
            send_timeout: Duration::from_secs(push.send_timeout_secs),
            validate_timeout: Duration::from_secs(push.validate_timeout_secs),
            batch_delay: Duration::from_millis(push.batch_delay_ms),
        })
    }

    pub fn from_settings(settings: &BarkSettings, push: &PushSettings) -> AppResult<Self> {
        Self::new(&settings.server_url, &settings.device_key, push)
    }

    /// A client for the same server bound to another device key.
    pub fn with_device_key(&self, device_key: &str) -> AppResult<Self> {
        let device_key = device_key.trim();
        if device_key.is_empty() {
            return Err(AppError::configuration(
                "deviceKeys",
                "Bark device key is empty",
            ));
        }

        Ok(Self {
            device_key: device_key.to_string(),
            ..self.clone()
        })
    }

    pub fn server(&self) -> &str {
        self.server.as_str().trim_end_matches('/')
    }

    fn build_url(&self, title: &str, body: &str, options: &PushOptions) -> Option<Url> {
        let mut url = self.server.clone();
        url.path_segments_mut()
            .ok()?
            .pop_if_empty()
            .push(&self.device_key)
            .push(title)
            .push(body);

        let params: Vec<(&str, String)> = QUERY_OPTIONS
            .iter()
            .filter_map(|key| option_value(options.get(*key)?).map(|v| (*key, v)))
            .collect();
        if !params.is_empty() {
            url.query_pairs_mut().extend_pairs(params);
        }

        Some(url)
    }

    /// Pushes one notification to the bound device.
    pub async fn send(&self, title: &str, body: &str, options: &PushOptions) -> PushResult {
        self.send_with_timeout(title, body, options, self.send_timeout)
            .await
    }

    async fn send_with_timeout(
        &self,
        title: &str,
        body: &str,
        options: &PushOptions,
        timeout: Duration,
    ) -> PushResult {
        if title.is_empty() && body.is_empty() {
            return PushResult::failed(FailureKind::InvalidInput, "Title or body is required");
        }

        let Some(url) = self.build_url(title, body, options) else {
            return PushResult::failed(
                FailureKind::InvalidInput,
                "Bark server URL cannot carry a path",
            );
        };

        tracing::info!(
            server = %self.server(),
            title = %preview(title, 30),
            "Sending Bark notification"
        );

        let result = match fetch_json(HTTP_CLIENT.get(url).timeout(timeout)).await {
            Ok((status, reply)) => interpret_reply(status.as_u16(), &reply),
            Err(e) => PushResult::Failed(PushFailure::from_external(PROVIDER_NAME, &e)),
        };

        match &result {
            PushResult::Delivered { message_id } => {
                tracing::info!(message_id = %message_id, "Bark notification delivered");
            }
            PushResult::Failed(failure) => {
                tracing::warn!(
                    reason = ?failure.kind,
                    error = %failure.error,
                    "Bark notification failed"
                );
            }
        }

        result
    }

    /// Pushes the same notification to each device key in order.
    ///
    /// A client is built for every key before the first call, so an empty key
    /// fails the whole batch without sending anything.
    pub async fn send_multiple(
        &self,
        device_keys: &[String],
        title: &str,
        body: &str,
        options: &PushOptions,
    ) -> AppResult<Vec<BatchEntry>> {
        let clients = device_keys
            .iter()
            .map(|key| self.with_device_key(key))
            .collect::<AppResult<Vec<_>>>()?;

        let mut entries = Vec::with_capacity(clients.len());
        for (index, client) in clients.iter().enumerate() {
            if index > 0 && !self.batch_delay.is_zero() {
                tokio::time::sleep(self.batch_delay).await;
            }
            let result = client.send(title, body, options).await;
            entries.push(BatchEntry {
                target_id: client.device_key.clone(),
                result,
            });
        }

        Ok(entries)
    }

    /// Sends a real test notification to the bound device.
    pub async fn validate_config(&self) -> SelfTestReport {
        let result = self
            .send_with_timeout(
                SELF_TEST_TITLE,
                SELF_TEST_BODY,
                &PushOptions::new(),
                self.validate_timeout,
            )
            .await;

        match result {
            PushResult::Delivered { .. } => SelfTestReport::valid(None),
            PushResult::Failed(failure) => SelfTestReport::invalid(failure.error),
        }
    }
}

/// Prefixes `https://` when no scheme is given and drops a trailing slash.
fn normalize_server_url(raw: &str) -> AppResult<Url> {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Err(AppError::configuration(
            "providers.bark.server_url",
            "Bark server URL is empty",
        ));
    }

    let candidate = if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed)
    };

    let url = Url::parse(&candidate).map_err(|e| {
        AppError::configuration(
            "providers.bark.server_url",
            format!("Invalid Bark server URL: {}", e),
        )
    })?;

    if url.scheme() != "https" && url.scheme() != "http" {
        return Err(AppError::configuration(
            "providers.bark.server_url",
            "Bark server URL must use http or https",
        ));
    }

    Ok(url)
}

fn option_value(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Turns a Bark reply into a `PushResult`.
fn interpret_reply(status: u16, reply: &Value) -> PushResult {
    if reply["code"].as_i64() == Some(200) {
        let message_id = MessageId::from_json(&reply["timestamp"])
            .unwrap_or_else(|| MessageId::Number(jiff::Timestamp::now().as_millisecond()));
        return PushResult::delivered(message_id);
    }

    let error = reply["message"]
        .as_str()
        .filter(|m| !m.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| format!("HTTP {}", status));

    PushResult::Failed(PushFailure::new(FailureKind::Provider, error).with_details(reply.to_string()))
}
