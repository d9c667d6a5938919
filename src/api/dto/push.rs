//! Push request and response DTOs.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidateUrl};

use crate::error::{AppError, AppResult};
use crate::services::push::{
    BatchEntry, ChatTargets, FailureKind, MessageId, ProviderKind, PushOptions, PushParams,
};

/// Telegram's limit on message text length
pub const MAX_MESSAGE_LEN: usize = 4096;

/// Upper bound on requests in one `/push/batch` call
pub const MAX_BATCH_REQUESTS: u64 = 50;

const DEFAULT_BARK_TITLE: &str = "Notification";
const DEFAULT_BARK_BODY: &str = "New message";

/// Bark options that must be absolute URLs when present
const URL_OPTIONS: &[&str] = &["icon", "url"];

/// Validation codes reported before any outbound call.
pub mod codes {
    pub const MISSING_OR_INVALID_TYPE: &str = "MISSING_OR_INVALID_TYPE";
    pub const MISSING_MESSAGE: &str = "MISSING_MESSAGE";
    pub const MISSING_TARGET: &str = "MISSING_TARGET";
    pub const MISSING_TITLE_OR_BODY: &str = "MISSING_TITLE_OR_BODY";
    pub const INVALID_OPTION: &str = "INVALID_OPTION";
    pub const VALIDATION_ERROR: &str = "VALIDATION_ERROR";
    pub const PUSH_FAILED: &str = "PUSH_FAILED";
}

/// A chat id as sent by clients: JSON string or number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum TargetId {
    Text(String),
    Number(i64),
}

impl TargetId {
    fn into_string(self) -> String {
        match self {
            TargetId::Text(s) => s.trim().to_string(),
            TargetId::Number(n) => n.to_string(),
        }
    }
}

/// Body of `POST /push`.
///
/// Every field is optional at the JSON level. `type` is kept as raw JSON so
/// a missing or malformed one is reported as `MISSING_OR_INVALID_TYPE`; the
/// rest is checked per provider by `into_params`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
#[schema(example = json!({
    "type": "telegram",
    "message": "Deploy finished",
    "chatId": "123456789",
    "options": {"parseMode": "HTML"}
}))]
pub struct PushRequest {
    /// `telegram` (alias `chatbot`) or `bark` (alias `devicepush`)
    #[serde(rename = "type")]
    #[schema(value_type = Option<String>)]
    pub kind: Option<serde_json::Value>,

    /// Telegram text; fallback body for Bark. At most 4096 characters.
    pub message: Option<String>,

    /// Bark title
    pub title: Option<String>,

    /// Bark body
    pub body: Option<String>,

    /// Single Telegram chat
    #[serde(alias = "targetId")]
    pub chat_id: Option<TargetId>,

    /// Several Telegram chats, sent in order
    #[serde(alias = "targetIds")]
    pub chat_ids: Option<Vec<TargetId>>,

    /// Bark device keys; the configured default device is used when absent
    pub device_keys: Option<Vec<String>>,

    /// Provider options passed through to the provider call
    #[schema(value_type = Option<Object>)]
    pub options: Option<PushOptions>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn check_length(message: &str) -> AppResult<()> {
    if message.chars().count() > MAX_MESSAGE_LEN {
        return Err(AppError::validation(
            codes::VALIDATION_ERROR,
            format!("Message cannot exceed {} characters", MAX_MESSAGE_LEN),
        ));
    }
    Ok(())
}

impl PushRequest {
    /// Declared type, if it names a supported provider
    pub fn provider_kind(&self) -> Option<ProviderKind> {
        self.kind
            .as_ref()
            .and_then(serde_json::Value::as_str)
            .and_then(|t| t.parse().ok())
    }

    /// Checks provider-specific required fields and shapes the push.
    pub fn into_params(self) -> AppResult<PushParams> {
        let kind = self.provider_kind().ok_or_else(|| {
            AppError::validation(
                codes::MISSING_OR_INVALID_TYPE,
                "Push type is required and must be one of: telegram, bark",
            )
        })?;
        let options = self.options.unwrap_or_default();

        match kind {
            ProviderKind::Telegram => {
                let message = non_empty(self.message).ok_or_else(|| {
                    AppError::validation(codes::MISSING_MESSAGE, "Telegram push requires a message")
                })?;
                check_length(&message)?;

                let chat_ids: Vec<String> = self
                    .chat_ids
                    .unwrap_or_default()
                    .into_iter()
                    .map(TargetId::into_string)
                    .collect();
                let chat_id = self
                    .chat_id
                    .map(TargetId::into_string)
                    .filter(|id| !id.is_empty());

                let targets = if !chat_ids.is_empty() {
                    ChatTargets::Multiple(chat_ids)
                } else if let Some(chat_id) = chat_id {
                    ChatTargets::Single(chat_id)
                } else {
                    return Err(AppError::validation(
                        codes::MISSING_TARGET,
                        "Telegram push requires chatId or a non-empty chatIds",
                    ));
                };

                Ok(PushParams::Telegram {
                    message,
                    targets,
                    options,
                })
            }
            ProviderKind::Bark => {
                let title = non_empty(self.title);
                let body = non_empty(self.body);
                if title.is_none() && body.is_none() {
                    return Err(AppError::validation(
                        codes::MISSING_TITLE_OR_BODY,
                        "Bark push requires a title or a body",
                    ));
                }

                for key in URL_OPTIONS {
                    if let Some(value) = options.get(*key).and_then(|v| v.as_str())
                        && !value.is_empty()
                        && !value.validate_url()
                    {
                        return Err(AppError::validation(
                            codes::INVALID_OPTION,
                            format!("Option '{}' must be an absolute URL", key),
                        ));
                    }
                }

                // `message` only matters when it stands in for the body.
                let body = match body {
                    Some(body) => body,
                    None => match non_empty(self.message) {
                        Some(message) => {
                            check_length(&message)?;
                            message
                        }
                        None => DEFAULT_BARK_BODY.to_string(),
                    },
                };

                Ok(PushParams::Bark {
                    title: title.unwrap_or_else(|| DEFAULT_BARK_TITLE.to_string()),
                    body,
                    device_keys: self.device_keys.filter(|keys| !keys.is_empty()),
                    options,
                })
            }
        }
    }
}

/// Body of `POST /push/batch`.
#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct BatchPushRequest {
    #[validate(length(
        min = 1,
        max = MAX_BATCH_REQUESTS,
        message = "Batch must contain between 1 and 50 requests"
    ))]
    pub requests: Vec<PushRequest>,
}

/// `data` of a delivered single-target push
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeliveredData {
    #[serde(rename = "type")]
    pub kind: ProviderKind,
    pub message_id: MessageId,
}

/// `data` of a failed single-target push
#[derive(Debug, Serialize, ToSchema)]
pub struct FailedData {
    #[serde(rename = "type")]
    pub kind: ProviderKind,
    pub reason: FailureKind,
}

/// Success and failure counts of a batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct BatchSummary {
    pub total: usize,
    pub success: usize,
    pub failure: usize,
}

impl BatchSummary {
    pub fn from_entries(entries: &[BatchEntry]) -> Self {
        let success = entries.iter().filter(|e| e.result.is_success()).count();
        Self {
            total: entries.len(),
            success,
            failure: entries.len() - success,
        }
    }
}

/// `data` of a multi-target push
#[derive(Debug, Serialize, ToSchema)]
pub struct BatchData {
    #[serde(rename = "type")]
    pub kind: ProviderKind,
    /// One `{targetId, success, messageId | error}` per target, in input order
    #[schema(value_type = Vec<Object>)]
    pub results: Vec<BatchEntry>,
    pub summary: BatchSummary,
}

/// Outcome of one item of `POST /push/batch`
#[derive(Debug, Serialize, ToSchema)]
pub struct BatchItemResult {
    /// Position of the item in the request
    pub index: usize,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<ProviderKind>,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    pub message: String,
    /// Dispatch result: a single push result or a list of per-target results
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub result: Option<serde_json::Value>,
}

/// `data` of `POST /push/batch`
#[derive(Debug, Serialize, ToSchema)]
pub struct BatchPushData {
    pub results: Vec<BatchItemResult>,
    pub summary: BatchSummary,
}
