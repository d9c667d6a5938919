//! Core push types shared by both providers.
//!
//! Provider clients never return `Err` for a delivery problem. Every outcome
//! of an outbound call is a `PushResult`, so callers see one uniform shape
//! whichever provider handled the request.

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};
use utoipa::ToSchema;

use crate::external::ExternalError;

/// Provider-specific options forwarded with a push (parse mode, sound, icon...)
pub type PushOptions = Map<String, Value>;

/// Code attached to failures produced by the dispatcher's fault conversion
pub const PUSH_ERROR: &str = "PUSH_ERROR";

/// The supported providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// Telegram Bot API
    #[serde(alias = "chatbot")]
    Telegram,
    /// Bark device push
    #[serde(alias = "devicepush")]
    Bark,
}

impl ProviderKind {
    pub const ALL: [ProviderKind; 2] = [ProviderKind::Telegram, ProviderKind::Bark];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::Telegram => "telegram",
            ProviderKind::Bark => "bark",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "telegram" | "chatbot" => Ok(ProviderKind::Telegram),
            "bark" | "devicepush" => Ok(ProviderKind::Bark),
            other => Err(format!("unsupported push type '{}'", other)),
        }
    }
}

/// Provider-assigned message identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum MessageId {
    Number(i64),
    Text(String),
}

impl MessageId {
    /// Reads a numeric or string id from a provider payload.
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => n.as_i64().map(MessageId::Number),
            Value::String(s) if !s.is_empty() => Some(MessageId::Text(s.clone())),
            _ => None,
        }
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageId::Number(n) => write!(f, "{}", n),
            MessageId::Text(s) => f.write_str(s),
        }
    }
}

/// Why a push attempt failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// The provider answered and rejected the request
    Provider,
    Timeout,
    /// DNS, connect or other transport failure
    Network,
    /// Rejected locally before any outbound call
    InvalidInput,
    Unknown,
}

/// Failure half of `PushResult`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushFailure {
    pub kind: FailureKind,
    pub error: String,
    pub details: Option<String>,
    pub code: Option<&'static str>,
}

impl PushFailure {
    pub fn new(kind: FailureKind, error: impl Into<String>) -> Self {
        Self {
            kind,
            error: error.into(),
            details: None,
            code: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn with_code(mut self, code: &'static str) -> Self {
        self.code = Some(code);
        self
    }

    /// Maps a transport failure to a readable message for the named provider.
    pub fn from_external(provider: &str, error: &ExternalError) -> Self {
        match error {
            ExternalError::Timeout => {
                PushFailure::new(FailureKind::Timeout, "Request timed out")
                    .with_details(error.to_string())
            }
            ExternalError::Connection(_) => PushFailure::new(
                FailureKind::Network,
                format!("Network error: unable to reach the {} API", provider),
            )
            .with_details(error.to_string()),
            ExternalError::Status { status, body } => {
                PushFailure::new(FailureKind::Provider, format!("HTTP {}", status.as_u16()))
                    .with_details(body.clone())
            }
            ExternalError::Decode(_) | ExternalError::Request(_) => {
                PushFailure::new(FailureKind::Unknown, "Send failed").with_details(error.to_string())
            }
        }
    }
}

/// Outcome of one push attempt to one target.
///
/// Serialized as `{success: true, messageId}` or
/// `{success: false, error, reason, code?, details?}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PushResult {
    Delivered { message_id: MessageId },
    Failed(PushFailure),
}

impl PushResult {
    pub fn delivered(message_id: MessageId) -> Self {
        PushResult::Delivered { message_id }
    }

    pub fn failed(kind: FailureKind, error: impl Into<String>) -> Self {
        PushResult::Failed(PushFailure::new(kind, error))
    }

    /// Failure produced when dispatching itself faulted.
    pub fn push_error(error: impl Into<String>) -> Self {
        PushResult::Failed(PushFailure::new(FailureKind::Unknown, error).with_code(PUSH_ERROR))
    }

    pub fn is_success(&self) -> bool {
        matches!(self, PushResult::Delivered { .. })
    }

    pub fn message_id(&self) -> Option<&MessageId> {
        match self {
            PushResult::Delivered { message_id } => Some(message_id),
            PushResult::Failed(_) => None,
        }
    }

    pub fn failure(&self) -> Option<&PushFailure> {
        match self {
            PushResult::Delivered { .. } => None,
            PushResult::Failed(failure) => Some(failure),
        }
    }

    fn serialize_fields<M: SerializeMap>(&self, map: &mut M) -> Result<(), M::Error> {
        match self {
            PushResult::Delivered { message_id } => {
                map.serialize_entry("success", &true)?;
                map.serialize_entry("messageId", message_id)?;
            }
            PushResult::Failed(failure) => {
                map.serialize_entry("success", &false)?;
                map.serialize_entry("error", &failure.error)?;
                map.serialize_entry("reason", &failure.kind)?;
                if let Some(code) = failure.code {
                    map.serialize_entry("code", code)?;
                }
                if let Some(details) = &failure.details {
                    map.serialize_entry("details", details)?;
                }
            }
        }
        Ok(())
    }
}

impl Serialize for PushResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        self.serialize_fields(&mut map)?;
        map.end()
    }
}

/// One target's outcome inside a batch, in input order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchEntry {
    pub target_id: String,
    pub result: PushResult,
}

impl Serialize for BatchEntry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("targetId", &self.target_id)?;
        self.result.serialize_fields(&mut map)?;
        map.end()
    }
}

/// Outcome of a configuration self-test.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SelfTestReport {
    pub valid: bool,
    /// Provider identity on success (bot info for Telegram)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub info: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SelfTestReport {
    pub fn valid(info: Option<Value>) -> Self {
        Self {
            valid: true,
            info,
            error: None,
        }
    }

    pub fn invalid(error: impl Into<String>) -> Self {
        Self {
            valid: false,
            info: None,
            error: Some(error.into()),
        }
    }
}

/// A configured provider as seen by the dispatcher.
///
/// Implemented by the provider managers so startup checks and the `check`
/// command can treat both providers alike.
#[async_trait]
pub trait PushProvider: Send + Sync {
    fn kind(&self) -> ProviderKind;

    /// True iff a client was built from configuration
    fn is_available(&self) -> bool;

    /// Verifies the configuration against the live provider.
    ///
    /// Returns `None` when the check would have a user-visible side effect
    /// and `allow_side_effects` is false.
    async fn self_test(&self, allow_side_effects: bool) -> Option<SelfTestReport>;
}

/// Shortens user content for log lines.
pub(crate) fn preview(text: &str, max_chars: usize) -> String {
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(max_chars).collect();
    if chars.next().is_some() {
        format!("{}...", head)
    } else {
        head
    }
}
