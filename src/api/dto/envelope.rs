//! Response envelope shared by every endpoint.

use serde::Serialize;
use serde_json::Value;
use utoipa::ToSchema;

/// Top-level outcome marker of an envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ResponseStatus {
    Success,
    Error,
}

/// Envelope carrying a payload.
///
/// A batch push answers with this envelope even when every target failed;
/// `status` then reads `error`.
#[derive(Debug, Serialize, ToSchema)]
pub struct ApiResponse<T> {
    pub status: ResponseStatus,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub details: Option<Value>,
}

impl<T> ApiResponse<T> {
    pub fn success(message: impl Into<String>, data: T) -> Self {
        Self {
            status: ResponseStatus::Success,
            message: message.into(),
            data: Some(data),
            code: None,
            details: None,
        }
    }

    pub fn failure(code: impl Into<String>, message: impl Into<String>, data: T) -> Self {
        Self {
            status: ResponseStatus::Error,
            message: message.into(),
            data: Some(data),
            code: Some(code.into()),
            details: None,
        }
    }

    pub fn with_status(mut self, status: ResponseStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }
}

/// Envelope for requests that produced no payload.
#[derive(Debug, Serialize, ToSchema)]
#[schema(example = json!({
    "status": "error",
    "message": "Telegram push requires a message",
    "code": "MISSING_MESSAGE"
}))]
pub struct ErrorResponse {
    pub status: ResponseStatus,
    pub message: String,
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub details: Option<Value>,
}

impl ErrorResponse {
    pub fn new(code: &str, message: impl Into<String>) -> Self {
        Self {
            status: ResponseStatus::Error,
            message: message.into(),
            code: code.to_string(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }
}
