//! Error handler for converting AppError to HTTP responses.
//!
//! Every error leaves the service as the standard envelope with a
//! machine-readable `code`. Internal causes are logged, never returned.

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::api::dto::ErrorResponse;
use crate::error::AppError;

impl IntoResponse for AppError {
    /// # Status Code Mapping
    /// - Validation → 400 with the validation code
    /// - ValidationErrors → 400 VALIDATION_ERROR
    /// - BadRequest → 400 BAD_REQUEST
    /// - ServiceUnavailable → 503 SERVICE_UNAVAILABLE
    /// - Configuration → 500 CONFIGURATION_ERROR
    /// - Internal → 500 INTERNAL_ERROR
    fn into_response(self) -> Response {
        let status = error_to_status_code(&self);
        let code = error_to_code(&self);

        let error_response = match &self {
            AppError::Validation { message, .. } => ErrorResponse::new(code, message.clone()),
            AppError::ValidationErrors { errors } => {
                ErrorResponse::new(code, "Request validation failed").with_details(json!(
                    errors
                        .iter()
                        .map(|e| json!({"field": e.field, "message": e.message}))
                        .collect::<Vec<_>>()
                ))
            }
            AppError::BadRequest { message } => ErrorResponse::new(code, message.clone()),
            AppError::ServiceUnavailable { .. } => ErrorResponse::new(code, self.to_string()),
            AppError::Configuration { key, source } => {
                tracing::error!(key = %key, error = %source, "Configuration error");
                ErrorResponse::new(code, format!("Configuration error: {}", key))
                    .with_details(json!({ "key": key }))
            }
            AppError::Internal { source } => {
                tracing::error!(error = %source, "Internal error");
                ErrorResponse::new(code, "An internal error occurred")
            }
        };

        (status, Json(error_response)).into_response()
    }
}

/// Maps an AppError variant to its HTTP status code.
pub fn error_to_status_code(error: &AppError) -> StatusCode {
    match error {
        AppError::Validation { .. } => StatusCode::BAD_REQUEST,
        AppError::ValidationErrors { .. } => StatusCode::BAD_REQUEST,
        AppError::BadRequest { .. } => StatusCode::BAD_REQUEST,
        AppError::ServiceUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
        AppError::Configuration { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        AppError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Maps an AppError variant to its error code string.
pub fn error_to_code(error: &AppError) -> &'static str {
    match error {
        AppError::Validation { code, .. } => *code,
        AppError::ValidationErrors { .. } => "VALIDATION_ERROR",
        AppError::BadRequest { .. } => "BAD_REQUEST",
        AppError::ServiceUnavailable { .. } => "SERVICE_UNAVAILABLE",
        AppError::Configuration { .. } => "CONFIGURATION_ERROR",
        AppError::Internal { .. } => "INTERNAL_ERROR",
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        match rejection {
            JsonRejection::JsonDataError(err) => {
                AppError::validation("INVALID_JSON", format!("Invalid JSON format: {}", err.body_text()))
            }
            JsonRejection::JsonSyntaxError(err) => {
                AppError::validation("JSON_SYNTAX_ERROR", format!("JSON syntax error: {}", err.body_text()))
            }
            JsonRejection::MissingJsonContentType(_) => AppError::validation(
                "MISSING_CONTENT_TYPE",
                "Missing or invalid Content-Type header, expected application/json",
            ),
            other => AppError::BadRequest {
                message: other.body_text(),
            },
        }
    }
}

/// Rewrites error responses that are not already JSON into the envelope.
///
/// Covers responses produced outside the handlers, such as axum's 404 and
/// 405 or an oversized body.
pub async fn global_error_handler(
    request: axum::extract::Request,
    next: axum::middleware::Next,
) -> Response {
    let response = next.run(request).await;
    let status = response.status();

    if !(status.is_client_error() || status.is_server_error()) {
        return response;
    }

    let is_json = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.contains("application/json"));
    if is_json {
        return response;
    }

    let (_parts, body) = response.into_parts();
    let body_bytes = axum::body::to_bytes(body, 64 * 1024)
        .await
        .unwrap_or_default();
    let original_message = String::from_utf8_lossy(&body_bytes).trim().to_string();

    let (code, fallback) = match status {
        StatusCode::BAD_REQUEST => ("BAD_REQUEST", "Bad request - invalid or malformed request"),
        StatusCode::NOT_FOUND => ("NOT_FOUND", "The requested resource was not found"),
        StatusCode::METHOD_NOT_ALLOWED => (
            "METHOD_NOT_ALLOWED",
            "HTTP method not allowed for this endpoint",
        ),
        StatusCode::UNSUPPORTED_MEDIA_TYPE => ("UNSUPPORTED_MEDIA_TYPE", "Unsupported media type"),
        StatusCode::PAYLOAD_TOO_LARGE => ("PAYLOAD_TOO_LARGE", "Request payload too large"),
        StatusCode::SERVICE_UNAVAILABLE => {
            ("SERVICE_UNAVAILABLE", "Service temporarily unavailable")
        }
        s if s.is_server_error() => ("INTERNAL_ERROR", "An internal server error occurred"),
        _ => ("UNKNOWN_ERROR", "An unknown error occurred"),
    };

    let message = if original_message.is_empty() || status.is_server_error() {
        fallback.to_string()
    } else {
        original_message
    };

    (status, Json(ErrorResponse::new(code, message))).into_response()
}
