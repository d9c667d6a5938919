use thiserror::Error;
use validator::ValidationErrors;

use crate::config::ConfigError;
use crate::services::push::ProviderKind;

/// A single field-level validation failure reported by `validator`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationFieldError {
    pub field: String,
    pub message: String,
}

/// Application-wide error type for everything that can reach the HTTP surface.
///
/// Provider failures are not errors here: clients report them as
/// `PushResult::Failed` values. This type covers requests that never reach a
/// provider and faults the push pipeline cannot express as a result.
#[derive(Error, Debug)]
pub enum AppError {
    /// Request shape rejected before any outbound call
    #[error("{message}")]
    Validation { code: &'static str, message: String },

    /// Field constraints declared with `validator` failed
    #[error("Validation failed: {}", format_field_errors(errors))]
    ValidationErrors { errors: Vec<ValidationFieldError> },

    /// Bad request error with descriptive message
    #[error("Bad request: {message}")]
    BadRequest { message: String },

    /// The provider has no usable configuration in this process
    #[error("{provider} service is not configured or unavailable")]
    ServiceUnavailable { provider: ProviderKind },

    /// Configuration error with key information
    #[error("Configuration error: {key}")]
    Configuration {
        key: String,
        #[source]
        source: anyhow::Error,
    },

    /// Internal error for unexpected failures
    #[error("Internal error")]
    Internal {
        #[source]
        source: anyhow::Error,
    },
}

fn format_field_errors(errors: &[ValidationFieldError]) -> String {
    errors
        .iter()
        .map(|e| format!("{}: {}", e.field, e.message))
        .collect::<Vec<_>>()
        .join("; ")
}

impl AppError {
    pub fn validation(code: &'static str, message: impl Into<String>) -> Self {
        AppError::Validation {
            code,
            message: message.into(),
        }
    }

    pub fn configuration(key: impl Into<String>, message: impl Into<String>) -> Self {
        AppError::Configuration {
            key: key.into(),
            source: anyhow::anyhow!(message.into()),
        }
    }
}

impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        AppError::Internal { source: error }
    }
}

impl From<ConfigError> for AppError {
    fn from(error: ConfigError) -> Self {
        let key = match &error {
            ConfigError::ValidationError { field, .. } => field.clone(),
            _ => "configuration".to_string(),
        };
        AppError::Configuration {
            key,
            source: error.into(),
        }
    }
}

impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> Self {
        let mut fields: Vec<ValidationFieldError> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |e| ValidationFieldError {
                    field: field.to_string(),
                    message: e
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("invalid value ({})", e.code)),
                })
            })
            .collect();
        fields.sort_by(|a, b| a.field.cmp(&b.field));

        AppError::ValidationErrors { errors: fields }
    }
}

/// Type alias for Result with AppError to simplify function signatures
pub type AppResult<T> = Result<T, AppError>;
