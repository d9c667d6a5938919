//! Service info and health DTOs.

use serde::Serialize;
use utoipa::ToSchema;

/// Static description of the running service
#[derive(Debug, Serialize, ToSchema)]
pub struct ServiceInfo {
    #[schema(example = "push-gateway")]
    pub name: String,
    #[schema(example = "0.1.0")]
    pub version: String,
    pub description: String,
    /// Endpoints accepting push traffic
    pub endpoints: Vec<String>,
}

/// Liveness payload
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthData {
    /// Time of the check (RFC 3339)
    #[schema(value_type = String, format = DateTime, example = "2024-01-01T12:00:00Z")]
    pub timestamp: String,
}
