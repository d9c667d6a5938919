//! Service info and liveness handlers.

use axum::{Json, extract::State};
use jiff::Timestamp;
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::api::doc::HEALTH_TAG;
use crate::api::dto::{ApiResponse, HealthData, ServiceInfo};
use crate::state::AppState;

/// Endpoints listed by `GET /`.
const PUSH_ENDPOINTS: &[&str] = &["POST /push", "POST /push/batch", "GET /push/status"];

pub fn basic_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(root))
        .routes(routes!(health))
}

/// GET / - Service name, version and endpoints
#[utoipa::path(
    get,
    path = "/",
    tag = HEALTH_TAG,
    responses(
        (status = 200, description = "Service information", body = ApiResponse<ServiceInfo>)
    )
)]
async fn root(State(state): State<AppState>) -> Json<ApiResponse<ServiceInfo>> {
    Json(ApiResponse::success(
        "Push gateway is running",
        ServiceInfo {
            name: state.application.name.clone(),
            version: state.application.version.clone(),
            description: "HTTP gateway forwarding pushes to Telegram and Bark".to_string(),
            endpoints: PUSH_ENDPOINTS.iter().map(|e| e.to_string()).collect(),
        },
    ))
}

/// GET /health - Liveness probe
#[utoipa::path(
    get,
    path = "/health",
    tag = HEALTH_TAG,
    responses(
        (status = 200, description = "Service is alive", body = ApiResponse<HealthData>)
    )
)]
async fn health() -> Json<ApiResponse<HealthData>> {
    Json(ApiResponse::success(
        "OK",
        HealthData {
            timestamp: Timestamp::now().to_string(),
        },
    ))
}
