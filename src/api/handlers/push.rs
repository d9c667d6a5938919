//! Push request handlers.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::api::doc::PUSH_TAG;
use crate::api::dto::{
    ApiResponse, BatchData, BatchItemResult, BatchPushData, BatchPushRequest, BatchSummary,
    DeliveredData, ErrorResponse, FailedData, PushRequest, ResponseStatus, codes,
};
use crate::api::middleware::error_to_code;
use crate::error::AppResult;
use crate::services::push::provider::preview;
use crate::services::push::{
    ChatTargets, DispatchOutcome, ProviderKind, PushParams, PushResult, PushStatus,
};
use crate::state::AppState;
use crate::utils::validate::ValidatedJson;

/// Creates push routes.
pub fn push_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(send_push))
        .routes(routes!(batch_push))
        .routes(routes!(push_status))
}

fn log_request(params: &PushParams) {
    match params {
        PushParams::Telegram { message, targets, .. } => {
            let targets = match targets {
                ChatTargets::Single(_) => 1,
                ChatTargets::Multiple(ids) => ids.len(),
            };
            tracing::info!(
                provider = "telegram",
                message = %preview(message, 50),
                targets,
                "Push request received"
            );
        }
        PushParams::Bark { title, device_keys, .. } => {
            tracing::info!(
                provider = "bark",
                title = %preview(title, 30),
                targets = device_keys.as_ref().map_or(1, Vec::len),
                "Push request received"
            );
        }
    }
}

/// Renders a dispatch outcome with the status the API promises.
fn outcome_response(kind: ProviderKind, outcome: DispatchOutcome) -> Response {
    match outcome {
        DispatchOutcome::Single(PushResult::Delivered { message_id }) => (
            StatusCode::OK,
            Json(ApiResponse::success(
                format!("{} push sent", kind),
                DeliveredData { kind, message_id },
            )),
        )
            .into_response(),
        DispatchOutcome::Single(PushResult::Failed(failure)) => {
            let mut response = ApiResponse::failure(
                failure.code.unwrap_or(codes::PUSH_FAILED),
                failure.error,
                FailedData {
                    kind,
                    reason: failure.kind,
                },
            );
            if let Some(details) = failure.details {
                response = response.with_details(serde_json::Value::String(details));
            }
            (StatusCode::INTERNAL_SERVER_ERROR, Json(response)).into_response()
        }
        DispatchOutcome::Batch(results) => {
            let summary = BatchSummary::from_entries(&results);
            let status = if summary.success > 0 {
                ResponseStatus::Success
            } else {
                ResponseStatus::Error
            };
            let message = format!(
                "{} push finished: {}/{} succeeded",
                kind, summary.success, summary.total
            );
            (
                StatusCode::OK,
                Json(
                    ApiResponse::success(message, BatchData { kind, results, summary })
                        .with_status(status),
                ),
            )
                .into_response()
        }
    }
}

/// POST /push - Send a push through one provider
///
/// A list of targets (`chatIds`, `deviceKeys`) is sent one target at a time
/// and always answers 200 with per-target results.
#[utoipa::path(
    post,
    path = "/push",
    tag = PUSH_TAG,
    request_body = PushRequest,
    responses(
        (status = 200, description = "Push sent, or batch finished", body = ApiResponse<DeliveredData>),
        (status = 400, description = "Missing or invalid fields", body = ErrorResponse),
        (status = 500, description = "Provider rejected or could not be reached", body = ApiResponse<FailedData>),
        (status = 503, description = "Provider not configured", body = ErrorResponse)
    )
)]
async fn send_push(
    State(state): State<AppState>,
    payload: Result<Json<PushRequest>, JsonRejection>,
) -> AppResult<Response> {
    let Json(request) = payload?;
    let params = request.into_params()?;
    let kind = params.kind();
    log_request(&params);

    let outcome = state.services.push.dispatch(params).await?;
    Ok(outcome_response(kind, outcome))
}

fn item_result(
    index: usize,
    kind: ProviderKind,
    outcome: AppResult<DispatchOutcome>,
) -> BatchItemResult {
    match outcome {
        Ok(outcome) => {
            let (success, code, message) = match &outcome {
                DispatchOutcome::Single(PushResult::Delivered { .. }) => {
                    (true, None, format!("{} push sent", kind))
                }
                DispatchOutcome::Single(PushResult::Failed(failure)) => (
                    false,
                    Some(failure.code.unwrap_or(codes::PUSH_FAILED).to_string()),
                    failure.error.clone(),
                ),
                DispatchOutcome::Batch(results) => {
                    let summary = BatchSummary::from_entries(results);
                    (
                        summary.success > 0,
                        (summary.success == 0).then(|| codes::PUSH_FAILED.to_string()),
                        format!("{}/{} succeeded", summary.success, summary.total),
                    )
                }
            };
            let result = match outcome {
                DispatchOutcome::Single(result) => serde_json::to_value(result),
                DispatchOutcome::Batch(results) => serde_json::to_value(results),
            }
            .ok();

            BatchItemResult {
                index,
                kind: Some(kind),
                success,
                code,
                message,
                result,
            }
        }
        Err(e) => BatchItemResult {
            index,
            kind: Some(kind),
            success: false,
            code: Some(error_to_code(&e).to_string()),
            message: e.to_string(),
            result: None,
        },
    }
}

/// POST /push/batch - Send several pushes in order
///
/// Each request is validated on its own; invalid items are reported with
/// their validation code and do not stop the others.
#[utoipa::path(
    post,
    path = "/push/batch",
    tag = PUSH_TAG,
    request_body = BatchPushRequest,
    responses(
        (status = 200, description = "Batch finished", body = ApiResponse<BatchPushData>),
        (status = 400, description = "Malformed batch", body = ErrorResponse)
    )
)]
async fn batch_push(
    State(state): State<AppState>,
    ValidatedJson(batch): ValidatedJson<BatchPushRequest>,
) -> AppResult<Json<ApiResponse<BatchPushData>>> {
    let total = batch.requests.len();
    let mut results: Vec<Option<BatchItemResult>> = (0..total).map(|_| None).collect();
    let mut accepted = Vec::new();
    let mut positions = Vec::new();

    for (index, request) in batch.requests.into_iter().enumerate() {
        let kind = request.provider_kind();
        match request.into_params() {
            Ok(params) => {
                log_request(&params);
                positions.push(index);
                accepted.push(params);
            }
            Err(e) => {
                results[index] = Some(BatchItemResult {
                    index,
                    kind,
                    success: false,
                    code: Some(error_to_code(&e).to_string()),
                    message: e.to_string(),
                    result: None,
                });
            }
        }
    }

    let outcomes = state.services.push.dispatch_all(accepted).await;
    for (index, (kind, outcome)) in positions.into_iter().zip(outcomes) {
        results[index] = Some(item_result(index, kind, outcome));
    }

    let results: Vec<BatchItemResult> = results.into_iter().flatten().collect();
    let success = results.iter().filter(|r| r.success).count();
    let summary = BatchSummary {
        total,
        success,
        failure: total - success,
    };
    let status = if success > 0 {
        ResponseStatus::Success
    } else {
        ResponseStatus::Error
    };

    Ok(Json(
        ApiResponse::success(
            format!("Batch finished: {}/{} succeeded", success, total),
            BatchPushData { results, summary },
        )
        .with_status(status),
    ))
}

/// GET /push/status - Provider availability and redacted configuration
#[utoipa::path(
    get,
    path = "/push/status",
    tag = PUSH_TAG,
    responses(
        (status = 200, description = "Provider status", body = ApiResponse<PushStatus>)
    )
)]
async fn push_status(State(state): State<AppState>) -> Json<ApiResponse<PushStatus>> {
    Json(ApiResponse::success(
        "Push service status",
        state.services.push.status(),
    ))
}
