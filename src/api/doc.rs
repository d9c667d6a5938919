use utoipa::OpenApi;

pub const PUSH_TAG: &str = "Push";
pub const HEALTH_TAG: &str = "Health";

#[derive(OpenApi)]
#[openapi(
    info(
        title = "push-gateway",
        description = "Forwards push requests to Telegram and Bark",
    ),
    components(
        schemas(
            crate::api::dto::ErrorResponse,
            crate::services::push::ProviderKind,
            crate::services::push::FailureKind,
        )
    ),
    tags(
        (name = PUSH_TAG, description = "Push delivery endpoints"),
        (name = HEALTH_TAG, description = "Service info and health endpoints"),
    )
)]
pub struct ApiDoc;
