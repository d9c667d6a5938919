//! In-process stand-ins for the Telegram Bot API and a Bark server.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Instant;

use axum::body::{Body, to_bytes};
use axum::extract::{Path, Query, State};
use axum::http::{Request, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{Value, json};
use tower::ServiceExt;

use push_gateway::AppState;
use push_gateway::api::routes::create_router;
use push_gateway::config::Settings;

pub const BOT_TOKEN: &str = "123456:TEST-TOKEN-abcdef";
pub const DEVICE_KEY: &str = "default-device";

/// Chat id the mock Telegram rejects
pub const UNKNOWN_CHAT: &str = "404";
/// Device key the mock Bark rejects
pub const UNKNOWN_DEVICE: &str = "unknown-device";

/// One outbound call seen by a mock provider.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub target: String,
    pub payload: Value,
    pub at: Instant,
}

#[derive(Clone, Default)]
pub struct Recorder(Arc<Mutex<Vec<Recorded>>>);

impl Recorder {
    fn push(&self, target: impl Into<String>, payload: Value) {
        self.0.lock().unwrap().push(Recorded {
            target: target.into(),
            payload,
            at: Instant::now(),
        });
    }

    pub fn calls(&self) -> Vec<Recorded> {
        self.0.lock().unwrap().clone()
    }

    pub fn targets(&self) -> Vec<String> {
        self.calls().into_iter().map(|c| c.target).collect()
    }
}

async fn spawn(router: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    addr
}

async fn telegram_send(
    State(recorder): State<Recorder>,
    Path(bot): Path<String>,
    Json(payload): Json<Value>,
) -> impl IntoResponse {
    if bot != format!("bot{}", BOT_TOKEN) {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"ok": false, "error_code": 401, "description": "Unauthorized"})),
        );
    }

    let chat_id = match &payload["chat_id"] {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    recorder.push(chat_id.clone(), payload);

    if chat_id == UNKNOWN_CHAT {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "ok": false,
                "error_code": 400,
                "description": "Bad Request: chat not found"
            })),
        );
    }

    (
        StatusCode::OK,
        Json(json!({"ok": true, "result": {"message_id": 42, "chat": {"id": chat_id}}})),
    )
}

async fn telegram_get_me(Path(bot): Path<String>) -> impl IntoResponse {
    if bot != format!("bot{}", BOT_TOKEN) {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"ok": false, "error_code": 401, "description": "Unauthorized"})),
        );
    }
    (
        StatusCode::OK,
        Json(json!({"ok": true, "result": {"id": 123456, "is_bot": true, "username": "test_bot"}})),
    )
}

/// Starts a mock Telegram Bot API and returns its base URL.
pub async fn mock_telegram(recorder: Recorder) -> String {
    let router = Router::new()
        .route("/{bot}/sendMessage", post(telegram_send))
        .route("/{bot}/getMe", get(telegram_get_me))
        .with_state(recorder);
    format!("http://{}", spawn(router).await)
}

async fn bark_push(
    State(recorder): State<Recorder>,
    Path((key, title, body)): Path<(String, String, String)>,
    Query(query): Query<HashMap<String, String>>,
) -> impl IntoResponse {
    recorder.push(
        key.clone(),
        json!({"title": title, "body": body, "query": query}),
    );

    if key == UNKNOWN_DEVICE {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"code": 400, "message": "failed to get device token", "timestamp": 1700000000})),
        );
    }

    (
        StatusCode::OK,
        Json(json!({"code": 200, "message": "success", "timestamp": 1700000000})),
    )
}

/// Starts a mock Bark server and returns its URL.
pub async fn mock_bark(recorder: Recorder) -> String {
    let router = Router::new()
        .route("/{key}/{title}/{body}", get(bark_push))
        .with_state(recorder);
    format!("http://{}", spawn(router).await)
}

/// Test fixture: the gateway router plus the mocks behind it.
pub struct Gateway {
    pub router: Router,
    pub telegram: Recorder,
    pub bark: Recorder,
}

#[derive(Clone, Copy)]
pub struct Providers {
    pub telegram: bool,
    pub bark: bool,
}

impl Providers {
    pub const BOTH: Providers = Providers {
        telegram: true,
        bark: true,
    };
}

/// Settings wired to running mocks; disabled providers get no credentials.
pub async fn settings_with(
    providers: Providers,
    batch_delay_ms: u64,
) -> (Settings, Recorder, Recorder) {
    let telegram = Recorder::default();
    let bark = Recorder::default();

    let mut settings = Settings::default();
    settings.push.batch_delay_ms = batch_delay_ms;
    settings.providers.telegram.api_base = mock_telegram(telegram.clone()).await;
    settings.providers.bark.server_url = mock_bark(bark.clone()).await;

    if providers.telegram {
        settings.providers.telegram.bot_token = BOT_TOKEN.to_string();
    }
    if providers.bark {
        settings.providers.bark.device_key = DEVICE_KEY.to_string();
    }

    (settings, telegram, bark)
}

pub async fn gateway(providers: Providers, batch_delay_ms: u64) -> Gateway {
    let (settings, telegram, bark) = settings_with(providers, batch_delay_ms).await;
    Gateway {
        router: create_router(AppState::new(&settings)),
        telegram,
        bark,
    }
}

impl Gateway {
    pub async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        let request = Request::post(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send(request).await
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.send(Request::get(uri).body(Body::empty()).unwrap()).await
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }
}
