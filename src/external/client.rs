use std::sync::LazyLock;
use std::time::Duration;

use reqwest::{RequestBuilder, StatusCode};
use serde_json::Value;
use thiserror::Error;

/// User-Agent sent on every outbound provider call
pub const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Global HTTP client shared by every provider client.
///
/// Connections are pooled per host. The 30s client timeout is only a ceiling:
/// provider calls set their own per-request timeout.
pub static HTTP_CLIENT: LazyLock<reqwest::Client> = LazyLock::new(|| {
    reqwest::Client::builder()
        // Timeouts
        .timeout(Duration::from_secs(30))
        .connect_timeout(Duration::from_secs(10))
        // Connection pooling
        .pool_max_idle_per_host(10)
        .pool_idle_timeout(Duration::from_secs(90))
        // HTTP/2 settings
        .http2_adaptive_window(true)
        .http2_keep_alive_interval(Duration::from_secs(10))
        .http2_keep_alive_timeout(Duration::from_secs(20))
        // Enable compression (gzip, deflate, brotli, zstd)
        .gzip(true)
        .deflate(true)
        .brotli(true)
        .zstd(true)
        .user_agent(USER_AGENT)
        .build()
        .expect("Failed to build HTTP client")
});

/// Classified failure of an outbound HTTP call.
///
/// Messages never include the request URL, which may embed a bot token.
#[derive(Debug, Error)]
pub enum ExternalError {
    #[error("request timed out")]
    Timeout,

    #[error("connection failed: {0}")]
    Connection(String),

    /// Non-success status with a body that is not JSON
    #[error("HTTP {status}")]
    Status { status: StatusCode, body: String },

    #[error("invalid response body: {0}")]
    Decode(String),

    #[error("request failed: {0}")]
    Request(String),
}

impl From<reqwest::Error> for ExternalError {
    fn from(error: reqwest::Error) -> Self {
        let error = error.without_url();
        if error.is_timeout() {
            ExternalError::Timeout
        } else if error.is_connect() {
            ExternalError::Connection(error.to_string())
        } else if error.is_decode() || error.is_body() {
            ExternalError::Decode(error.to_string())
        } else {
            ExternalError::Request(error.to_string())
        }
    }
}

/// Sends the request and parses the reply body as JSON.
///
/// Error statuses with a JSON body are returned as `Ok` so callers can read
/// provider-specific error fields. Only a non-JSON body on an error status
/// becomes `ExternalError::Status`.
pub async fn fetch_json(request: RequestBuilder) -> Result<(StatusCode, Value), ExternalError> {
    let response = request.send().await?;
    let status = response.status();
    let text = response.text().await?;

    match serde_json::from_str::<Value>(&text) {
        Ok(body) => Ok((status, body)),
        Err(_) if !status.is_success() => Err(ExternalError::Status { status, body: text }),
        Err(e) => Err(ExternalError::Decode(e.to_string())),
    }
}
