//! End-to-end tests of the HTTP surface against mock providers.

use std::time::Duration;

use axum::http::StatusCode;
use serde_json::json;

use crate::common;
use crate::common::{BOT_TOKEN, DEVICE_KEY, Providers, UNKNOWN_CHAT, UNKNOWN_DEVICE, gateway};

#[tokio::test]
async fn telegram_single_target_returns_message_id() {
    let gw = gateway(Providers::BOTH, 0).await;

    let (status, body) = gw
        .post(
            "/push",
            json!({"type": "chatbot", "message": "hello", "targetId": "123"}),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");
    assert_eq!(body["data"]["messageId"], 42);
    assert_eq!(body["data"]["type"], "telegram");

    let calls = gw.telegram.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].payload["chat_id"], "123");
    assert_eq!(calls[0].payload["text"], "hello");
    assert_eq!(calls[0].payload["parse_mode"], "HTML");
}

#[tokio::test]
async fn telegram_numeric_chat_id_and_options() {
    let gw = gateway(Providers::BOTH, 0).await;

    let (status, _) = gw
        .post(
            "/push",
            json!({
                "type": "telegram",
                "message": "*bold*",
                "chatId": -100123,
                "options": {"parseMode": "MarkdownV2", "disableNotification": true}
            }),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    let calls = gw.telegram.calls();
    assert_eq!(calls[0].target, "-100123");
    assert_eq!(calls[0].payload["parse_mode"], "MarkdownV2");
    assert_eq!(calls[0].payload["disable_notification"], true);
}

#[tokio::test]
async fn telegram_rejection_maps_to_500_with_details() {
    let gw = gateway(Providers::BOTH, 0).await;

    let (status, body) = gw
        .post(
            "/push",
            json!({"type": "telegram", "message": "hello", "chatId": UNKNOWN_CHAT}),
        )
        .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["status"], "error");
    assert_eq!(body["code"], "PUSH_FAILED");
    assert_eq!(body["message"], "Bad Request: chat not found");
    assert_eq!(body["data"]["reason"], "provider");
    assert!(body["details"].as_str().unwrap().contains("chat not found"));
}

#[tokio::test]
async fn bark_provider_error_maps_to_push_failed() {
    let gw = gateway(Providers::BOTH, 0).await;

    let (status, body) = gw
        .post(
            "/push",
            json!({
                "type": "devicepush",
                "title": "T",
                "body": "B",
                "deviceKeys": [UNKNOWN_DEVICE]
            }),
        )
        .await;

    // A device list always answers 200 with per-target results
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "error");
    assert_eq!(body["data"]["results"][0]["error"], "failed to get device token");
}

#[tokio::test]
async fn bark_single_failure_returns_500() {
    let (mut settings, _telegram, bark) = common::settings_with(Providers::BOTH, 0).await;
    settings.providers.bark.device_key = UNKNOWN_DEVICE.to_string();
    let router = push_gateway::api::routes::create_router(push_gateway::AppState::new(&settings));
    let gw = common::Gateway {
        router,
        telegram: Default::default(),
        bark,
    };

    let (status, body) = gw
        .post("/push", json!({"type": "devicepush", "title": "T", "body": "B"}))
        .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["code"], "PUSH_FAILED");
    assert_eq!(body["message"], "failed to get device token");
    assert_eq!(gw.bark.targets(), vec![UNKNOWN_DEVICE.to_string()]);
}

#[tokio::test]
async fn bark_defaults_and_query_options() {
    let gw = gateway(Providers::BOTH, 0).await;

    let (status, body) = gw
        .post(
            "/push",
            json!({
                "type": "bark",
                "body": "Disk almost full",
                "options": {"sound": "alarm", "group": "ops", "level": "timeSensitive", "icon": ""}
            }),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["messageId"], 1700000000);

    let calls = gw.bark.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].target, DEVICE_KEY);
    assert_eq!(calls[0].payload["title"], "Notification");
    assert_eq!(calls[0].payload["body"], "Disk almost full");
    assert_eq!(calls[0].payload["query"]["sound"], "alarm");
    assert_eq!(calls[0].payload["query"]["group"], "ops");
    assert_eq!(calls[0].payload["query"]["level"], "timeSensitive");
    assert!(calls[0].payload["query"].get("icon").is_none());
}

#[tokio::test]
async fn missing_type_is_rejected_without_outbound_call() {
    let gw = gateway(Providers::BOTH, 0).await;

    let (status, body) = gw.post("/push", json!({"message": "hello", "chatId": "1"})).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "error");
    assert_eq!(body["code"], "MISSING_OR_INVALID_TYPE");
    assert!(gw.telegram.calls().is_empty());
}

#[tokio::test]
async fn per_type_required_fields() {
    let gw = gateway(Providers::BOTH, 0).await;

    let cases = [
        (json!({"type": "telegram", "chatId": "1"}), "MISSING_MESSAGE"),
        (json!({"type": "telegram", "message": "hi"}), "MISSING_TARGET"),
        (
            json!({"type": "telegram", "message": "hi", "chatIds": []}),
            "MISSING_TARGET",
        ),
        (json!({"type": "bark", "message": "hi"}), "MISSING_TITLE_OR_BODY"),
        (json!({"type": "email", "message": "hi"}), "MISSING_OR_INVALID_TYPE"),
        (
            json!({"type": "bark", "title": "T", "options": {"url": "not a url"}}),
            "INVALID_OPTION",
        ),
    ];

    for (request, code) in cases {
        let (status, body) = gw.post("/push", request.clone()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "request {}", request);
        assert_eq!(body["code"], code, "request {}", request);
    }

    assert!(gw.telegram.calls().is_empty());
    assert!(gw.bark.calls().is_empty());
}

#[tokio::test]
async fn oversized_message_is_rejected() {
    let gw = gateway(Providers::BOTH, 0).await;

    let (status, body) = gw
        .post(
            "/push",
            json!({"type": "telegram", "message": "x".repeat(5000), "chatId": "1"}),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn type_is_resolved_before_other_checks() {
    let gw = gateway(Providers::BOTH, 0).await;

    let cases = [
        json!({"type": 5, "message": "hi", "chatId": "1"}),
        json!({"type": null, "message": "hi", "chatId": "1"}),
        json!({"message": "x".repeat(5000)}),
    ];

    for request in cases {
        let (status, body) = gw.post("/push", request.clone()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "request {}", request);
        assert_eq!(body["code"], "MISSING_OR_INVALID_TYPE", "request {}", request);
    }

    assert!(gw.telegram.calls().is_empty());
}

#[tokio::test]
async fn bark_ignores_long_message_when_body_is_given() {
    let gw = gateway(Providers::BOTH, 0).await;

    let (status, body) = gw
        .post(
            "/push",
            json!({"type": "bark", "title": "T", "body": "B", "message": "x".repeat(5000)}),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");

    let calls = gw.bark.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].payload["body"], "B");
}

#[tokio::test]
async fn malformed_json_gets_json_error() {
    let gw = gateway(Providers::BOTH, 0).await;
    let request = axum::http::Request::post("/push")
        .header("content-type", "application/json")
        .body(axum::body::Body::from("{\"type\": "))
        .unwrap();

    let response = tower::ServiceExt::oneshot(gw.router.clone(), request)
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unconfigured_provider_returns_503_without_outbound_call() {
    let gw = gateway(
        Providers {
            telegram: true,
            bark: false,
        },
        0,
    )
    .await;

    let (status, body) = gw.get("/push/status").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["bark"]["available"], false);
    assert_eq!(body["data"]["telegram"]["available"], true);

    let (status, body) = gw
        .post("/push", json!({"type": "devicepush", "title": "T", "body": "B"}))
        .await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["code"], "SERVICE_UNAVAILABLE");
    assert!(gw.bark.calls().is_empty());
}

#[tokio::test]
async fn multiple_targets_are_sent_in_order_with_delay() {
    let gw = gateway(Providers::BOTH, 50).await;

    let (status, body) = gw
        .post(
            "/push",
            json!({
                "type": "telegram",
                "message": "fan out",
                "chatIds": ["1", UNKNOWN_CHAT, "3"],
                "chatId": "ignored"
            }),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");
    assert_eq!(body["data"]["summary"], json!({"total": 3, "success": 2, "failure": 1}));

    let results = body["data"]["results"].as_array().unwrap();
    let ids: Vec<&str> = results.iter().map(|r| r["targetId"].as_str().unwrap()).collect();
    assert_eq!(ids, vec!["1", UNKNOWN_CHAT, "3"]);
    assert_eq!(results[0]["messageId"], 42);
    assert_eq!(results[1]["success"], false);
    assert!(results[1].get("messageId").is_none());

    let calls = gw.telegram.calls();
    assert_eq!(
        calls.iter().map(|c| c.target.as_str()).collect::<Vec<_>>(),
        vec!["1", UNKNOWN_CHAT, "3"]
    );
    for pair in calls.windows(2) {
        assert!(pair[1].at.duration_since(pair[0].at) >= Duration::from_millis(45));
    }
}

#[tokio::test]
async fn bark_device_keys_are_sent_in_order_with_delay() {
    let gw = gateway(Providers::BOTH, 50).await;

    let (status, body) = gw
        .post(
            "/push",
            json!({
                "type": "bark",
                "title": "Deploy",
                "body": "done",
                "deviceKeys": ["a", UNKNOWN_DEVICE, "c"]
            }),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");
    assert_eq!(body["data"]["type"], "bark");
    assert_eq!(body["data"]["summary"], json!({"total": 3, "success": 2, "failure": 1}));

    let results = body["data"]["results"].as_array().unwrap();
    let ids: Vec<&str> = results.iter().map(|r| r["targetId"].as_str().unwrap()).collect();
    assert_eq!(ids, vec!["a", UNKNOWN_DEVICE, "c"]);
    assert_eq!(results[0]["success"], true);
    assert_eq!(results[1]["success"], false);
    assert_eq!(results[2]["success"], true);

    // The failing key does not stop the ones after it.
    let calls = gw.bark.calls();
    assert_eq!(
        calls.iter().map(|c| c.target.as_str()).collect::<Vec<_>>(),
        vec!["a", UNKNOWN_DEVICE, "c"]
    );
    for call in &calls {
        assert_eq!(call.payload["title"], "Deploy");
        assert_eq!(call.payload["body"], "done");
    }
    for pair in calls.windows(2) {
        assert!(pair[1].at.duration_since(pair[0].at) >= Duration::from_millis(45));
    }
}

#[tokio::test]
async fn all_targets_failing_reads_error_but_answers_200() {
    let gw = gateway(Providers::BOTH, 0).await;

    let (status, body) = gw
        .post(
            "/push",
            json!({"type": "telegram", "message": "hi", "chatIds": [UNKNOWN_CHAT, UNKNOWN_CHAT]}),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "error");
    assert_eq!(body["data"]["summary"]["failure"], 2);
}

#[tokio::test]
async fn status_never_leaks_secrets() {
    let gw = gateway(Providers::BOTH, 0).await;

    for _ in 0..2 {
        let (status, body) = gw.get("/push/status").await;
        assert_eq!(status, StatusCode::OK);

        let rendered = body.to_string();
        assert!(!rendered.contains(BOT_TOKEN));
        assert!(!rendered.contains(DEVICE_KEY));
        assert_eq!(body["data"]["telegram"]["config"]["botToken"], "***configured");
        assert_eq!(body["data"]["bark"]["config"]["deviceKey"], "***configured");
        assert_eq!(body["data"]["telegram"]["available"], true);
        assert_eq!(body["data"]["bark"]["available"], true);
    }
}

#[tokio::test]
async fn batch_endpoint_reports_each_item() {
    let gw = gateway(
        Providers {
            telegram: true,
            bark: false,
        },
        0,
    )
    .await;

    let (status, body) = gw
        .post(
            "/push/batch",
            json!({"requests": [
                {"type": "telegram", "message": "first", "chatId": "1"},
                {"message": "no type"},
                {"type": "bark", "title": "T"},
                {"type": "telegram", "message": "last", "chatId": "2"}
            ]}),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");
    assert_eq!(body["data"]["summary"], json!({"total": 4, "success": 2, "failure": 2}));

    let results = body["data"]["results"].as_array().unwrap();
    assert_eq!(results.len(), 4);
    assert_eq!(results[0]["success"], true);
    assert_eq!(results[1]["code"], "MISSING_OR_INVALID_TYPE");
    assert_eq!(results[2]["code"], "SERVICE_UNAVAILABLE");
    assert_eq!(results[3]["index"], 3);
    assert_eq!(gw.telegram.targets(), vec!["1".to_string(), "2".to_string()]);
}

#[tokio::test]
async fn batch_size_is_bounded() {
    let gw = gateway(Providers::BOTH, 0).await;
    let item = json!({"type": "telegram", "message": "hi", "chatId": "1"});

    for requests in [Vec::new(), vec![item; 51]] {
        let (status, body) = gw.post("/push/batch", json!({"requests": requests})).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "VALIDATION_ERROR");
    }

    assert!(gw.telegram.calls().is_empty());
}

#[tokio::test]
async fn batch_items_with_non_string_type_are_reported() {
    let gw = gateway(Providers::BOTH, 0).await;

    let (status, body) = gw
        .post(
            "/push/batch",
            json!({"requests": [
                {"type": 5, "message": "hi", "chatId": "1"},
                {"type": "telegram", "message": "x".repeat(5000), "chatId": "1"},
                {"type": "telegram", "message": "ok", "chatId": "2"}
            ]}),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    let results = body["data"]["results"].as_array().unwrap();
    assert_eq!(results[0]["code"], "MISSING_OR_INVALID_TYPE");
    assert!(results[0].get("type").is_none());
    assert_eq!(results[1]["code"], "VALIDATION_ERROR");
    assert_eq!(results[1]["type"], "telegram");
    assert_eq!(results[2]["success"], true);
    assert_eq!(gw.telegram.targets(), vec!["2".to_string()]);
}

#[tokio::test]
async fn info_and_health_endpoints() {
    let gw = gateway(Providers::BOTH, 0).await;

    let (status, body) = gw.get("/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], "push-gateway");
    assert!(
        body["data"]["endpoints"]
            .as_array()
            .unwrap()
            .contains(&json!("POST /push"))
    );

    let (status, body) = gw.get("/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");
    assert!(body["data"]["timestamp"].is_string());
}
