//! Telegram adapter against a fake Bot API server

mod common;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::post,
    Json, Router,
};
use common::{spawn_server, test_config, ADMIN, BOT_TOKEN, VIEWER};
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;
use uptime_warden::adapters::{TelegramClient, UpdatePoller};
use uptime_warden::commands::{help_message, CommandSource};
use uptime_warden::supervisor::Notifier;
use uptime_warden::{BotCommand, WardenError};

#[derive(Default)]
struct FakeBotApi {
    updates: Mutex<VecDeque<Value>>,
    sent: Mutex<Vec<Value>>,
    answered: Mutex<Vec<String>>,
    offsets: Mutex<Vec<i64>>,
}

async fn handle(
    State(api): State<Arc<FakeBotApi>>,
    Path((bot, method)): Path<(String, String)>,
    Json(body): Json<Value>,
) -> impl IntoResponse {
    if bot != format!("bot{BOT_TOKEN}") {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "ok": false, "error_code": 401, "description": "Unauthorized" })),
        );
    }

    let result = match method.as_str() {
        "getMe" => json!({ "id": 42, "is_bot": true, "first_name": "Warden", "username": "warden_bot" }),
        "sendMessage" => {
            api.sent.lock().unwrap().push(body.clone());
            json!({ "message_id": 1, "chat": { "id": body["chat_id"] }, "date": 0 })
        }
        "answerCallbackQuery" => {
            let id = body["callback_query_id"].as_str().unwrap_or_default();
            api.answered.lock().unwrap().push(id.to_string());
            json!(true)
        }
        "getUpdates" => {
            api.offsets
                .lock()
                .unwrap()
                .push(body["offset"].as_i64().unwrap_or_default());
            let batch = api.updates.lock().unwrap().pop_front();
            match batch {
                Some(batch) => batch,
                None => {
                    tokio::time::sleep(Duration::from_millis(50)).await;
                    json!([])
                }
            }
        }
        other => {
            return (
                StatusCode::NOT_FOUND,
                Json(json!({ "ok": false, "description": format!("method {other} not found") })),
            )
        }
    };

    (StatusCode::OK, Json(json!({ "ok": true, "result": result })))
}

async fn fake_api() -> (Arc<FakeBotApi>, String) {
    let api = Arc::new(FakeBotApi::default());
    let app = Router::new()
        .route("/:bot/:method", post(handle))
        .with_state(api.clone());
    let addr = spawn_server(app).await;
    (api, format!("http://{addr}"))
}

#[tokio::test]
async fn test_get_me_authorizes_bot() {
    let (_, url) = fake_api().await;
    let client = TelegramClient::new(&url, BOT_TOKEN).unwrap();

    let me = client.get_me().await.unwrap();
    assert!(me.is_bot);
    assert_eq!(me.username.as_deref(), Some("warden_bot"));
}

/// A rejected token surfaces the API description and never the token
#[tokio::test]
async fn test_get_me_rejects_bad_token() {
    let (_, url) = fake_api().await;
    let client = TelegramClient::new(&url, "999:WRONG").unwrap();

    let err = client.get_me().await.unwrap_err();
    assert!(matches!(err, WardenError::TelegramApi { .. }));
    let msg = err.to_string();
    assert!(msg.contains("Unauthorized"));
    assert!(!msg.contains("WRONG"));
}

#[tokio::test]
async fn test_transport_error_hides_token() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = TelegramClient::new(&format!("http://{addr}"), BOT_TOKEN).unwrap();
    let err = client.get_me().await.unwrap_err();
    assert!(matches!(err, WardenError::Http(_)));
    assert!(!err.to_string().contains("TEST-TOKEN"));
}

#[tokio::test]
async fn test_broadcast_and_keyboard_delivery() {
    let (api, url) = fake_api().await;
    let config = test_config("https://service.example.com/ping", &url);
    let client = Arc::new(TelegramClient::from_config(&config).unwrap());
    let notifier = Notifier::new(client, config.monitor_users.clone());

    assert_eq!(notifier.broadcast("Перевірка").await, 2);
    assert!(notifier.send_to(VIEWER, help_message()).await);

    let sent = api.sent.lock().unwrap().clone();
    assert_eq!(sent.len(), 3);
    assert_eq!(sent[0]["chat_id"], json!(ADMIN));
    assert_eq!(sent[1]["chat_id"], json!(VIEWER));
    assert_eq!(sent[0]["text"], json!("Перевірка"));
    assert!(sent[0].get("reply_markup").is_none());

    let keyboard = &sent[2]["reply_markup"]["inline_keyboard"];
    let payloads: Vec<&str> = keyboard
        .as_array()
        .unwrap()
        .iter()
        .flat_map(|row| row.as_array().unwrap())
        .map(|button| button["callback_data"].as_str().unwrap())
        .collect();
    assert_eq!(payloads, vec!["status", "revive", "mysecretid", "help"]);
}

#[tokio::test]
async fn test_poller_forwards_commands_and_advances_offset() {
    let (api, url) = fake_api().await;
    api.updates.lock().unwrap().push_back(json!([
        {
            "update_id": 500,
            "message": {
                "message_id": 1,
                "from": { "id": VIEWER, "is_bot": false, "first_name": "Viewer" },
                "chat": { "id": VIEWER, "type": "private" },
                "text": "/mysecretid"
            }
        },
        {
            "update_id": 501,
            "message": {
                "message_id": 2,
                "from": { "id": VIEWER, "is_bot": false, "first_name": "Viewer" },
                "chat": { "id": VIEWER, "type": "private" },
                "text": "just chatting"
            }
        },
        {
            "update_id": 502,
            "callback_query": {
                "id": "cb-77",
                "from": { "id": ADMIN, "is_bot": false, "first_name": "Admin" },
                "message": { "message_id": 9, "chat": { "id": ADMIN } },
                "data": "status"
            }
        }
    ]));

    let client = Arc::new(TelegramClient::new(&url, BOT_TOKEN).unwrap());
    let (tx, mut rx) = mpsc::channel(8);
    let poller = tokio::spawn(UpdatePoller::new(client, 1).run(tx));

    let first = rx.recv().await.unwrap();
    assert_eq!(first.sender, VIEWER);
    assert_eq!(first.command, BotCommand::ShowId);
    assert_eq!(first.source, CommandSource::Text);

    let second = rx.recv().await.unwrap();
    assert_eq!(second.sender, ADMIN);
    assert_eq!(second.chat, ADMIN);
    assert_eq!(second.command, BotCommand::Status);
    assert_eq!(second.source, CommandSource::Button);

    // wait for the follow-up poll, then close the channel
    tokio::time::sleep(Duration::from_millis(200)).await;
    drop(rx);

    assert_eq!(api.answered.lock().unwrap().clone(), vec!["cb-77".to_string()]);
    let offsets = api.offsets.lock().unwrap().clone();
    assert_eq!(offsets[0], 0);
    assert!(offsets[1..].iter().all(|offset| *offset == 503));

    poller.abort();
}
