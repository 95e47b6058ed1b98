//! Shared helpers for integration tests

#![allow(dead_code)]

use axum::Router;
use config::FileFormat;
use std::net::SocketAddr;
use uptime_warden::AppConfig;

pub use uptime_warden::supervisor::test_support::{RecordingSink, ScriptedProber};

pub const BOT_TOKEN: &str = "123456:TEST-TOKEN";
pub const ADMIN: i64 = 111;
pub const VIEWER: i64 = 222;

/// Config pointing at local fake servers
pub fn test_config(check_url: &str, api_url: &str) -> AppConfig {
    let doc = serde_json::json!({
        "bot_token": BOT_TOKEN,
        "check_url": check_url,
        "monitor_users": [ADMIN, VIEWER],
        "privileged_users_sublist": [ADMIN],
        "check_interval_seconds": 60,
        "second_check_delay_seconds": 30,
        "script_wait_time_seconds": 60,
        "request_timeout_seconds": 1,
        "script_path": "/opt/warden/revive.sh",
        "telegram": { "api_url": api_url, "poll_timeout_seconds": 1 }
    });
    AppConfig::parse(&doc.to_string(), FileFormat::Json).unwrap()
}

/// Serve `app` on an ephemeral localhost port
pub async fn spawn_server(app: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}
