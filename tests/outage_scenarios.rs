//! End-to-end outage debouncing scenarios

mod common;

use axum::{extract::State, http::StatusCode, routing::get, Router};
use common::{spawn_server, test_config, RecordingSink, ScriptedProber, ADMIN, VIEWER};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use uptime_warden::messages;
use uptime_warden::probe::ProbeStatus::{Down, Up};
use uptime_warden::runtime::Components;
use uptime_warden::supervisor::TickOutcome;

const API_URL: &str = "http://127.0.0.1:9";

/// Ticks DOWN,DOWN,DOWN,DOWN,UP,DOWN,DOWN (each DOWN tick is two failed
/// probes) announce exactly two outages.
#[tokio::test(start_paused = true)]
async fn test_edge_triggered_alerting_over_two_outages() {
    let config = test_config("https://service.example.com/ping", API_URL);
    let sink = Arc::new(RecordingSink::default());
    let prober = Arc::new(ScriptedProber::with_fallback(
        &[
            Down, Down, Down, Down, Down, Down, Down, Down, Up, Down, Down, Down, Down,
        ],
        Up,
    ));
    let components = Components::with_prober(&config, sink.clone(), prober.clone());

    let mut outcomes = Vec::new();
    for _ in 0..7 {
        outcomes.push(components.debouncer.tick().await);
    }

    assert_eq!(
        outcomes,
        vec![
            TickOutcome::ConfirmedDown { alerted: true },
            TickOutcome::ConfirmedDown { alerted: false },
            TickOutcome::ConfirmedDown { alerted: false },
            TickOutcome::ConfirmedDown { alerted: false },
            TickOutcome::Healthy,
            TickOutcome::ConfirmedDown { alerted: true },
            TickOutcome::ConfirmedDown { alerted: false },
        ]
    );
    // one broadcast per outage, delivered to both recipients
    assert_eq!(sink.count_text(messages::OUTAGE_ALERT), 4);
    assert_eq!(sink.chats(), vec![ADMIN, VIEWER, ADMIN, VIEWER]);
    assert_eq!(prober.calls(), 13);
}

/// A failure that clears on the second probe is never announced
#[tokio::test(start_paused = true)]
async fn test_transient_failure_is_silent() {
    let config = test_config("https://service.example.com/ping", API_URL);
    let sink = Arc::new(RecordingSink::default());
    let prober = Arc::new(ScriptedProber::new(&[Down, Up]));
    let components = Components::with_prober(&config, sink.clone(), prober);

    assert_eq!(components.debouncer.tick().await, TickOutcome::Transient);
    assert!(sink.texts().is_empty());
    assert!(!components.state.is_down().await);
}

/// The scheduler waits one full interval before the first probe, and the
/// second probe follows the first after the configured delay.
#[tokio::test(start_paused = true)]
async fn test_scheduler_timing() {
    let config = test_config("https://service.example.com/ping", API_URL);
    let sink = Arc::new(RecordingSink::default());
    let prober = Arc::new(ScriptedProber::with_fallback(&[], Down));
    let components = Components::with_prober(&config, sink.clone(), prober.clone());

    tokio::spawn(components.debouncer.clone().run(config.check_interval()));

    tokio::time::sleep(Duration::from_secs(59)).await;
    assert_eq!(prober.calls(), 0);

    tokio::time::sleep(Duration::from_secs(2)).await;
    assert_eq!(prober.calls(), 1);
    assert!(sink.texts().is_empty());

    tokio::time::sleep(Duration::from_secs(30)).await;
    assert_eq!(prober.calls(), 2);
    assert_eq!(sink.count_text(messages::OUTAGE_ALERT), 2);
    assert!(components.state.is_down().await);

    // next tick at t=120s confirms again without a second alert
    tokio::time::sleep(Duration::from_secs(60)).await;
    assert_eq!(prober.calls(), 4);
    assert_eq!(sink.count_text(messages::OUTAGE_ALERT), 2);
}

/// Real HTTP target answering 503, 503 | 503, 503 | 200
#[tokio::test]
async fn test_http_outage_then_silent_recovery() {
    let responses = Arc::new(Mutex::new(VecDeque::from(vec![
        StatusCode::SERVICE_UNAVAILABLE,
        StatusCode::SERVICE_UNAVAILABLE,
        StatusCode::SERVICE_UNAVAILABLE,
        StatusCode::SERVICE_UNAVAILABLE,
        StatusCode::OK,
    ])));
    let app = Router::new()
        .route(
            "/ping",
            get(
                |State(responses): State<Arc<Mutex<VecDeque<StatusCode>>>>| async move {
                    responses
                        .lock()
                        .unwrap()
                        .pop_front()
                        .unwrap_or(StatusCode::OK)
                },
            ),
        )
        .with_state(responses);
    let addr = spawn_server(app).await;

    let mut config = test_config(&format!("http://{addr}/ping"), API_URL);
    config.second_check_delay_seconds = 0;
    let sink = Arc::new(RecordingSink::default());
    let components = uptime_warden::runtime::Components::build(&config, sink.clone()).unwrap();

    assert_eq!(
        components.debouncer.tick().await,
        TickOutcome::ConfirmedDown { alerted: true }
    );
    assert!(components.state.is_down().await);

    assert_eq!(
        components.debouncer.tick().await,
        TickOutcome::ConfirmedDown { alerted: false }
    );

    assert_eq!(components.debouncer.tick().await, TickOutcome::Healthy);
    assert!(!components.state.is_down().await);

    // scheduled recovery is silent; only the single alert went out
    assert_eq!(sink.texts(), vec![messages::OUTAGE_ALERT.to_string(); 2]);
}
