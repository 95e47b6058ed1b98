//! Health check HTTP server for supervising the watchdog process
//!
//! `/healthz` is a bare liveness probe for systemd/k8s. `/health` also
//! reports the outage flag the watchdog currently holds for its target.

use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;

use crate::error::{Result, WardenError};
use crate::supervisor::OutageState;

/// Health endpoint body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub uptime_seconds: u64,
    pub check_url: String,
    /// The monitored service is in a confirmed outage
    pub service_down: bool,
}

/// Shared state for health server
pub struct HealthState {
    pub started_at: DateTime<Utc>,
    outage: Arc<OutageState>,
    check_url: String,
}

impl HealthState {
    pub fn new(outage: Arc<OutageState>, check_url: impl Into<String>) -> Self {
        Self {
            started_at: Utc::now(),
            outage,
            check_url: check_url.into(),
        }
    }

    pub async fn get_health(&self) -> HealthResponse {
        let now = Utc::now();
        HealthResponse {
            status: "ok".to_string(),
            timestamp: now,
            uptime_seconds: (now - self.started_at).num_seconds().max(0) as u64,
            check_url: self.check_url.clone(),
            service_down: self.outage.is_down().await,
        }
    }
}

/// Health check server
pub struct HealthServer {
    state: Arc<HealthState>,
    addr: SocketAddr,
}

impl HealthServer {
    pub fn new(state: Arc<HealthState>, addr: SocketAddr) -> Self {
        Self { state, addr }
    }

    /// Routes served by the health server
    pub fn router(state: Arc<HealthState>) -> Router {
        Router::new()
            .route("/health", get(health_handler))
            .route("/healthz", get(liveness_handler))
            .with_state(state)
    }

    /// Start the health server
    pub async fn run(&self) -> Result<()> {
        let app = Self::router(Arc::clone(&self.state));

        info!("Starting health server on {}", self.addr);
        let listener = tokio::net::TcpListener::bind(self.addr).await?;
        axum::serve(listener, app)
            .await
            .map_err(|e| WardenError::Internal(format!("Health server error: {}", e)))?;

        Ok(())
    }
}

/// Full health report, always 200 while the process is serving
async fn health_handler(State(state): State<Arc<HealthState>>) -> impl IntoResponse {
    (StatusCode::OK, Json(state.get_health().await))
}

/// Liveness probe - is the process alive?
async fn liveness_handler() -> impl IntoResponse {
    StatusCode::OK
}
