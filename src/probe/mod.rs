//! Service liveness probing
//!
//! A probe is one bounded-timeout GET against the monitored endpoint. The
//! result is a plain UP/DOWN verdict; retries and debouncing live in the
//! supervisor layer.

mod http;

pub use http::HttpProber;

use async_trait::async_trait;
use std::fmt;

/// Verdict of a single probe
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeStatus {
    Up,
    Down,
}

impl ProbeStatus {
    pub fn is_up(&self) -> bool {
        matches!(self, ProbeStatus::Up)
    }
}

impl fmt::Display for ProbeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProbeStatus::Up => write!(f, "UP"),
            ProbeStatus::Down => write!(f, "DOWN"),
        }
    }
}

/// Outcome of a probe, with an optional diagnostic for logging
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeReport {
    pub status: ProbeStatus,
    pub detail: Option<String>,
}

impl ProbeReport {
    pub fn up() -> Self {
        Self {
            status: ProbeStatus::Up,
            detail: None,
        }
    }

    pub fn down(detail: impl Into<String>) -> Self {
        Self {
            status: ProbeStatus::Down,
            detail: Some(detail.into()),
        }
    }

    pub fn is_up(&self) -> bool {
        self.status.is_up()
    }
}

/// Classify an HTTP status code: 2xx and 3xx are UP, everything else DOWN
pub fn classify_status(code: u16) -> ProbeStatus {
    if (200..400).contains(&code) {
        ProbeStatus::Up
    } else {
        ProbeStatus::Down
    }
}

/// Something that can check whether the monitored service is alive
#[async_trait]
pub trait Prober: Send + Sync {
    async fn probe(&self) -> ProbeReport;
}
