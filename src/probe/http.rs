use async_trait::async_trait;
use reqwest::{redirect, Client};
use std::time::Duration;
use tracing::{debug, warn};

use super::{classify_status, ProbeReport, ProbeStatus, Prober};
use crate::config::AppConfig;
use crate::error::Result;

const MAX_REDIRECTS: usize = 10;

/// HTTP(S) GET prober
///
/// Certificate verification is disabled: the monitored host serves a
/// self-signed certificate. Up to ten redirects are followed and the final
/// status is classified; a longer chain is a DOWN.
#[derive(Clone)]
pub struct HttpProber {
    client: Client,
    url: String,
    timeout: Duration,
}

impl HttpProber {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .danger_accept_invalid_certs(true)
            .redirect(redirect::Policy::limited(MAX_REDIRECTS))
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            url: url.into(),
            timeout,
        })
    }

    pub fn from_config(config: &AppConfig) -> Result<Self> {
        Self::new(config.check_url.clone(), config.request_timeout())
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl Prober for HttpProber {
    async fn probe(&self) -> ProbeReport {
        match self.client.get(&self.url).send().await {
            Ok(resp) => {
                let code = resp.status().as_u16();
                match classify_status(code) {
                    ProbeStatus::Up => {
                        debug!(status = code, "Service check passed");
                        ProbeReport::up()
                    }
                    ProbeStatus::Down => {
                        warn!("Service responded with status code {}", code);
                        ProbeReport::down(format!("HTTP {}", code))
                    }
                }
            }
            Err(e) if e.is_timeout() => {
                warn!("Service check timed out after {:?}", self.timeout);
                ProbeReport::down(format!("timed out after {}s", self.timeout.as_secs()))
            }
            Err(e) => {
                warn!("Error checking service: {}", e);
                ProbeReport::down(e.to_string())
            }
        }
    }
}
