//! Self-ping loop that keeps free-tier hosts from idling the process out.

use std::time::Duration;

use tokio::sync::watch;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use shapebot_core::config::KeepAliveConfig;

use crate::http::health::HealthSnapshot;

#[derive(Debug, thiserror::Error)]
pub enum PingError {
    #[error("request timed out after {ms}ms")]
    Timeout { ms: u64 },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Outcome of one successful round trip. `health` is `None` when the body
/// was not a health snapshot.
#[derive(Debug)]
pub struct PingReport {
    pub status: u16,
    pub health: Option<HealthSnapshot>,
}

impl PingReport {
    /// Only a 200 counts as alive; redirects and error pages do not.
    pub fn is_ok(&self) -> bool {
        self.status == 200
    }
}

pub struct KeepAlive {
    client: reqwest::Client,
    url: String,
    interval: Duration,
    timeout: Duration,
    ping_on_start: bool,
}

impl KeepAlive {
    /// `base_url` is the service root; `/health` is appended.
    pub fn new(base_url: &str, interval: Duration, timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: format!("{}/health", base_url.trim_end_matches('/')),
            interval,
            timeout,
            ping_on_start: false,
        }
    }

    /// `None` when no public URL is configured.
    pub fn from_config(config: &KeepAliveConfig) -> Option<Self> {
        let base = config.public_url.as_deref().map(str::trim)?;
        if base.is_empty() {
            return None;
        }
        Some(Self::new(
            base,
            Duration::from_secs(config.interval_secs),
            Duration::from_secs(config.timeout_secs),
        ))
    }

    /// Fire the first ping immediately instead of one interval after start.
    pub fn ping_on_start(mut self, yes: bool) -> Self {
        self.ping_on_start = yes;
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub async fn ping_once(&self) -> Result<PingReport, PingError> {
        let resp = self
            .client
            .get(&self.url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = resp.status().as_u16();
        let body = resp.bytes().await.map_err(|e| self.classify(e))?;
        let health = serde_json::from_slice::<HealthSnapshot>(&body).ok();
        Ok(PingReport { status, health })
    }

    fn classify(&self, e: reqwest::Error) -> PingError {
        if e.is_timeout() {
            PingError::Timeout {
                ms: self.timeout.as_millis() as u64,
            }
        } else {
            PingError::Http(e)
        }
    }

    /// Ping and log the outcome. Failures never stop the loop.
    pub async fn tick(&self) {
        match self.ping_once().await {
            Ok(report) if !report.is_ok() => warn!(
                url = %self.url,
                status = report.status,
                "keep-alive ping got non-200 response"
            ),
            Ok(PingReport {
                status,
                health: Some(h),
            }) => info!(
                status,
                bot = %h.bot,
                uptime_secs = h.uptime as u64,
                "keep-alive ping ok"
            ),
            Ok(PingReport { status, health: None }) => {
                info!(status, "keep-alive ping answered without health body")
            }
            Err(e) => warn!(url = %self.url, error = %e, "keep-alive ping failed"),
        }
    }

    /// Ping on a fixed interval until `shutdown` flips to true or its sender
    /// is dropped.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        info!(
            url = %self.url,
            interval_secs = self.interval.as_secs(),
            "keep-alive started"
        );

        let start = if self.ping_on_start {
            Instant::now()
        } else {
            Instant::now() + self.interval
        };
        let mut ticker = interval_at(start, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => self.tick().await,
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        debug!("keep-alive stopping");
                        break;
                    }
                }
            }
        }
    }
}
