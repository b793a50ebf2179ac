//! Liveness endpoint for uptime monitors and the keep-alive pinger.

use axum::{extract::State, http::StatusCode, Json};
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::app::AppState;

pub const HEALTHY: &str = "healthy";

/// Body of `GET /health`, computed fresh on every request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthSnapshot {
    pub status: String,
    /// Logged-in bot tag, or "not ready" before login.
    pub bot: String,
    /// Seconds since startup.
    pub uptime: f64,
    /// RFC 3339 UTC with millisecond precision.
    pub timestamp: String,
}

/// GET /health: liveness probe. Public, unauthenticated.
pub async fn health_handler(State(state): State<Arc<AppState>>) -> Json<HealthSnapshot> {
    Json(HealthSnapshot {
        status: HEALTHY.to_string(),
        bot: state.login.display().to_string(),
        uptime: state.started_at.elapsed().as_secs_f64(),
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
    })
}

/// Every other path.
pub async fn not_found() -> (StatusCode, &'static str) {
    (StatusCode::NOT_FOUND, "Not Found")
}
