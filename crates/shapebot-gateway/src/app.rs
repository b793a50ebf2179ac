use axum::{routing::get, Router};
use std::sync::Arc;
use std::time::Instant;

use shapebot_agent::pipeline::{CommandRouter, RelayContext};
use shapebot_agent::ChatBackend;
use shapebot_core::{BotConfig, LoginState};

/// Central shared state, passed as Arc<AppState> to the Discord adapter and
/// to all Axum handlers.
pub struct AppState {
    pub config: BotConfig,
    pub started_at: Instant,
    pub login: LoginState,
    pub router: CommandRouter,
    pub backend: Box<dyn ChatBackend>,
}

impl AppState {
    pub fn new(config: BotConfig, backend: Box<dyn ChatBackend>) -> Self {
        Self {
            router: CommandRouter::from_config(&config.discord),
            config,
            started_at: Instant::now(),
            login: LoginState::new(),
            backend,
        }
    }
}

impl RelayContext for AppState {
    fn backend(&self) -> &dyn ChatBackend {
        self.backend.as_ref()
    }

    fn router(&self) -> &CommandRouter {
        &self.router
    }

    fn login(&self) -> &LoginState {
        &self.login
    }

    fn shape_name(&self) -> &str {
        &self.config.shapes.shape_username
    }
}

/// Assemble the liveness router.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(crate::http::health::health_handler))
        .fallback(crate::http::health::not_found)
        .with_state(state)
        .layer(tower_http::trace::TraceLayer::new_for_http())
}
