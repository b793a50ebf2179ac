//! Login state shared between the Discord adapter and the liveness endpoint.

use std::sync::OnceLock;

/// Placeholder reported before the gateway `ready` event arrives.
pub const NOT_READY: &str = "not ready";

/// Set-once slot holding the logged-in bot tag (e.g. `tenshi#1234`).
///
/// Written by the adapter on the first `ready` event; reconnects log in as the
/// same account, so later writes are ignored.
#[derive(Debug, Default)]
pub struct LoginState {
    tag: OnceLock<String>,
}

impl LoginState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the bot identity. Returns `false` if it was already set.
    pub fn mark_ready(&self, tag: impl Into<String>) -> bool {
        self.tag.set(tag.into()).is_ok()
    }

    pub fn tag(&self) -> Option<&str> {
        self.tag.get().map(String::as_str)
    }

    pub fn is_ready(&self) -> bool {
        self.tag.get().is_some()
    }

    /// The tag, or [`NOT_READY`] before login.
    pub fn display(&self) -> &str {
        self.tag().unwrap_or(NOT_READY)
    }
}
