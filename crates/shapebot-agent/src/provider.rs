use async_trait::async_trait;
use serde::Serialize;

use shapebot_core::CallerIdentity;

/// Reply used whenever the backend fails in a way the user cannot fix, or
/// answers without any text.
pub const FALLBACK_REPLY: &str =
    "Sorry, I encountered an error while processing your message. Please try again.";
pub const UNAUTHORIZED_REPLY: &str =
    "Authentication error. Please check the API key configuration.";
pub const RATE_LIMITED_REPLY: &str = "Rate limit exceeded. Please try again later.";

/// A single message in the request conversation.
#[derive(Debug, Clone, Serialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
}

/// A hosted conversational backend that owns persona, memory and commands.
///
/// One call is one user turn; conversation state lives on the remote side,
/// keyed by the caller identity.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Backend name for logging.
    fn name(&self) -> &str;

    /// Send `content` as the only message of a turn and return the reply text.
    async fn send(&self, caller: &CallerIdentity, content: &str) -> Result<String, BackendError>;
}

#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("rate limited, retry after {retry_after_ms}ms")]
    RateLimited { retry_after_ms: u64 },

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Parse error: {0}")]
    Parse(String),
}

impl BackendError {
    /// Fixed text shown to the end user in place of this error.
    pub fn user_message(&self) -> &'static str {
        match self {
            BackendError::Unauthorized(_) => UNAUTHORIZED_REPLY,
            BackendError::RateLimited { .. } => RATE_LIMITED_REPLY,
            BackendError::Http(_) | BackendError::Api { .. } | BackendError::Parse(_) => {
                FALLBACK_REPLY
            }
        }
    }
}
