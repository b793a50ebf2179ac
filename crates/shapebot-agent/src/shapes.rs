use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, warn};

use shapebot_core::config::{ShapesConfig, DEFAULT_SHAPES_BASE_URL};
use shapebot_core::CallerIdentity;

use crate::provider::{BackendError, ChatBackend, Message, FALLBACK_REPLY};

/// Header carrying the caller's user identity.
pub const USER_ID_HEADER: &str = "X-User-Id";
/// Header carrying the conversation scope identity.
pub const CHANNEL_ID_HEADER: &str = "X-Channel-Id";

/// Client for the Shapes.inc OpenAI-compatible chat-completion API.
pub struct ShapesClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl ShapesClient {
    pub fn new(api_key: String, base_url: Option<String>, model: String) -> Self {
        let base_url = base_url.unwrap_or_else(|| DEFAULT_SHAPES_BASE_URL.to_string());
        Self {
            client: reqwest::Client::new(),
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            model,
        }
    }

    pub fn from_config(config: &ShapesConfig) -> Self {
        Self::new(
            config.api_key.clone(),
            Some(config.base_url.clone()),
            config.model(),
        )
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

#[async_trait]
impl ChatBackend for ShapesClient {
    fn name(&self) -> &str {
        "shapes"
    }

    async fn send(&self, caller: &CallerIdentity, content: &str) -> Result<String, BackendError> {
        let body = build_request_body(&self.model, content);

        debug!(
            model = %self.model,
            user = %caller.user_id,
            channel = %caller.channel_id,
            "sending request to Shapes"
        );

        let resp = self
            .client
            .post(self.completions_url())
            .bearer_auth(&self.api_key)
            .header(USER_ID_HEADER, &caller.user_id)
            .header(CHANNEL_ID_HEADER, &caller.channel_id)
            .json(&body)
            .send()
            .await?;

        let status = resp.status().as_u16();
        if status == 401 {
            let text = resp.text().await.unwrap_or_default();
            return Err(BackendError::Unauthorized(text));
        }

        if status == 429 {
            let retry = resp
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok())
                .map(|s| s * 1000) // seconds to ms
                .unwrap_or(5000);
            return Err(BackendError::RateLimited {
                retry_after_ms: retry,
            });
        }

        if !resp.status().is_success() {
            let text = resp.text().await.unwrap_or_default();
            warn!(status, body = %text, "Shapes API error");
            return Err(BackendError::Api {
                status,
                message: text,
            });
        }

        let api_resp: ApiResponse = resp
            .json()
            .await
            .map_err(|e| BackendError::Parse(e.to_string()))?;

        Ok(parse_response(api_resp))
    }
}

fn build_request_body(model: &str, content: &str) -> serde_json::Value {
    serde_json::json!({
        "model": model,
        "messages": [Message::user(content)],
    })
}

/// First choice's text, or the fallback reply when there is none.
fn parse_response(resp: ApiResponse) -> String {
    resp.choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .filter(|text| !text.trim().is_empty())
        .unwrap_or_else(|| FALLBACK_REPLY.to_string())
}

// Shapes API response types (private, deserialization only)

#[derive(Deserialize)]
struct ApiResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChatMessage,
}

#[derive(Deserialize)]
struct ChatMessage {
    content: Option<String>,
}
