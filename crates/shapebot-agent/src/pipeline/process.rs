//! Message pipeline shared by channel adapters.
//!
//! The adapter classifies and dispatches through here, then only handles
//! platform-specific delivery (segmenting, reply vs. follow-up, embeds).

use tracing::{debug, warn};

use shapebot_core::CallerIdentity;

use super::command::{Action, CommandRouter, Inbound};
use crate::provider::ChatBackend;

/// Outcome of one inbound message, ready for delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// Text to send; may exceed the platform limit and must be segmented.
    Text(String),
    /// Render the built-in command catalog.
    Help,
}

/// One backend turn with every failure absorbed into user-visible text.
pub async fn ask<B: ChatBackend + ?Sized>(
    backend: &B,
    caller: &CallerIdentity,
    content: &str,
) -> String {
    match backend.send(caller, content).await {
        Ok(text) => text,
        Err(e) => {
            warn!(
                backend = backend.name(),
                user = %caller.user_id,
                channel = %caller.channel_id,
                error = %e,
                "backend call failed"
            );
            e.user_message().to_string()
        }
    }
}

/// Run the dispatch table for `inbound`. Makes at most one backend call and
/// never fails; `None` means nothing should be sent.
pub async fn dispatch<B: ChatBackend + ?Sized>(
    router: &CommandRouter,
    backend: &B,
    caller: &CallerIdentity,
    inbound: &Inbound,
) -> Option<Reply> {
    let action = router.plan(inbound)?;
    let reply = match action {
        Action::Forward(payload) => {
            debug!(user = %caller.user_id, len = payload.len(), "forwarding to backend");
            Reply::Text(ask(backend, caller, &payload).await)
        }
        Action::Reply(text) => Reply::Text(text),
        Action::ShowHelp => Reply::Help,
    };
    Some(reply)
}
