//! Shared context interface for channel adapters.

use shapebot_core::LoginState;

use super::command::CommandRouter;
use crate::provider::ChatBackend;

/// What a channel adapter needs from its host.
///
/// Implemented by `AppState` in `shapebot-gateway`. Defined here so adapter
/// crates depend only on `shapebot-agent` and `shapebot-core`.
pub trait RelayContext: Send + Sync {
    fn backend(&self) -> &dyn ChatBackend;
    fn router(&self) -> &CommandRouter;
    fn login(&self) -> &LoginState;

    /// Persona name, for startup logging.
    fn shape_name(&self) -> &str;
}
