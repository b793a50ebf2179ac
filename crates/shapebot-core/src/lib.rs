pub mod config;
pub mod error;
pub mod status;
pub mod types;

pub use config::BotConfig;
pub use error::{ConfigError, Result};
pub use status::LoginState;
pub use types::{CallerIdentity, ConversationScope};
