pub mod adapter;
pub mod context;
pub mod embed;
pub mod error;
pub mod handler;
pub mod send;

pub use adapter::DiscordAdapter;
pub use context::DiscordAppContext;
pub use error::DiscordError;
