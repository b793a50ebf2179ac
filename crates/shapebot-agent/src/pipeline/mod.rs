//! Message pipeline: command grammar, dispatch, and the adapter context trait.

pub mod command;
pub mod context;
pub mod process;

pub use command::{Action, Command, CommandRouter, Inbound};
pub use context::RelayContext;
pub use process::{ask, dispatch, Reply};
