//! Conversation scope and caller identity for inbound Discord messages.

use serenity::model::channel::Message;

use shapebot_core::{CallerIdentity, ConversationScope};

pub use shapebot_agent::pipeline::RelayContext as DiscordAppContext;

/// Guild messages are scoped to guild + channel; DMs to the author.
pub fn resolve_scope(msg: &Message) -> ConversationScope {
    scope_for(msg.guild_id.map(|g| g.get()), msg.channel_id.get(), msg.author.id.get())
}

/// Header identity for the author of `msg`.
pub fn caller_for(msg: &Message, scope: &ConversationScope) -> CallerIdentity {
    CallerIdentity::for_discord(msg.author.id.get(), scope)
}

fn scope_for(guild_id: Option<u64>, channel_id: u64, author_id: u64) -> ConversationScope {
    match guild_id {
        Some(guild_id) => ConversationScope::GuildChannel {
            guild_id,
            channel_id,
        },
        None => ConversationScope::DirectMessage { user_id: author_id },
    }
}
