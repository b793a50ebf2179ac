use std::fmt;

/// The unit of conversational context: a guild channel or a DM thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConversationScope {
    GuildChannel { guild_id: u64, channel_id: u64 },
    DirectMessage { user_id: u64 },
}

impl ConversationScope {
    /// Stable key for this scope:
    /// - guild: `{guild_id}_{channel_id}`
    /// - DM:    `dm_{user_id}`
    pub fn key(&self) -> String {
        match self {
            Self::GuildChannel {
                guild_id,
                channel_id,
            } => format!("{}_{}", guild_id, channel_id),
            Self::DirectMessage { user_id } => format!("dm_{}", user_id),
        }
    }

    pub fn is_direct(&self) -> bool {
        matches!(self, Self::DirectMessage { .. })
    }
}

impl fmt::Display for ConversationScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key())
    }
}

/// Who is talking, and where. Sent to the backend as request headers so it can
/// keep per-user and per-channel memory; nothing is stored locally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallerIdentity {
    pub user_id: String,
    pub channel_id: String,
}

impl CallerIdentity {
    pub fn new(user_id: impl Into<String>, channel_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            channel_id: channel_id.into(),
        }
    }

    /// Identity for a Discord author speaking in `scope`.
    pub fn for_discord(author_id: u64, scope: &ConversationScope) -> Self {
        Self::new(
            format!("discord_user_{}", author_id),
            format!("discord_channel_{}", scope.key()),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guild_scope_key() {
        let scope = ConversationScope::GuildChannel {
            guild_id: 111,
            channel_id: 222,
        };
        assert_eq!(scope.key(), "111_222");
        assert!(!scope.is_direct());
    }

    #[test]
    fn dm_scope_key() {
        let scope = ConversationScope::DirectMessage { user_id: 42 };
        assert_eq!(scope.key(), "dm_42");
        assert_eq!(scope.to_string(), "dm_42");
        assert!(scope.is_direct());
    }

    #[test]
    fn discord_identity_headers() {
        let scope = ConversationScope::GuildChannel {
            guild_id: 1,
            channel_id: 2,
        };
        let caller = CallerIdentity::for_discord(99, &scope);
        assert_eq!(caller.user_id, "discord_user_99");
        assert_eq!(caller.channel_id, "discord_channel_1_2");
    }
}
