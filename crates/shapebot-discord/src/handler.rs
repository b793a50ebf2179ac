use std::sync::{Arc, OnceLock};

use serenity::all::ActivityData;
use serenity::async_trait;
use serenity::model::channel::Message;
use serenity::model::gateway::Ready;
use serenity::model::id::{ChannelId, MessageId, UserId};
use serenity::model::user::OnlineStatus;
use serenity::prelude::{Context, EventHandler};
use tracing::{debug, info, warn};

use shapebot_agent::pipeline::{dispatch, Inbound, Reply};
use shapebot_core::config::DiscordConfig;
use shapebot_core::{CallerIdentity, ConversationScope};

use crate::context::{caller_for, resolve_scope, DiscordAppContext};
use crate::{embed, send};

/// Serenity event handler wired to the chat backend.
pub struct DiscordHandler<C: DiscordAppContext + 'static> {
    pub ctx: Arc<C>,
    pub config: DiscordConfig,
    pub bot_id: OnceLock<UserId>,
}

#[async_trait]
impl<C: DiscordAppContext + 'static> EventHandler for DiscordHandler<C> {
    async fn ready(&self, ctx: Context, ready: Ready) {
        self.bot_id.set(ready.user.id).ok();

        let tag = ready.user.tag();
        if self.ctx.login().mark_ready(tag.clone()) {
            info!(bot = %tag, "Discord bot is ready");
        } else {
            info!(bot = %tag, "Discord gateway resumed");
        }
        info!(shape = %self.ctx.shape_name(), "using shape");

        ctx.set_presence(build_activity(&self.config), OnlineStatus::Online);
    }

    async fn message(&self, ctx: Context, msg: Message) {
        if msg.author.bot {
            return;
        }

        let is_guild = msg.guild_id.is_some();
        if !is_guild && !self.config.dm_allowed {
            return;
        }

        let bot_id = self.bot_id.get().copied();
        let mentioned = bot_id.is_some_and(|id| msg.mentions_user_id(id));
        let addressed = !is_guild || mentioned || !self.config.require_mention;

        let content = match bot_id {
            Some(id) => strip_mention(&msg.content, id),
            None => msg.content.trim().to_string(),
        };

        let inbound = self.ctx.router().classify(&content, addressed);
        if inbound == Inbound::Ignore {
            return;
        }

        let scope = resolve_scope(&msg);
        let caller = caller_for(&msg, &scope);
        debug!(scope = %scope, user = %caller.user_id, "inbound message");

        if matches!(inbound, Inbound::Chat(_)) {
            let _ = msg.channel_id.broadcast_typing(&ctx.http).await;
        }

        let app = Arc::clone(&self.ctx);
        let http = Arc::clone(&ctx.http);
        let max_len = self.config.max_message_length;
        let channel_id = msg.channel_id;
        let reply_to = msg.id;

        tokio::spawn(async move {
            process_message(app, http, channel_id, reply_to, scope, caller, inbound, max_len)
                .await;
        });
    }
}

/// Remove mentions of the bot (`<@id>` and the legacy `<@!id>` form).
fn strip_mention(content: &str, bot_id: UserId) -> String {
    content
        .replace(&format!("<@{}>", bot_id), "")
        .replace(&format!("<@!{}>", bot_id), "")
        .trim()
        .to_string()
}

#[allow(clippy::too_many_arguments)]
async fn process_message<C: DiscordAppContext + 'static>(
    app: Arc<C>,
    http: Arc<serenity::http::Http>,
    channel_id: ChannelId,
    reply_to: MessageId,
    scope: ConversationScope,
    caller: CallerIdentity,
    inbound: Inbound,
    max_len: usize,
) {
    let Some(reply) = dispatch(app.router(), app.backend(), &caller, &inbound).await else {
        return;
    };

    let result = match reply {
        Reply::Text(text) => {
            send::send_response(&http, channel_id, Some(reply_to), &text, max_len).await
        }
        Reply::Help => embed::send_help(&http, channel_id, reply_to).await,
    };

    if let Err(e) = result {
        warn!(error = %e, scope = %scope, "Discord send failed");
    }
}

/// Build an `ActivityData` from the Discord config.
fn build_activity(config: &DiscordConfig) -> Option<ActivityData> {
    let name = config.activity_name.as_deref()?;
    let kind = config.activity_type.as_deref().unwrap_or("playing");
    Some(match kind.to_lowercase().as_str() {
        "listening" => ActivityData::listening(name),
        "watching" => ActivityData::watching(name),
        "competing" => ActivityData::competing(name),
        "custom" => ActivityData::custom(name),
        _ => ActivityData::playing(name),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_both_mention_forms() {
        let id = UserId::new(1234);
        assert_eq!(strip_mention("<@1234> hello", id), "hello");
        assert_eq!(strip_mention("<@!1234>   hi there ", id), "hi there");
        assert_eq!(strip_mention("hey <@1234>, what's up", id), "hey , what's up");
    }

    #[test]
    fn leaves_other_mentions_alone() {
        let id = UserId::new(1234);
        assert_eq!(strip_mention("<@999> hello", id), "<@999> hello");
    }

    #[test]
    fn prefixed_command_after_mention_is_a_command() {
        let id = UserId::new(1234);
        assert_eq!(strip_mention("<@1234> !reset", id), "!reset");
    }

    #[test]
    fn activity_defaults_to_playing() {
        let config = DiscordConfig::default();
        assert!(build_activity(&config).is_some());

        let silent = DiscordConfig {
            activity_name: None,
            ..DiscordConfig::default()
        };
        assert!(build_activity(&silent).is_none());
    }
}
