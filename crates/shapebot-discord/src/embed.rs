//! Local help rendering as a Discord embed.

use serenity::builder::{CreateEmbed, CreateEmbedFooter, CreateMessage};
use serenity::http::Http;
use serenity::model::id::{ChannelId, MessageId};
use tracing::warn;

use shapebot_agent::help::{
    render_text, HELP_COLOUR, HELP_DESCRIPTION, HELP_ENTRIES, HELP_FOOTER, HELP_TITLE,
};

use crate::error::DiscordError;

/// Build the command catalog embed.
pub fn help_embed() -> CreateEmbed {
    CreateEmbed::new()
        .colour(HELP_COLOUR)
        .title(HELP_TITLE)
        .description(HELP_DESCRIPTION)
        .fields(
            HELP_ENTRIES
                .iter()
                .map(|e| (e.label, e.description, e.inline)),
        )
        .footer(CreateEmbedFooter::new(HELP_FOOTER))
}

/// Reply to `reply_to` with the help embed, falling back to plain text when
/// the embed is rejected (e.g. missing Embed Links permission).
pub async fn send_help(
    http: &Http,
    channel_id: ChannelId,
    reply_to: MessageId,
) -> Result<(), DiscordError> {
    let message = CreateMessage::new()
        .embed(help_embed())
        .reference_message((channel_id, reply_to));

    if let Err(e) = channel_id.send_message(http, message).await {
        warn!(error = %e, "help embed rejected, sending plain text");
        let fallback = CreateMessage::new()
            .content(render_text())
            .reference_message((channel_id, reply_to));
        channel_id.send_message(http, fallback).await?;
    }
    Ok(())
}
