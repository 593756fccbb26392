use poise::serenity_prelude as serenity;
use tracing::debug;

use breeze_commands::{ChannelTransport, dispatch_text};
use breeze_core::{Data, Error};

/// Run `/command` text typed as a regular message in a channel or DM.
pub async fn handle_message_command(
    ctx: &serenity::Context,
    data: &Data,
    message: &serenity::Message,
) -> Result<(), Error> {
    // Ignore bots and webhooks.
    if message.author.bot || message.webhook_id.is_some() {
        return Ok(());
    }

    let transport = ChannelTransport::new(ctx.http.clone(), message.channel_id);
    let user_id = message.author.id.get();

    if dispatch_text(data, user_id, &message.content, &transport).await? {
        debug!(user_id, channel_id = message.channel_id.get(), "handled text command");
    }

    Ok(())
}
