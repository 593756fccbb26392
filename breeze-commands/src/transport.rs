use std::sync::Arc;

use async_trait::async_trait;
use poise::serenity_prelude as serenity;

use breeze_core::{Context, Error};
use breeze_utils::embed::build_reply_embed;

/// How a reply should be rendered by the chat platform.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReplyFormat {
    Plain,
    /// Markdown inside an embed.
    Rich,
}

/// Text sent back to the user. `text` is also what gets audited.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
    pub format: ReplyFormat,
}

impl Reply {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            format: ReplyFormat::Plain,
        }
    }

    pub fn rich(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            format: ReplyFormat::Rich,
        }
    }
}

/// Outbound side of the chat platform.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    async fn send(&self, reply: &Reply) -> Result<(), Error>;
}

/// Replies into the channel a plain-text command arrived in.
pub struct ChannelTransport {
    http: Arc<serenity::Http>,
    channel_id: serenity::ChannelId,
}

impl ChannelTransport {
    pub fn new(http: Arc<serenity::Http>, channel_id: serenity::ChannelId) -> Self {
        Self { http, channel_id }
    }
}

#[async_trait]
impl ChatTransport for ChannelTransport {
    async fn send(&self, reply: &Reply) -> Result<(), Error> {
        let message = match reply.format {
            ReplyFormat::Plain => serenity::CreateMessage::new().content(reply.text.clone()),
            ReplyFormat::Rich => serenity::CreateMessage::new().embed(build_reply_embed(&reply.text)),
        };

        // City names are echoed back, so never let them ping anyone.
        self.channel_id
            .send_message(
                &self.http,
                message.allowed_mentions(serenity::CreateAllowedMentions::new()),
            )
            .await?;

        Ok(())
    }
}

/// Replies to a slash-command interaction.
pub struct PoiseTransport<'a> {
    ctx: Context<'a>,
}

impl<'a> PoiseTransport<'a> {
    pub fn new(ctx: Context<'a>) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl ChatTransport for PoiseTransport<'_> {
    async fn send(&self, reply: &Reply) -> Result<(), Error> {
        let builder = match reply.format {
            ReplyFormat::Plain => poise::CreateReply::default().content(reply.text.clone()),
            ReplyFormat::Rich => poise::CreateReply::default().embed(build_reply_embed(&reply.text)),
        };

        self.ctx
            .send(builder.allowed_mentions(serenity::CreateAllowedMentions::new()))
            .await?;

        Ok(())
    }
}
