use poise::serenity_prelude as serenity;

/// Default embed color used across the bot UI.
pub const DEFAULT_EMBED_COLOR: u32 = 0x4a_90_d9;

/// Build the embed used for rich-text replies.
pub fn build_reply_embed(description: impl Into<String>) -> serenity::CreateEmbed {
    serenity::CreateEmbed::new()
        .color(DEFAULT_EMBED_COLOR)
        .description(description)
}
