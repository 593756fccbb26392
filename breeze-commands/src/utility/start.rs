use breeze_core::{Context, Error};

use crate::command::Command;
use crate::dispatcher::dispatch;
use crate::transport::PoiseTransport;

/// Say hello and explain how to ask for the weather.
#[poise::command(slash_command, category = "Utility")]
pub async fn start(ctx: Context<'_>) -> Result<(), Error> {
    dispatch(
        ctx.data(),
        ctx.author().id.get(),
        Command::Start,
        &PoiseTransport::new(ctx),
    )
    .await
}
