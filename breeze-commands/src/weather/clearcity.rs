use breeze_core::{Context, Error};

use crate::command::Command;
use crate::dispatcher::dispatch;
use crate::transport::PoiseTransport;

/// Forget your saved default city.
#[poise::command(slash_command, category = "Weather")]
pub async fn clearcity(ctx: Context<'_>) -> Result<(), Error> {
    dispatch(
        ctx.data(),
        ctx.author().id.get(),
        Command::ClearCity,
        &PoiseTransport::new(ctx),
    )
    .await
}
