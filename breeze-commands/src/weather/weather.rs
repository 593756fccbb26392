use breeze_core::{Context, Error};

use crate::command::Command;
use crate::dispatcher::dispatch;
use crate::transport::PoiseTransport;

/// Show the current weather for a city, or for your saved city.
#[poise::command(slash_command, category = "Weather")]
pub async fn weather(
    ctx: Context<'_>,
    #[description = "City name (defaults to your saved city)"] city: Option<String>,
) -> Result<(), Error> {
    // The provider round trip can outlast the interaction deadline.
    ctx.defer().await?;

    dispatch(
        ctx.data(),
        ctx.author().id.get(),
        Command::weather(city),
        &PoiseTransport::new(ctx),
    )
    .await
}
