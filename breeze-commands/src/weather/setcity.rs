use breeze_core::{Context, Error};

use crate::command::Command;
use crate::dispatcher::dispatch;
use crate::transport::PoiseTransport;

/// Save a default city for /weather.
#[poise::command(slash_command, category = "Weather")]
pub async fn setcity(
    ctx: Context<'_>,
    #[description = "City to use when /weather is called without one"] city: Option<String>,
) -> Result<(), Error> {
    dispatch(
        ctx.data(),
        ctx.author().id.get(),
        Command::set_city(city),
        &PoiseTransport::new(ctx),
    )
    .await
}
