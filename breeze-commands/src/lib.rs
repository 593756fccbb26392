pub mod command;
pub mod dispatcher;
pub mod replies;
pub mod transport;
pub mod utility;
pub mod weather;

use breeze_core::{Data, Error};

pub use command::Command;
pub use dispatcher::{dispatch, dispatch_text};
pub use transport::{ChannelTransport, ChatTransport, PoiseTransport, Reply, ReplyFormat};

/// Slash-command registrations. Plain `/command` messages are routed through
/// [`dispatch_text`] by the bot's message handler instead.
pub fn commands() -> Vec<poise::Command<Data, Error>> {
    vec![
        utility::start::start(),
        weather::weather::weather(),
        weather::setcity::setcity(),
        weather::clearcity::clearcity(),
    ]
}
