use breeze_utils::parse::split_command;

/// A recognised chat command with its argument, if it takes one.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    Start,
    Weather { city: Option<String> },
    SetCity { city: Option<String> },
    ClearCity,
}

impl Command {
    /// Recognise a `/command [argument]` message. Anything else is `None`.
    pub fn parse(text: &str) -> Option<Self> {
        let invocation = split_command(text)?;
        let argument = invocation.argument.map(str::to_owned);

        match invocation.name {
            "start" => Some(Self::Start),
            "weather" => Some(Self::Weather { city: argument }),
            "setcity" => Some(Self::SetCity { city: argument }),
            "clearcity" => Some(Self::ClearCity),
            _ => None,
        }
    }

    pub fn weather(city: Option<String>) -> Self {
        Self::Weather {
            city: normalize_argument(city),
        }
    }

    pub fn set_city(city: Option<String>) -> Self {
        Self::SetCity {
            city: normalize_argument(city),
        }
    }
}

fn normalize_argument(raw: Option<String>) -> Option<String> {
    raw.map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
}
