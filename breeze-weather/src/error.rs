use thiserror::Error;

/// Failure talking to the weather provider.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The request could not be sent or its body could not be read.
    #[error("weather service request failed: {0}")]
    Transport(#[source] reqwest::Error),

    /// The provider answered with a non-2xx status.
    #[error("{message} (HTTP {status})")]
    Status {
        status: u16,
        message: String,
        body: String,
    },

    /// The provider answered 2xx with a body that is not a weather payload.
    #[error("unreadable weather payload: {0}")]
    Decode(#[source] serde_json::Error),
}

impl GatewayError {
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Transport(source) => source.status().map(|status| status.as_u16()),
            Self::Decode(_) => None,
        }
    }
}

/// A weather payload lacked a field the summary template needs.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FormatError {
    #[error("weather payload is missing `{0}`")]
    MissingField(&'static str),
}
