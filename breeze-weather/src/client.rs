use std::fmt;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, warn};

use crate::error::GatewayError;
use crate::types::WeatherSnapshot;

pub const DEFAULT_WEATHER_API_URL: &str = "https://api.openweathermap.org/data/2.5/weather";
pub const DEFAULT_WEATHER_LANG: &str = "ru";

/// Source of current weather for a city.
#[async_trait]
pub trait WeatherGateway: Send + Sync {
    async fn fetch(&self, city: &str) -> Result<WeatherSnapshot, GatewayError>;
}

/// OpenWeatherMap current-weather client. One request per call; no retries.
#[derive(Clone)]
pub struct OpenWeatherClient {
    http: Client,
    base_url: String,
    api_key: String,
    lang: String,
}

impl OpenWeatherClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            base_url: DEFAULT_WEATHER_API_URL.to_owned(),
            api_key: api_key.into(),
            lang: DEFAULT_WEATHER_LANG.to_owned(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_lang(mut self, lang: impl Into<String>) -> Self {
        self.lang = lang.into();
        self
    }
}

impl fmt::Debug for OpenWeatherClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenWeatherClient")
            .field("base_url", &self.base_url)
            .field("lang", &self.lang)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl WeatherGateway for OpenWeatherClient {
    async fn fetch(&self, city: &str) -> Result<WeatherSnapshot, GatewayError> {
        debug!(city, "requesting current weather");

        // The request URL carries the API key, so it is stripped from errors.
        let response = self
            .http
            .get(&self.base_url)
            .query(&[
                ("q", city),
                ("appid", self.api_key.as_str()),
                ("units", "metric"),
                ("lang", self.lang.as_str()),
            ])
            .send()
            .await
            .map_err(|source| GatewayError::Transport(source.without_url()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|source| GatewayError::Transport(source.without_url()))?;

        if !status.is_success() {
            let message = upstream_message(&body).unwrap_or_else(|| {
                status
                    .canonical_reason()
                    .unwrap_or("unexpected response")
                    .to_owned()
            });
            warn!(
                city,
                status = status.as_u16(),
                %message,
                "weather provider returned an error"
            );

            return Err(GatewayError::Status {
                status: status.as_u16(),
                message,
                body,
            });
        }

        serde_json::from_str(&body).map_err(GatewayError::Decode)
    }
}

/// Pull the provider's `message` field out of an error body.
fn upstream_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    value
        .get("message")
        .and_then(serde_json::Value::as_str)
        .map(str::trim)
        .filter(|message| !message.is_empty())
        .map(str::to_owned)
}
