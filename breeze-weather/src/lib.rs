//! OpenWeatherMap current-weather client and the chat summary built from it.

pub mod client;
pub mod error;
pub mod format;
pub mod types;

pub use client::{OpenWeatherClient, WeatherGateway};
pub use error::{FormatError, GatewayError};
pub use format::render_weather_summary;
pub use types::WeatherSnapshot;
