pub mod config;

use std::fmt;
use std::sync::Arc;

use breeze_database::{AuditLogger, SettingsStore};
use breeze_weather::WeatherGateway;

pub use config::Config;

pub type Error = anyhow::Error;

/// Services shared by every command and event handler.
#[derive(Clone)]
pub struct Data {
    pub settings: Arc<dyn SettingsStore>,
    pub weather: Arc<dyn WeatherGateway>,
    pub audit: AuditLogger,
}

impl fmt::Debug for Data {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Data")
            .field("audit", &self.audit)
            .finish_non_exhaustive()
    }
}

pub type Context<'a> = poise::Context<'a, Data, Error>;
