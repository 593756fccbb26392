//! Process configuration, read once at startup.

use std::env;
use std::net::{IpAddr, Ipv4Addr};

use anyhow::{Context as _, bail};
use breeze_database::audit::DEFAULT_AUDIT_QUEUE_CAPACITY;
use breeze_weather::client::{DEFAULT_WEATHER_API_URL, DEFAULT_WEATHER_LANG};

const DEFAULT_HTTP_PORT: u16 = 5000;
const DEFAULT_DB_PORT: u16 = 5432;
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 5;

#[derive(Clone)]
pub struct Config {
    pub discord_token: String,
    /// Slash commands are registered in this guild only; globally when unset.
    pub discord_guild_id: Option<u64>,
    pub weather: WeatherConfig,
    pub database: DatabaseConfig,
    pub api: ApiConfig,
    pub audit_queue_capacity: usize,
}

#[derive(Clone)]
pub struct WeatherConfig {
    pub api_key: String,
    pub api_url: String,
    pub lang: String,
}

#[derive(Clone)]
pub struct DatabaseConfig {
    pub connection: DatabaseConnection,
    pub max_connections: u32,
    pub auto_run_migrations: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DatabaseConnection {
    Url(String),
    Parts {
        host: String,
        port: u16,
        database: String,
        username: String,
        password: Option<String>,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ApiConfig {
    pub bind_addr: IpAddr,
    pub port: u16,
}

impl Config {
    /// Read the configuration from the process environment.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Read the configuration through `lookup`; blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_owned())
                .filter(|value| !value.is_empty())
        };
        let require = |key: &str| get(key).with_context(|| format!("{key} must be set"));

        let discord_guild_id = get("DISCORD_GUILD_ID")
            .map(|raw| raw.parse::<u64>())
            .transpose()
            .context("DISCORD_GUILD_ID must be a numeric guild id")?;

        let connection = match get("DATABASE_URL") {
            Some(url) => DatabaseConnection::Url(url),
            None => {
                let (Some(host), Some(database), Some(username)) =
                    (get("DB_HOST"), get("DB_NAME"), get("DB_USER"))
                else {
                    bail!("DATABASE_URL or DB_HOST, DB_NAME and DB_USER must be set");
                };

                DatabaseConnection::Parts {
                    host,
                    port: parse_or(get("DB_PORT"), DEFAULT_DB_PORT),
                    database,
                    username,
                    password: get("DB_PASS"),
                }
            }
        };

        Ok(Self {
            discord_token: require("DISCORD_TOKEN")?,
            discord_guild_id,
            weather: WeatherConfig {
                api_key: require("OPENWEATHERMAP_API_KEY")?,
                api_url: get("WEATHER_API_URL")
                    .unwrap_or_else(|| DEFAULT_WEATHER_API_URL.to_owned()),
                lang: get("WEATHER_LANG").unwrap_or_else(|| DEFAULT_WEATHER_LANG.to_owned()),
            },
            database: DatabaseConfig {
                connection,
                max_connections: parse_or(get("DB_MAX_CONNECTIONS"), DEFAULT_DB_MAX_CONNECTIONS),
                auto_run_migrations: get("AUTO_RUN_MIGRATIONS")
                    .map_or(true, |value| parse_bool(&value)),
            },
            api: ApiConfig {
                bind_addr: parse_or(get("API_BIND_ADDR"), IpAddr::V4(Ipv4Addr::UNSPECIFIED)),
                port: parse_or(get("PORT"), DEFAULT_HTTP_PORT),
            },
            audit_queue_capacity: parse_or(
                get("AUDIT_QUEUE_CAPACITY"),
                DEFAULT_AUDIT_QUEUE_CAPACITY,
            ),
        })
    }
}

fn parse_bool(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

fn parse_or<T: std::str::FromStr>(value: Option<String>, default: T) -> T {
    value
        .and_then(|value| value.parse::<T>().ok())
        .unwrap_or(default)
}
