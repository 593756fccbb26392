//! Turns a recognised command into a reply and an audit entry.
//!
//! Per message the order is fixed: settings read/write, weather lookup,
//! reply, then the audit entry is queued. Errors from the stores or the
//! weather provider become replies here and never reach the framework.

use thiserror::Error;
use tracing::{error, warn};

use breeze_core::{Data, Error};
use breeze_database::model::logs::NewLogEntry;
use breeze_database::model::settings::MAX_CITY_CHARS;
use breeze_weather::{FormatError, GatewayError, render_weather_summary};

use crate::command::Command;
use crate::replies;
use crate::transport::{ChatTransport, Reply};

/// A failure that is reported back to the user.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error(transparent)]
    Gateway(#[from] GatewayError),
    #[error(transparent)]
    Format(#[from] FormatError),
    #[error("{0:#}")]
    Persistence(anyhow::Error),
}

/// What a command answered and the command string it is audited under.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Outcome {
    pub command: String,
    pub reply: Reply,
}

impl Outcome {
    fn plain(command: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            reply: Reply::plain(text),
        }
    }
}

/// Parse `text` and dispatch it. Returns `false` when the text is not a
/// command, in which case nothing is sent or logged.
pub async fn dispatch_text(
    data: &Data,
    user_id: u64,
    text: &str,
    transport: &dyn ChatTransport,
) -> Result<bool, Error> {
    let Some(command) = Command::parse(text) else {
        return Ok(false);
    };

    dispatch(data, user_id, command, transport).await?;
    Ok(true)
}

/// Run `command` for `user_id`, send the reply and queue the audit entry.
///
/// The entry is queued even when sending fails; the send error is returned
/// afterwards.
pub async fn dispatch(
    data: &Data,
    user_id: u64,
    command: Command,
    transport: &dyn ChatTransport,
) -> Result<(), Error> {
    let outcome = execute(data, user_id, command).await;
    let sent = transport.send(&outcome.reply).await;

    data.audit.record(NewLogEntry::new(
        user_id,
        outcome.command,
        outcome.reply.text,
    ));

    sent
}

/// Compute the reply for `command` without sending it.
pub async fn execute(data: &Data, user_id: u64, command: Command) -> Outcome {
    match command {
        Command::Start => Outcome::plain("/start", replies::GREETING),
        Command::Weather { city } => weather(data, user_id, city).await,
        Command::SetCity { city } => set_city(data, user_id, city).await,
        Command::ClearCity => clear_city(data, user_id).await,
    }
}

async fn weather(data: &Data, user_id: u64, requested: Option<String>) -> Outcome {
    let city = match requested {
        Some(city) => city,
        None => match data.settings.get_setting(user_id).await {
            Ok(setting) => match setting.and_then(|setting| setting.city) {
                Some(city) => city,
                None => return Outcome::plain("/weather", replies::WEATHER_CITY_REQUIRED),
            },
            Err(source) => {
                error!(?source, user_id, "failed to read default city");
                let reason = CommandError::Persistence(source);
                return Outcome::plain("/weather", replies::weather_failed(&reason));
            }
        },
    };

    let command = format!("/weather {city}");
    match weather_summary(data, &city).await {
        Ok(summary) => Outcome {
            command,
            reply: Reply::rich(summary),
        },
        Err(reason) => {
            warn!(%reason, user_id, city = %city, "weather lookup failed");
            Outcome::plain(command, replies::weather_failed(&reason))
        }
    }
}

async fn weather_summary(data: &Data, city: &str) -> Result<String, CommandError> {
    let snapshot = data.weather.fetch(city).await?;
    Ok(render_weather_summary(&snapshot)?)
}

async fn set_city(data: &Data, user_id: u64, city: Option<String>) -> Outcome {
    let Some(city) = city else {
        return Outcome::plain("/setcity", replies::SETCITY_USAGE);
    };

    let command = format!("/setcity {city}");
    if city.chars().count() > MAX_CITY_CHARS {
        warn!(user_id, length = city.chars().count(), "rejected overlong default city");
        return Outcome::plain(command, replies::CITY_TOO_LONG);
    }

    match data.settings.upsert_city(user_id, &city).await {
        Ok(_) => Outcome::plain(command, replies::city_saved(&city)),
        Err(source) => {
            error!(?source, user_id, city = %city, "failed to save default city");
            let reason = CommandError::Persistence(source);
            Outcome::plain(command, replies::setcity_failed(&reason))
        }
    }
}

async fn clear_city(data: &Data, user_id: u64) -> Outcome {
    match data.settings.delete_setting(user_id).await {
        Ok(true) => Outcome::plain("/clearcity", replies::CITY_CLEARED),
        Ok(false) => Outcome::plain("/clearcity", replies::NO_CITY_STORED),
        Err(source) => {
            error!(?source, user_id, "failed to clear default city");
            let reason = CommandError::Persistence(source);
            Outcome::plain("/clearcity", replies::clearcity_failed(&reason))
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use tokio::task::JoinHandle;

    use breeze_core::{Data, Error};
    use breeze_database::model::logs::{LogFilter, LogPage, LogRecord, NewLogEntry, Pagination};
    use breeze_database::model::settings::{MAX_CITY_CHARS, UserSetting};
    use breeze_database::{AuditLogger, LogStore, MemoryStore, SettingsStore};
    use breeze_weather::{GatewayError, WeatherGateway, WeatherSnapshot};

    use super::{dispatch, dispatch_text};
    use crate::command::Command;
    use crate::replies;
    use crate::transport::{ChatTransport, Reply, ReplyFormat};

    const USER: u64 = 1001;

    #[derive(Default)]
    struct FakeWeather {
        cities: HashMap<String, serde_json::Value>,
        calls: Mutex<Vec<String>>,
    }

    impl FakeWeather {
        fn with_city(mut self, city: &str, payload: serde_json::Value) -> Self {
            self.cities.insert(city.to_owned(), payload);
            self
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl WeatherGateway for FakeWeather {
        async fn fetch(&self, city: &str) -> Result<WeatherSnapshot, GatewayError> {
            self.calls.lock().unwrap().push(city.to_owned());
            match self.cities.get(city) {
                Some(payload) => Ok(serde_json::from_value(payload.clone()).unwrap()),
                None => Err(GatewayError::Status {
                    status: 404,
                    message: "city not found".to_owned(),
                    body: r#"{"cod":"404","message":"city not found"}"#.to_owned(),
                }),
            }
        }
    }

    struct BrokenSettings;

    #[async_trait]
    impl SettingsStore for BrokenSettings {
        async fn get_setting(&self, _user_id: u64) -> anyhow::Result<Option<UserSetting>> {
            anyhow::bail!("database is unavailable")
        }

        async fn upsert_city(&self, _user_id: u64, _city: &str) -> anyhow::Result<UserSetting> {
            anyhow::bail!("database is unavailable")
        }

        async fn delete_setting(&self, _user_id: u64) -> anyhow::Result<bool> {
            anyhow::bail!("database is unavailable")
        }
    }

    struct BrokenLogs;

    #[async_trait]
    impl LogStore for BrokenLogs {
        async fn append_log(&self, _entry: &NewLogEntry) -> anyhow::Result<LogRecord> {
            anyhow::bail!("disk full")
        }

        async fn query_logs(
            &self,
            _filter: &LogFilter,
            _pagination: Option<Pagination>,
        ) -> anyhow::Result<LogPage> {
            anyhow::bail!("disk full")
        }
    }

    #[derive(Default)]
    struct RecordingTransport {
        sent: Mutex<Vec<Reply>>,
        fail: bool,
    }

    impl RecordingTransport {
        fn failing() -> Self {
            Self {
                fail: true,
                ..Self::default()
            }
        }

        fn texts(&self) -> Vec<String> {
            self.sent
                .lock()
                .unwrap()
                .iter()
                .map(|reply| reply.text.clone())
                .collect()
        }

        fn last(&self) -> Reply {
            self.sent.lock().unwrap().last().cloned().unwrap()
        }
    }

    #[async_trait]
    impl ChatTransport for RecordingTransport {
        async fn send(&self, reply: &Reply) -> Result<(), Error> {
            self.sent.lock().unwrap().push(reply.clone());
            if self.fail {
                anyhow::bail!("channel is gone");
            }
            Ok(())
        }
    }

    struct Harness {
        data: Data,
        settings: Arc<MemoryStore>,
        logs: Arc<MemoryStore>,
        weather: Arc<FakeWeather>,
        audit_worker: JoinHandle<()>,
        transport: RecordingTransport,
    }

    impl Harness {
        fn new(weather: FakeWeather) -> Self {
            let settings = Arc::new(MemoryStore::new());
            Self::with_settings(weather, settings.clone(), settings)
        }

        fn with_settings(
            weather: FakeWeather,
            settings_store: Arc<dyn SettingsStore>,
            settings: Arc<MemoryStore>,
        ) -> Self {
            let logs = Arc::new(MemoryStore::new());
            let weather = Arc::new(weather);
            let (audit, audit_worker) = AuditLogger::spawn(logs.clone(), 64);

            Self {
                data: Data {
                    settings: settings_store,
                    weather: weather.clone(),
                    audit,
                },
                settings,
                logs,
                weather,
                audit_worker,
                transport: RecordingTransport::default(),
            }
        }

        async fn send(&self, text: &str) -> bool {
            dispatch_text(&self.data, USER, text, &self.transport)
                .await
                .unwrap()
        }

        /// Stop the audit writer and return every entry in write order.
        async fn audit_entries(self) -> (Vec<LogRecord>, RecordingTransport) {
            let Self {
                data,
                logs,
                audit_worker,
                transport,
                ..
            } = self;
            drop(data);
            audit_worker.await.unwrap();

            let mut entries = logs
                .query_logs(&LogFilter::default(), None)
                .await
                .unwrap()
                .entries;
            entries.sort_by_key(|entry| entry.id);
            (entries, transport)
        }
    }

    fn moscow() -> serde_json::Value {
        serde_json::json!({
            "name": "Moscow",
            "main": { "temp": -3.5, "feels_like": -8.0, "humidity": 90 },
            "weather": [{ "description": "снег" }],
            "wind": { "speed": 5 }
        })
    }

    fn paris() -> serde_json::Value {
        serde_json::json!({
            "name": "Paris",
            "main": { "temp": 18.2, "feels_like": 17.9, "humidity": 64 },
            "weather": [{ "description": "ясно" }],
            "wind": { "speed": 4.1 }
        })
    }

    #[tokio::test]
    async fn unmatched_text_is_ignored() {
        let harness = Harness::new(FakeWeather::default());

        assert!(!harness.send("hello bot").await);
        assert!(!harness.send("/forecast Paris").await);

        let (entries, transport) = harness.audit_entries().await;
        assert!(entries.is_empty());
        assert!(transport.texts().is_empty());
    }

    #[tokio::test]
    async fn start_greets_and_is_logged() {
        let harness = Harness::new(FakeWeather::default());

        assert!(harness.send("/start").await);

        let (entries, transport) = harness.audit_entries().await;
        assert_eq!(transport.texts(), [replies::GREETING]);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].user_id, USER);
        assert_eq!(entries[0].command, "/start");
        assert_eq!(entries[0].response, replies::GREETING);
    }

    #[tokio::test]
    async fn weather_without_city_or_default_prompts_and_skips_gateway() {
        let harness = Harness::new(FakeWeather::default().with_city("Paris", paris()));

        harness.send("/weather").await;

        assert!(harness.weather.calls().is_empty());
        let (entries, transport) = harness.audit_entries().await;
        assert_eq!(transport.texts(), [replies::WEATHER_CITY_REQUIRED]);
        assert_eq!(entries[0].command, "/weather");
        assert_eq!(entries[0].response, replies::WEATHER_CITY_REQUIRED);
    }

    #[tokio::test]
    async fn weather_reply_is_a_rich_summary() {
        let harness = Harness::new(FakeWeather::default().with_city("Moscow", moscow()));

        harness.send("/weather Moscow").await;

        let reply = harness.transport.last();
        assert_eq!(reply.format, ReplyFormat::Rich);
        assert!(reply.text.contains("**Погода в городе Moscow:**"));
        assert!(reply.text.contains("Температура: -3.5°C"));
        assert!(reply.text.contains("Скорость ветра: 5 м/с"));

        let (entries, _) = harness.audit_entries().await;
        assert_eq!(entries[0].command, "/weather Moscow");
        assert_eq!(entries[0].response, reply.text);
    }

    #[tokio::test]
    async fn default_city_gives_the_same_weather_as_explicit_city() {
        let harness = Harness::new(FakeWeather::default().with_city("Paris", paris()));

        harness.send("/setcity Paris").await;
        harness.send("/weather").await;
        harness.send("/weather Paris").await;

        assert_eq!(harness.weather.calls(), ["Paris", "Paris"]);
        let texts = harness.transport.texts();
        assert_eq!(texts[0], replies::city_saved("Paris"));
        assert_eq!(texts[1], texts[2]);

        let (entries, _) = harness.audit_entries().await;
        let commands: Vec<_> = entries.iter().map(|e| e.command.as_str()).collect();
        assert_eq!(commands, ["/setcity Paris", "/weather Paris", "/weather Paris"]);
    }

    #[tokio::test]
    async fn setcity_twice_keeps_a_single_row_with_the_latest_city() {
        let harness = Harness::new(FakeWeather::default());

        harness.send("/setcity Paris").await;
        harness.send("/setcity Berlin").await;

        assert_eq!(harness.settings.settings_len().await, 1);
        let setting = harness.settings.get_setting(USER).await.unwrap().unwrap();
        assert_eq!(setting.city.as_deref(), Some("Berlin"));
        assert_eq!(harness.transport.last().text, replies::city_saved("Berlin"));
    }

    #[tokio::test]
    async fn setcity_without_argument_shows_usage() {
        let harness = Harness::new(FakeWeather::default());

        harness.send("/setcity").await;

        assert_eq!(harness.settings.settings_len().await, 0);
        let (entries, transport) = harness.audit_entries().await;
        assert_eq!(transport.texts(), [replies::SETCITY_USAGE]);
        assert_eq!(entries[0].command, "/setcity");
    }

    #[tokio::test]
    async fn setcity_rejects_overlong_names_without_saving() {
        let harness = Harness::new(FakeWeather::default());
        let longest = "я".repeat(MAX_CITY_CHARS);
        let too_long = "я".repeat(1990);

        harness.send(&format!("/setcity {too_long}")).await;
        assert_eq!(harness.settings.settings_len().await, 0);

        harness.send(&format!("/setcity {longest}")).await;
        assert_eq!(harness.settings.settings_len().await, 1);

        let (entries, transport) = harness.audit_entries().await;
        assert_eq!(transport.texts()[0], replies::CITY_TOO_LONG);
        assert_eq!(transport.texts()[1], replies::city_saved(&longest));
        assert_eq!(entries[0].response, replies::CITY_TOO_LONG);
    }

    #[tokio::test]
    async fn clearcity_removes_the_row_then_reports_nothing_stored() {
        let harness = Harness::new(FakeWeather::default());

        harness.send("/setcity Oslo").await;
        harness.send("/clearcity").await;
        assert!(harness.settings.get_setting(USER).await.unwrap().is_none());
        harness.send("/clearcity").await;

        let (entries, transport) = harness.audit_entries().await;
        assert_eq!(
            transport.texts()[1..],
            [replies::CITY_CLEARED, replies::NO_CITY_STORED]
        );
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[1].command, "/clearcity");
        assert_eq!(entries[2].response, replies::NO_CITY_STORED);
    }

    #[tokio::test]
    async fn unknown_city_reply_carries_the_provider_message() {
        let harness = Harness::new(FakeWeather::default());

        harness.send("/weather Atlantis").await;

        let expected = replies::weather_failed(&"city not found (HTTP 404)");
        let (entries, transport) = harness.audit_entries().await;
        assert_eq!(transport.texts(), [expected.clone()]);
        assert_eq!(entries[0].command, "/weather Atlantis");
        assert_eq!(entries[0].response, expected);
    }

    #[tokio::test]
    async fn malformed_payload_is_reported_instead_of_rendered() {
        let mut payload = paris();
        payload["main"].as_object_mut().unwrap().remove("temp");
        let harness = Harness::new(FakeWeather::default().with_city("Paris", payload));

        harness.send("/weather Paris").await;

        let reply = harness.transport.last();
        assert_eq!(reply.format, ReplyFormat::Plain);
        assert_eq!(
            reply.text,
            replies::weather_failed(&"weather payload is missing `main.temp`")
        );
    }

    #[tokio::test]
    async fn persistence_failures_are_replied_and_logged() {
        let harness = Harness::with_settings(
            FakeWeather::default().with_city("Paris", paris()),
            Arc::new(BrokenSettings),
            Arc::new(MemoryStore::new()),
        );

        harness.send("/setcity Paris").await;
        harness.send("/clearcity").await;
        harness.send("/weather").await;

        assert!(harness.weather.calls().is_empty());
        let (entries, transport) = harness.audit_entries().await;
        assert_eq!(
            transport.texts(),
            [
                replies::setcity_failed(&"database is unavailable"),
                replies::clearcity_failed(&"database is unavailable"),
                replies::weather_failed(&"database is unavailable"),
            ]
        );
        let commands: Vec<_> = entries.iter().map(|e| e.command.as_str()).collect();
        assert_eq!(commands, ["/setcity Paris", "/clearcity", "/weather"]);
    }

    #[tokio::test]
    async fn failed_send_is_still_audited() {
        let mut harness = Harness::new(FakeWeather::default());
        harness.transport = RecordingTransport::failing();

        let result = dispatch(&harness.data, USER, Command::Start, &harness.transport).await;
        assert!(result.is_err());

        let (entries, _) = harness.audit_entries().await;
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].response, replies::GREETING);
    }

    #[tokio::test]
    async fn broken_audit_store_does_not_change_the_reply() {
        let settings = Arc::new(MemoryStore::new());
        let (audit, audit_worker) = AuditLogger::spawn(Arc::new(BrokenLogs), 4);
        let data = Data {
            settings,
            weather: Arc::new(FakeWeather::default()),
            audit,
        };
        let transport = RecordingTransport::default();

        dispatch(&data, USER, Command::Start, &transport)
            .await
            .unwrap();

        drop(data);
        audit_worker.await.unwrap();
        assert_eq!(transport.texts(), [replies::GREETING]);
    }
}
