use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use anyhow::Context as _;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::model::logs::{LogFilter, LogPage, LogRecord, NewLogEntry, Pagination};
use crate::model::settings::{UserSetting, normalize_city};
use crate::store::{LogStore, SettingsStore};

/// Process-local store with the same semantics as the Postgres tables.
#[derive(Debug, Default)]
pub struct MemoryStore {
    settings: RwLock<HashMap<u64, UserSetting>>,
    logs: RwLock<Vec<LogRecord>>,
    next_log_id: AtomicU64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a log entry with an explicit creation time.
    pub async fn append_log_at(&self, entry: &NewLogEntry, created_at: DateTime<Utc>) -> LogRecord {
        let record = LogRecord {
            id: self.next_log_id.fetch_add(1, Ordering::Relaxed) + 1,
            user_id: entry.user_id,
            command: entry.command.clone(),
            response: entry.response.clone(),
            created_at,
        };

        self.logs.write().await.push(record.clone());
        record
    }

    /// Number of stored settings rows.
    pub async fn settings_len(&self) -> usize {
        self.settings.read().await.len()
    }
}

#[async_trait]
impl SettingsStore for MemoryStore {
    async fn get_setting(&self, user_id: u64) -> anyhow::Result<Option<UserSetting>> {
        Ok(self.settings.read().await.get(&user_id).cloned())
    }

    async fn upsert_city(&self, user_id: u64, city: &str) -> anyhow::Result<UserSetting> {
        let city = normalize_city(city).context("city must not be blank")?;
        let setting = UserSetting {
            user_id,
            city: Some(city),
        };

        self.settings.write().await.insert(user_id, setting.clone());
        Ok(setting)
    }

    async fn delete_setting(&self, user_id: u64) -> anyhow::Result<bool> {
        Ok(self.settings.write().await.remove(&user_id).is_some())
    }
}

#[async_trait]
impl LogStore for MemoryStore {
    async fn append_log(&self, entry: &NewLogEntry) -> anyhow::Result<LogRecord> {
        Ok(self.append_log_at(entry, Utc::now()).await)
    }

    async fn query_logs(
        &self,
        filter: &LogFilter,
        pagination: Option<Pagination>,
    ) -> anyhow::Result<LogPage> {
        let logs = self.logs.read().await;

        let mut matching: Vec<LogRecord> = logs
            .iter()
            .filter(|record| filter.matches(record))
            .cloned()
            .collect();
        matching.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });

        let total_items = u64::try_from(matching.len()).context("log count out of u64 range")?;
        let entries = match pagination {
            Some(pagination) => {
                let offset = usize::try_from(pagination.offset()).unwrap_or(usize::MAX);
                let limit = usize::try_from(pagination.per_page).unwrap_or(usize::MAX);
                matching.into_iter().skip(offset).take(limit).collect()
            }
            None => matching,
        };

        Ok(LogPage {
            total_items,
            entries,
        })
    }
}
