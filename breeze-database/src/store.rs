use async_trait::async_trait;

use crate::database::Database;
use crate::impls::logs::{insert_log_entry, query_log_entries};
use crate::impls::settings::{delete_user_setting, get_user_setting, upsert_user_city};
use crate::model::logs::{LogFilter, LogPage, LogRecord, NewLogEntry, Pagination};
use crate::model::settings::UserSetting;

/// Per-user default city storage.
#[async_trait]
pub trait SettingsStore: Send + Sync {
    async fn get_setting(&self, user_id: u64) -> anyhow::Result<Option<UserSetting>>;

    /// Create the user's setting or overwrite its city.
    async fn upsert_city(&self, user_id: u64, city: &str) -> anyhow::Result<UserSetting>;

    /// Remove the user's setting. Returns whether one existed.
    async fn delete_setting(&self, user_id: u64) -> anyhow::Result<bool>;
}

/// Append-only request log.
#[async_trait]
pub trait LogStore: Send + Sync {
    async fn append_log(&self, entry: &NewLogEntry) -> anyhow::Result<LogRecord>;

    /// Matching rows newest first; `None` pagination returns every match.
    async fn query_logs(
        &self,
        filter: &LogFilter,
        pagination: Option<Pagination>,
    ) -> anyhow::Result<LogPage>;
}

#[async_trait]
impl SettingsStore for Database {
    async fn get_setting(&self, user_id: u64) -> anyhow::Result<Option<UserSetting>> {
        get_user_setting(self, user_id).await
    }

    async fn upsert_city(&self, user_id: u64, city: &str) -> anyhow::Result<UserSetting> {
        upsert_user_city(self, user_id, city).await
    }

    async fn delete_setting(&self, user_id: u64) -> anyhow::Result<bool> {
        delete_user_setting(self, user_id).await
    }
}

#[async_trait]
impl LogStore for Database {
    async fn append_log(&self, entry: &NewLogEntry) -> anyhow::Result<LogRecord> {
        insert_log_entry(self, entry).await
    }

    async fn query_logs(
        &self,
        filter: &LogFilter,
        pagination: Option<Pagination>,
    ) -> anyhow::Result<LogPage> {
        query_log_entries(self, filter, pagination).await
    }
}
