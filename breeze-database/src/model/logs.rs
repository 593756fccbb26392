use chrono::{DateTime, Utc};
use serde::Serialize;

use breeze_utils::pagination::page_offset;

/// An audit entry waiting to be written; the store stamps its creation time.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewLogEntry {
    pub user_id: u64,
    pub command: String,
    pub response: String,
}

impl NewLogEntry {
    pub fn new(user_id: u64, command: impl Into<String>, response: impl Into<String>) -> Self {
        Self {
            user_id,
            command: command.into(),
            response: response.into(),
        }
    }
}

/// A stored audit entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogRecord {
    pub id: u64,
    pub user_id: u64,
    pub command: String,
    pub response: String,
    pub created_at: DateTime<Utc>,
}

/// Row filter for log queries. Date bounds are inclusive.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LogFilter {
    pub user_id: Option<u64>,
    pub created_from: Option<DateTime<Utc>>,
    pub created_to: Option<DateTime<Utc>>,
}

impl LogFilter {
    pub fn for_user(user_id: u64) -> Self {
        Self {
            user_id: Some(user_id),
            ..Self::default()
        }
    }

    pub fn matches(&self, record: &LogRecord) -> bool {
        if self.user_id.is_some_and(|user_id| user_id != record.user_id) {
            return false;
        }

        if self
            .created_from
            .is_some_and(|from| record.created_at < from)
        {
            return false;
        }

        !self.created_to.is_some_and(|to| record.created_at > to)
    }
}

/// A 1-indexed page request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Pagination {
    pub page: u64,
    pub per_page: u64,
}

impl Pagination {
    /// Returns `None` unless both the page and the page size are at least 1.
    pub fn new(page: u64, per_page: u64) -> Option<Self> {
        (page >= 1 && per_page >= 1).then_some(Self { page, per_page })
    }

    pub fn offset(&self) -> u64 {
        page_offset(self.page, self.per_page)
    }
}

/// One page of log entries plus the number of rows matching the filter.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LogPage {
    pub total_items: u64,
    pub entries: Vec<LogRecord>,
}
