//! Request handlers for the log query endpoints.

use axum::Json;
use axum::extract::{Path, Query, State};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{error, warn};

use breeze_database::model::logs::{LogFilter, LogPage, LogRecord, Pagination};
use breeze_utils::pagination::total_pages;
use breeze_utils::parse::{parse_date_bound, parse_positive_int};

use crate::error::ApiError;
use crate::state::AppState;

// =============================================================================
// Query parameter types
// =============================================================================

/// Raw query parameters. Kept as strings so a malformed `page` or `limit`
/// falls back to the endpoint defaults instead of rejecting the request.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogsParams {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

/// How an endpoint treats a missing or invalid `page`/`limit`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PageDefaults {
    /// Paginate only when both values are valid, otherwise return every row.
    Unpaginated,
    /// Substitute the given value for each missing or invalid one.
    Fallback { page: u64, limit: u64 },
}

pub const ALL_LOGS_PAGING: PageDefaults = PageDefaults::Unpaginated;
pub const USER_LOGS_PAGING: PageDefaults = PageDefaults::Fallback { page: 1, limit: 10 };

impl LogsParams {
    fn pagination(&self, defaults: PageDefaults) -> Option<Pagination> {
        let page = self.page.as_deref().and_then(parse_positive_int);
        let limit = self.limit.as_deref().and_then(parse_positive_int);

        match defaults {
            PageDefaults::Unpaginated => Pagination::new(page?, limit?),
            PageDefaults::Fallback {
                page: default_page,
                limit: default_limit,
            } => Pagination::new(page.unwrap_or(default_page), limit.unwrap_or(default_limit)),
        }
    }

    fn filter(&self, user_id: Option<u64>) -> Result<LogFilter, ApiError> {
        Ok(LogFilter {
            user_id,
            created_from: date_bound("startDate", self.start_date.as_deref())?,
            created_to: date_bound("endDate", self.end_date.as_deref())?,
        })
    }
}

fn date_bound(name: &str, raw: Option<&str>) -> Result<Option<DateTime<Utc>>, ApiError> {
    let Some(raw) = raw.map(str::trim).filter(|raw| !raw.is_empty()) else {
        return Ok(None);
    };

    match parse_date_bound(raw) {
        Some(bound) => Ok(Some(bound)),
        None => {
            warn!(parameter = name, value = raw, "rejected log query date");
            Err(ApiError::BadRequest(format!(
                "Invalid {name}: expected an ISO 8601 date"
            )))
        }
    }
}

// =============================================================================
// Response types
// =============================================================================

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogsResponse {
    pub total_items: u64,
    pub total_pages: u64,
    pub current_page: u64,
    pub logs: Vec<LogRecord>,
}

impl LogsResponse {
    fn new(page: LogPage, pagination: Option<Pagination>) -> Self {
        let (total_pages, current_page) = match pagination {
            Some(pagination) => (
                total_pages(page.total_items, pagination.per_page),
                pagination.page,
            ),
            None => (1, 1),
        };

        Self {
            total_items: page.total_items,
            total_pages,
            current_page,
            logs: page.entries,
        }
    }
}

// =============================================================================
// Handlers
// =============================================================================

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

/// `GET /logs`
pub async fn list_logs(
    State(state): State<AppState>,
    Query(params): Query<LogsParams>,
) -> Result<Json<LogsResponse>, ApiError> {
    let filter = params.filter(None)?;
    let pagination = params.pagination(ALL_LOGS_PAGING);

    let page = state
        .logs
        .query_logs(&filter, pagination)
        .await
        .map_err(|source| {
            error!(error = ?source, "failed to fetch request logs");
            ApiError::Internal
        })?;

    Ok(Json(LogsResponse::new(page, pagination)))
}

/// `GET /logs/{user_id}`
pub async fn list_user_logs(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Query(params): Query<LogsParams>,
) -> Result<Json<LogsResponse>, ApiError> {
    let user_id = user_id.trim().parse::<u64>().map_err(|_| {
        warn!(parameter = "userId", value = %user_id, "rejected log query user id");
        ApiError::BadRequest("Invalid userId: expected a numeric id".to_owned())
    })?;
    let filter = params.filter(Some(user_id))?;
    let pagination = params.pagination(USER_LOGS_PAGING);

    let page = state
        .logs
        .query_logs(&filter, pagination)
        .await
        .map_err(|source| {
            error!(error = ?source, user_id, "failed to fetch user request logs");
            ApiError::Internal
        })?;

    Ok(Json(LogsResponse::new(page, pagination)))
}

#[cfg(test)]
mod tests {
    use super::{LogsParams, PageDefaults, USER_LOGS_PAGING};
    use breeze_database::model::logs::Pagination;

    fn params(page: Option<&str>, limit: Option<&str>) -> LogsParams {
        LogsParams {
            page: page.map(str::to_owned),
            limit: limit.map(str::to_owned),
            ..LogsParams::default()
        }
    }

    #[test]
    fn unpaginated_needs_both_values() {
        let defaults = PageDefaults::Unpaginated;
        assert_eq!(params(Some("2"), None).pagination(defaults), None);
        assert_eq!(params(Some("2"), Some("abc")).pagination(defaults), None);
        assert_eq!(params(Some("0"), Some("5")).pagination(defaults), None);
        assert_eq!(
            params(Some("2"), Some("5")).pagination(defaults),
            Pagination::new(2, 5)
        );
    }

    #[test]
    fn fallback_fills_each_value_independently() {
        assert_eq!(params(None, None).pagination(USER_LOGS_PAGING), Pagination::new(1, 10));
        assert_eq!(
            params(Some("3"), Some("-1")).pagination(USER_LOGS_PAGING),
            Pagination::new(3, 10)
        );
        assert_eq!(
            params(Some("x"), Some("25")).pagination(USER_LOGS_PAGING),
            Pagination::new(1, 25)
        );
    }

    #[test]
    fn blank_dates_are_ignored() {
        let params = LogsParams {
            start_date: Some("  ".to_owned()),
            ..LogsParams::default()
        };
        assert_eq!(params.filter(None).map(|f| f.created_from).ok(), Some(None));
    }

    #[test]
    fn malformed_dates_are_rejected() {
        let params = LogsParams {
            end_date: Some("yesterday".to_owned()),
            ..LogsParams::default()
        };
        assert!(params.filter(None).is_err());
    }
}
