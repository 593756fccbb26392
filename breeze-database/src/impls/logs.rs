use anyhow::Context as _;
use chrono::{DateTime, Utc};
use sqlx::{Postgres, QueryBuilder};

use crate::{
    database::Database,
    model::logs::{LogFilter, LogPage, LogRecord, NewLogEntry, Pagination},
};

const LOG_COLUMNS: &str = "id, user_id, command, response, created_at";

#[derive(sqlx::FromRow)]
struct LogRow {
    id: i64,
    user_id: i64,
    command: String,
    response: String,
    created_at: DateTime<Utc>,
}

pub async fn insert_log_entry(db: &Database, entry: &NewLogEntry) -> anyhow::Result<LogRecord> {
    let user_id_i64 = i64::try_from(entry.user_id).context("user_id out of i64 range")?;

    let row: LogRow = sqlx::query_as(
        "INSERT INTO request_logs (user_id, command, response)
         VALUES ($1, $2, $3)
         RETURNING id, user_id, command, response, created_at",
    )
    .bind(user_id_i64)
    .bind(&entry.command)
    .bind(&entry.response)
    .fetch_one(db.pool())
    .await?;

    to_log_record(row)
}

/// Count the rows matching `filter` and fetch the requested page, newest first.
///
/// Without a pagination every matching row is returned.
pub async fn query_log_entries(
    db: &Database,
    filter: &LogFilter,
    pagination: Option<Pagination>,
) -> anyhow::Result<LogPage> {
    let mut count_query = count_logs_query(filter)?;
    let total_items: i64 = count_query
        .build_query_scalar::<i64>()
        .fetch_one(db.pool())
        .await
        .context("failed to count request logs")?;

    let mut page_query = select_logs_query(filter, pagination)?;
    let rows: Vec<LogRow> = page_query
        .build_query_as::<LogRow>()
        .fetch_all(db.pool())
        .await
        .context("failed to fetch request logs")?;

    let entries = rows
        .into_iter()
        .map(to_log_record)
        .collect::<anyhow::Result<Vec<_>>>()?;

    Ok(LogPage {
        total_items: u64::try_from(total_items).context("log count out of u64 range")?,
        entries,
    })
}

fn count_logs_query(filter: &LogFilter) -> anyhow::Result<QueryBuilder<'static, Postgres>> {
    let mut builder = QueryBuilder::new("SELECT COUNT(*) FROM request_logs");
    push_log_filter(&mut builder, filter)?;
    Ok(builder)
}

fn select_logs_query(
    filter: &LogFilter,
    pagination: Option<Pagination>,
) -> anyhow::Result<QueryBuilder<'static, Postgres>> {
    let mut builder = QueryBuilder::new(format!("SELECT {LOG_COLUMNS} FROM request_logs"));
    push_log_filter(&mut builder, filter)?;
    builder.push(" ORDER BY created_at DESC, id DESC");

    if let Some(pagination) = pagination {
        // Past BIGINT range every page is empty anyway.
        let limit = i64::try_from(pagination.per_page).unwrap_or(i64::MAX);
        let offset = i64::try_from(pagination.offset()).unwrap_or(i64::MAX);
        builder.push(" LIMIT ").push_bind(limit);
        builder.push(" OFFSET ").push_bind(offset);
    }

    Ok(builder)
}

fn push_log_filter(
    builder: &mut QueryBuilder<'static, Postgres>,
    filter: &LogFilter,
) -> anyhow::Result<()> {
    let mut separator = " WHERE ";

    if let Some(user_id) = filter.user_id {
        let user_id_i64 = i64::try_from(user_id).context("user_id out of i64 range")?;
        builder.push(separator).push("user_id = ").push_bind(user_id_i64);
        separator = " AND ";
    }

    if let Some(from) = filter.created_from {
        builder.push(separator).push("created_at >= ").push_bind(from);
        separator = " AND ";
    }

    if let Some(to) = filter.created_to {
        builder.push(separator).push("created_at <= ").push_bind(to);
    }

    Ok(())
}

fn to_log_record(row: LogRow) -> anyhow::Result<LogRecord> {
    Ok(LogRecord {
        id: u64::try_from(row.id).context("id row out of u64 range")?,
        user_id: u64::try_from(row.user_id).context("user_id row out of u64 range")?,
        command: row.command,
        response: row.response,
        created_at: row.created_at,
    })
}
