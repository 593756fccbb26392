use anyhow::Context as _;

use crate::{
    database::Database,
    model::settings::{UserSetting, normalize_city},
};

#[derive(sqlx::FromRow)]
struct UserSettingRow {
    user_id: i64,
    city: Option<String>,
}

pub async fn get_user_setting(db: &Database, user_id: u64) -> anyhow::Result<Option<UserSetting>> {
    let user_id_i64 = i64::try_from(user_id).context("user_id out of i64 range")?;

    let row: Option<UserSettingRow> =
        sqlx::query_as("SELECT user_id, city FROM user_settings WHERE user_id = $1")
            .bind(user_id_i64)
            .fetch_optional(db.pool())
            .await?;

    row.map(to_user_setting).transpose()
}

pub async fn upsert_user_city(
    db: &Database,
    user_id: u64,
    city: &str,
) -> anyhow::Result<UserSetting> {
    let user_id_i64 = i64::try_from(user_id).context("user_id out of i64 range")?;
    let city = normalize_city(city).context("city must not be blank")?;

    let row: UserSettingRow = sqlx::query_as(
        "INSERT INTO user_settings (user_id, city)
         VALUES ($1, $2)
         ON CONFLICT (user_id) DO UPDATE SET city = EXCLUDED.city, updated_at = now()
         RETURNING user_id, city",
    )
    .bind(user_id_i64)
    .bind(city)
    .fetch_one(db.pool())
    .await?;

    to_user_setting(row)
}

pub async fn delete_user_setting(db: &Database, user_id: u64) -> anyhow::Result<bool> {
    let user_id_i64 = i64::try_from(user_id).context("user_id out of i64 range")?;

    let deleted = sqlx::query("DELETE FROM user_settings WHERE user_id = $1")
        .bind(user_id_i64)
        .execute(db.pool())
        .await?
        .rows_affected();

    Ok(deleted > 0)
}

fn to_user_setting(row: UserSettingRow) -> anyhow::Result<UserSetting> {
    let user_id = u64::try_from(row.user_id).context("user_id row out of u64 range")?;
    Ok(UserSetting::new(user_id, row.city.as_deref()))
}
