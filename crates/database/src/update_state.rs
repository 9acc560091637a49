//! Update-consumption state (last processed update id and time).

use sqlx::SqlitePool;

use crate::models::UpdateState;
use crate::Result;

/// Name of the singleton row used by the bot.
pub const LAST_UPDATE_RECORD: &str = "last_update_time";

/// Create or replace a named update-state record.
pub async fn put_state(
    pool: &SqlitePool,
    name: &str,
    latest_update_id: i64,
    latest_update_time: f64,
) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO update_state (name, latest_update_id, latest_update_time)
        VALUES (?, ?, ?)
        ON CONFLICT(name) DO UPDATE SET
            latest_update_id = excluded.latest_update_id,
            latest_update_time = excluded.latest_update_time
        "#,
    )
    .bind(name)
    .bind(latest_update_id)
    .bind(latest_update_time)
    .execute(pool)
    .await?;

    Ok(())
}

/// Get a named update-state record.
pub async fn get_state(pool: &SqlitePool, name: &str) -> Result<Option<UpdateState>> {
    let record = sqlx::query_as::<_, UpdateState>(
        r#"
        SELECT name, latest_update_id, latest_update_time
        FROM update_state
        WHERE name = ?
        "#,
    )
    .bind(name)
    .fetch_optional(pool)
    .await?;

    Ok(record)
}
