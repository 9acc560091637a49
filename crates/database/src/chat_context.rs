//! Chat context storage, one JSON document per chat.

use sqlx::SqlitePool;

use crate::models::ChatContextRecord;
use crate::Result;

/// Create or replace the context document for a chat.
pub async fn upsert_context(pool: &SqlitePool, chat_id: &str, context: &str) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO chat_contexts (chat_id, context)
        VALUES (?, ?)
        ON CONFLICT(chat_id) DO UPDATE SET
            context = excluded.context,
            updated_at = datetime('now')
        "#,
    )
    .bind(chat_id)
    .bind(context)
    .execute(pool)
    .await?;

    Ok(())
}

/// Get the context document for a chat.
pub async fn get_context(pool: &SqlitePool, chat_id: &str) -> Result<Option<ChatContextRecord>> {
    let record = sqlx::query_as::<_, ChatContextRecord>(
        r#"
        SELECT chat_id, context, updated_at
        FROM chat_contexts
        WHERE chat_id = ?
        "#,
    )
    .bind(chat_id)
    .fetch_optional(pool)
    .await?;

    Ok(record)
}

/// Count stored chat contexts.
pub async fn count_contexts(pool: &SqlitePool) -> Result<i64> {
    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM chat_contexts")
        .fetch_one(pool)
        .await?;

    Ok(count)
}
