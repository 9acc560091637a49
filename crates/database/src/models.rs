//! Database models.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Stored conversation context for a single chat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct ChatContextRecord {
    /// Telegram chat id, stored as text.
    pub chat_id: String,
    /// JSON-encoded context object.
    pub context: String,
    /// Last update timestamp.
    pub updated_at: String,
}

/// A named update-consumption record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct UpdateState {
    /// Record name (there is normally a single `last_update_time` row).
    pub name: String,
    /// Highest update id recorded.
    pub latest_update_id: i64,
    /// Unix timestamp (seconds, fractional) of the last recording.
    pub latest_update_time: f64,
}
