//! SQLite tables through the `database` crate.

use async_trait::async_trait;
use bot_database::{chat_context, update_state, Database};

use super::{ContextStore, SequencerState, SequencerStore};
use crate::clock::{from_unix_seconds, to_unix_seconds};
use crate::context::ChatContext;
use crate::error::Result;

/// Contexts and sequencer state kept in SQLite.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    db: Database,
}

impl SqliteStore {
    /// Wrap a connected, migrated database.
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ContextStore for SqliteStore {
    async fn load(&self, chat_id: i64) -> Result<ChatContext> {
        let record = chat_context::get_context(self.db.pool(), &chat_id.to_string()).await?;
        match record {
            Some(record) => Ok(ChatContext::from_json(&record.context)?),
            None => Ok(ChatContext::new()),
        }
    }

    async fn save(&self, chat_id: i64, context: &ChatContext) -> Result<()> {
        let json = serde_json::to_string(context)?;
        chat_context::upsert_context(self.db.pool(), &chat_id.to_string(), &json).await?;
        Ok(())
    }
}

#[async_trait]
impl SequencerStore for SqliteStore {
    async fn load_state(&self) -> Result<Option<SequencerState>> {
        let record = update_state::get_state(self.db.pool(), update_state::LAST_UPDATE_RECORD).await?;
        Ok(record.and_then(|r| {
            from_unix_seconds(r.latest_update_time).map(|time| SequencerState {
                last_event_id: r.latest_update_id,
                last_update_time: time,
            })
        }))
    }

    async fn save_state(&self, state: &SequencerState) -> Result<()> {
        update_state::put_state(
            self.db.pool(),
            update_state::LAST_UPDATE_RECORD,
            state.last_event_id,
            to_unix_seconds(state.last_update_time),
        )
        .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;
    use serde_json::{json, Map};

    async fn database() -> Database {
        let db = Database::in_memory().await.unwrap();
        db.migrate().await.unwrap();
        db
    }

    async fn store() -> SqliteStore {
        SqliteStore::new(database().await)
    }

    #[tokio::test]
    async fn test_context_round_trip() {
        let store = store().await;
        assert!(store.load(5).await.unwrap().is_empty());

        let mut context = ChatContext::new();
        let mut partial = Map::new();
        partial.insert("previous_message".into(), json!("shalom"));
        context.merge(partial);
        store.save(5, &context).await.unwrap();

        assert_eq!(store.load(5).await.unwrap(), context);
    }

    #[tokio::test]
    async fn test_state_round_trip() {
        let store = store().await;
        assert!(store.load_state().await.unwrap().is_none());

        let state = SequencerState {
            last_event_id: 12,
            last_update_time: DateTime::from_timestamp(1_700_000_000, 0).unwrap(),
        };
        store.save_state(&state).await.unwrap();
        assert_eq!(store.load_state().await.unwrap(), Some(state));
    }

    #[tokio::test]
    async fn test_legacy_rows_are_folded() {
        let db = database().await;
        let store = SqliteStore::new(db.clone());
        chat_context::upsert_context(
            db.pool(),
            "8",
            r#"{"picking:3": true, "picked:3": {"year": "2025"}}"#,
        )
        .await
        .unwrap();

        let context = store.load(8).await.unwrap();
        assert!(context.memory().is_empty());
        assert_eq!(context.calendar(3).unwrap().year.as_deref(), Some("2025"));
    }
}
