//! In-process store for tests and throwaway runs.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;

use super::{ContextStore, SequencerState, SequencerStore};
use crate::context::ChatContext;
use crate::error::{BotError, Result};

/// Keeps serialized contexts in a map, so every load decodes a fresh copy.
#[derive(Debug, Default)]
pub struct MemoryStore {
    contexts: RwLock<HashMap<i64, Value>>,
    state: RwLock<Option<SequencerState>>,
    unavailable: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every later operation fail with [`BotError::StorageUnavailable`].
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Number of chats with a stored context.
    pub async fn chat_count(&self) -> usize {
        self.contexts.read().await.len()
    }

    fn check(&self) -> Result<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(BotError::StorageUnavailable(
                "memory store marked unavailable".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl ContextStore for MemoryStore {
    async fn load(&self, chat_id: i64) -> Result<ChatContext> {
        self.check()?;
        match self.contexts.read().await.get(&chat_id) {
            Some(value) => Ok(ChatContext::from_value(value.clone())?),
            None => Ok(ChatContext::new()),
        }
    }

    async fn save(&self, chat_id: i64, context: &ChatContext) -> Result<()> {
        self.check()?;
        let value = context.to_value()?;
        self.contexts.write().await.insert(chat_id, value);
        Ok(())
    }
}

#[async_trait]
impl SequencerStore for MemoryStore {
    async fn load_state(&self) -> Result<Option<SequencerState>> {
        self.check()?;
        Ok(*self.state.read().await)
    }

    async fn save_state(&self, state: &SequencerState) -> Result<()> {
        self.check()?;
        *self.state.write().await = Some(*state);
        Ok(())
    }
}
