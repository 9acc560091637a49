//! Per-chat mutual exclusion around load-mutate-save.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// One async mutex per chat id, created on demand.
///
/// Two events for the same chat are handled one after the other; events for
/// different chats run concurrently. Entries nobody holds are pruned on the
/// next lock call.
#[derive(Debug, Default)]
pub struct ChatLocks {
    chats: Mutex<HashMap<i64, Arc<AsyncMutex<()>>>>,
}

impl ChatLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `chat_id`. Released when the guard drops.
    pub async fn lock(&self, chat_id: i64) -> OwnedMutexGuard<()> {
        let mutex = {
            let mut chats = self.chats.lock().unwrap_or_else(|e| e.into_inner());
            chats.retain(|_, m| Arc::strong_count(m) > 1);
            chats.entry(chat_id).or_default().clone()
        };
        mutex.lock_owned().await
    }

    /// Chats with a live lock entry.
    pub fn len(&self) -> usize {
        self.chats.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
