//! Persistence for chat contexts and the sequencer record.
//!
//! The handler only sees the [`ContextStore`] and [`SequencerStore`] traits.
//! Which backend sits behind them is decided once, when [`Storage::open`]
//! is called with a [`StorageBackend`].

mod file;
mod memory;
mod sqlite;

pub use file::JsonFileStore;
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use bot_database::{chat_context, Database};
use chrono::{DateTime, Utc};
use tracing::info;

use crate::context::ChatContext;
use crate::error::Result;

/// Per-chat context persistence.
#[async_trait]
pub trait ContextStore: Send + Sync {
    /// Load a chat's context. A chat never seen before yields an empty context.
    async fn load(&self, chat_id: i64) -> Result<ChatContext>;

    /// Replace a chat's stored context.
    async fn save(&self, chat_id: i64, context: &ChatContext) -> Result<()>;
}

/// Last processed update, shared by the whole deployment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SequencerState {
    pub last_event_id: i64,
    pub last_update_time: DateTime<Utc>,
}

impl SequencerState {
    /// A record that has seen nothing yet.
    pub fn fresh(now: DateTime<Utc>) -> Self {
        Self {
            last_event_id: 0,
            last_update_time: now,
        }
    }
}

/// Persistence of the singleton [`SequencerState`].
#[async_trait]
pub trait SequencerStore: Send + Sync {
    async fn load_state(&self) -> Result<Option<SequencerState>>;

    async fn save_state(&self, state: &SequencerState) -> Result<()>;
}

/// Where state is kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageBackend {
    /// Two JSON files on local disk.
    File {
        state_path: PathBuf,
        context_path: PathBuf,
    },
    /// A SQLite database.
    Sqlite { url: String },
    /// Process memory only.
    Memory,
}

impl StorageBackend {
    /// Short backend name for logs and health checks.
    pub fn name(&self) -> &'static str {
        match self {
            StorageBackend::File { .. } => "file",
            StorageBackend::Sqlite { .. } => "sqlite",
            StorageBackend::Memory => "memory",
        }
    }
}

/// Opened stores, both halves usually backed by the same object.
#[derive(Clone)]
pub struct Storage {
    pub contexts: Arc<dyn ContextStore>,
    pub sequencer: Arc<dyn SequencerStore>,
}

impl Storage {
    /// Open the configured backend, creating files or tables as needed.
    pub async fn open(backend: &StorageBackend) -> Result<Self> {
        match backend {
            StorageBackend::File {
                state_path,
                context_path,
            } => {
                info!(
                    "Using file storage: {} and {}",
                    state_path.display(),
                    context_path.display()
                );
                let store = Arc::new(JsonFileStore::open(state_path, context_path).await?);
                Ok(Self::shared(store))
            }
            StorageBackend::Sqlite { url } => {
                let db = Database::connect(url).await?;
                db.migrate().await?;
                let chats = chat_context::count_contexts(db.pool()).await?;
                info!("Using SQLite storage: {} ({} chats)", url, chats);
                Ok(Self::shared(Arc::new(SqliteStore::new(db))))
            }
            StorageBackend::Memory => {
                info!("Using in-memory storage");
                Ok(Self::shared(Arc::new(MemoryStore::new())))
            }
        }
    }

    /// Use one object for both halves.
    pub fn shared<S>(store: Arc<S>) -> Self
    where
        S: ContextStore + SequencerStore + 'static,
    {
        Self {
            contexts: store.clone(),
            sequencer: store,
        }
    }
}
