//! JSON files on local disk.

use std::collections::{BTreeMap, HashMap};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex as StdMutex, OnceLock};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tempfile::NamedTempFile;
use tokio::fs;
use tokio::sync::Mutex;
use tracing::{debug, info};

use super::{ContextStore, SequencerState, SequencerStore};
use crate::clock::{from_unix_seconds, to_unix_seconds};
use crate::context::ChatContext;
use crate::error::{BotError, Result};

/// Layout of the context file.
#[derive(Debug, Default, Serialize, Deserialize)]
struct ContextFile {
    #[serde(default)]
    chats: BTreeMap<String, Value>,
}

/// Layout of the sequencer file.
#[derive(Debug, Serialize, Deserialize)]
struct StateFile {
    latest_update_id: i64,
    /// Unix seconds.
    latest_update_time: f64,
}

/// Contexts and sequencer state kept in two JSON files.
///
/// Every write goes to a uniquely named temporary sibling that is then
/// renamed over the target, so readers never see a torn file, not even with
/// several writers on the same paths.
///
/// One mutex covers both files. It is shared by every store opened on the
/// same context file in this process, so their read-modify-write cycles do
/// not lose each other's chats. Separate processes are not coordinated: the
/// last whole-file write wins.
#[derive(Debug)]
pub struct JsonFileStore {
    state_path: PathBuf,
    context_path: PathBuf,
    lock: Arc<Mutex<()>>,
}

/// Locks of every context file opened in this process.
fn path_lock(path: &Path) -> Arc<Mutex<()>> {
    static LOCKS: OnceLock<StdMutex<HashMap<PathBuf, Arc<Mutex<()>>>>> = OnceLock::new();
    let mut locks = LOCKS
        .get_or_init(Default::default)
        .lock()
        .unwrap_or_else(|e| e.into_inner());
    locks.entry(path.to_path_buf()).or_default().clone()
}

impl JsonFileStore {
    /// Open the store, creating an empty context file if none exists.
    pub async fn open(state_path: impl Into<PathBuf>, context_path: impl Into<PathBuf>) -> Result<Self> {
        let state_path = state_path.into();
        let context_path = context_path.into();
        ensure_parent(&state_path).await?;
        ensure_parent(&context_path).await?;

        let lock = path_lock(&lock_key(&context_path).await?);
        let store = Self {
            state_path,
            context_path,
            lock,
        };
        {
            let _guard = store.lock.lock().await;
            if fs::try_exists(&store.context_path).await? {
                debug!("Context file {} exists", store.context_path.display());
            } else {
                info!("Creating context file {}", store.context_path.display());
                write_json(&store.context_path, &ContextFile::default()).await?;
            }
        }

        Ok(store)
    }

    pub fn state_path(&self) -> &Path {
        &self.state_path
    }

    pub fn context_path(&self) -> &Path {
        &self.context_path
    }

    async fn read_contexts(&self) -> Result<ContextFile> {
        match read_optional(&self.context_path).await? {
            Some(bytes) => Ok(serde_json::from_slice(&bytes)?),
            None => Ok(ContextFile::default()),
        }
    }
}

#[async_trait]
impl ContextStore for JsonFileStore {
    async fn load(&self, chat_id: i64) -> Result<ChatContext> {
        let _guard = self.lock.lock().await;
        let mut file = self.read_contexts().await?;
        match file.chats.remove(&chat_id.to_string()) {
            Some(value) => Ok(ChatContext::from_value(value)?),
            None => Ok(ChatContext::new()),
        }
    }

    async fn save(&self, chat_id: i64, context: &ChatContext) -> Result<()> {
        let _guard = self.lock.lock().await;
        let mut file = self.read_contexts().await?;
        file.chats.insert(chat_id.to_string(), context.to_value()?);
        write_json(&self.context_path, &file).await
    }
}

#[async_trait]
impl SequencerStore for JsonFileStore {
    async fn load_state(&self) -> Result<Option<SequencerState>> {
        let _guard = self.lock.lock().await;
        let Some(bytes) = read_optional(&self.state_path).await? else {
            return Ok(None);
        };
        let file: StateFile = serde_json::from_slice(&bytes)?;
        Ok(from_unix_seconds(file.latest_update_time).map(|time| SequencerState {
            last_event_id: file.latest_update_id,
            last_update_time: time,
        }))
    }

    async fn save_state(&self, state: &SequencerState) -> Result<()> {
        let _guard = self.lock.lock().await;
        let file = StateFile {
            latest_update_id: state.last_event_id,
            latest_update_time: to_unix_seconds(state.last_update_time),
        };
        write_json(&self.state_path, &file).await
    }
}

/// Read a file, treating a missing or empty file as absent.
async fn read_optional(path: &Path) -> Result<Option<Vec<u8>>> {
    match fs::read(path).await {
        Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => Ok(None),
        Ok(bytes) => Ok(Some(bytes)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

async fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let bytes = serde_json::to_vec_pretty(value)?;
    let path = path.to_path_buf();
    tokio::task::spawn_blocking(move || replace_file(&path, &bytes))
        .await
        .map_err(|e| BotError::StorageUnavailable(format!("file writer stopped: {}", e)))?
}

/// Write `bytes` to a fresh temporary file next to `path` and rename it into place.
fn replace_file(path: &Path, bytes: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut temp = NamedTempFile::new_in(dir)?;
    temp.write_all(bytes)?;
    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// Absolute form of `path` so two spellings of one file share a lock.
async fn lock_key(path: &Path) -> Result<PathBuf> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let dir = fs::canonicalize(dir).await?;
    Ok(match path.file_name() {
        Some(name) => dir.join(name),
        None => dir,
    })
}

async fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).await?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::CalendarPick;
    use chrono::DateTime;
    use serde_json::{json, Map};
    use tempfile::TempDir;

    async fn open(dir: &TempDir) -> JsonFileStore {
        JsonFileStore::open(dir.path().join("storage.json"), dir.path().join("context.json"))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_open_initializes_context_file() {
        let dir = TempDir::new().unwrap();
        let store = open(&dir).await;

        let raw = std::fs::read_to_string(store.context_path()).unwrap();
        let value: Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value, json!({"chats": {}}));
        assert!(store.load_state().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_context_round_trip() {
        let dir = TempDir::new().unwrap();
        let store = open(&dir).await;

        let mut context = ChatContext::new();
        let mut partial = Map::new();
        partial.insert("previous_message".into(), json!("hi"));
        context.merge(partial);
        context.set_calendar(42, CalendarPick::started());
        store.save(99, &context).await.unwrap();

        let reopened = open(&dir).await;
        assert_eq!(reopened.load(99).await.unwrap(), context);
        assert!(reopened.load(100).await.unwrap().is_empty());

        let raw: Value =
            serde_json::from_str(&std::fs::read_to_string(reopened.context_path()).unwrap()).unwrap();
        assert_eq!(raw["chats"]["99"]["previous_message"], json!("hi"));
    }

    #[tokio::test]
    async fn test_state_file_layout() {
        let dir = TempDir::new().unwrap();
        let store = open(&dir).await;
        let state = SequencerState {
            last_event_id: 77,
            last_update_time: DateTime::from_timestamp(1_700_000_000, 500_000_000).unwrap(),
        };
        store.save_state(&state).await.unwrap();

        let raw: Value =
            serde_json::from_str(&std::fs::read_to_string(store.state_path()).unwrap()).unwrap();
        assert_eq!(raw["latest_update_id"], json!(77));
        assert_eq!(raw["latest_update_time"], json!(1_700_000_000.5));
        assert_eq!(store.load_state().await.unwrap(), Some(state));
    }

    #[tokio::test]
    async fn test_corrupt_file_is_storage_error() {
        let dir = TempDir::new().unwrap();
        let store = open(&dir).await;
        std::fs::write(store.context_path(), "{not json").unwrap();

        let result = store.load(1).await;
        assert!(matches!(
            result,
            Err(crate::error::BotError::StorageUnavailable(_))
        ));
    }

    #[tokio::test]
    async fn test_writes_leave_no_temp_files() {
        let dir = TempDir::new().unwrap();
        let store = open(&dir).await;
        store.save(1, &ChatContext::new()).await.unwrap();
        store
            .save_state(&SequencerState::fresh(chrono::Utc::now()))
            .await
            .unwrap();

        let mut names: Vec<String> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        assert_eq!(names, vec!["context.json", "storage.json"]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_two_stores_on_same_files_keep_every_chat() {
        let dir = TempDir::new().unwrap();
        let first = Arc::new(open(&dir).await);
        // Same file, spelled differently
        let second = Arc::new(
            JsonFileStore::open(
                dir.path().join("storage.json"),
                dir.path().join(".").join("context.json"),
            )
            .await
            .unwrap(),
        );

        let tasks: Vec<_> = (0..200i64)
            .map(|chat_id| {
                let store = if chat_id % 2 == 0 { first.clone() } else { second.clone() };
                tokio::spawn(async move {
                    let mut context = ChatContext::new();
                    let mut partial = Map::new();
                    partial.insert("n".into(), json!(chat_id));
                    context.merge(partial);
                    store.save(chat_id, &context).await
                })
            })
            .collect();
        for task in tasks {
            task.await.unwrap().unwrap();
        }

        let reopened = open(&dir).await;
        for chat_id in 0..200i64 {
            let context = reopened.load(chat_id).await.unwrap();
            assert_eq!(context.get("n"), Some(&json!(chat_id)), "chat {chat_id}");
        }
    }
}
