//! Long polling of `getUpdates` for local runs without a public webhook.
//!
//! The next offset is kept in a small JSON file (`{"offset": N}`) so a
//! restarted poller does not replay updates Telegram already delivered.

use std::path::{Path, PathBuf};
use std::time::Duration;

use futures::stream::{self, Stream};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::client::BotClient;
use crate::error::ApiError;
use crate::types::{GetUpdatesParams, Update};

/// Default offset file name.
pub const DEFAULT_OFFSET_FILE: &str = "update_offset.json";

/// Configuration for the update poller.
#[derive(Debug, Clone)]
pub struct PollConfig {
    /// Where the next offset is persisted.
    pub offset_file: PathBuf,
    /// Pause before each `getUpdates` call.
    pub interval: Duration,
    /// Maximum updates per call.
    pub limit: u32,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            offset_file: PathBuf::from(DEFAULT_OFFSET_FILE),
            interval: Duration::from_secs(1),
            limit: 1,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct OffsetRecord {
    offset: i64,
}

/// Persisted `getUpdates` offset.
#[derive(Debug, Clone)]
pub struct OffsetFile {
    path: PathBuf,
}

impl OffsetFile {
    /// First offset used when no file exists yet.
    pub const INITIAL_OFFSET: i64 = 1;

    /// Use the offset file at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the offset file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the stored offset, creating the file with the initial offset if missing.
    pub async fn load(&self) -> Result<i64, ApiError> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => {
                let record: OffsetRecord = serde_json::from_slice(&bytes)?;
                Ok(record.offset)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                self.store(Self::INITIAL_OFFSET).await?;
                Ok(Self::INITIAL_OFFSET)
            }
            Err(e) => Err(ApiError::Offset(e)),
        }
    }

    /// Persist the next offset.
    pub async fn store(&self, offset: i64) -> Result<(), ApiError> {
        let json = serde_json::to_vec_pretty(&OffsetRecord { offset })?;
        tokio::fs::write(&self.path, json).await?;
        Ok(())
    }
}

/// Polls `getUpdates` and advances the persisted offset.
#[derive(Debug, Clone)]
pub struct UpdatePoller {
    client: BotClient,
    offset_file: OffsetFile,
    config: PollConfig,
}

impl UpdatePoller {
    /// Create a poller.
    pub fn new(client: BotClient, config: PollConfig) -> Self {
        Self {
            client,
            offset_file: OffsetFile::new(config.offset_file.clone()),
            config,
        }
    }

    /// Fetch the next batch of updates and advance the offset past them.
    pub async fn poll_once(&self) -> Result<Vec<Update>, ApiError> {
        tokio::time::sleep(self.config.interval).await;

        let offset = self.offset_file.load().await?;
        let params = GetUpdatesParams {
            offset,
            limit: self.config.limit,
            timeout: None,
        };
        let updates = self.client.get_updates(&params).await?;

        if let Some(last) = updates.iter().map(|u| u.update_id).max() {
            self.offset_file.store(last + 1).await?;
            debug!("Received {} update(s), next offset {}", updates.len(), last + 1);
        }

        Ok(updates)
    }

    /// Turn the poller into an endless stream of updates.
    ///
    /// Errors are yielded and polling continues with the next call.
    pub fn into_stream(self) -> impl Stream<Item = Result<Update, ApiError>> + Send {
        stream::unfold(
            (self, Vec::<Update>::new().into_iter()),
            |(poller, mut pending)| async move {
                loop {
                    if let Some(update) = pending.next() {
                        return Some((Ok(update), (poller, pending)));
                    }
                    match poller.poll_once().await {
                        Ok(updates) => pending = updates.into_iter(),
                        Err(e) => {
                            warn!("getUpdates failed: {}", e);
                            return Some((Err(e), (poller, pending)));
                        }
                    }
                }
            },
        )
    }
}
