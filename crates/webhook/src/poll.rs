//! Local polling mode.

use std::path::PathBuf;
use std::sync::Arc;

use conversation::{BotError, BotHandler};
use futures::StreamExt;
use telegram_api::{BotClient, PollConfig, UpdatePoller};
use tracing::{error, info, warn};

/// Feed `getUpdates` results through the handler until the process is stopped.
///
/// Failed polls and failed updates are logged and polling carries on.
pub async fn run(client: BotClient, handler: Arc<BotHandler>, offset_file: PathBuf) {
    info!("Polling for updates, offset file {}", offset_file.display());

    let config = PollConfig {
        offset_file,
        ..PollConfig::default()
    };
    let mut updates = Box::pin(UpdatePoller::new(client, config).into_stream());

    while let Some(result) = updates.next().await {
        let update = match result {
            Ok(update) => update,
            // Already logged by the poller
            Err(_) => continue,
        };

        match handler.handle(&update).await {
            Ok(outcome) => info!("Update {}: {:?}", update.update_id, outcome),
            Err(BotError::StorageUnavailable(e)) => {
                error!("Update {} lost, storage unavailable: {}", update.update_id, e)
            }
            Err(e) => warn!("Update {} failed: {}", update.update_id, e),
        }
    }
}
