//! Telegram calendar bot.
//!
//! Serves the Bot API webhook, or long-polls `getUpdates` when run with
//! `BOT_MODE=poll`.

mod config;
mod error;
mod poll;
mod routes;
mod state;

use std::sync::Arc;

use conversation::{BotHandler, Storage, SystemClock, TelegramDispatcher};
use telegram_api::{ApiConfig, BotClient};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::{BotMode, Config};
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Load configuration
    let config = Config::from_env()?;
    info!(mode = ?config.mode, storage = config.storage.name(), "Starting calendar bot");

    // Open storage
    let storage = Storage::open(&config.storage).await?;

    // Bot API client
    let client = BotClient::new(ApiConfig::new(&config.token).with_base_url(&config.api_url))?;
    let dispatcher = Arc::new(TelegramDispatcher::new(client.clone()));

    let handler = Arc::new(BotHandler::new(
        storage,
        dispatcher,
        Arc::new(SystemClock),
        config.handler,
    ));

    match config.mode {
        BotMode::Webhook => {
            let state = AppState::new(handler, config.storage.name());
            let app = routes::router().with_state(state);

            info!(addr = %config.addr, "Webhook server listening");
            let listener = tokio::net::TcpListener::bind(config.addr).await?;
            axum::serve(listener, app)
                .with_graceful_shutdown(shutdown_signal())
                .await?;
        }
        BotMode::Poll => {
            tokio::select! {
                _ = poll::run(client, handler, config.offset_file.clone()) => {}
                _ = shutdown_signal() => {}
            }
        }
    }

    info!("Calendar bot stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
