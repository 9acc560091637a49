//! Telegram Bot API client library.
//!
//! This crate provides a Rust client for the Telegram Bot API over HTTP.
//! It supports:
//!
//! - Sending messages with reply or inline keyboards
//! - Editing message text and inline keyboards
//! - Answering callback queries
//! - Receiving updates by long polling, with a persisted offset
//!
//! # Example
//!
//! ```no_run
//! use telegram_api::{ApiConfig, BotClient, PollConfig, SendMessageParams, UpdatePoller};
//!
//! # async fn example() -> Result<(), telegram_api::ApiError> {
//! let client = BotClient::connect(ApiConfig::new("123:token")).await?;
//!
//! // Send a message
//! let params = SendMessageParams::text(12345, "Hello!");
//! let sent = client.send_message(&params).await?;
//! println!("Sent message {:?}", sent.message_id);
//!
//! // Poll for incoming updates
//! use futures::StreamExt;
//! let mut updates = Box::pin(UpdatePoller::new(client, PollConfig::default()).into_stream());
//! while let Some(result) = updates.next().await {
//!     match result {
//!         Ok(update) => println!("Update {}", update.update_id),
//!         Err(e) => eprintln!("Error: {}", e),
//!     }
//! }
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod poll;
pub mod types;

pub use client::BotClient;
pub use config::{ApiConfig, DEFAULT_API_URL};
pub use error::ApiError;
pub use poll::{OffsetFile, PollConfig, UpdatePoller, DEFAULT_OFFSET_FILE};
pub use types::*;
