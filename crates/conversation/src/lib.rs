//! Per-chat conversation state and the inline date picker.
//!
//! This crate provides the [`BotHandler`] type which takes Telegram updates
//! from the webhook or the poller and turns them into chat actions.
//!
//! # Features
//!
//! - Detects redelivered updates with a persisted sequencer record
//! - Keeps a free-form context per chat, written through on every change
//! - Drives a year → month → day picker with back and cancel buttons
//! - Serializes events of one chat with a per-chat lock
//! - Stores state in JSON files, SQLite or memory behind one interface
//!
//! # Architecture
//!
//! ```text
//! Update (webhook or getUpdates)
//!          ↓
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       BOT HANDLER                           │
//! │                                                             │
//! │  1. Sequencer admits and records update_id                  │
//! │         ↓                                                   │
//! │  2. Normalize message / callback into EventFacts            │
//! │         ↓                                                   │
//! │  3. Lock chat, load ChatContext, build Session              │
//! │         ↓                                                   │
//! │  4. Acknowledge callback                                    │
//! │         ↓                                                   │
//! │  5. Route:                                                  │
//! │     • picker callback → CalendarMachine step                │
//! │     • demo callback   → edit message                        │
//! │     • command / text  → reply, remember previous message    │
//! └─────────────────────────────────────────────────────────────┘
//!          ↓
//! Dispatcher (Telegram, logging, recording)
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use conversation::{BotHandler, HandlerConfig, LoggingDispatcher, Storage, StorageBackend, SystemClock};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let storage = Storage::open(&StorageBackend::Memory).await?;
//!     let handler = BotHandler::new(
//!         storage,
//!         Arc::new(LoggingDispatcher),
//!         Arc::new(SystemClock),
//!         HandlerConfig::default(),
//!     );
//!
//!     let update = serde_json::json!({
//!         "update_id": 1,
//!         "message": {"message_id": 1, "chat": {"id": 7}, "text": "/calendar"}
//!     });
//!     handler.handle_value(update).await?;
//!     Ok(())
//! }
//! ```

pub mod calendar;
mod clock;
mod context;
mod dispatcher;
mod error;
mod handler;
mod locks;
mod sequencer;
mod session;
pub mod store;
mod telegram;

pub use calendar::{
    picked_date, CalendarAction, CalendarLocale, CalendarMachine, CalendarPick, CancelPolicy,
    LocaleKind, PickState, StepOutcome,
};
pub use clock::{from_unix_seconds, to_unix_seconds, Clock, FixedClock, SystemClock};
pub use context::{ChatContext, CALENDAR_KEY};
pub use dispatcher::{
    log_delivery_failure, Dispatcher, LoggingDispatcher, NoOpDispatcher, OutboundCall,
    RecordingDispatcher,
};
pub use error::{BotError, Result};
pub use handler::{BotHandler, HandlerConfig, Outcome, PREVIOUS_MESSAGE_KEY};
pub use locks::ChatLocks;
pub use sequencer::{OrderingPolicy, UpdateSequencer, STALE_AFTER_DAYS};
pub use session::{CallbackFacts, EventFacts, Session};
pub use store::{
    ContextStore, JsonFileStore, MemoryStore, SequencerState, SequencerStore, SqliteStore,
    Storage, StorageBackend,
};
pub use telegram::TelegramDispatcher;
