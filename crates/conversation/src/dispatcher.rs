//! Outbound chat actions.

use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use telegram_api::{InlineKeyboardMarkup, ReplyMarkup};
use tracing::{info, warn};

use crate::error::{BotError, Result};

/// Sends and edits chat messages.
///
/// Abstracted so the handler can run against Telegram, a log, or a recorder
/// in tests.
#[async_trait]
pub trait Dispatcher: Send + Sync {
    /// Send a new message. Without a keyboard, any reply keyboard shown to
    /// the user is removed.
    ///
    /// Text is plain; markup characters are escaped by the implementation.
    /// Returns the id of the sent message when the transport reports one.
    async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        markup: Option<&ReplyMarkup>,
    ) -> Result<Option<i64>>;

    /// Edit a message the bot sent earlier.
    ///
    /// With `text` set the text is replaced and the keyboard becomes `markup`;
    /// with `text` unset only the keyboard changes.
    async fn edit_message(
        &self,
        chat_id: i64,
        message_id: i64,
        text: Option<&str>,
        markup: Option<&InlineKeyboardMarkup>,
    ) -> Result<()>;

    /// Close a callback query so the client stops its spinner.
    async fn acknowledge_callback(&self, callback_id: &str) -> Result<()>;
}

/// Log a failed delivery and carry on.
pub fn log_delivery_failure<T>(result: Result<T>, action: &str) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            warn!("Failed to {}: {}", action, e);
            None
        }
    }
}

/// A dispatcher that discards everything.
#[derive(Debug, Clone, Default)]
pub struct NoOpDispatcher;

#[async_trait]
impl Dispatcher for NoOpDispatcher {
    async fn send_message(
        &self,
        _chat_id: i64,
        _text: &str,
        _markup: Option<&ReplyMarkup>,
    ) -> Result<Option<i64>> {
        Ok(None)
    }

    async fn edit_message(
        &self,
        _chat_id: i64,
        _message_id: i64,
        _text: Option<&str>,
        _markup: Option<&InlineKeyboardMarkup>,
    ) -> Result<()> {
        Ok(())
    }

    async fn acknowledge_callback(&self, _callback_id: &str) -> Result<()> {
        Ok(())
    }
}

/// A dispatcher that logs every action instead of sending it.
#[derive(Debug, Clone, Default)]
pub struct LoggingDispatcher;

#[async_trait]
impl Dispatcher for LoggingDispatcher {
    async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        markup: Option<&ReplyMarkup>,
    ) -> Result<Option<i64>> {
        let keyboard = if markup.is_some() { "with" } else { "without" };
        info!("Sending message to {} ({} keyboard): {}", chat_id, keyboard, text);
        Ok(None)
    }

    async fn edit_message(
        &self,
        chat_id: i64,
        message_id: i64,
        text: Option<&str>,
        markup: Option<&InlineKeyboardMarkup>,
    ) -> Result<()> {
        match text {
            Some(text) => info!("Editing message {} in {}: {}", message_id, chat_id, text),
            None => info!(
                "Replacing keyboard of message {} in {} ({} buttons)",
                message_id,
                chat_id,
                markup.map_or(0, |m| m.buttons().count())
            ),
        }
        Ok(())
    }

    async fn acknowledge_callback(&self, callback_id: &str) -> Result<()> {
        info!("Acknowledging callback {}", callback_id);
        Ok(())
    }
}

/// One captured outbound action.
#[derive(Debug, Clone, PartialEq)]
pub enum OutboundCall {
    Send {
        chat_id: i64,
        text: String,
        markup: Option<ReplyMarkup>,
    },
    Edit {
        chat_id: i64,
        message_id: i64,
        text: Option<String>,
        markup: Option<InlineKeyboardMarkup>,
    },
    Acknowledge {
        callback_id: String,
    },
}

/// A dispatcher that records calls, for tests.
///
/// Sent messages get ids counting up from [`RecordingDispatcher::FIRST_MESSAGE_ID`].
/// When failing, calls are still recorded but return
/// [`BotError::OutboundDeliveryFailed`].
#[derive(Debug)]
pub struct RecordingDispatcher {
    calls: Mutex<Vec<OutboundCall>>,
    failing: AtomicBool,
    next_message_id: AtomicI64,
}

impl Default for RecordingDispatcher {
    fn default() -> Self {
        Self {
            calls: Mutex::default(),
            failing: AtomicBool::new(false),
            next_message_id: AtomicI64::new(Self::FIRST_MESSAGE_ID),
        }
    }
}

impl RecordingDispatcher {
    pub const FIRST_MESSAGE_ID: i64 = 1000;

    pub fn new() -> Self {
        Self::default()
    }

    /// Make every later call fail.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Calls recorded so far.
    pub fn calls(&self) -> Vec<OutboundCall> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Drain the recorded calls.
    pub fn take(&self) -> Vec<OutboundCall> {
        std::mem::take(&mut *self.calls.lock().unwrap_or_else(|e| e.into_inner()))
    }

    fn record(&self, call: OutboundCall) -> Result<()> {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(call);
        if self.failing.load(Ordering::SeqCst) {
            return Err(BotError::OutboundDeliveryFailed(
                "recording dispatcher set to fail".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl Dispatcher for RecordingDispatcher {
    async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        markup: Option<&ReplyMarkup>,
    ) -> Result<Option<i64>> {
        self.record(OutboundCall::Send {
            chat_id,
            text: text.to_string(),
            markup: markup.cloned(),
        })?;
        Ok(Some(self.next_message_id.fetch_add(1, Ordering::SeqCst)))
    }

    async fn edit_message(
        &self,
        chat_id: i64,
        message_id: i64,
        text: Option<&str>,
        markup: Option<&InlineKeyboardMarkup>,
    ) -> Result<()> {
        self.record(OutboundCall::Edit {
            chat_id,
            message_id,
            text: text.map(String::from),
            markup: markup.cloned(),
        })
    }

    async fn acknowledge_callback(&self, callback_id: &str) -> Result<()> {
        self.record(OutboundCall::Acknowledge {
            callback_id: callback_id.to_string(),
        })
    }
}
