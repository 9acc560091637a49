//! One inbound event plus the chat's context.

use std::sync::Arc;

use serde_json::{Map, Value};
use telegram_api::{Message, Update};
use tracing::{debug, warn};

use crate::calendar::CalendarPick;
use crate::context::ChatContext;
use crate::dispatcher::Dispatcher;
use crate::error::{BotError, Result};
use crate::store::ContextStore;

/// The button press behind a callback event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallbackFacts {
    pub id: String,
    pub data: Option<String>,
}

/// Immutable facts of one inbound event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventFacts {
    pub update_id: i64,
    pub chat_id: i64,
    /// First name of the sender, empty when unknown.
    pub sender_name: String,
    /// For callbacks, the message carrying the pressed keyboard.
    pub message_id: i64,
    /// Message text, empty when the message has none.
    pub text: String,
    pub callback: Option<CallbackFacts>,
}

impl EventFacts {
    /// Normalize a message update or a callback update.
    pub fn from_update(update: &Update) -> Result<Self> {
        let (message, sender, callback) = match &update.callback_query {
            Some(query) => {
                let message = query.message.as_ref().ok_or_else(|| {
                    BotError::MalformedEvent(format!(
                        "callback {} carries no message",
                        query.id
                    ))
                })?;
                let callback = CallbackFacts {
                    id: query.id.clone(),
                    data: query.data.clone(),
                };
                (message, query.from.as_ref().or(message.from.as_ref()), Some(callback))
            }
            None => {
                let message = update.message.as_ref().ok_or_else(|| {
                    BotError::MalformedEvent(format!(
                        "update {} has neither message nor callback",
                        update.update_id
                    ))
                })?;
                (message, message.from.as_ref(), None)
            }
        };

        let (chat_id, message_id) = identify(message, update.update_id)?;

        Ok(Self {
            update_id: update.update_id,
            chat_id,
            sender_name: sender.map(|u| u.first_name.clone()).unwrap_or_default(),
            message_id,
            text: message.text.clone().unwrap_or_default(),
            callback,
        })
    }

    pub fn is_callback(&self) -> bool {
        self.callback.is_some()
    }
}

fn identify(message: &Message, update_id: i64) -> Result<(i64, i64)> {
    let chat_id = message
        .chat
        .as_ref()
        .map(|chat| chat.id)
        .ok_or_else(|| BotError::MalformedEvent(format!("update {} has no chat id", update_id)))?;
    let message_id = message.message_id.ok_or_else(|| {
        BotError::MalformedEvent(format!("update {} has no message id", update_id))
    })?;
    Ok((chat_id, message_id))
}

/// Per-event view of a chat: the event facts and a working copy of the
/// chat's context.
///
/// Every mutation is written through to the store before returning.
pub struct Session {
    facts: EventFacts,
    context: ChatContext,
    store: Arc<dyn ContextStore>,
}

impl Session {
    pub fn new(facts: EventFacts, context: ChatContext, store: Arc<dyn ContextStore>) -> Self {
        Self {
            facts,
            context,
            store,
        }
    }

    /// Load the chat's context and build a session around it.
    pub async fn open(facts: EventFacts, store: Arc<dyn ContextStore>) -> Result<Self> {
        let context = store.load(facts.chat_id).await?;
        debug!(
            "Loaded context for chat {} ({} keys, {} pickers)",
            facts.chat_id,
            context.memory().len(),
            context.calendar_count()
        );
        Ok(Self::new(facts, context, store))
    }

    pub fn facts(&self) -> &EventFacts {
        &self.facts
    }

    pub fn chat_id(&self) -> i64 {
        self.facts.chat_id
    }

    pub fn sender_name(&self) -> &str {
        &self.facts.sender_name
    }

    pub fn message_id(&self) -> i64 {
        self.facts.message_id
    }

    pub fn text(&self) -> &str {
        &self.facts.text
    }

    pub fn is_callback(&self) -> bool {
        self.facts.is_callback()
    }

    pub fn callback_id(&self) -> Option<&str> {
        self.facts.callback.as_ref().map(|c| c.id.as_str())
    }

    pub fn callback_data(&self) -> Option<&str> {
        self.facts.callback.as_ref().and_then(|c| c.data.as_deref())
    }

    pub fn context(&self) -> &ChatContext {
        &self.context
    }

    /// A free-form context value.
    pub fn memory_value(&self, key: &str) -> Option<&Value> {
        self.context.get(key)
    }

    /// Merge `partial` into the context and persist the whole context.
    pub async fn update_context(&mut self, partial: Map<String, Value>) -> Result<()> {
        self.context.merge(partial);
        self.flush().await
    }

    /// Replace the picker attached to `message_id` and persist.
    pub async fn set_calendar(&mut self, message_id: i64, pick: CalendarPick) -> Result<()> {
        self.context.set_calendar(message_id, pick);
        self.flush().await
    }

    /// Answer the callback behind this event, if any. Failures are logged.
    pub async fn acknowledge(&self, dispatcher: &dyn Dispatcher) {
        let Some(callback_id) = self.callback_id() else {
            return;
        };
        if let Err(e) = dispatcher.acknowledge_callback(callback_id).await {
            warn!("Failed to acknowledge callback {}: {}", callback_id, e);
        }
    }

    async fn flush(&self) -> Result<()> {
        self.store.save(self.facts.chat_id, &self.context).await
    }
}
