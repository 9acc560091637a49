//! Inbound update types delivered by webhook or `getUpdates`.
//!
//! Fields that the bot cannot work without (chat, message id) are still
//! optional here so that a partial payload deserializes and can be rejected
//! with a precise error further up.

use serde::{Deserialize, Serialize};

use super::keyboard::InlineKeyboardMarkup;

/// A single inbound update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Update {
    /// Monotonic update identifier assigned by Telegram.
    pub update_id: i64,

    /// New incoming message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<Message>,

    /// Inline keyboard button press.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub callback_query: Option<CallbackQuery>,
}

impl Update {
    /// Whether this update carries a callback query.
    pub fn is_callback_query(&self) -> bool {
        self.callback_query.is_some()
    }
}

/// A chat message.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Message identifier, unique inside the chat.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_id: Option<i64>,

    /// Sender, absent for channel posts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<User>,

    /// Conversation the message belongs to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chat: Option<Chat>,

    /// Unix time the message was sent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<i64>,

    /// Text content.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    /// Inline keyboard attached to the message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply_markup: Option<InlineKeyboardMarkup>,
}

/// A Telegram user or bot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// User identifier.
    pub id: i64,

    /// Whether this user is a bot.
    #[serde(default)]
    pub is_bot: bool,

    /// First name.
    #[serde(default)]
    pub first_name: String,

    /// Username without the leading `@`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

/// A chat.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chat {
    /// Chat identifier.
    pub id: i64,

    /// Chat type ("private", "group", "supergroup" or "channel").
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

/// A button press on an inline keyboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallbackQuery {
    /// Callback identifier, required to answer the query.
    pub id: String,

    /// User who pressed the button.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<User>,

    /// Message the keyboard was attached to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<Message>,

    /// Payload of the pressed button.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
}

/// Response envelope for every Bot API method.
#[derive(Debug, Deserialize)]
pub struct ApiResponse<T> {
    /// Whether the request succeeded.
    pub ok: bool,

    /// Method result on success.
    pub result: Option<T>,

    /// Human-readable error description.
    #[serde(default)]
    pub description: Option<String>,

    /// Error code on failure.
    #[serde(default)]
    pub error_code: Option<i32>,
}

/// Result of an edit method: the edited message, or `true` for inline messages.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum EditResult {
    /// The edited message.
    Message(Box<Message>),
    /// Edit applied to an inline message.
    Done(bool),
}
