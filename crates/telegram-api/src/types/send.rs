//! Request parameter types for outbound Bot API methods.

use serde::Serialize;

use super::keyboard::{InlineKeyboardMarkup, ReplyKeyboardRemove, ReplyMarkup};

/// Default parse mode for outgoing text.
pub const DEFAULT_PARSE_MODE: &str = "HTML";

/// Escape `&`, `<` and `>` so arbitrary text survives [`DEFAULT_PARSE_MODE`].
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            c => escaped.push(c),
        }
    }
    escaped
}

/// Parameters for `sendMessage`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SendMessageParams {
    /// Target chat.
    pub chat_id: i64,

    /// Message text.
    pub text: String,

    /// Text formatting mode.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parse_mode: Option<String>,

    /// Keyboard to show with the message.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_markup: Option<ReplyMarkup>,
}

impl SendMessageParams {
    /// Create params for a plain HTML text message.
    pub fn text(chat_id: i64, text: impl Into<String>) -> Self {
        Self {
            chat_id,
            text: text.into(),
            parse_mode: Some(DEFAULT_PARSE_MODE.to_string()),
            reply_markup: None,
        }
    }

    /// Attach a keyboard.
    pub fn with_markup(mut self, markup: impl Into<ReplyMarkup>) -> Self {
        self.reply_markup = Some(markup.into());
        self
    }

    /// Remove any reply keyboard currently shown in the chat.
    pub fn removing_keyboard(self) -> Self {
        self.with_markup(ReplyKeyboardRemove::default())
    }
}

/// Parameters for `editMessageText`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EditMessageTextParams {
    /// Chat containing the message.
    pub chat_id: i64,

    /// Message to edit.
    pub message_id: i64,

    /// New text.
    pub text: String,

    /// Text formatting mode.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parse_mode: Option<String>,

    /// New inline keyboard. Omitting it removes the current one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_markup: Option<InlineKeyboardMarkup>,
}

impl EditMessageTextParams {
    /// Create params replacing the text of a message.
    pub fn new(chat_id: i64, message_id: i64, text: impl Into<String>) -> Self {
        Self {
            chat_id,
            message_id,
            text: text.into(),
            parse_mode: Some(DEFAULT_PARSE_MODE.to_string()),
            reply_markup: None,
        }
    }

    /// Attach an inline keyboard.
    pub fn with_markup(mut self, markup: InlineKeyboardMarkup) -> Self {
        self.reply_markup = Some(markup);
        self
    }
}

/// Parameters for `editMessageReplyMarkup`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EditMessageReplyMarkupParams {
    /// Chat containing the message.
    pub chat_id: i64,

    /// Message to edit.
    pub message_id: i64,

    /// New inline keyboard. Omitting it removes the current one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_markup: Option<InlineKeyboardMarkup>,
}

/// Parameters for `answerCallbackQuery`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnswerCallbackQueryParams {
    /// Callback query to answer.
    pub callback_query_id: String,

    /// Optional notification text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

/// Parameters for `getUpdates`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GetUpdatesParams {
    /// First update id to return.
    pub offset: i64,

    /// Maximum number of updates.
    pub limit: u32,

    /// Long-poll timeout in seconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::InlineKeyboardButton;
    use serde_json::json;

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("a < b && c > d"), "a &lt; b &amp;&amp; c &gt; d");
        assert_eq!(escape_html("בחרת בתאריך: 17/3/2025"), "בחרת בתאריך: 17/3/2025");
    }

    #[test]
    fn test_send_message_removing_keyboard() {
        let params = SendMessageParams::text(7, "Echo: hi").removing_keyboard();
        let value = serde_json::to_value(&params).unwrap();

        assert_eq!(
            value,
            json!({
                "chat_id": 7,
                "text": "Echo: hi",
                "parse_mode": "HTML",
                "reply_markup": {"remove_keyboard": true}
            })
        );
    }

    #[test]
    fn test_edit_message_text_without_markup() {
        let params = EditMessageTextParams::new(7, 42, "done");
        let value = serde_json::to_value(&params).unwrap();

        assert_eq!(
            value,
            json!({"chat_id": 7, "message_id": 42, "text": "done", "parse_mode": "HTML"})
        );
    }

    #[test]
    fn test_edit_message_text_with_markup() {
        let markup = InlineKeyboardMarkup::new(vec![vec![InlineKeyboardButton::new("x", "3")]]);
        let params = EditMessageTextParams::new(7, 42, "this is 123").with_markup(markup);
        let value = serde_json::to_value(&params).unwrap();

        assert_eq!(
            value["reply_markup"],
            json!({"inline_keyboard": [[{"text": "x", "callback_data": "3"}]]})
        );
    }
}
