//! Keyboard markup types.

use serde::{Deserialize, Serialize};

/// A button on an inline keyboard that sends a callback payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InlineKeyboardButton {
    /// Label shown on the button.
    pub text: String,
    /// Opaque payload delivered back in the callback query.
    pub callback_data: String,
}

impl InlineKeyboardButton {
    /// Create a callback button.
    pub fn new(text: impl Into<String>, callback_data: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            callback_data: callback_data.into(),
        }
    }
}

/// Inline keyboard attached to a message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InlineKeyboardMarkup {
    /// Rows of buttons.
    pub inline_keyboard: Vec<Vec<InlineKeyboardButton>>,
}

impl InlineKeyboardMarkup {
    /// Create an inline keyboard from rows of buttons.
    pub fn new(rows: Vec<Vec<InlineKeyboardButton>>) -> Self {
        Self {
            inline_keyboard: rows,
        }
    }

    /// Iterate over every button, row by row.
    pub fn buttons(&self) -> impl Iterator<Item = &InlineKeyboardButton> {
        self.inline_keyboard.iter().flatten()
    }
}

/// A plain button on a reply keyboard; pressing it sends its label as text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyboardButton {
    /// Label, also the text sent when pressed.
    pub text: String,
}

/// Custom reply keyboard shown instead of the system keyboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplyKeyboardMarkup {
    /// Rows of buttons.
    pub keyboard: Vec<Vec<KeyboardButton>>,
    /// Hide the keyboard after one use.
    #[serde(default)]
    pub one_time_keyboard: bool,
}

impl ReplyKeyboardMarkup {
    /// Create a reply keyboard from rows of labels.
    pub fn from_labels<R, L>(rows: R, one_time_keyboard: bool) -> Self
    where
        R: IntoIterator,
        R::Item: IntoIterator<Item = L>,
        L: Into<String>,
    {
        let keyboard = rows
            .into_iter()
            .map(|row| {
                row.into_iter()
                    .map(|label| KeyboardButton { text: label.into() })
                    .collect()
            })
            .collect();

        Self {
            keyboard,
            one_time_keyboard,
        }
    }
}

/// Request to remove a previously shown reply keyboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplyKeyboardRemove {
    /// Always `true`.
    pub remove_keyboard: bool,
}

impl Default for ReplyKeyboardRemove {
    fn default() -> Self {
        Self {
            remove_keyboard: true,
        }
    }
}

/// Any markup accepted by `sendMessage`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ReplyMarkup {
    /// Inline keyboard with callback buttons.
    Inline(InlineKeyboardMarkup),
    /// Reply keyboard with plain labels.
    Reply(ReplyKeyboardMarkup),
    /// Remove the current reply keyboard.
    Remove(ReplyKeyboardRemove),
}

impl From<InlineKeyboardMarkup> for ReplyMarkup {
    fn from(markup: InlineKeyboardMarkup) -> Self {
        Self::Inline(markup)
    }
}

impl From<ReplyKeyboardMarkup> for ReplyMarkup {
    fn from(markup: ReplyKeyboardMarkup) -> Self {
        Self::Reply(markup)
    }
}

impl From<ReplyKeyboardRemove> for ReplyMarkup {
    fn from(markup: ReplyKeyboardRemove) -> Self {
        Self::Remove(markup)
    }
}
