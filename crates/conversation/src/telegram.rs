//! [`Dispatcher`] backed by the Telegram Bot API.

use async_trait::async_trait;
use telegram_api::{
    escape_html, BotClient, EditMessageTextParams, InlineKeyboardMarkup, ReplyMarkup,
    SendMessageParams,
};
use tracing::debug;

use crate::dispatcher::Dispatcher;
use crate::error::Result;

/// Sends chat actions through a [`BotClient`].
///
/// Outgoing text is HTML-escaped, so user input such as `a < b` is shown
/// verbatim instead of being rejected by the Bot API.
#[derive(Clone)]
pub struct TelegramDispatcher {
    client: BotClient,
}

impl TelegramDispatcher {
    pub fn new(client: BotClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Dispatcher for TelegramDispatcher {
    async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        markup: Option<&ReplyMarkup>,
    ) -> Result<Option<i64>> {
        let params = SendMessageParams::text(chat_id, escape_html(text));
        let params = match markup {
            Some(markup) => params.with_markup(markup.clone()),
            None => params.removing_keyboard(),
        };
        let sent = self.client.send_message(&params).await?;
        debug!("Sent message {:?} to chat {}", sent.message_id, chat_id);
        Ok(sent.message_id)
    }

    async fn edit_message(
        &self,
        chat_id: i64,
        message_id: i64,
        text: Option<&str>,
        markup: Option<&InlineKeyboardMarkup>,
    ) -> Result<()> {
        match text {
            Some(text) => {
                let mut params = EditMessageTextParams::new(chat_id, message_id, escape_html(text));
                if let Some(markup) = markup {
                    params = params.with_markup(markup.clone());
                }
                self.client.edit_message_text(&params).await?;
            }
            None => {
                self.client
                    .edit_message_reply_markup(chat_id, message_id, markup.cloned())
                    .await?;
            }
        }
        Ok(())
    }

    async fn acknowledge_callback(&self, callback_id: &str) -> Result<()> {
        self.client.answer_callback_query(callback_id).await?;
        Ok(())
    }
}
