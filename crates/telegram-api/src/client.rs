//! Bot API HTTP client.

use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info};

use crate::config::ApiConfig;
use crate::error::ApiError;
use crate::types::{
    AnswerCallbackQueryParams, ApiResponse, EditMessageReplyMarkupParams, EditMessageTextParams,
    EditResult, GetUpdatesParams, InlineKeyboardMarkup, Message, SendMessageParams, Update, User,
};

/// Client for the Telegram Bot API.
#[derive(Clone)]
pub struct BotClient {
    http: Client,
    config: ApiConfig,
}

impl BotClient {
    /// Create a client. No request is made until the first call.
    pub fn new(config: ApiConfig) -> Result<Self, ApiError> {
        if config.token.is_empty() {
            return Err(ApiError::Config("bot token cannot be empty".to_string()));
        }

        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(ApiError::Http)?;

        Ok(Self { http, config })
    }

    /// Create a client and verify the token with `getMe`.
    pub async fn connect(config: ApiConfig) -> Result<Self, ApiError> {
        let client = Self::new(config)?;
        let me = client.get_me().await?;
        info!(
            "Connected to Bot API at {} as {}",
            client.config.base_url,
            me.username.as_deref().unwrap_or(&me.first_name)
        );
        Ok(client)
    }

    /// Get the bot's own user.
    pub async fn get_me(&self) -> Result<User, ApiError> {
        self.call("getMe", &serde_json::json!({})).await
    }

    /// Send a message using the full parameter structure.
    pub async fn send_message(&self, params: &SendMessageParams) -> Result<Message, ApiError> {
        self.call("sendMessage", params).await
    }

    /// Replace the text (and optionally the keyboard) of a message.
    pub async fn edit_message_text(
        &self,
        params: &EditMessageTextParams,
    ) -> Result<EditResult, ApiError> {
        self.call("editMessageText", params).await
    }

    /// Replace only the inline keyboard of a message.
    pub async fn edit_message_reply_markup(
        &self,
        chat_id: i64,
        message_id: i64,
        reply_markup: Option<InlineKeyboardMarkup>,
    ) -> Result<EditResult, ApiError> {
        let params = EditMessageReplyMarkupParams {
            chat_id,
            message_id,
            reply_markup,
        };
        self.call("editMessageReplyMarkup", &params).await
    }

    /// Close the loading state of a pressed inline button.
    pub async fn answer_callback_query(&self, callback_query_id: &str) -> Result<bool, ApiError> {
        let params = AnswerCallbackQueryParams {
            callback_query_id: callback_query_id.to_string(),
            text: None,
        };
        self.call("answerCallbackQuery", &params).await
    }

    /// Fetch pending updates.
    pub async fn get_updates(&self, params: &GetUpdatesParams) -> Result<Vec<Update>, ApiError> {
        self.call("getUpdates", params).await
    }

    /// Call a Bot API method and unwrap its response envelope.
    async fn call<P: Serialize + ?Sized, R: DeserializeOwned>(
        &self,
        method: &str,
        params: &P,
    ) -> Result<R, ApiError> {
        let url = self.config.method_url(method);
        debug!("Bot API call: {}", method);

        let response = self
            .http
            .post(&url)
            .json(params)
            .send()
            .await
            .map_err(ApiError::Http)?;

        let status = response.status();
        let body = response.text().await.map_err(ApiError::Http)?;

        let envelope: ApiResponse<R> = match serde_json::from_str(&body) {
            Ok(envelope) => envelope,
            Err(e) if status.is_success() => return Err(ApiError::Json(e)),
            Err(_) => {
                return Err(ApiError::Api {
                    code: i32::from(status.as_u16()),
                    description: body,
                })
            }
        };

        if !envelope.ok {
            return Err(ApiError::Api {
                code: envelope
                    .error_code
                    .unwrap_or_else(|| i32::from(status.as_u16())),
                description: envelope.description.unwrap_or_default(),
            });
        }

        envelope
            .result
            .ok_or_else(|| ApiError::EmptyResult(method.to_string()))
    }
}

impl std::fmt::Debug for BotClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BotClient")
            .field("config", &self.config)
            .finish()
    }
}
