//! Error types for the webhook server.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use conversation::BotError;
use thiserror::Error;

/// Errors that can occur while serving an update.
#[derive(Debug, Error)]
pub enum WebhookError {
    /// Handling the update failed.
    #[error("Bot error: {0}")]
    Bot(#[from] BotError),
}

impl IntoResponse for WebhookError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            WebhookError::Bot(BotError::StorageUnavailable(msg)) => {
                tracing::error!("Storage unavailable: {}", msg);
                (StatusCode::SERVICE_UNAVAILABLE, self.to_string())
            }
            WebhookError::Bot(err) => {
                tracing::error!("Bot error: {}", err);
                (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
            }
        };

        let body = serde_json::json!({
            "error": message
        });

        (status, Json(body)).into_response()
    }
}

/// Result type for webhook operations.
pub type Result<T> = std::result::Result<T, WebhookError>;
