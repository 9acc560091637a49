//! Error types for conversation handling.

use thiserror::Error;

/// Errors that can occur while handling one inbound event.
///
/// Every variant is scoped to the current event; none of them leaves another
/// chat's context or the sequencer record in a partial state.
#[derive(Debug, Error)]
pub enum BotError {
    /// The inbound event lacks a chat id, message id or message.
    #[error("malformed event: {0}")]
    MalformedEvent(String),

    /// A context or sequencer read/write failed.
    #[error("storage unavailable: {0}")]
    StorageUnavailable(String),

    /// An outbound Bot API call failed.
    #[error("outbound delivery failed: {0}")]
    OutboundDeliveryFailed(String),

    /// A calendar step that does not apply to the picker's current state.
    #[error("invalid state transition: {0}")]
    InvalidStateTransition(String),
}

impl From<bot_database::DatabaseError> for BotError {
    fn from(err: bot_database::DatabaseError) -> Self {
        Self::StorageUnavailable(err.to_string())
    }
}

impl From<std::io::Error> for BotError {
    fn from(err: std::io::Error) -> Self {
        Self::StorageUnavailable(err.to_string())
    }
}

impl From<serde_json::Error> for BotError {
    fn from(err: serde_json::Error) -> Self {
        Self::StorageUnavailable(format!("corrupt record: {}", err))
    }
}

impl From<telegram_api::ApiError> for BotError {
    fn from(err: telegram_api::ApiError) -> Self {
        Self::OutboundDeliveryFailed(err.to_string())
    }
}

/// Result type for conversation operations.
pub type Result<T> = std::result::Result<T, BotError>;
