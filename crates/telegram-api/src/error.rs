//! Error types for telegram-api.

use thiserror::Error;

/// Errors that can occur when talking to the Bot API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The API answered `ok: false`.
    #[error("API error {code}: {description}")]
    Api { code: i32, description: String },

    /// The API answered `ok: true` without a result.
    #[error("empty result from {0}")]
    EmptyResult(String),

    /// Reading or writing the update offset file failed.
    #[error("offset file error: {0}")]
    Offset(#[from] std::io::Error),

    /// Invalid configuration.
    #[error("Invalid configuration: {0}")]
    Config(String),
}
