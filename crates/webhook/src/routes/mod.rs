//! Route handlers for the webhook server.

pub mod health;
pub mod webhook;

use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Build the router with all routes.
pub fn router() -> Router<AppState> {
    Router::new()
        // Telegram updates
        .route("/webhook", post(webhook::receive_update))
        // Health check
        .route("/health", get(health::health))
        .layer(TraceLayer::new_for_http())
}
