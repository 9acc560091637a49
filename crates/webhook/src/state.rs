//! Application state shared across handlers.

use std::sync::Arc;

use conversation::BotHandler;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Update handler.
    pub handler: Arc<BotHandler>,
    /// Storage backend name reported by `/health`.
    pub storage: &'static str,
}

impl AppState {
    /// Create new application state.
    pub fn new(handler: Arc<BotHandler>, storage: &'static str) -> Self {
        Self { handler, storage }
    }
}
