//! Telegram webhook endpoint.

use axum::extract::State;
use axum::Json;
use conversation::Outcome;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::error::Result;
use crate::state::AppState;

/// Body returned to Telegram.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct Ack {
    pub ok: bool,
    pub outcome: &'static str,
}

impl From<Outcome> for Ack {
    fn from(outcome: Outcome) -> Self {
        let outcome = match outcome {
            Outcome::Handled => "handled",
            Outcome::Duplicate => "duplicate",
            Outcome::Dropped => "dropped",
        };
        Self { ok: true, outcome }
    }
}

/// Receive one update.
///
/// Handled, duplicate and malformed updates all answer `200 OK` so Telegram
/// does not redeliver them; only storage failures surface as errors.
pub async fn receive_update(
    State(state): State<AppState>,
    Json(update): Json<Value>,
) -> Result<Json<Ack>> {
    let outcome = state.handler.handle_value(update).await?;
    debug!("Webhook update {:?}", outcome);
    Ok(Json(Ack::from(outcome)))
}
