//! Entry point for inbound updates.
//!
//! [`BotHandler::handle`] runs one update start to finish:
//! sequencer check → parse → per-chat lock → context load → acknowledge
//! callback → route to the calendar or the demo commands.

use std::sync::Arc;

use serde_json::{Map, Value};
use telegram_api::{InlineKeyboardButton, InlineKeyboardMarkup, ReplyKeyboardMarkup, ReplyMarkup, Update};
use tracing::{debug, info, warn};

use crate::calendar::{CalendarMachine, CancelPolicy, LocaleKind, StepOutcome};
use crate::clock::Clock;
use crate::dispatcher::{log_delivery_failure, Dispatcher};
use crate::error::Result;
use crate::locks::ChatLocks;
use crate::sequencer::{OrderingPolicy, UpdateSequencer};
use crate::session::{EventFacts, Session};
use crate::store::{ContextStore, Storage};

/// Context key remembering the last echoed text.
pub const PREVIOUS_MESSAGE_KEY: &str = "previous_message";

const PICK_AND_CHOOSE: &str = "Pick & Choose";

/// Policies the handler is built with.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HandlerConfig {
    pub ordering: OrderingPolicy,
    pub cancel_policy: CancelPolicy,
    pub locale: LocaleKind,
}

/// What became of one update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Routed and answered.
    Handled,
    /// Rejected by the sequencer as already seen.
    Duplicate,
    /// Could not be parsed; nothing was changed.
    Dropped,
}

/// Handles updates for every chat.
pub struct BotHandler {
    sequencer: UpdateSequencer,
    contexts: Arc<dyn ContextStore>,
    dispatcher: Arc<dyn Dispatcher>,
    calendar: CalendarMachine,
    locks: ChatLocks,
}

impl BotHandler {
    pub fn new(
        storage: Storage,
        dispatcher: Arc<dyn Dispatcher>,
        clock: Arc<dyn Clock>,
        config: HandlerConfig,
    ) -> Self {
        info!(
            "Bot handler ready (ordering: {:?}, cancel: {:?}, locale: {:?})",
            config.ordering, config.cancel_policy, config.locale
        );
        Self {
            sequencer: UpdateSequencer::new(storage.sequencer, clock.clone(), config.ordering),
            contexts: storage.contexts,
            dispatcher,
            calendar: CalendarMachine::new(config.locale.build(), clock, config.cancel_policy),
            locks: ChatLocks::new(),
        }
    }

    pub fn sequencer(&self) -> &UpdateSequencer {
        &self.sequencer
    }

    pub fn calendar(&self) -> &CalendarMachine {
        &self.calendar
    }

    /// Handle an update that has not been decoded yet.
    pub async fn handle_value(&self, value: Value) -> Result<Outcome> {
        match serde_json::from_value::<Update>(value) {
            Ok(update) => self.handle(&update).await,
            Err(e) => {
                warn!("Dropping undecodable update: {}", e);
                Ok(Outcome::Dropped)
            }
        }
    }

    /// Handle one update.
    ///
    /// Storage failures are returned; delivery failures are logged and the
    /// update still counts as handled.
    pub async fn handle(&self, update: &Update) -> Result<Outcome> {
        if !self.sequencer.admit(update.update_id).await? {
            info!("Skipping update {}: already processed", update.update_id);
            return Ok(Outcome::Duplicate);
        }

        let facts = match EventFacts::from_update(update) {
            Ok(facts) => facts,
            Err(e) => {
                warn!("Dropping update {}: {}", update.update_id, e);
                return Ok(Outcome::Dropped);
            }
        };

        let _guard = self.locks.lock(facts.chat_id).await;
        let mut session = Session::open(facts, self.contexts.clone()).await?;
        debug!(
            "Update {} in chat {} from {:?}",
            update.update_id,
            session.chat_id(),
            session.sender_name()
        );

        session.acknowledge(self.dispatcher.as_ref()).await;

        if session.is_callback() {
            self.on_callback(&mut session).await?;
        } else {
            self.on_message(&mut session).await?;
        }
        Ok(Outcome::Handled)
    }

    async fn on_callback(&self, session: &mut Session) -> Result<()> {
        let dispatcher = self.dispatcher.as_ref();

        if self.calendar.is_calendar_interaction(session) {
            if let StepOutcome::Finished(date) = self.calendar.continue_picking(session, dispatcher).await? {
                info!("Chat {} picked {}", session.chat_id(), date);
                let text = format!("You chose a date! {}", date);
                self.send(session, &text, None).await;
            }
            return Ok(());
        }

        let (text, markup) = match session.callback_data() {
            Some("123") => (
                "this is 123",
                Some(InlineKeyboardMarkup::new(vec![vec![InlineKeyboardButton::new(
                    "awww naww", "3",
                )]])),
            ),
            Some("3") => ("this is 3", None),
            _ => ("this is None", None),
        };
        let result = dispatcher
            .edit_message(session.chat_id(), session.message_id(), Some(text), markup.as_ref())
            .await;
        log_delivery_failure(result, "edit callback message");
        Ok(())
    }

    async fn on_message(&self, session: &mut Session) -> Result<()> {
        let command = session.text().trim().to_string();
        match command.as_str() {
            "/start" => {
                let keyboard = ReplyKeyboardMarkup::from_labels([["/help"], ["/woot"], ["/previous"]], true);
                self.send(session, PICK_AND_CHOOSE, Some(keyboard.into())).await;
            }
            "/woot" => {
                let keyboard = InlineKeyboardMarkup::new(vec![vec![
                    InlineKeyboardButton::new("woa", "123"),
                    InlineKeyboardButton::new("awww", "3"),
                ]]);
                self.send(session, PICK_AND_CHOOSE, Some(keyboard.into())).await;
            }
            "/previous" => {
                let previous = match session.memory_value(PREVIOUS_MESSAGE_KEY) {
                    Some(Value::String(text)) => text.clone(),
                    Some(other) => other.to_string(),
                    None => "None".to_string(),
                };
                self.send(session, &format!("Previous message: {}", previous), None).await;
            }
            "/calendar" => {
                self.calendar
                    .start_picking(session, self.dispatcher.as_ref())
                    .await?;
            }
            _ => {
                let text = session.text().to_string();
                let mut partial = Map::new();
                partial.insert(PREVIOUS_MESSAGE_KEY.to_string(), Value::String(text.clone()));
                session.update_context(partial).await?;
                self.send(session, &format!("Echo: {}", text), None).await;
            }
        }
        Ok(())
    }

    async fn send(&self, session: &Session, text: &str, markup: Option<ReplyMarkup>) {
        let result = self
            .dispatcher
            .send_message(session.chat_id(), text, markup.as_ref())
            .await;
        log_delivery_failure(result, "send message");
    }
}
