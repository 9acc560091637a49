//! Year → month → day stepping over a [`Session`].

use std::str::FromStr;
use std::sync::Arc;

use chrono::{Datelike, NaiveDate};
use telegram_api::{InlineKeyboardMarkup, ReplyMarkup};
use tracing::{debug, info};

use super::keyboard::{day_keyboard, month_keyboard, year_keyboard};
use super::locale::CalendarLocale;
use super::payload::{CalendarAction, ReturnTo};
use super::pick::{CalendarPick, PickState};
use crate::clock::Clock;
use crate::context::ChatContext;
use crate::dispatcher::{log_delivery_failure, Dispatcher};
use crate::error::{BotError, Result};
use crate::session::Session;

/// What happens to already chosen fields when a picker is cancelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CancelPolicy {
    /// Keep year/month so the record shows how far the user got.
    #[default]
    RetainPartial,
    /// Drop every chosen field.
    ClearPartial,
}

impl FromStr for CancelPolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "retain" | "keep" => Ok(Self::RetainPartial),
            "clear" => Ok(Self::ClearPartial),
            other => Err(format!("unknown cancel policy: {other}")),
        }
    }
}

/// How the picker message should look after a step.
#[derive(Debug, Clone, PartialEq)]
pub enum Render {
    /// Keep the text, swap the keyboard.
    Keyboard(InlineKeyboardMarkup),
    /// Replace the text and drop the keyboard.
    Text(String),
}

/// Result of applying one action to a picker.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub pick: CalendarPick,
    pub render: Render,
}

/// Result of handling one callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// Not a valid step for this picker; nothing changed.
    Ignored,
    /// The picker moved to a new non-final state.
    Advanced(PickState),
    /// This step completed the date.
    Finished(NaiveDate),
}

/// Drives date pickers. Holds no per-chat state; pickers live in the
/// chat context.
pub struct CalendarMachine {
    locale: Arc<dyn CalendarLocale>,
    clock: Arc<dyn Clock>,
    cancel_policy: CancelPolicy,
}

fn invalid(action: CalendarAction, state: PickState) -> BotError {
    BotError::InvalidStateTransition(format!("{action} while {state:?}"))
}

impl CalendarMachine {
    pub fn new(locale: Arc<dyn CalendarLocale>, clock: Arc<dyn Clock>, cancel_policy: CancelPolicy) -> Self {
        Self {
            locale,
            clock,
            cancel_policy,
        }
    }

    /// Year choices around the current year.
    pub fn year_choices(&self) -> InlineKeyboardMarkup {
        year_keyboard(self.clock.today().year())
    }

    /// Apply `action` to a picker without side effects.
    pub fn step(&self, current: Option<&CalendarPick>, action: CalendarAction) -> Result<Transition> {
        let state = PickState::of(current);
        let mut pick = current.cloned().unwrap_or_else(CalendarPick::started);

        let render = match (action, state) {
            (CalendarAction::Year(year), PickState::Idle | PickState::PickingYear) => {
                pick.picking = true;
                pick.year = Some(year.to_string());
                pick.month = None;
                pick.day = None;
                Render::Keyboard(month_keyboard(self.locale.as_ref()))
            }
            (CalendarAction::Month(month), PickState::PickingMonth) => {
                let year = parse_field(&pick.year).ok_or_else(|| invalid(action, state))?;
                let keyboard = day_keyboard(self.locale.as_ref(), year, month)
                    .ok_or_else(|| invalid(action, state))?;
                pick.month = Some(month.to_string());
                pick.day = None;
                Render::Keyboard(keyboard)
            }
            (CalendarAction::Day(day), PickState::PickingDay) => {
                let year = parse_field(&pick.year).ok_or_else(|| invalid(action, state))?;
                let month = parse_field(&pick.month).ok_or_else(|| invalid(action, state))?;
                NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| invalid(action, state))?;

                let day = day.to_string();
                let text = self.locale.picked_text(
                    &day,
                    pick.month.as_deref().unwrap_or_default(),
                    pick.year.as_deref().unwrap_or_default(),
                );
                pick.day = Some(day);
                pick.picking = false;
                Render::Text(text)
            }
            (CalendarAction::Return(ReturnTo::Year), PickState::PickingMonth) => {
                pick.clear_choices();
                Render::Keyboard(self.year_choices())
            }
            (CalendarAction::Return(ReturnTo::Month), PickState::PickingDay) => {
                pick.month = None;
                pick.day = None;
                Render::Keyboard(month_keyboard(self.locale.as_ref()))
            }
            (CalendarAction::Cancel, state) if state.is_active() => {
                pick.picking = false;
                if self.cancel_policy == CancelPolicy::ClearPartial {
                    pick.clear_choices();
                }
                Render::Text(self.locale.cancelled_text().to_string())
            }
            _ => return Err(invalid(action, state)),
        };

        Ok(Transition { pick, render })
    }

    /// Show the year keyboard.
    ///
    /// From a callback the pressed message is reused and its picker reset;
    /// from a plain message a new message is sent and its picker starts in
    /// `PickingYear` under the id the dispatcher reports.
    pub async fn start_picking(&self, session: &mut Session, dispatcher: &dyn Dispatcher) -> Result<()> {
        let keyboard = self.year_choices();
        let prompt = self.locale.prompt_text();

        if session.is_callback() {
            let message_id = session.message_id();
            session.set_calendar(message_id, CalendarPick::started()).await?;
            info!(
                "Restarted date picker on message {} in chat {}",
                message_id,
                session.chat_id()
            );
            let result = dispatcher
                .edit_message(session.chat_id(), message_id, Some(prompt), Some(&keyboard))
                .await;
            log_delivery_failure(result, "show year choices");
        } else {
            info!("Starting date picker in chat {}", session.chat_id());
            let markup = ReplyMarkup::from(keyboard);
            let result = dispatcher
                .send_message(session.chat_id(), prompt, Some(&markup))
                .await;
            // Without an id the first year press creates the record
            if let Some(Some(message_id)) = log_delivery_failure(result, "send year choices") {
                session.set_calendar(message_id, CalendarPick::started()).await?;
            }
        }
        Ok(())
    }

    /// Whether the callback behind `session` belongs to a picker: either it
    /// opens one, or it lands on a picker that is still active.
    pub fn is_calendar_interaction(&self, session: &Session) -> bool {
        if !session.is_callback() {
            return false;
        }
        let opens = session
            .callback_data()
            .and_then(CalendarAction::parse)
            .is_some_and(|action| action.is_year());
        opens || PickState::of(session.context().calendar(session.message_id())).is_active()
    }

    /// Apply the pressed button to the message's picker, persist it and
    /// update the message.
    pub async fn continue_picking(
        &self,
        session: &mut Session,
        dispatcher: &dyn Dispatcher,
    ) -> Result<StepOutcome> {
        let message_id = session.message_id();
        let Some(action) = session.callback_data().and_then(CalendarAction::parse) else {
            debug!("Ignoring non-calendar payload on message {}", message_id);
            return Ok(StepOutcome::Ignored);
        };

        let transition = match self.step(session.context().calendar(message_id), action) {
            Ok(transition) => transition,
            Err(BotError::InvalidStateTransition(reason)) => {
                debug!("Ignoring calendar step on message {}: {}", message_id, reason);
                return Ok(StepOutcome::Ignored);
            }
            Err(e) => return Err(e),
        };

        let state = transition.pick.state();
        let date = transition.pick.date();
        session.set_calendar(message_id, transition.pick).await?;

        let chat_id = session.chat_id();
        let result = match &transition.render {
            Render::Keyboard(keyboard) => {
                dispatcher
                    .edit_message(chat_id, message_id, None, Some(keyboard))
                    .await
            }
            Render::Text(text) => {
                dispatcher
                    .edit_message(chat_id, message_id, Some(text), None)
                    .await
            }
        };
        log_delivery_failure(result, "update date picker");

        debug!("Picker on message {} is now {:?}", message_id, state);
        Ok(match (state, date) {
            (PickState::Finished, Some(date)) => StepOutcome::Finished(date),
            (state, _) => StepOutcome::Advanced(state),
        })
    }
}

/// The date picked on a message, once all three fields are set.
pub fn picked_date(context: &ChatContext, message_id: i64) -> Option<NaiveDate> {
    context.calendar(message_id).and_then(CalendarPick::date)
}

fn parse_field<T: FromStr>(field: &Option<String>) -> Option<T> {
    field.as_deref().and_then(|value| value.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::locale::{English, Hebrew};
    use crate::clock::FixedClock;

    fn machine(policy: CancelPolicy) -> CalendarMachine {
        let clock = Arc::new(FixedClock::at_date(2025, 6, 1).unwrap());
        CalendarMachine::new(Arc::new(English), clock, policy)
    }

    fn run(machine: &CalendarMachine, actions: &[&str]) -> Option<CalendarPick> {
        let mut pick = None;
        for data in actions {
            let action = CalendarAction::parse(data).unwrap();
            pick = Some(machine.step(pick.as_ref(), action).unwrap().pick);
        }
        pick
    }

    #[test]
    fn test_full_flow() {
        let machine = machine(CancelPolicy::RetainPartial);
        let pick = run(&machine, &["year;2025", "month;3"]).unwrap();
        assert_eq!(pick.state(), PickState::PickingDay);

        let transition = machine.step(Some(&pick), CalendarAction::Day(17)).unwrap();
        assert_eq!(transition.pick.state(), PickState::Finished);
        assert_eq!(transition.pick.date(), NaiveDate::from_ymd_opt(2025, 3, 17));
        assert_eq!(transition.render, Render::Text("You picked: 17/3/2025".to_string()));
    }

    #[test]
    fn test_return_to_year_clears_year() {
        let machine = machine(CancelPolicy::RetainPartial);
        let pick = run(&machine, &["year;2025"]).unwrap();

        let transition = machine
            .step(Some(&pick), CalendarAction::Return(ReturnTo::Year))
            .unwrap();
        assert!(transition.pick.year.is_none());
        assert_eq!(transition.pick.state(), PickState::PickingYear);
        assert_eq!(transition.render, Render::Keyboard(year_keyboard(2025)));
    }

    #[test]
    fn test_return_to_month_keeps_year() {
        let machine = machine(CancelPolicy::RetainPartial);
        let pick = run(&machine, &["year;2024", "month;2", "return;month"]).unwrap();
        assert_eq!(pick.year.as_deref(), Some("2024"));
        assert!(pick.month.is_none());
        assert_eq!(pick.state(), PickState::PickingMonth);
    }

    #[test]
    fn test_cancel_policies() {
        let retain = machine(CancelPolicy::RetainPartial);
        let pick = run(&retain, &["year;2025", "month;3", "cancel"]).unwrap();
        assert_eq!(pick.state(), PickState::Cancelled);
        assert_eq!(pick.month.as_deref(), Some("3"));
        assert!(pick.date().is_none());

        let clear = machine(CancelPolicy::ClearPartial);
        let pick = run(&clear, &["year;2025", "month;3", "cancel"]).unwrap();
        assert_eq!(pick.state(), PickState::Cancelled);
        assert!(pick.year.is_none() && pick.month.is_none());
    }

    #[test]
    fn test_invalid_transitions() {
        let machine = machine(CancelPolicy::RetainPartial);
        let finished = run(&machine, &["year;2025", "month;3", "day;17"]).unwrap();
        let cancelled = run(&machine, &["year;2025", "cancel"]).unwrap();
        let picking_month = run(&machine, &["year;2025"]).unwrap();

        let cases: [(Option<&CalendarPick>, CalendarAction); 7] = [
            (Some(&finished), CalendarAction::Day(18)),
            (Some(&finished), CalendarAction::Year(2025)),
            (Some(&cancelled), CalendarAction::Month(4)),
            (Some(&cancelled), CalendarAction::Cancel),
            (Some(&picking_month), CalendarAction::Day(3)),
            (Some(&picking_month), CalendarAction::Return(ReturnTo::Month)),
            (None, CalendarAction::Cancel),
        ];
        for (pick, action) in cases {
            assert!(matches!(
                machine.step(pick, action),
                Err(BotError::InvalidStateTransition(_))
            ));
        }
    }

    #[test]
    fn test_out_of_range_values_are_invalid() {
        let machine = machine(CancelPolicy::RetainPartial);
        let picking_month = run(&machine, &["year;2025"]).unwrap();
        assert!(machine.step(Some(&picking_month), CalendarAction::Month(13)).is_err());

        let picking_day = run(&machine, &["year;2025", "month;2"]).unwrap();
        assert!(machine.step(Some(&picking_day), CalendarAction::Day(29)).is_err());
    }

    #[test]
    fn test_locale_only_changes_labels() {
        let clock = Arc::new(FixedClock::at_date(2025, 6, 1).unwrap());
        let hebrew = CalendarMachine::new(Arc::new(Hebrew), clock, CancelPolicy::RetainPartial);
        let english = machine(CancelPolicy::RetainPartial);

        let a = run(&hebrew, &["year;2025", "month;3", "day;17"]);
        let b = run(&english, &["year;2025", "month;3", "day;17"]);
        assert_eq!(a, b);
    }

    #[test]
    fn test_cancel_policy_from_str() {
        assert_eq!("clear".parse::<CancelPolicy>(), Ok(CancelPolicy::ClearPartial));
        assert_eq!("Retain".parse::<CancelPolicy>(), Ok(CancelPolicy::RetainPartial));
        assert!("drop".parse::<CancelPolicy>().is_err());
    }
}
