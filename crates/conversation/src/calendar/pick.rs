//! The persisted record of one date picker.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Progress of a date picker attached to one message.
///
/// Values are kept as the decimal strings carried by the callback payloads.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarPick {
    /// Whether the user is still stepping through the picker.
    #[serde(default)]
    pub picking: bool,

    /// Chosen year.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<String>,

    /// Chosen month, 1-based.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub month: Option<String>,

    /// Chosen day of month.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day: Option<String>,
}

/// Where a picker stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickState {
    /// No picker exists for the message.
    Idle,
    /// Waiting for a year.
    PickingYear,
    /// Waiting for a month.
    PickingMonth,
    /// Waiting for a day.
    PickingDay,
    /// Year, month and day are all set.
    Finished,
    /// The user cancelled; only a fresh start re-opens the picker.
    Cancelled,
}

fn is_set(field: &Option<String>) -> bool {
    field.as_deref().is_some_and(|v| !v.is_empty())
}

impl CalendarPick {
    /// A picker waiting for its first choice.
    pub fn started() -> Self {
        Self {
            picking: true,
            ..Self::default()
        }
    }

    /// All of year, month and day are present and non-empty.
    pub fn is_finished(&self) -> bool {
        is_set(&self.year) && is_set(&self.month) && is_set(&self.day)
    }

    /// Derive the state from the stored fields.
    pub fn state(&self) -> PickState {
        if self.is_finished() {
            PickState::Finished
        } else if !self.picking {
            PickState::Cancelled
        } else if !is_set(&self.year) {
            PickState::PickingYear
        } else if !is_set(&self.month) {
            PickState::PickingMonth
        } else {
            PickState::PickingDay
        }
    }

    /// The chosen date, once the picker is finished.
    pub fn date(&self) -> Option<NaiveDate> {
        if !self.is_finished() {
            return None;
        }
        let year = self.year.as_deref()?.parse().ok()?;
        let month = self.month.as_deref()?.parse().ok()?;
        let day = self.day.as_deref()?.parse().ok()?;
        NaiveDate::from_ymd_opt(year, month, day)
    }

    /// Drop every partial choice.
    pub fn clear_choices(&mut self) {
        self.year = None;
        self.month = None;
        self.day = None;
    }
}

impl PickState {
    /// State of an optional record; a missing record is `Idle`.
    pub fn of(pick: Option<&CalendarPick>) -> Self {
        pick.map_or(PickState::Idle, CalendarPick::state)
    }

    /// Whether the picker still accepts step choices.
    pub fn is_active(self) -> bool {
        matches!(
            self,
            PickState::PickingYear | PickState::PickingMonth | PickState::PickingDay
        )
    }
}
