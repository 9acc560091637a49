//! Inline-keyboard date picker.
//!
//! A picker is attached to one bot message and walks the user through year,
//! month and day. Its progress is a [`CalendarPick`] stored in the chat
//! context under the message id, so several pickers in one chat coexist.
//!
//! ```text
//! Idle ──year;Y──▶ PickingMonth ──month;M──▶ PickingDay ──day;D──▶ Finished
//!                   │    ▲                      │    ▲
//!          return;year   year;Y        return;month  month;M
//!                   ▼    │                      ▼    │
//!                 PickingYear                 PickingMonth
//!
//! any Picking* ──cancel──▶ Cancelled
//! ```

mod keyboard;
mod locale;
mod machine;
mod payload;
mod pick;

pub use keyboard::{day_keyboard, days_in_month, month_keyboard, year_keyboard};
pub use locale::{label, CalendarLocale, English, Hebrew, LocaleKind};
pub use machine::{picked_date, CalendarMachine, CancelPolicy, Render, StepOutcome, Transition};
pub use payload::{CalendarAction, ReturnTo, BLANK, DELIMITER};
pub use pick::{CalendarPick, PickState};
