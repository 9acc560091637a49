//! Inline keyboards for each picker step.

use chrono::{Datelike, NaiveDate, Weekday};
use telegram_api::{InlineKeyboardButton, InlineKeyboardMarkup};

use super::locale::{label, CalendarLocale};
use super::payload::{CalendarAction, ReturnTo, BLANK};

const MONTHS_PER_ROW: usize = 4;
const DAYS_PER_WEEK: usize = 7;

const SUNDAY_FIRST: [Weekday; DAYS_PER_WEEK] = [
    Weekday::Sun,
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
];

fn button(text: impl Into<String>, action: CalendarAction) -> InlineKeyboardButton {
    InlineKeyboardButton::new(text, action.to_string())
}

fn blank() -> InlineKeyboardButton {
    InlineKeyboardButton::new(BLANK, BLANK)
}

fn oriented(mut row: Vec<InlineKeyboardButton>, locale: &dyn CalendarLocale) -> Vec<InlineKeyboardButton> {
    if locale.right_to_left() {
        row.reverse();
    }
    row
}

fn control_row(locale: &dyn CalendarLocale, back: ReturnTo) -> Vec<InlineKeyboardButton> {
    vec![
        button(locale.cancel_label(), CalendarAction::Cancel),
        button(locale.back_label(), CalendarAction::Return(back)),
    ]
}

/// One row with the previous, current and next year.
pub fn year_keyboard(current_year: i32) -> InlineKeyboardMarkup {
    let row = (current_year - 1..=current_year + 1)
        .map(|year| button(year.to_string(), CalendarAction::Year(year)))
        .collect();
    InlineKeyboardMarkup::new(vec![row])
}

/// Twelve months in rows of four, then cancel and back-to-year.
pub fn month_keyboard(locale: &dyn CalendarLocale) -> InlineKeyboardMarkup {
    let months: Vec<InlineKeyboardButton> = (1..=12)
        .map(|month| button(label(locale.month_abbr(month)), CalendarAction::Month(month)))
        .collect();

    let mut rows: Vec<Vec<InlineKeyboardButton>> = months
        .chunks(MONTHS_PER_ROW)
        .map(|chunk| oriented(chunk.to_vec(), locale))
        .collect();
    rows.push(control_row(locale, ReturnTo::Year));

    InlineKeyboardMarkup::new(rows)
}

/// Number of days in a month, `None` for an invalid year/month.
pub fn days_in_month(year: i32, month: u32) -> Option<u32> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    u32::try_from(next.signed_duration_since(first).num_days()).ok()
}

/// Day grid for a month: weekday header, Sunday-first weeks padded with
/// blank cells, then cancel and back-to-month.
///
/// Returns `None` when the year/month pair is not a real month.
pub fn day_keyboard(locale: &dyn CalendarLocale, year: i32, month: u32) -> Option<InlineKeyboardMarkup> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let days = days_in_month(year, month)?;
    let leading = first.weekday().num_days_from_sunday() as usize;

    let header = SUNDAY_FIRST
        .iter()
        .map(|day| InlineKeyboardButton::new(label(locale.weekday_abbr(*day)), BLANK))
        .collect();

    let mut cells: Vec<InlineKeyboardButton> = Vec::with_capacity(leading + days as usize + DAYS_PER_WEEK);
    cells.extend(std::iter::repeat_with(blank).take(leading));
    cells.extend((1..=days).map(|day| button(day.to_string(), CalendarAction::Day(day))));
    while cells.len() % DAYS_PER_WEEK != 0 {
        cells.push(blank());
    }

    let mut rows = vec![oriented(header, locale)];
    rows.extend(
        cells
            .chunks(DAYS_PER_WEEK)
            .map(|week| oriented(week.to_vec(), locale)),
    );
    rows.push(control_row(locale, ReturnTo::Month));

    Some(InlineKeyboardMarkup::new(rows))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::locale::{English, Hebrew};

    fn payloads(row: &[InlineKeyboardButton]) -> Vec<&str> {
        row.iter().map(|b| b.callback_data.as_str()).collect()
    }

    #[test]
    fn test_year_keyboard() {
        let markup = year_keyboard(2025);
        assert_eq!(markup.inline_keyboard.len(), 1);
        assert_eq!(
            payloads(&markup.inline_keyboard[0]),
            vec!["year;2024", "year;2025", "year;2026"]
        );
    }

    #[test]
    fn test_month_keyboard_rtl_rows() {
        let markup = month_keyboard(&Hebrew);
        assert_eq!(markup.inline_keyboard.len(), 4);
        assert_eq!(
            payloads(&markup.inline_keyboard[0]),
            vec!["month;4", "month;3", "month;2", "month;1"]
        );
        assert_eq!(markup.inline_keyboard[0][3].text, "ינו");
        assert_eq!(payloads(&markup.inline_keyboard[3]), vec!["cancel", "return;year"]);
    }

    #[test]
    fn test_month_keyboard_ltr_rows() {
        let markup = month_keyboard(&English);
        assert_eq!(
            payloads(&markup.inline_keyboard[2]),
            vec!["month;9", "month;10", "month;11", "month;12"]
        );
        assert_eq!(markup.inline_keyboard[2][0].text, "Sep");
    }

    #[test]
    fn test_day_keyboard_march_2025() {
        // March 1st 2025 is a Saturday.
        let markup = day_keyboard(&English, 2025, 3).unwrap();
        let rows = &markup.inline_keyboard;
        assert_eq!(rows.len(), 8);

        let header: Vec<&str> = rows[0].iter().map(|b| b.text.as_str()).collect();
        assert_eq!(header, vec!["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"]);
        assert_eq!(payloads(&rows[1]), vec![" ", " ", " ", " ", " ", " ", "day;1"]);
        assert_eq!(payloads(&rows[3])[0], "day;9");
        assert_eq!(payloads(&rows[6]), vec!["day;30", "day;31", " ", " ", " ", " ", " "]);
        assert_eq!(payloads(&rows[7]), vec!["cancel", "return;month"]);
    }

    #[test]
    fn test_day_keyboard_rtl_reverses_weeks() {
        let markup = day_keyboard(&Hebrew, 2025, 3).unwrap();
        let rows = &markup.inline_keyboard;
        assert_eq!(rows[0][6].text, "א");
        assert_eq!(payloads(&rows[1])[0], "day;1");
        assert_eq!(payloads(&rows[2]), vec!["day;8", "day;7", "day;6", "day;5", "day;4", "day;3", "day;2"]);
    }

    #[test]
    fn test_days_in_month() {
        assert_eq!(days_in_month(2024, 2), Some(29));
        assert_eq!(days_in_month(2025, 2), Some(28));
        assert_eq!(days_in_month(2025, 12), Some(31));
        assert_eq!(days_in_month(2025, 13), None);
        assert!(day_keyboard(&English, 2025, 0).is_none());
    }
}
