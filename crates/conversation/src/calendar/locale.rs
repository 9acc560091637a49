//! Labels and messages shown by the picker.

use std::str::FromStr;
use std::sync::Arc;

use chrono::Weekday;

/// Text used when rendering the picker.
///
/// Abbreviations are returned raw; [`label`] strips the trailing possessive
/// mark some locales carry.
pub trait CalendarLocale: Send + Sync {
    /// Abbreviated month name, `month` in `1..=12`.
    fn month_abbr(&self, month: u32) -> &str;

    /// Abbreviated weekday name.
    fn weekday_abbr(&self, weekday: Weekday) -> &str;

    /// Whether rows are laid out right to left.
    fn right_to_left(&self) -> bool;

    fn cancel_label(&self) -> &str;

    fn back_label(&self) -> &str;

    /// Text of the message carrying the year keyboard.
    fn prompt_text(&self) -> &str;

    /// Confirmation shown once a date is picked.
    fn picked_text(&self, day: &str, month: &str, year: &str) -> String;

    /// Notice shown after cancelling.
    fn cancelled_text(&self) -> &str;
}

/// Render a raw abbreviation as a button label.
pub fn label(raw: &str) -> String {
    raw.replace('\'', "")
}

const HEBREW_MONTHS: [&str; 12] = [
    "ינו", "פבר", "מרץ", "אפר", "מאי", "יונ", "יול", "אוג", "ספט", "אוק", "נוב", "דצמ",
];

/// Hebrew labels, Sunday first.
const HEBREW_WEEKDAYS: [&str; 7] = ["א'", "ב'", "ג'", "ד'", "ה'", "ו'", "ש'"];

const ENGLISH_MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

const ENGLISH_WEEKDAYS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

fn month_index(month: u32) -> usize {
    (month.clamp(1, 12) - 1) as usize
}

/// Hebrew, right to left.
#[derive(Debug, Clone, Copy, Default)]
pub struct Hebrew;

impl CalendarLocale for Hebrew {
    fn month_abbr(&self, month: u32) -> &str {
        HEBREW_MONTHS[month_index(month)]
    }

    fn weekday_abbr(&self, weekday: Weekday) -> &str {
        HEBREW_WEEKDAYS[weekday.num_days_from_sunday() as usize]
    }

    fn right_to_left(&self) -> bool {
        true
    }

    fn cancel_label(&self) -> &str {
        "ביטול"
    }

    fn back_label(&self) -> &str {
        "חזרה"
    }

    fn prompt_text(&self) -> &str {
        "בחרו תאריך"
    }

    fn picked_text(&self, day: &str, month: &str, year: &str) -> String {
        format!("בחרת בתאריך: {day}/{month}/{year}")
    }

    fn cancelled_text(&self) -> &str {
        "בחירת תאריך בוטלה"
    }
}

/// English, left to right.
#[derive(Debug, Clone, Copy, Default)]
pub struct English;

impl CalendarLocale for English {
    fn month_abbr(&self, month: u32) -> &str {
        ENGLISH_MONTHS[month_index(month)]
    }

    fn weekday_abbr(&self, weekday: Weekday) -> &str {
        ENGLISH_WEEKDAYS[weekday.num_days_from_sunday() as usize]
    }

    fn right_to_left(&self) -> bool {
        false
    }

    fn cancel_label(&self) -> &str {
        "Cancel"
    }

    fn back_label(&self) -> &str {
        "Back"
    }

    fn prompt_text(&self) -> &str {
        "Pick a date"
    }

    fn picked_text(&self, day: &str, month: &str, year: &str) -> String {
        format!("You picked: {day}/{month}/{year}")
    }

    fn cancelled_text(&self) -> &str {
        "Date picking cancelled"
    }
}

/// Locale selection from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LocaleKind {
    #[default]
    Hebrew,
    English,
}

impl LocaleKind {
    /// Build the locale.
    pub fn build(self) -> Arc<dyn CalendarLocale> {
        match self {
            LocaleKind::Hebrew => Arc::new(Hebrew),
            LocaleKind::English => Arc::new(English),
        }
    }
}

impl FromStr for LocaleKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "he" | "he_il" | "hebrew" => Ok(LocaleKind::Hebrew),
            "en" | "en_us" | "english" => Ok(LocaleKind::English),
            other => Err(format!("unknown calendar locale: {other}")),
        }
    }
}
