//! Callback payloads understood by the picker (`prefix;value`).

use std::fmt;

/// Separator between payload prefix and value.
pub const DELIMITER: char = ';';
pub const YEAR_PREFIX: &str = "year";
pub const MONTH_PREFIX: &str = "month";
pub const DAY_PREFIX: &str = "day";
pub const CANCEL_BUTTON: &str = "cancel";
pub const RETURN_BUTTON: &str = "return";

/// Payload of buttons that do nothing (weekday headers, blank cells).
pub const BLANK: &str = " ";

/// A step the user can navigate back to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReturnTo {
    Year,
    Month,
}

/// A decoded picker button press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalendarAction {
    Year(i32),
    Month(u32),
    Day(u32),
    Cancel,
    Return(ReturnTo),
}

impl CalendarAction {
    /// Decode a callback payload. Returns `None` for anything that is not a
    /// picker button, including blank cells.
    pub fn parse(data: &str) -> Option<Self> {
        if data == CANCEL_BUTTON {
            return Some(Self::Cancel);
        }

        let (prefix, value) = data.split_once(DELIMITER)?;
        match prefix {
            YEAR_PREFIX => value.parse().ok().map(Self::Year),
            MONTH_PREFIX => value.parse().ok().map(Self::Month),
            DAY_PREFIX => value.parse().ok().map(Self::Day),
            RETURN_BUTTON => match value {
                YEAR_PREFIX => Some(Self::Return(ReturnTo::Year)),
                MONTH_PREFIX => Some(Self::Return(ReturnTo::Month)),
                _ => None,
            },
            _ => None,
        }
    }

    /// Whether this press opens a new picker.
    pub fn is_year(&self) -> bool {
        matches!(self, Self::Year(_))
    }
}

impl fmt::Display for CalendarAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Year(y) => write!(f, "{YEAR_PREFIX}{DELIMITER}{y}"),
            Self::Month(m) => write!(f, "{MONTH_PREFIX}{DELIMITER}{m}"),
            Self::Day(d) => write!(f, "{DAY_PREFIX}{DELIMITER}{d}"),
            Self::Cancel => f.write_str(CANCEL_BUTTON),
            Self::Return(ReturnTo::Year) => write!(f, "{RETURN_BUTTON}{DELIMITER}{YEAR_PREFIX}"),
            Self::Return(ReturnTo::Month) => {
                write!(f, "{RETURN_BUTTON}{DELIMITER}{MONTH_PREFIX}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_steps() {
        assert_eq!(CalendarAction::parse("year;2025"), Some(CalendarAction::Year(2025)));
        assert_eq!(CalendarAction::parse("month;3"), Some(CalendarAction::Month(3)));
        assert_eq!(CalendarAction::parse("day;17"), Some(CalendarAction::Day(17)));
        assert_eq!(CalendarAction::parse("cancel"), Some(CalendarAction::Cancel));
        assert_eq!(
            CalendarAction::parse("return;year"),
            Some(CalendarAction::Return(ReturnTo::Year))
        );
        assert_eq!(
            CalendarAction::parse("return;month"),
            Some(CalendarAction::Return(ReturnTo::Month))
        );
    }

    #[test]
    fn test_parse_rejects_other_payloads() {
        for data in [BLANK, "", "123", "3", "year;", "year;abc", "return;day", "week;2"] {
            assert_eq!(CalendarAction::parse(data), None, "payload {data:?}");
        }
    }

    #[test]
    fn test_display_matches_parse() {
        let actions = [
            CalendarAction::Year(2026),
            CalendarAction::Month(12),
            CalendarAction::Day(1),
            CalendarAction::Cancel,
            CalendarAction::Return(ReturnTo::Month),
        ];
        for action in actions {
            assert_eq!(CalendarAction::parse(&action.to_string()), Some(action));
        }
    }
}
