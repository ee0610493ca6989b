//! Date handling for WFS temporal filter bounds.
//!
//! WOUDC expects temporal bounds as `YYYY-MM-DD HH:MM:SS` strings. [`date2string`] turns
//! any [`DateInput`] into that form, filling in the start or end of the day when only a
//! date is known.

use crate::error::WoudcError;
use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone};
use std::fmt;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Canonical timestamp layout used in WOUDC filter expressions.
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A date-like value, tagged by how much of the timestamp is already known.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use woudc::DateInput;
///
/// let date: DateInput = NaiveDate::from_ymd_opt(2000, 11, 30).unwrap().into();
/// assert!(matches!(date, DateInput::DateOnly(_)));
///
/// let text: DateInput = "2000-10-10 02:22:28".into();
/// assert!(matches!(text, DateInput::Preformatted(_)));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DateInput {
    /// A calendar date without a time of day.
    DateOnly(NaiveDate),
    /// A full timestamp. Interpreted as UTC.
    DateTime(NaiveDateTime),
    /// A string such as `"2000-10-10"` or `"2000-10-10 02:22:28"`, passed through as-is.
    Preformatted(String),
}

impl From<NaiveDate> for DateInput {
    fn from(value: NaiveDate) -> Self {
        DateInput::DateOnly(value)
    }
}

impl From<NaiveDateTime> for DateInput {
    fn from(value: NaiveDateTime) -> Self {
        DateInput::DateTime(value)
    }
}

impl<Tz: TimeZone> From<DateTime<Tz>> for DateInput {
    fn from(value: DateTime<Tz>) -> Self {
        DateInput::DateTime(value.naive_utc())
    }
}

impl From<&str> for DateInput {
    fn from(value: &str) -> Self {
        DateInput::Preformatted(value.to_string())
    }
}

impl From<String> for DateInput {
    fn from(value: String) -> Self {
        DateInput::Preformatted(value)
    }
}

/// Which end of a day a date-only value should be expanded to.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DateBound {
    /// Start of the day, `00:00:00`.
    #[default]
    Begin,
    /// End of the day, `23:59:59`.
    End,
}

impl DateBound {
    fn time_of_day(self) -> &'static str {
        match self {
            DateBound::Begin => "00:00:00",
            DateBound::End => "23:59:59",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DateBound::Begin => "begin",
            DateBound::End => "end",
        }
    }
}

impl Display for DateBound {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for DateBound {
    type Err = WoudcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "begin" => Ok(DateBound::Begin),
            "end" => Ok(DateBound::End),
            other => Err(WoudcError::invalid(format!(
                "date_type must be 'begin' or 'end', got '{other}'"
            ))),
        }
    }
}

/// Normalizes a date input into a `YYYY-MM-DD HH:MM:SS` string.
///
/// * Strings that already carry a time component are returned unchanged.
/// * Date-only strings and [`NaiveDate`]s get `00:00:00` appended for
///   [`DateBound::Begin`] and `23:59:59` for [`DateBound::End`].
/// * Datetimes are formatted directly and `date_type` is ignored.
///
/// # Errors
///
/// Returns [`WoudcError::InvalidArgument`] for an empty string.
///
/// # Examples
///
/// ```
/// use woudc::{date2string, DateBound};
///
/// assert_eq!(date2string(&"2000-10-10".into(), DateBound::Begin).unwrap(), "2000-10-10 00:00:00");
/// assert_eq!(date2string(&"2001-11-11".into(), DateBound::End).unwrap(), "2001-11-11 23:59:59");
/// ```
pub fn date2string(value: &DateInput, date_type: DateBound) -> Result<String, WoudcError> {
    match value {
        DateInput::DateTime(datetime) => Ok(datetime.format(DATETIME_FORMAT).to_string()),
        DateInput::DateOnly(date) => Ok(format!(
            "{} {}",
            date.format("%Y-%m-%d"),
            date_type.time_of_day()
        )),
        DateInput::Preformatted(text) => {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                return Err(WoudcError::invalid("Expected a date, got an empty string"));
            }
            if trimmed.contains(' ') {
                Ok(trimmed.to_string())
            } else {
                Ok(format!("{} {}", trimmed, date_type.time_of_day()))
            }
        }
    }
}
