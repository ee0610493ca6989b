use crate::error::WoudcError;
use crate::types::date::{date2string, DateBound, DateInput};
use std::str::FromStr;

/// Separator between the two instants of a textual temporal range.
pub const RANGE_SEPARATOR: char = '/';

/// An unvalidated temporal argument, as handed to [`crate::WoudcClient::get_data`].
///
/// Either a `"begin/end"` string such as `"2000-11-11/2001-10-30"` or a sequence of
/// exactly two instants. Converted into a [`Temporal`] with [`Temporal::try_from`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemporalInput {
    Text(String),
    Instants(Vec<DateInput>),
}

impl From<&str> for TemporalInput {
    fn from(value: &str) -> Self {
        TemporalInput::Text(value.to_string())
    }
}

impl From<String> for TemporalInput {
    fn from(value: String) -> Self {
        TemporalInput::Text(value)
    }
}

impl From<Vec<DateInput>> for TemporalInput {
    fn from(value: Vec<DateInput>) -> Self {
        TemporalInput::Instants(value)
    }
}

impl From<Vec<&str>> for TemporalInput {
    fn from(value: Vec<&str>) -> Self {
        TemporalInput::Instants(value.into_iter().map(DateInput::from).collect())
    }
}

impl From<Vec<String>> for TemporalInput {
    fn from(value: Vec<String>) -> Self {
        TemporalInput::Instants(value.into_iter().map(DateInput::from).collect())
    }
}

impl<A: Into<DateInput>, B: Into<DateInput>> From<(A, B)> for TemporalInput {
    fn from((begin, end): (A, B)) -> Self {
        TemporalInput::Instants(vec![begin.into(), end.into()])
    }
}

/// A validated temporal range with both bounds already normalized by [`date2string`].
///
/// A range always has two instants. The begin instant gets the start of its day and the
/// end instant the end of its day when no time of day is given.
///
/// # Examples
///
/// ```
/// use woudc::Temporal;
///
/// let range: Temporal = "2000-11-11/2001-10-30".parse().unwrap();
/// assert_eq!(range.begin(), "2000-11-11 00:00:00");
/// assert_eq!(range.end(), "2001-10-30 23:59:59");
///
/// assert!("2000-11-11".parse::<Temporal>().is_err());
/// assert!("2000-11-11/2001-10-30/2002-01-01".parse::<Temporal>().is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Temporal {
    begin: String,
    end: String,
}

impl Temporal {
    pub fn new(begin: impl Into<DateInput>, end: impl Into<DateInput>) -> Result<Self, WoudcError> {
        Ok(Self {
            begin: date2string(&begin.into(), DateBound::Begin)?,
            end: date2string(&end.into(), DateBound::End)?,
        })
    }

    /// Parses `"begin/end"`. Exactly one separator with a non-empty instant on each side.
    pub fn parse(text: &str) -> Result<Self, WoudcError> {
        let parts: Vec<&str> = text.split(RANGE_SEPARATOR).map(str::trim).collect();
        match parts.as_slice() {
            [begin, end] if !begin.is_empty() && !end.is_empty() => Self::new(*begin, *end),
            _ => Err(WoudcError::invalid(format!(
                "Expected temporal range of the form 'begin{RANGE_SEPARATOR}end', got '{text}'"
            ))),
        }
    }

    pub fn begin(&self) -> &str {
        &self.begin
    }

    pub fn end(&self) -> &str {
        &self.end
    }
}

impl FromStr for Temporal {
    type Err = WoudcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Temporal::parse(s)
    }
}

impl TryFrom<TemporalInput> for Temporal {
    type Error = WoudcError;

    fn try_from(input: TemporalInput) -> Result<Self, Self::Error> {
        match input {
            TemporalInput::Text(text) => Temporal::parse(&text),
            TemporalInput::Instants(instants) => match <[DateInput; 2]>::try_from(instants) {
                Ok([begin, end]) => Temporal::new(begin, end),
                Err(instants) => Err(WoudcError::invalid(format!(
                    "Expected 2 instants that form a temporal range, got {}",
                    instants.len()
                ))),
            },
        }
    }
}
