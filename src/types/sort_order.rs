use crate::error::WoudcError;
use std::fmt;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Direction of a WFS `sortBy` clause.
///
/// Parsed from the single-letter tokens used by WFS 1.1.0, `"A"` and `"D"`. Matching is
/// case-sensitive.
///
/// ```
/// use woudc::SortOrder;
///
/// assert_eq!("D".parse::<SortOrder>().unwrap(), SortOrder::Descending);
/// assert!("d".parse::<SortOrder>().is_err());
/// ```
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

impl SortOrder {
    pub fn as_str(self) -> &'static str {
        match self {
            SortOrder::Ascending => "A",
            SortOrder::Descending => "D",
        }
    }
}

impl Display for SortOrder {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for SortOrder {
    type Err = WoudcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "A" => Ok(SortOrder::Ascending),
            "D" => Ok(SortOrder::Descending),
            other => Err(WoudcError::invalid(format!(
                "sort_order must be 'A' or 'D', got '{other}'"
            ))),
        }
    }
}

impl From<SortOrder> for String {
    fn from(value: SortOrder) -> Self {
        value.as_str().to_string()
    }
}
