use crate::error::WoudcError;
use std::fmt;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// An unvalidated bounding box argument.
///
/// Accepts either the `"minx,miny,maxx,maxy"` string form or a sequence of numbers.
/// Use [`Bbox::try_from`] to validate it.
#[derive(Debug, Clone, PartialEq)]
pub enum BboxInput {
    Text(String),
    Values(Vec<f64>),
}

impl From<&str> for BboxInput {
    fn from(value: &str) -> Self {
        BboxInput::Text(value.to_string())
    }
}

impl From<String> for BboxInput {
    fn from(value: String) -> Self {
        BboxInput::Text(value)
    }
}

impl From<Vec<f64>> for BboxInput {
    fn from(value: Vec<f64>) -> Self {
        BboxInput::Values(value)
    }
}

impl From<&[f64]> for BboxInput {
    fn from(value: &[f64]) -> Self {
        BboxInput::Values(value.to_vec())
    }
}

impl<const N: usize> From<[f64; N]> for BboxInput {
    fn from(value: [f64; N]) -> Self {
        BboxInput::Values(value.to_vec())
    }
}

impl From<Bbox> for BboxInput {
    fn from(value: Bbox) -> Self {
        BboxInput::Values(value.to_array().to_vec())
    }
}

/// A validated `(minx, miny, maxx, maxy)` bounding box, in longitude/latitude degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bbox {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Bbox {
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// Builds a bbox from exactly 4 finite values.
    pub fn from_values(values: &[f64]) -> Result<Self, WoudcError> {
        let [min_x, min_y, max_x, max_y] = <[f64; 4]>::try_from(values)
            .map_err(|_| Self::cardinality_error(values.len()))?;
        if let Some(bad) = values.iter().find(|v| !v.is_finite()) {
            return Err(WoudcError::invalid(format!(
                "Expected numeric bbox element, got '{bad}'"
            )));
        }
        Ok(Self::new(min_x, min_y, max_x, max_y))
    }

    /// Parses a `"minx,miny,maxx,maxy"` string.
    pub fn parse(text: &str) -> Result<Self, WoudcError> {
        let parts: Vec<&str> = text.split(',').map(str::trim).collect();
        if parts.len() != 4 {
            return Err(Self::cardinality_error(parts.len()));
        }
        let values = parts
            .iter()
            .map(|part| {
                part.parse::<f64>().map_err(|_| {
                    WoudcError::invalid(format!("Expected numeric bbox element, got '{part}'"))
                })
            })
            .collect::<Result<Vec<f64>, WoudcError>>()?;
        Self::from_values(&values)
    }

    pub fn to_array(self) -> [f64; 4] {
        [self.min_x, self.min_y, self.max_x, self.max_y]
    }

    fn cardinality_error(found: usize) -> WoudcError {
        WoudcError::invalid(format!(
            "Expected 4 elements that form a bbox, got {found}"
        ))
    }
}

impl Display for Bbox {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{},{},{},{}",
            self.min_x, self.min_y, self.max_x, self.max_y
        )
    }
}

impl FromStr for Bbox {
    type Err = WoudcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Bbox::parse(s)
    }
}

impl TryFrom<BboxInput> for Bbox {
    type Error = WoudcError;

    fn try_from(input: BboxInput) -> Result<Self, Self::Error> {
        match input {
            BboxInput::Text(text) => Bbox::parse(&text),
            BboxInput::Values(values) => Bbox::from_values(&values),
        }
    }
}
