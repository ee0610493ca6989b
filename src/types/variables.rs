use crate::error::WoudcError;

/// An unvalidated `variables` argument.
///
/// Only [`VariablesInput::List`] is accepted by [`Variables::try_from`]; a bare string is
/// kept distinct so that `.variables("foo")` fails loudly instead of being treated as a
/// one-element list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VariablesInput {
    Bare(String),
    List(Vec<String>),
}

impl From<&str> for VariablesInput {
    fn from(value: &str) -> Self {
        VariablesInput::Bare(value.to_string())
    }
}

impl From<String> for VariablesInput {
    fn from(value: String) -> Self {
        VariablesInput::Bare(value)
    }
}

impl From<Vec<String>> for VariablesInput {
    fn from(value: Vec<String>) -> Self {
        VariablesInput::List(value)
    }
}

impl From<Vec<&str>> for VariablesInput {
    fn from(value: Vec<&str>) -> Self {
        VariablesInput::List(value.into_iter().map(str::to_string).collect())
    }
}

impl From<&[&str]> for VariablesInput {
    fn from(value: &[&str]) -> Self {
        VariablesInput::List(value.iter().map(|v| v.to_string()).collect())
    }
}

impl<const N: usize> From<[&str; N]> for VariablesInput {
    fn from(value: [&str; N]) -> Self {
        VariablesInput::List(value.iter().map(|v| v.to_string()).collect())
    }
}

/// Validated list of feature properties to restrict a query to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Variables(Vec<String>);

impl Variables {
    pub fn names(&self) -> &[String] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_inner(self) -> Vec<String> {
        self.0
    }
}

impl TryFrom<VariablesInput> for Variables {
    type Error = WoudcError;

    fn try_from(input: VariablesInput) -> Result<Self, Self::Error> {
        let names = match input {
            VariablesInput::Bare(_) => {
                return Err(WoudcError::invalid("Expected list of variables"));
            }
            VariablesInput::List(names) => names,
        };
        if names.iter().any(|name| name.trim().is_empty()) {
            return Err(WoudcError::invalid(
                "Expected list of variables, got an empty variable name",
            ));
        }
        Ok(Variables(names))
    }
}
