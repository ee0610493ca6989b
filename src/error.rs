use crate::ows::error::OwsError;
use thiserror::Error;

pub type Result<T, E = WoudcError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum WoudcError {
    /// A caller-supplied value was rejected, either locally before any request was made or
    /// by one of the WOUDC validation processes.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid endpoint URL '{0}'")]
    InvalidUrl(String, #[source] url::ParseError),

    #[error(transparent)]
    Ows(#[from] OwsError),
}

impl WoudcError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        WoudcError::InvalidArgument(message.into())
    }

    /// Returns `true` for errors raised by argument validation.
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, WoudcError::InvalidArgument(_))
    }
}
