/// Errors raised while answering an API request.
///
/// Each variant knows the HTTP status it maps to; only `NoMatchingRange`
/// and `MalformedDateInput` are meant to reach the client with a specific
/// message, everything else is reported as an internal error.

use thiserror::Error;

use crate::model::NO_DATA_MESSAGE;

#[derive(Debug, Error)]
pub enum ClimateError {
    /// A scalar aggregate was requested over an empty measurement table.
    #[error("Dataset is empty: cannot determine {0}")]
    EmptyDataset(&'static str),

    /// A date-range aggregate matched no rows.
    #[error("{}", NO_DATA_MESSAGE)]
    NoMatchingRange,

    /// A date path segment is not `YYYY-MM-DD` (strict validation only).
    #[error("Invalid date '{0}'. Expected YYYY-MM-DD.")]
    MalformedDateInput(String),

    /// The latest stored date could not be parsed.
    #[error("Stored date '{0}' is not in YYYY-MM-DD format")]
    MalformedStoredDate(String),

    #[error("Database query failed: {0}")]
    Store(#[from] postgres::Error),
}

impl ClimateError {
    /// HTTP status code this error is served with.
    pub fn status_code(&self) -> u16 {
        match self {
            ClimateError::NoMatchingRange => 404,
            ClimateError::MalformedDateInput(_) => 400,
            ClimateError::EmptyDataset(_)
            | ClimateError::MalformedStoredDate(_)
            | ClimateError::Store(_) => 500,
        }
    }

    /// Message placed in the `Error` field of the response body. Internal
    /// failures are not described to the client.
    pub fn public_message(&self) -> String {
        match self.status_code() {
            500 => "Internal server error".to_string(),
            _ => self.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ClimateError>;
