use thiserror::Error;

/// Rejected simulation parameters, reported by the CLI and the HTTP API.
#[derive(Debug, Error, PartialEq)]
pub enum InputError {
    #[error("{0} must be a finite number")]
    NonFinite(&'static str),

    #[error("{name} must be {expected}")]
    OutOfRange {
        name: &'static str,
        expected: &'static str,
    },

    #[error("{name} must be between 1 and {max} years")]
    YearsOutOfRange { name: &'static str, max: u32 },

    #[error("Invalid API payload: {0}")]
    Payload(String),
}

impl From<serde_json::Error> for InputError {
    fn from(e: serde_json::Error) -> Self {
        InputError::Payload(e.to_string())
    }
}
