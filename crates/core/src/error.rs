//! Error types for the tabula evaluator core.

use alloc::string::String;
use core::fmt;

/// Result type alias for core operations.
pub type Result<T> = core::result::Result<T, Error>;

/// Error raised while building an entity schema. Lookups that miss return
/// `None`, not an error.
#[derive(Debug)]
pub enum Error {
    /// Invalid schema definition.
    InvalidSchema { message: String },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidSchema { message } => {
                write!(f, "Invalid schema: {}", message)
            }
        }
    }
}

impl core::error::Error for Error {}

impl Error {
    /// Creates an invalid schema error.
    pub fn invalid_schema(message: impl Into<String>) -> Self {
        Error::InvalidSchema {
            message: message.into(),
        }
    }
}
