//! Error types for levelshift-polars

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    #[error("Level-shift error: {0}")]
    Core(#[from] levelshift_core::Error),

    #[error("Invalid column: {0}")]
    InvalidColumn(String),

    #[error("Type mismatch in column '{column}': expected {expected}, got {got}")]
    TypeMismatch {
        column: String,
        expected: String,
        got: String,
    },

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl Error {
    /// Whether the upstream table was absent or unreadable
    pub fn is_missing_input(&self) -> bool {
        matches!(self, Self::Core(e) if e.is_missing_input())
    }
}

impl From<Error> for levelshift_core::Error {
    fn from(e: Error) -> Self {
        match e {
            Error::Core(inner) => inner,
            other => levelshift_core::Error::InvalidInput(other.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
