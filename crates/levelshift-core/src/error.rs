//! Error types for level-shift analysis
//!
//! Provides a unified error type for all levelshift crates.
//!
//! Statistical undefined-ness (a group too small for a moment, a zero
//! standard deviation) is never an error: it surfaces as `NaN` and the
//! affected rows are dropped. The variants here cover structural failures
//! that must reach the caller.

use thiserror::Error;

/// Core error type for level-shift operations
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid parameter provided to a function
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Invalid input data
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Insufficient data for the requested operation
    #[error("Insufficient data: expected at least {expected} samples, got {actual}")]
    InsufficientData { expected: usize, actual: usize },

    /// Numerical computation error
    #[error("Computation error: {0}")]
    Computation(String),

    /// A period string that is not a recognised month
    #[error("Invalid period: {0}")]
    InvalidPeriod(String),

    /// The change-detection result (or another required upstream table) is
    /// absent or unreadable; the run cannot proceed
    #[error("Missing external result '{source_name}': {reason}")]
    MissingExternalResult { source_name: String, reason: String },

    /// IO error (for file operations)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration (de)serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Other errors
    #[error("Other error: {0}")]
    Other(#[from] anyhow::Error),
}

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

// Helper functions for common error patterns

impl Error {
    /// Create an error for an out-of-range probability
    pub fn invalid_probability(p: f64) -> Self {
        Self::InvalidParameter(format!("Probability {p} must be in [0, 1]"))
    }

    /// Create an error for a missing upstream table
    pub fn missing_result(source_name: impl Into<String>, reason: impl ToString) -> Self {
        Self::MissingExternalResult {
            source_name: source_name.into(),
            reason: reason.to_string(),
        }
    }

    /// Whether this error means the run could not start, as opposed to a
    /// bad argument from the caller
    pub fn is_missing_input(&self) -> bool {
        matches!(self, Self::MissingExternalResult { .. } | Self::Io(_))
    }
}
