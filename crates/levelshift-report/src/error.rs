//! Error types for levelshift-report

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Level-shift error: {0}")]
    Core(#[from] levelshift_core::Error),

    /// The renderer could not produce an artifact
    #[error("Render failed: {0}")]
    Render(String),

    /// A link template refers to a placeholder that does not exist
    #[error("Invalid link template: {0}")]
    InvalidTemplate(String),

    /// A requested row is not among the scored rows
    #[error("Unknown row: {0}")]
    UnknownRow(String),
}

impl Error {
    /// Wrap any displayable renderer failure
    pub fn render(e: impl std::fmt::Display) -> Self {
        Self::Render(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
