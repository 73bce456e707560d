//! Error types for the check engine.

use crate::parsers::ParseError;
use thiserror::Error;

/// Errors that make a check result untrustworthy. Each one is reported as
/// UNKNOWN; the display text is the message shown to the operator.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CheckError {
    #[error("Acquisition failed: {0}")]
    Acquisition(String),

    #[error("Invalid regular expression: '{0}'")]
    InvalidRegex(String),

    #[error("No units remain after filtering")]
    EmptySelection,

    #[error("Unit '{0}' not found")]
    UnitNotFound(String),

    #[error("Invalid unit: {0}")]
    InvalidUnit(String),

    #[error("Table error: {0}")]
    Table(#[from] ParseError),
}

impl CheckError {
    /// True for errors caused by operator input rather than system state.
    pub fn is_configuration(&self) -> bool {
        matches!(self, CheckError::InvalidRegex(_) | CheckError::EmptySelection)
    }
}
