//! Parse error type shared by all text parsers.
//!
//! A `ParseError` is either fatal for a whole block (missing header, missing
//! column) or a soft issue attached to a single skipped row.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Parse error with context for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[error("{source_id}: {reason}{}", line_suffix(.line_num))]
pub struct ParseError {
    /// Which text block produced this error (e.g. "systemctl list-units")
    pub source_id: String,
    /// Line number where error occurred (1-indexed), if applicable
    pub line_num: Option<usize>,
    /// Raw input that failed to parse
    pub raw: String,
    /// Why parsing failed
    pub reason: ParseErrorReason,
}

/// Specific reason for parse failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(rename_all = "snake_case")]
pub enum ParseErrorReason {
    /// Input contained no header line
    #[error("missing header line")]
    MissingHeader,
    /// Expected column not found in the header
    #[error("missing column '{0}'")]
    MissingColumn(String),
    /// Row cannot be sliced into the detected columns
    #[error("malformed row")]
    MalformedRow,
    /// Row index past the end of the body
    #[error("row {0} out of range")]
    RowOutOfRange(usize),
    /// Required section not found in output
    #[error("missing section: {0}")]
    MissingSection(String),
}

fn line_suffix(line_num: &Option<usize>) -> String {
    match line_num {
        Some(n) => format!(" (line {})", n),
        None => String::new(),
    }
}

impl ParseError {
    pub fn new(source_id: &str, reason: ParseErrorReason, raw: &str) -> Self {
        Self {
            source_id: source_id.to_string(),
            line_num: None,
            raw: raw.to_string(),
            reason,
        }
    }

    pub fn with_line(mut self, line_num: usize) -> Self {
        self.line_num = Some(line_num);
        self
    }
}

/// Round a seconds value to millisecond precision.
pub fn round_millis(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}
