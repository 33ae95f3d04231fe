//! Error types for parsing and running conversion programs.

use thiserror::Error;

use crate::number::NumberFormat;

/// Errors produced while parsing a program or converting a table.
///
/// Every error aborts the whole pipeline: there is no partial output.
/// Lenient whole-table conversions (`numbers`, `dates`) never produce one
/// for a field that does not match; they pass it through instead.
#[derive(Debug, Error)]
pub enum ConvertError {
    /// One or more column references could not be resolved against the header.
    #[error("column not found: {}", .columns.join(", "))]
    ColumnNotFound { columns: Vec<String> },

    /// A statement needed exactly one column but the reference resolved to `matches`.
    #[error("column '{column}' must resolve to exactly one column, found {matches}")]
    InvalidColumnIndex { column: String, matches: usize },

    /// A field failed strict number validation.
    #[error("invalid {format} number: '{value}'")]
    InvalidNumber { value: String, format: NumberFormat },

    #[error("invalid number format: '{0}'")]
    InvalidNumberFormat(String),

    #[error("invalid date format: '{0}'")]
    InvalidDateFormat(String),

    /// A field could not be parsed as a date in the requested format.
    #[error("invalid date '{value}' for format {format}")]
    InvalidDate { value: String, format: String },

    /// Malformed statement syntax (argument or option count, bad column spec).
    #[error("invalid statement '{statement}': {reason}")]
    InvalidStatement { statement: String, reason: String },

    #[error("unknown statement: '{0}'")]
    UnknownStatement(String),

    #[error("unknown operator: '{0}'")]
    UnknownOperator(String),

    /// The right-hand side of a filter cannot be used with its operator.
    #[error("invalid operand '{operand}' for operator '{op}': {reason}")]
    InvalidOperand {
        op: String,
        operand: String,
        reason: String,
    },

    /// Both sides of a comparison are comma-format numbers.
    #[error("numbers must be converted to dot format before comparing: '{left}' and '{right}'")]
    UnnormalizedNumbers { left: String, right: String },

    #[error("invalid option: {0}")]
    InvalidOption(String),

    /// Input must be UTF-8; `field` is 1-based.
    #[error("line {line}, field {field} is not valid UTF-8")]
    InvalidEncoding { line: u64, field: usize },

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl ConvertError {
    pub(crate) fn statement(statement: &str, reason: impl Into<String>) -> Self {
        ConvertError::InvalidStatement {
            statement: statement.to_string(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ConvertError>;
