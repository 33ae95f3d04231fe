//! Number validation, normalization and separator conversion.
//!
//! Two conventions are supported:
//! - `dot`:   `1,234,567.89` (`.` fraction, `,` grouping)
//! - `comma`: `1.234.567,89` (`,` fraction, `.` grouping)

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use log::{debug, error};
use regex::Regex;

use crate::column::{Column, resolve_one};
use crate::error::{ConvertError, Result};
use crate::table::Table;
use crate::text::unquote;

static DOT_NUMBER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[-+]?[0-9]{0,3}((,[0-9]{3})*|[0-9]*)(\.|\.[0-9]+)?$").expect("valid regex")
});

static COMMA_NUMBER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[-+]?[0-9]{0,3}((\.[0-9]{3})*|[0-9]*)(,|,[0-9]+)?$").expect("valid regex")
});

/// Decimal/grouping separator convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NumberFormat {
    Dot,
    Comma,
}

impl NumberFormat {
    /// The fraction separator.
    pub fn decimal(self) -> char {
        match self {
            NumberFormat::Dot => '.',
            NumberFormat::Comma => ',',
        }
    }

    /// The thousands grouping separator.
    pub fn grouping(self) -> char {
        match self {
            NumberFormat::Dot => ',',
            NumberFormat::Comma => '.',
        }
    }
}

impl fmt::Display for NumberFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NumberFormat::Dot => write!(f, "dot"),
            NumberFormat::Comma => write!(f, "comma"),
        }
    }
}

impl FromStr for NumberFormat {
    type Err = ConvertError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "dot" | "." => Ok(NumberFormat::Dot),
            "comma" | "," => Ok(NumberFormat::Comma),
            _ => Err(ConvertError::InvalidNumberFormat(s.to_string())),
        }
    }
}

/// Whether `field` is a well-formed number in `format`.
pub fn is_number(field: &str, format: NumberFormat) -> bool {
    // the patterns alone would accept a bare sign or separator
    if !field.bytes().any(|b| b.is_ascii_digit()) {
        return false;
    }
    match format {
        NumberFormat::Dot => DOT_NUMBER.is_match(field),
        NumberFormat::Comma => COMMA_NUMBER.is_match(field),
    }
}

fn clean(field: &str, format: NumberFormat) -> Option<(String, f64)> {
    if !is_number(field, format) {
        return None;
    }
    let cleaned: String = field
        .chars()
        .filter(|&c| c != format.grouping())
        .map(|c| if c == format.decimal() { '.' } else { c })
        .collect();
    match cleaned.parse::<f64>() {
        Ok(value) => Some((cleaned, value)),
        // is_number and f64 parsing disagree: a bug, not bad input
        Err(e) => panic!("validated {format} number '{field}' does not parse: {e}"),
    }
}

/// Strip grouping separators and normalize the fraction separator to `.`.
///
/// Returns `None` if `field` is not a valid number in `format`.
pub fn clean_number(field: &str, format: NumberFormat) -> Option<String> {
    clean(field, format).map(|(cleaned, _)| cleaned)
}

/// Parse a valid number in `format` to `f64`.
pub fn parse_number(field: &str, format: NumberFormat) -> Option<f64> {
    clean(field, format).map(|(_, value)| value)
}

/// Swap fraction and grouping separators from `from` to `to` convention.
pub fn replace_separator(value: &str, from: NumberFormat, to: NumberFormat) -> String {
    if from == to {
        return value.to_string();
    }
    value
        .chars()
        .map(|c| {
            if c == from.decimal() {
                to.decimal()
            } else if c == from.grouping() {
                to.grouping()
            } else {
                c
            }
        })
        .collect()
}

/// Strictly convert one column: every non-empty field must be a valid number.
///
/// Rows too short for the column and empty (or quoted empty) fields pass
/// through unchanged.
pub fn convert_number(
    table: Table,
    column: &Column,
    from: NumberFormat,
    to: NumberFormat,
) -> Result<Table> {
    let header = table.header().map(Vec::as_slice).unwrap_or_default();
    let index = resolve_one(header, column)?;

    table.map_data(|mut row| {
        if index >= row.len() {
            return Ok(row);
        }
        let raw = &row[index];
        let value = unquote(raw);
        if value.is_empty() {
            return Ok(row);
        }
        if !is_number(value, from) {
            error!("invalid {from} number in column {column}: {raw:?}");
            return Err(ConvertError::InvalidNumber {
                value: raw.clone(),
                format: from,
            });
        }
        debug!("converting number {value:?} from {from} to {to}");
        row[index] = replace_separator(value, from, to);
        Ok(row)
    })
}

/// Leniently convert every field of the table, header included.
///
/// Fields that are not valid numbers in `from` are left untouched.
pub fn convert_numbers(table: Table, from: NumberFormat, to: NumberFormat) -> Table {
    table
        .into_rows()
        .into_iter()
        .map(|row| {
            row.into_iter()
                .map(|field| {
                    if is_number(&field, from) {
                        replace_separator(&field, from, to)
                    } else {
                        field
                    }
                })
                .collect()
        })
        .collect::<Vec<_>>()
        .into()
}
