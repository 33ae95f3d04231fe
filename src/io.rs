//! CSV reading and writing with newline detection.

use std::fmt;
use std::str::FromStr;

use csv::{ReaderBuilder, Terminator, WriterBuilder};
use log::error;

use crate::error::{ConvertError, Result};
use crate::table::Table;

/// Output line terminator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum NewlineMode {
    /// Keep whatever the input used, falling back to `\n`.
    #[default]
    Auto,
    Lf,
    Crlf,
}

impl NewlineMode {
    pub fn terminator(self) -> Terminator {
        match self {
            NewlineMode::Crlf => Terminator::CRLF,
            NewlineMode::Auto | NewlineMode::Lf => Terminator::Any(b'\n'),
        }
    }

    /// `self`, or `detected` when `self` is `Auto`.
    pub fn or(self, detected: NewlineMode) -> NewlineMode {
        match self {
            NewlineMode::Auto => detected,
            mode => mode,
        }
    }
}

impl fmt::Display for NewlineMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NewlineMode::Auto => write!(f, "auto"),
            NewlineMode::Lf => write!(f, "nl"),
            NewlineMode::Crlf => write!(f, "crlf"),
        }
    }
}

impl FromStr for NewlineMode {
    type Err = ConvertError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "nl" | "lf" | "\n" => Ok(NewlineMode::Lf),
            "crlf" | "\r\n" => Ok(NewlineMode::Crlf),
            "auto" | "any" | "" => Ok(NewlineMode::Auto),
            _ => Err(ConvertError::InvalidOption(format!(
                "invalid newline mode '{}', expected auto, nl or crlf",
                s.escape_default()
            ))),
        }
    }
}

/// The newline convention used in `data`.
pub fn detect_newline(data: &[u8]) -> NewlineMode {
    if data.windows(2).any(|w| w == b"\r\n") {
        NewlineMode::Crlf
    } else if data.contains(&b'\n') {
        NewlineMode::Lf
    } else {
        NewlineMode::Auto
    }
}

/// Read every record of `data`; rows may have different lengths.
pub fn read_csv(delimiter: u8, data: &[u8]) -> Result<Table> {
    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(data);

    let mut table = Table::default();
    for record in reader.byte_records() {
        let record = record?;
        let line = record.position().map_or(0, |p| p.line());
        let row = record
            .iter()
            .enumerate()
            .map(|(i, field)| match std::str::from_utf8(field) {
                Ok(field) => Ok(field.to_string()),
                Err(_) => {
                    error!("line {line}, field {} is not valid UTF-8", i + 1);
                    Err(ConvertError::InvalidEncoding { line, field: i + 1 })
                }
            })
            .collect::<Result<_>>()?;
        table.push(row);
    }
    Ok(table)
}

/// Write all rows of `table`, quoting fields only where needed.
pub fn write_csv(delimiter: u8, newline: NewlineMode, table: &Table) -> Result<Vec<u8>> {
    let mut writer = WriterBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .terminator(newline.terminator())
        .from_writer(Vec::new());

    for row in table.rows() {
        writer.write_record(row)?;
    }
    writer
        .into_inner()
        .map_err(|e| ConvertError::Io(e.into_error()))
}
