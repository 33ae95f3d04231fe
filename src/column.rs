//! Column references and their resolution against a header row.
//!
//! A reference is resolved in this order:
//! 1. `*` expands to every header column, in order.
//! 2. Exact name match; duplicate header names all match.
//! 3. A numeral >= 1 is a 1-based position, which may lie beyond the header.
//!
//! Anything left over is reported in a single `ColumnNotFound` error.

use std::fmt;

use log::error;

use crate::error::{ConvertError, Result};
use crate::text::quote;

/// What a column reference points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnKey {
    /// `*`, all existing header columns.
    All,
    /// A header name.
    Name(String),
    /// A numeral. Matched by name first, then used as a 1-based position.
    Numeral { text: String, value: i64 },
}

impl ColumnKey {
    pub fn parse(s: &str) -> Self {
        if s == "*" {
            return ColumnKey::All;
        }
        match s.parse::<i64>() {
            Ok(value) => ColumnKey::Numeral {
                text: s.to_string(),
                value,
            },
            Err(_) => ColumnKey::Name(s.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            ColumnKey::All => "*",
            ColumnKey::Name(name) => name,
            ColumnKey::Numeral { text, .. } => text,
        }
    }
}

/// A column reference as written in a program, with its optional rename.
///
/// `kind` and `cast` hold the `name:type:cast` annotations of a select
/// column. They are kept for display and do not change field values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub key: ColumnKey,
    pub rename: Option<String>,
    pub kind: Option<String>,
    pub cast: Option<String>,
}

impl Column {
    pub fn new(name: &str) -> Self {
        Self {
            key: ColumnKey::parse(name),
            rename: None,
            kind: None,
            cast: None,
        }
    }

    pub fn renamed(name: &str, rename: &str) -> Self {
        Self {
            rename: Some(rename.to_string()),
            ..Self::new(name)
        }
    }

    pub fn name(&self) -> &str {
        self.key.as_str()
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", quote(self.name()))?;
        match (&self.kind, &self.cast) {
            (Some(kind), Some(cast)) => write!(f, ":{kind}:{cast}")?,
            (None, Some(cast)) => write!(f, ":{cast}")?,
            _ => {}
        }
        if let Some(rename) = &self.rename {
            write!(f, " as {}", quote(rename))?;
        }
        Ok(())
    }
}

/// Convenience for building a list of plain references.
pub fn cols(names: &[&str]) -> Vec<Column> {
    names.iter().map(|name| Column::new(name)).collect()
}

/// A resolved, zero-based column position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnIndex {
    pub index: usize,
    pub rename: Option<String>,
}

/// Resolve every reference in `columns` against `header`.
pub fn resolve(header: &[String], columns: &[Column]) -> Result<Vec<ColumnIndex>> {
    if header.is_empty() {
        error!("empty header, cannot resolve {} column(s)", columns.len());
        return Err(ConvertError::ColumnNotFound {
            columns: columns.iter().map(|c| c.name().to_string()).collect(),
        });
    }

    let mut indices = Vec::new();
    let mut not_found = Vec::new();

    for col in columns {
        let name = match &col.key {
            ColumnKey::All => {
                indices.extend((0..header.len()).map(|index| ColumnIndex {
                    index,
                    rename: None,
                }));
                continue;
            }
            ColumnKey::Name(name) => name,
            ColumnKey::Numeral { text, .. } => text,
        };

        if name.is_empty() {
            not_found.push(String::new());
            continue;
        }

        let before = indices.len();
        indices.extend(
            header
                .iter()
                .enumerate()
                .filter(|(_, h)| *h == name)
                .map(|(index, _)| ColumnIndex {
                    index,
                    rename: col.rename.clone(),
                }),
        );
        if indices.len() > before {
            continue;
        }

        match col.key {
            ColumnKey::Numeral { value, .. } if value >= 1 => indices.push(ColumnIndex {
                index: (value - 1) as usize,
                rename: col.rename.clone(),
            }),
            _ => not_found.push(name.clone()),
        }
    }

    if !not_found.is_empty() {
        error!("columns not found: {not_found:?}, header: {header:?}");
        return Err(ConvertError::ColumnNotFound { columns: not_found });
    }
    Ok(indices)
}

/// Resolve a reference that must name exactly one column.
pub fn resolve_one(header: &[String], column: &Column) -> Result<usize> {
    let indices = resolve(header, std::slice::from_ref(column))?;
    match indices.as_slice() {
        [only] => Ok(only.index),
        _ => Err(ConvertError::InvalidColumnIndex {
            column: column.name().to_string(),
            matches: indices.len(),
        }),
    }
}
