//! Date parsing and formatting for the five supported day/month/year layouts.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use chrono::{Datelike, NaiveDate};
use log::debug;
use regex::Regex;

use crate::column::{Column, resolve_one};
use crate::error::{ConvertError, Result};
use crate::table::Table;

/// A date layout. `Any` is only meaningful as a source format and probes
/// the concrete layouts in [`DateFormat::PROBE_ORDER`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DateFormat {
    Any,
    /// `dd.mm.yyyy`
    Dot,
    /// `dd.mm.yy`
    Dot2,
    /// `dd/mm/yyyy`
    Slash,
    /// `dd/mm/yy`
    Slash2,
    /// `yyyy-mm-dd`
    Iso,
}

struct Layout {
    shape: Regex,
    chrono: &'static str,
}

fn layout(shape: &str, chrono: &'static str) -> Layout {
    Layout {
        shape: Regex::new(shape).expect("valid regex"),
        chrono,
    }
}

// chrono accepts short digit runs (%Y matches "21"), so each layout is
// gated by an exact shape first.
static DOT: LazyLock<Layout> = LazyLock::new(|| layout(r"^\d{2}\.\d{2}\.\d{4}$", "%d.%m.%Y"));
static DOT2: LazyLock<Layout> = LazyLock::new(|| layout(r"^\d{2}\.\d{2}\.\d{2}$", "%d.%m.%y"));
static SLASH: LazyLock<Layout> = LazyLock::new(|| layout(r"^\d{2}/\d{2}/\d{4}$", "%d/%m/%Y"));
static SLASH2: LazyLock<Layout> = LazyLock::new(|| layout(r"^\d{2}/\d{2}/\d{2}$", "%d/%m/%y"));
static ISO: LazyLock<Layout> = LazyLock::new(|| layout(r"^\d{4}-\d{2}-\d{2}$", "%Y-%m-%d"));

impl DateFormat {
    pub const PROBE_ORDER: [DateFormat; 5] = [
        DateFormat::Dot,
        DateFormat::Slash,
        DateFormat::Iso,
        DateFormat::Dot2,
        DateFormat::Slash2,
    ];

    fn layout(self) -> Option<&'static Layout> {
        match self {
            DateFormat::Any => None,
            DateFormat::Dot => Some(&*DOT),
            DateFormat::Dot2 => Some(&*DOT2),
            DateFormat::Slash => Some(&*SLASH),
            DateFormat::Slash2 => Some(&*SLASH2),
            DateFormat::Iso => Some(&*ISO),
        }
    }

    /// Parse a format token that may be used as a conversion target.
    pub fn parse_target(s: &str) -> Result<Self> {
        match s.parse::<DateFormat>()? {
            DateFormat::Any => Err(ConvertError::InvalidDateFormat(s.to_string())),
            format => Ok(format),
        }
    }
}

impl fmt::Display for DateFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DateFormat::Any => "any",
            DateFormat::Dot => "dd.mm.yyyy",
            DateFormat::Dot2 => "dd.mm.yy",
            DateFormat::Slash => "dd/mm/yyyy",
            DateFormat::Slash2 => "dd/mm/yy",
            DateFormat::Iso => "yyyy-mm-dd",
        };
        write!(f, "{name}")
    }
}

impl FromStr for DateFormat {
    type Err = ConvertError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "any" | "auto" => Ok(DateFormat::Any),
            "dd.mm.yyyy" | "dot" | "." => Ok(DateFormat::Dot),
            "dd.mm.yy" | "dot2" => Ok(DateFormat::Dot2),
            "dd/mm/yyyy" | "slash" | "/" => Ok(DateFormat::Slash),
            "dd/mm/yy" | "slash2" => Ok(DateFormat::Slash2),
            "yyyy-mm-dd" | "iso" | "-" => Ok(DateFormat::Iso),
            _ => Err(ConvertError::InvalidDateFormat(s.to_string())),
        }
    }
}

/// Parse `s` in `format`, probing all layouts for [`DateFormat::Any`].
pub fn parse_date(s: &str, format: DateFormat) -> Result<NaiveDate> {
    let Some(layout) = format.layout() else {
        return DateFormat::PROBE_ORDER
            .iter()
            .find_map(|f| parse_date(s, *f).ok())
            .ok_or_else(|| ConvertError::InvalidDateFormat(s.to_string()));
    };
    let invalid = || ConvertError::InvalidDate {
        value: s.to_string(),
        format: format.to_string(),
    };
    if !layout.shape.is_match(s) {
        return Err(invalid());
    }
    let date = NaiveDate::parse_from_str(s, layout.chrono).map_err(|_| invalid())?;
    // Two-digit years 69-99 are 1969-1999; chrono alone reads 69 as 2069.
    if matches!(format, DateFormat::Dot2 | DateFormat::Slash2) && date.year() == 2069 {
        return Ok(date.with_year(1969).unwrap_or(date));
    }
    Ok(date)
}

/// Format `date` in `format`; `Any` formats as ISO.
pub fn format_date(date: NaiveDate, format: DateFormat) -> String {
    let layout = format.layout().unwrap_or(&*ISO);
    date.format(layout.chrono).to_string()
}

/// Strictly convert one column; every field present must parse in `from`.
pub fn convert_date(
    table: Table,
    column: &Column,
    from: DateFormat,
    to: DateFormat,
) -> Result<Table> {
    let header = table.header().map(Vec::as_slice).unwrap_or_default();
    let index = resolve_one(header, column)?;

    table.map_data(|mut row| {
        if index >= row.len() {
            return Ok(row);
        }
        let date = parse_date(&row[index], from)?;
        row[index] = format_date(date, to);
        Ok(row)
    })
}

/// Leniently convert every field that parses as a date in `from`.
pub fn convert_dates(table: Table, from: DateFormat, to: DateFormat) -> Table {
    table
        .into_rows()
        .into_iter()
        .map(|row| {
            row.into_iter()
                .map(|field| match parse_date(&field, from) {
                    Ok(date) => {
                        debug!("converting date {field:?} from {from} to {to}");
                        format_date(date, to)
                    }
                    Err(_) => field,
                })
                .collect()
        })
        .collect::<Vec<_>>()
        .into()
}
