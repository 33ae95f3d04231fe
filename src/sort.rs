//! Stable sorting of data rows by one column.

use std::cmp::Ordering;

use log::{debug, error};

use crate::column::{Column, resolve_one};
use crate::error::{ConvertError, Result};
use crate::number::{NumberFormat, parse_number};
use crate::table::{Row, Table, field};

/// Sort data rows by `column`; the header stays on top and ties keep their order.
///
/// Without a number format fields compare as text. With one, every field
/// must be a valid number in that format; empty fields and rows too short
/// for the column sort as zero.
pub fn sort(
    table: Table,
    column: &Column,
    ascending: bool,
    format: Option<NumberFormat>,
) -> Result<Table> {
    let header = table.header().map(Vec::as_slice).unwrap_or_default();
    let index = resolve_one(header, column)?;
    debug!("sort by {column} (index {index}), ascending: {ascending}, number format: {format:?}");

    let direct = |ord: Ordering| if ascending { ord } else { ord.reverse() };

    let Some(format) = format else {
        return Ok(table.sort_by(|a, b| direct(field(a, index).cmp(field(b, index)))));
    };

    let mut rows = table.into_rows().into_iter();
    let Some(header) = rows.next() else {
        return Ok(Table::default());
    };

    let mut keyed: Vec<(f64, Row)> = Vec::with_capacity(rows.len());
    for row in rows {
        let key = match row.get(index) {
            None => 0.0,
            Some(value) if value.is_empty() => 0.0,
            Some(value) => match parse_number(value, format) {
                Some(key) => key,
                None => {
                    error!("cannot sort by invalid {format} number {value:?}");
                    return Err(ConvertError::InvalidNumber {
                        value: value.clone(),
                        format,
                    });
                }
            },
        };
        keyed.push((key, row));
    }
    // Validated numbers are never NaN; -0 and 0 must tie.
    keyed.sort_by(|(a, _), (b, _)| direct(a.partial_cmp(b).unwrap_or(Ordering::Equal)));

    let mut result = Vec::with_capacity(keyed.len() + 1);
    result.push(header);
    result.extend(keyed.into_iter().map(|(_, row)| row));
    Ok(Table::new(result))
}
