//! Column selection, reordering and renaming.

use log::debug;

use crate::column::{Column, resolve};
use crate::error::Result;
use crate::table::{Table, field};

/// Build a table from the resolved `columns`, in the order given.
///
/// `*` expands to all header columns, duplicate header names fan out, and a
/// position past the end of a row yields an empty field. Renamed columns
/// take their new name in the header.
pub fn select_columns(table: Table, columns: &[Column]) -> Result<Table> {
    if columns.is_empty() {
        return Ok(table);
    }

    let header = table.header().map(Vec::as_slice).unwrap_or_default();
    let indices = resolve(header, columns)?;
    debug!(
        "selecting columns {:?} at {:?}",
        columns.iter().map(|c| c.to_string()).collect::<Vec<_>>(),
        indices.iter().map(|c| c.index).collect::<Vec<_>>()
    );

    let mut rows = table.into_rows().into_iter();
    let mut result = Vec::with_capacity(rows.len());

    if let Some(header) = rows.next() {
        result.push(
            indices
                .iter()
                .map(|col| match &col.rename {
                    Some(rename) => rename.clone(),
                    None => field(&header, col.index).to_string(),
                })
                .collect(),
        );
    }
    for row in rows {
        result.push(
            indices
                .iter()
                .map(|col| field(&row, col.index).to_string())
                .collect(),
        );
    }

    Ok(Table::new(result))
}
