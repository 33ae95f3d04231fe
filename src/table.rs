//! Table representation shared by every converter.
//!
//! A table is a list of rows; row 0 is the header and the remaining rows are
//! data. Rows are plain text fields and may be shorter or longer than the
//! header. Reading a missing field yields the empty string.

use std::cmp::Ordering;

/// A single row of text fields.
pub type Row = Vec<String>;

/// Header row plus data rows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    rows: Vec<Row>,
}

impl Table {
    pub fn new(rows: Vec<Row>) -> Self {
        Self { rows }
    }

    /// Build a table from string slices, mostly useful in tests and examples.
    pub fn from_strs(rows: &[&[&str]]) -> Self {
        Self::new(
            rows.iter()
                .map(|row| row.iter().map(|s| s.to_string()).collect())
                .collect(),
        )
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<Row> {
        self.rows
    }

    /// True when the table has no rows at all, not even a header.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The header row, if any.
    pub fn header(&self) -> Option<&Row> {
        self.rows.first()
    }

    /// A table holding only the header row (empty if there is none).
    pub fn header_table(&self) -> Table {
        Table::new(self.rows.iter().take(1).cloned().collect())
    }

    /// Rows after the header.
    pub fn data(&self) -> &[Row] {
        if self.rows.len() <= 1 {
            return &[];
        }
        &self.rows[1..]
    }

    /// Number of data rows.
    pub fn count(&self) -> usize {
        self.data().len()
    }

    /// Header plus the first `n` data rows.
    pub fn head(&self, n: usize) -> Table {
        if n == 0 || self.count() == 0 {
            return self.header_table();
        }
        if n >= self.count() {
            return self.clone();
        }
        Table::new(self.rows[..=n].to_vec())
    }

    /// Header plus the last `n` data rows.
    pub fn tail(&self, n: usize) -> Table {
        if n == 0 || self.count() == 0 {
            return self.header_table();
        }
        if n >= self.count() {
            return self.clone();
        }
        let mut rows = Vec::with_capacity(n + 1);
        rows.push(self.rows[0].clone());
        rows.extend_from_slice(&self.rows[self.rows.len() - n..]);
        Table::new(rows)
    }

    /// Append all rows of `other` after the rows of `self`.
    pub fn concat(mut self, other: Table) -> Table {
        self.rows.extend(other.rows);
        self
    }

    /// Append data rows below the current rows.
    pub fn push(&mut self, row: Row) {
        self.rows.push(row);
    }

    /// Keep the header and the data rows matching `predicate`.
    pub fn filter<F>(self, mut predicate: F) -> Table
    where
        F: FnMut(&Row) -> bool,
    {
        let mut rows = self.rows.into_iter();
        let Some(header) = rows.next() else {
            return Table::default();
        };
        let mut result = vec![header];
        result.extend(rows.filter(|row| predicate(row)));
        Table::new(result)
    }

    /// Stable-sort the data rows; the header stays first.
    pub fn sort_by<F>(mut self, compare: F) -> Table
    where
        F: FnMut(&Row, &Row) -> Ordering,
    {
        if self.rows.len() > 1 {
            self.rows[1..].sort_by(compare);
        }
        self
    }

    /// Apply `f` to every data row, keeping the header untouched.
    pub(crate) fn map_data<F>(self, mut f: F) -> crate::Result<Table>
    where
        F: FnMut(Row) -> crate::Result<Row>,
    {
        let mut rows = self.rows.into_iter();
        let Some(header) = rows.next() else {
            return Ok(Table::default());
        };
        let mut result = Vec::with_capacity(rows.len() + 1);
        result.push(header);
        for row in rows {
            result.push(f(row)?);
        }
        Ok(Table::new(result))
    }
}

impl From<Vec<Row>> for Table {
    fn from(rows: Vec<Row>) -> Self {
        Table::new(rows)
    }
}

/// Field `index` of `row`, or the empty string if the row is too short.
pub fn field(row: &[String], index: usize) -> &str {
    row.get(index).map(String::as_str).unwrap_or("")
}
