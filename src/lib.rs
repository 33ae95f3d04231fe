//! # csvconv
//!
//! A small pipe-separated query language for converting CSV tables.
//!
//! A program is a list of statements joined by `|`. Each statement takes
//! the whole table (header row plus data rows) and returns a new one:
//! columns can be selected and renamed, rows filtered and sorted, and
//! numbers and dates rewritten between regional formats.
//!
//! ## Overview
//!
//! - **Tables**: a header row followed by data rows; rows may be ragged
//! - **Columns**: referenced by name, by 1-based position, or `*`
//! - **Numbers**: `dot` (`1,234.5`) and `comma` (`1.234,5`) conventions
//! - **Dates**: `dd.mm.yyyy`, `dd.mm.yy`, `dd/mm/yyyy`, `dd/mm/yy`, `yyyy-mm-dd`
//! - **Errors**: the first failing statement aborts the whole program
//!
//! ## Example
//!
//! ```
//! use csvconv::{Pipeline, Table};
//!
//! let table = Table::from_strs(&[
//!     &["name", "age", "city"],
//!     &["Alice", "30", "Oslo"],
//!     &["Bob", "17", "Rome"],
//!     &["Cara", "45", "Bern"],
//! ]);
//!
//! let pipeline = Pipeline::parse("select name, age | filter age >= 18 | sort:num:desc age").unwrap();
//! let result = pipeline.run(table).unwrap();
//!
//! assert_eq!(
//!     result,
//!     Table::from_strs(&[&["name", "age"], &["Cara", "45"], &["Alice", "30"]])
//! );
//! ```

pub mod column;
pub mod date;
pub mod dsl;
pub mod error;
pub mod executor;
pub mod files;
pub mod filter;
pub mod io;
pub mod number;
pub mod options;
pub mod select;
pub mod sort;
pub mod table;
pub mod text;

pub use column::{Column, ColumnIndex, ColumnKey, cols, resolve, resolve_one};
pub use date::{DateFormat, convert_date, convert_dates, format_date, parse_date};
pub use dsl::{Converter, Statement, parse_program, parse_statement, parse_statements, run_program};
pub use error::{ConvertError, Result};
pub use executor::{Pipeline, StageInfo, chain, execute, execute_traced};
pub use files::{STDIN, convert_bytes, convert_csv};
pub use filter::{Condition, IsCheck, Operator, filter};
pub use io::{NewlineMode, detect_newline, read_csv, write_csv};
pub use number::{
    NumberFormat, clean_number, convert_number, convert_numbers, is_number, parse_number,
    replace_separator,
};
pub use options::{Options, parse_delimiters};
pub use select::select_columns;
pub use sort::sort;
pub use table::{Row, Table, field};
