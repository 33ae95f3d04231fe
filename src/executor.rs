//! Statement-at-a-time program executor.
//!
//! Each statement consumes the whole table produced by the previous one.
//! The first error stops execution and no partial table is returned.

use log::{debug, error};

use crate::dsl::{Converter, Statement, parse_program, parse_statements};
use crate::error::Result;
use crate::table::Table;

/// Data row counts observed around a single statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageInfo {
    pub name: String,
    pub input_count: usize,
    pub output_count: usize,
}

/// Run `statements` in order on `table`.
pub fn execute(table: Table, statements: &[Statement]) -> Result<Table> {
    let (table, _) = execute_traced(table, statements)?;
    Ok(table)
}

/// Run `statements` in order, recording the row count before and after each one.
pub fn execute_traced(table: Table, statements: &[Statement]) -> Result<(Table, Vec<StageInfo>)> {
    let mut trace = Vec::with_capacity(statements.len());
    let mut current = table;

    for (i, statement) in statements.iter().enumerate() {
        let input_count = current.count();
        current = statement.apply(current).inspect_err(|e| {
            error!("statement {} '{statement}' failed: {e}", i + 1);
        })?;
        debug!(
            "statement {} '{statement}': {input_count} -> {} rows",
            i + 1,
            current.count()
        );
        trace.push(StageInfo {
            name: statement.to_string(),
            input_count,
            output_count: current.count(),
        });
    }

    Ok((current, trace))
}

/// Chain converters, feeding each one the output of the previous.
pub fn chain(converters: Vec<Converter>) -> Converter {
    Box::new(move |table| converters.iter().try_fold(table, |table, convert| convert(table)))
}

/// A parsed program, ready to run on any number of tables.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Pipeline {
    statements: Vec<Statement>,
}

impl Pipeline {
    pub fn new(statements: Vec<Statement>) -> Self {
        Self { statements }
    }

    /// Parse a program from its text.
    pub fn parse(program: &str) -> Result<Self> {
        Ok(Self::new(parse_statements(program)?))
    }

    /// Parse a program from command line words.
    pub fn from_words<S: AsRef<str>>(words: &[S]) -> Result<Self> {
        Ok(Self::new(parse_program(words)?))
    }

    pub fn statements(&self) -> &[Statement] {
        &self.statements
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    pub fn run(&self, table: Table) -> Result<Table> {
        execute(table, &self.statements)
    }

    pub fn run_traced(&self, table: Table) -> Result<(Table, Vec<StageInfo>)> {
        execute_traced(table, &self.statements)
    }

    /// Compile the whole program into one converter.
    pub fn converter(&self) -> Converter {
        chain(self.statements.iter().map(Statement::converter).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConvertError;

    fn people() -> Table {
        Table::from_strs(&[
            &["name", "age"],
            &["Alice", "30"],
            &["Bob", "17"],
            &["Cara", "45"],
        ])
    }

    #[test]
    fn test_execute_in_order() {
        let pipeline = Pipeline::parse("filter age >= 18 | sort:num:desc age | select name").unwrap();
        assert_eq!(pipeline.statements().len(), 3);
        let got = pipeline.run(people()).unwrap();
        assert_eq!(got, Table::from_strs(&[&["name"], &["Cara"], &["Alice"]]));
    }

    #[test]
    fn test_traced_counts() {
        let pipeline = Pipeline::parse("filter age >= 18 | select name").unwrap();
        let (table, trace) = pipeline.run_traced(people()).unwrap();
        assert_eq!(table.count(), 2);
        assert_eq!(
            trace,
            vec![
                StageInfo {
                    name: "filter age >= 18".to_string(),
                    input_count: 3,
                    output_count: 2,
                },
                StageInfo {
                    name: "select name".to_string(),
                    input_count: 2,
                    output_count: 2,
                },
            ]
        );
    }

    #[test]
    fn test_empty_pipeline_is_identity() {
        let pipeline = Pipeline::parse("").unwrap();
        assert!(pipeline.is_empty());
        assert_eq!(pipeline.run(people()).unwrap(), people());
    }

    #[test]
    fn test_first_error_stops_execution() {
        let pipeline = Pipeline::parse("select name | sort age").unwrap();
        assert!(matches!(
            pipeline.run(people()),
            Err(ConvertError::ColumnNotFound { .. })
        ));
    }

    #[test]
    fn test_converter_matches_run() {
        let pipeline = Pipeline::from_words(&["filter", "name", "in", "(Bob,", "Cara)"]).unwrap();
        let convert = pipeline.converter();
        assert_eq!(convert(people()).unwrap(), pipeline.run(people()).unwrap());
        assert_eq!(convert(people()).unwrap().count(), 2);
    }
}
