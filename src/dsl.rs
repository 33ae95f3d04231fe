//! Parser and evaluator for conversion programs.
//!
//! A program is a `|`-separated list of statements:
//! ```text
//! select name, age as years | filter years >= 18 | sort:num:desc years
//! ```
//!
//! Each statement is `keyword[:option[:option]] arguments`. Keywords and
//! options are case-insensitive.
//!
//! Supported statements:
//! - `select col, col as new, 'quoted name' -> new, *` (also `sel`, `get`) - choose, reorder and rename columns
//! - `number[:from[:to]] col` (also `num`) - strictly convert one numeric column (`dot`, `comma`)
//! - `numbers [from[:to]]` (also `nums`) - leniently convert every numeric field
//! - `date[:from[:to]] col` - strictly convert one date column
//! - `dates [from[:to]]` - leniently convert every date field
//! - `filter col op value` (also `and`, `where`, `if`) - keep matching rows
//! - `sort[:asc|:desc][:num|:dot|:comma] col` (also `order`) - stable sort of data rows
//!
//! A whole program is parsed before anything runs, so a typo in the last
//! statement aborts before the first one touches the table.

use std::fmt;

use log::{debug, warn};

use crate::column::{Column, ColumnKey};
use crate::date::{DateFormat, convert_date, convert_dates};
use crate::error::{ConvertError, Result};
use crate::filter::{Condition, filter};
use crate::number::{NumberFormat, convert_number, convert_numbers};
use crate::select::select_columns;
use crate::sort::sort;
use crate::table::Table;
use crate::text::{split_outside_quotes, split_token, split_unquoted, unquote};

/// A table-to-table transformation built from a statement.
pub type Converter = Box<dyn Fn(Table) -> Result<Table>>;

/// A parsed statement.
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Select {
        columns: Vec<Column>,
    },
    Number {
        column: Column,
        from: NumberFormat,
        to: NumberFormat,
    },
    Numbers {
        from: NumberFormat,
        to: NumberFormat,
    },
    Date {
        column: Column,
        from: DateFormat,
        to: DateFormat,
    },
    Dates {
        from: DateFormat,
        to: DateFormat,
    },
    Filter {
        column: Column,
        condition: Condition,
    },
    Sort {
        column: Column,
        ascending: bool,
        format: Option<NumberFormat>,
    },
}

impl Statement {
    pub fn name(&self) -> &'static str {
        match self {
            Statement::Select { .. } => "select",
            Statement::Number { .. } => "number",
            Statement::Numbers { .. } => "numbers",
            Statement::Date { .. } => "date",
            Statement::Dates { .. } => "dates",
            Statement::Filter { .. } => "filter",
            Statement::Sort { .. } => "sort",
        }
    }

    /// Run this statement on `table`.
    pub fn apply(&self, table: Table) -> Result<Table> {
        match self {
            Statement::Select { columns } => select_columns(table, columns),
            Statement::Number { column, from, to } => convert_number(table, column, *from, *to),
            Statement::Numbers { from, to } => Ok(convert_numbers(table, *from, *to)),
            Statement::Date { column, from, to } => convert_date(table, column, *from, *to),
            Statement::Dates { from, to } => Ok(convert_dates(table, *from, *to)),
            Statement::Filter { column, condition } => filter(table, column, condition),
            Statement::Sort {
                column,
                ascending,
                format,
            } => sort(table, column, *ascending, *format),
        }
    }

    /// Turn this statement into a standalone converter.
    pub fn converter(&self) -> Converter {
        let statement = self.clone();
        Box::new(move |table| statement.apply(table))
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Statement::Select { columns } => {
                let columns: Vec<String> = columns.iter().map(|c| c.to_string()).collect();
                write!(f, "select {}", columns.join(", "))
            }
            Statement::Number { column, from, to } => write!(f, "number:{from}:{to} {column}"),
            Statement::Numbers { from, to } => write!(f, "numbers:{from}:{to}"),
            Statement::Date { column, from, to } => write!(f, "date:{from}:{to} {column}"),
            Statement::Dates { from, to } => write!(f, "dates:{from}:{to}"),
            Statement::Filter { column, condition } => write!(f, "filter {column} {condition}"),
            Statement::Sort {
                column,
                ascending,
                format,
            } => {
                write!(f, "sort")?;
                if let Some(format) = format {
                    write!(f, ":{format}")?;
                }
                if !ascending {
                    write!(f, ":desc")?;
                }
                write!(f, " {column}")
            }
        }
    }
}

/// Statement text split into keyword, colon options and arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
struct StatementText<'a> {
    text: &'a str,
    keyword: String,
    options: Vec<String>,
    args: &'a str,
}

impl<'a> StatementText<'a> {
    fn split(text: &'a str) -> Self {
        let (head, args) = match text.split_once(char::is_whitespace) {
            Some((head, args)) => (head, args.trim()),
            None => (text, ""),
        };
        let mut parts = head.split(':').map(|p| p.trim().to_lowercase());
        let keyword = parts.next().unwrap_or_default();
        let options = parts.filter(|p| !p.is_empty()).collect();
        Self {
            text,
            keyword,
            options,
            args,
        }
    }

    fn invalid(&self, reason: impl Into<String>) -> ConvertError {
        ConvertError::statement(self.text, reason)
    }

    /// Options from the keyword suffix followed by any in the arguments.
    fn all_options(&self) -> Vec<String> {
        let mut options = self.options.clone();
        options.extend(
            self.args
                .split(|c: char| c == ':' || c.is_whitespace())
                .filter(|s| !s.is_empty())
                .map(str::to_lowercase),
        );
        options
    }

    /// The single column argument; a quoted name may contain spaces.
    fn single_column(&self) -> Result<Column> {
        let (token, rest) = split_token(self.args);
        let name = unquote(token);
        if name.is_empty() || !rest.is_empty() {
            return Err(self.invalid("expected exactly one column"));
        }
        Ok(Column::new(name))
    }
}

/// Parse a program into its statements.
///
/// An empty program has no statements and leaves the table as it is.
pub fn parse_statements(program: &str) -> Result<Vec<Statement>> {
    let program = program.trim();
    if program.is_empty() {
        return Ok(Vec::new());
    }
    split_unquoted(program, '|')
        .into_iter()
        .map(parse_statement)
        .collect()
}

/// Parse a program given as command line words, joined with spaces.
pub fn parse_program<S: AsRef<str>>(words: &[S]) -> Result<Vec<Statement>> {
    let program: Vec<&str> = words.iter().map(AsRef::as_ref).collect();
    parse_statements(&program.join(" "))
}

/// Parse a single statement.
pub fn parse_statement(text: &str) -> Result<Statement> {
    let st = StatementText::split(text.trim());
    debug!(
        "statement {:?}: keyword {:?}, options {:?}, args {:?}",
        st.text, st.keyword, st.options, st.args
    );

    match st.keyword.as_str() {
        "select" | "sel" | "get" => parse_select(&st),
        "number" | "num" => {
            let (from, to) = number_formats(&st, &st.options)?;
            Ok(Statement::Number {
                column: st.single_column()?,
                from,
                to,
            })
        }
        "numbers" | "nums" => {
            let (from, to) = number_formats(&st, &st.all_options())?;
            Ok(Statement::Numbers { from, to })
        }
        "date" => {
            let (from, to) = date_formats(&st, &st.options)?;
            Ok(Statement::Date {
                column: st.single_column()?,
                from,
                to,
            })
        }
        "dates" => {
            let (from, to) = date_formats(&st, &st.all_options())?;
            Ok(Statement::Dates { from, to })
        }
        "filter" | "and" | "where" | "if" => parse_filter(&st),
        "sort" | "order" => parse_sort(&st),
        _ => Err(ConvertError::UnknownStatement(st.text.to_string())),
    }
}

fn number_formats(st: &StatementText, options: &[String]) -> Result<(NumberFormat, NumberFormat)> {
    match options {
        [] => Ok((NumberFormat::Dot, NumberFormat::Dot)),
        [to] => Ok((NumberFormat::Dot, to.parse()?)),
        [from, to] => Ok((from.parse()?, to.parse()?)),
        _ => Err(st.invalid("expected at most two number formats")),
    }
}

fn date_formats(st: &StatementText, options: &[String]) -> Result<(DateFormat, DateFormat)> {
    match options {
        [] => Ok((DateFormat::Any, DateFormat::Iso)),
        [to] => Ok((DateFormat::Any, DateFormat::parse_target(to)?)),
        [from, to] => Ok((from.parse()?, DateFormat::parse_target(to)?)),
        _ => Err(st.invalid("expected at most two date formats")),
    }
}

fn parse_select(st: &StatementText) -> Result<Statement> {
    if st.args.is_empty() {
        return Err(st.invalid("expected at least one column"));
    }
    let specs = split_unquoted(st.args, ',');
    let columns = specs
        .iter()
        .map(|spec| parse_select_column(st, spec))
        .collect::<Result<Vec<_>>>()?;
    Ok(Statement::Select { columns })
}

/// `name`, `name:cast` or `name:type:cast`, optionally followed by
/// `as new` or `-> new`. Quoted names keep their spaces and colons.
fn parse_select_column(st: &StatementText, spec: &str) -> Result<Column> {
    let (spec, rename) = match split_rename(spec).as_slice() {
        [spec] => (*spec, None),
        [spec, rename] => (*spec, Some(unquote(rename))),
        _ => return Err(st.invalid(format!("multiple renames in '{spec}'"))),
    };

    let non_empty = |s: &str| (!s.is_empty()).then(|| s.to_string());
    let (name, kind, cast) = match split_unquoted(spec, ':').as_slice() {
        [name] => (*name, None, None),
        [name, cast] => (*name, None, non_empty(*cast)),
        [name, kind, cast] => (*name, non_empty(*kind), non_empty(*cast)),
        _ => return Err(st.invalid(format!("too many ':' in '{spec}'"))),
    };
    let name = unquote(name);
    if name.is_empty() || rename.is_some_and(str::is_empty) {
        return Err(st.invalid(format!("empty column name in '{spec}'")));
    }

    Ok(Column {
        key: ColumnKey::parse(name),
        rename: rename.map(str::to_string),
        kind,
        cast,
    })
}

/// Split a select column at `->` and at `as` words outside quotes.
fn split_rename(spec: &str) -> Vec<&str> {
    split_outside_quotes(spec, |s, i| {
        let rest = &s[i..];
        if rest.starts_with("->") {
            return Some(2);
        }
        let is_as = rest.get(..2).is_some_and(|w| w.eq_ignore_ascii_case("as"))
            && (i == 0 || s[..i].ends_with(char::is_whitespace))
            && (rest.len() == 2 || rest[2..].starts_with(char::is_whitespace));
        is_as.then_some(2)
    })
    .into_iter()
    .map(str::trim)
    .collect()
}

/// `column operator value`; the value is everything after the operator.
fn parse_filter(st: &StatementText) -> Result<Statement> {
    let (column, rest) = split_token(st.args);
    let (op, value) = split_token(rest);
    let column = unquote(column);
    if column.is_empty() || op.is_empty() || value.trim().is_empty() {
        return Err(st.invalid("expected: column operator value"));
    }
    Ok(Statement::Filter {
        column: Column::new(column),
        condition: Condition::parse(op, value)?,
    })
}

fn parse_sort(st: &StatementText) -> Result<Statement> {
    let mut ascending = true;
    let mut format = None;
    for option in &st.options {
        match option.as_str() {
            "asc" => ascending = true,
            "desc" => ascending = false,
            "num" => format = format.or(Some(NumberFormat::Dot)),
            "dot" => format = Some(NumberFormat::Dot),
            "comma" => format = Some(NumberFormat::Comma),
            other => warn!("ignoring unknown sort option '{other}' in '{}'", st.text),
        }
    }
    Ok(Statement::Sort {
        column: st.single_column()?,
        ascending,
        format,
    })
}

/// Parse `program` and run it on `table`.
pub fn run_program(program: &str, table: Table) -> Result<Table> {
    crate::executor::execute(table, &parse_statements(program)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::cols;

    fn people() -> Table {
        Table::from_strs(&[
            &["name", "age", "active", "full name", "date"],
            &["Alice", "25", "true", "Alice A.", "01.01.2020"],
            &["Bob", "30", "false", "Bob B.", "03.03.2023"],
            &["Charlie", "", "", "Charlie C.", "12.12.2021"],
        ])
    }

    fn parse_one(text: &str) -> Statement {
        let mut statements = parse_statements(text).unwrap();
        assert_eq!(statements.len(), 1, "{text}");
        statements.remove(0)
    }

    #[test]
    fn test_parse_statements() {
        let cases = [
            (
                "select col1, col2",
                Statement::Select {
                    columns: cols(&["col1", "col2"]),
                },
            ),
            (
                "number:dot col1",
                Statement::Number {
                    column: Column::new("col1"),
                    from: NumberFormat::Dot,
                    to: NumberFormat::Dot,
                },
            ),
            (
                "date:iso col1",
                Statement::Date {
                    column: Column::new("col1"),
                    from: DateFormat::Any,
                    to: DateFormat::Iso,
                },
            ),
            (
                "numbers",
                Statement::Numbers {
                    from: NumberFormat::Dot,
                    to: NumberFormat::Dot,
                },
            ),
            (
                "dates",
                Statement::Dates {
                    from: DateFormat::Any,
                    to: DateFormat::Iso,
                },
            ),
            (
                "filter col1 > 10",
                Statement::Filter {
                    column: Column::new("col1"),
                    condition: Condition::parse(">", "10").unwrap(),
                },
            ),
            (
                "and col1 = 10",
                Statement::Filter {
                    column: Column::new("col1"),
                    condition: Condition::parse("=", "10").unwrap(),
                },
            ),
        ];

        for (text, want) in cases {
            assert_eq!(parse_one(text), want, "{text}");
        }
    }

    #[test]
    fn test_parse_pipeline() {
        let statements = parse_statements("select col1|numbers dot|dates iso").unwrap();
        assert_eq!(
            statements,
            vec![
                Statement::Select {
                    columns: cols(&["col1"]),
                },
                Statement::Numbers {
                    from: NumberFormat::Dot,
                    to: NumberFormat::Dot,
                },
                Statement::Dates {
                    from: DateFormat::Any,
                    to: DateFormat::Iso,
                },
            ]
        );
    }

    #[test]
    fn test_parse_options() {
        assert_eq!(
            parse_one("NUMBERS dot:comma"),
            Statement::Numbers {
                from: NumberFormat::Dot,
                to: NumberFormat::Comma,
            }
        );
        assert_eq!(
            parse_one("numbers:comma:dot"),
            Statement::Numbers {
                from: NumberFormat::Comma,
                to: NumberFormat::Dot,
            }
        );
        assert_eq!(
            parse_one("date:dot:slash2 d"),
            Statement::Date {
                column: Column::new("d"),
                from: DateFormat::Dot,
                to: DateFormat::Slash2,
            }
        );
        assert_eq!(
            parse_one("number:comma 'unit price'"),
            Statement::Number {
                column: Column::new("unit price"),
                from: NumberFormat::Dot,
                to: NumberFormat::Comma,
            }
        );
    }

    #[test]
    fn test_keyword_aliases() {
        assert_eq!(parse_one("GET a"), parse_one("select a"));
        assert_eq!(parse_one("sel a"), parse_one("select a"));
        assert_eq!(parse_one("num:comma a"), parse_one("number:comma a"));
        assert_eq!(parse_one("nums:comma"), parse_one("numbers comma"));
        assert_eq!(parse_one("if a = 1"), parse_one("where a = 1"));
        assert_eq!(parse_one("order:desc a"), parse_one("sort:desc a"));
    }

    #[test]
    fn test_parse_sort() {
        assert_eq!(
            parse_one("sort:num:desc age"),
            Statement::Sort {
                column: Column::new("age"),
                ascending: false,
                format: Some(NumberFormat::Dot),
            }
        );
        assert_eq!(
            parse_one("order:comma b"),
            Statement::Sort {
                column: Column::new("b"),
                ascending: true,
                format: Some(NumberFormat::Comma),
            }
        );
        // unknown options are ignored
        assert_eq!(
            parse_one("sort:foo:desc b"),
            Statement::Sort {
                column: Column::new("b"),
                ascending: false,
                format: None,
            }
        );
    }

    #[test]
    fn test_parse_select_columns() {
        let Statement::Select { columns } =
            parse_one("select 'full name' as name2, a -> b, c:int, d:text:int, *")
        else {
            panic!("Expected Select statement");
        };
        assert_eq!(columns[0], Column::renamed("full name", "name2"));
        assert_eq!(columns[1], Column::renamed("a", "b"));
        assert_eq!(columns[2].name(), "c");
        assert_eq!(columns[2].kind, None);
        assert_eq!(columns[2].cast.as_deref(), Some("int"));
        assert_eq!(columns[3].kind.as_deref(), Some("text"));
        assert_eq!(columns[3].cast.as_deref(), Some("int"));
        assert_eq!(columns[4].key, ColumnKey::All);
        // "as" only counts as a whole word
        assert_eq!(parse_one("select alias"), Statement::Select { columns: cols(&["alias"]) });
    }

    #[test]
    fn test_parse_errors() {
        let invalid = [
            "number a b",
            "number:dot:comma:dot a",
            "number",
            "numbers dot comma dot",
            "filter a >",
            "filter a",
            "select",
            "select a:b:c:d",
            "select a as b as c",
            "select a as",
            "sort",
            "sort a b",
        ];
        for text in invalid {
            assert!(
                matches!(parse_statements(text), Err(ConvertError::InvalidStatement { .. })),
                "{text}"
            );
        }

        assert!(matches!(
            parse_statements("frobnicate x"),
            Err(ConvertError::UnknownStatement(_))
        ));
        assert!(matches!(
            parse_statements("select a || sort a"),
            Err(ConvertError::UnknownStatement(_))
        ));
        assert!(matches!(
            parse_statements("date:any a"),
            Err(ConvertError::InvalidDateFormat(_))
        ));
        assert!(matches!(
            parse_statements("number:float a"),
            Err(ConvertError::InvalidNumberFormat(_))
        ));
        assert!(matches!(
            parse_statements("filter a ~~ b"),
            Err(ConvertError::UnknownOperator(_))
        ));
    }

    #[test]
    fn test_display_round_trips() {
        for text in [
            "select a, b as c",
            "number:dot:comma x",
            "filter age >= 18",
            "sort:dot:desc age",
            "date:yyyy-mm-dd:dd/mm/yyyy d",
            "number:dot:comma 'unit price'",
            "date:any:yyyy-mm-dd 'due date'",
            "sort:desc 'unit price'",
            "filter 'full name' = 'Bob  B.'",
            "select 'full name' as 'given name', 'a:b':text:int, \"it's x\"",
        ] {
            let statement = parse_one(text);
            assert_eq!(statement.to_string(), text);
            assert_eq!(parse_one(&statement.to_string()), statement);
        }

        let statement = parse_one("number:comma 'unit price'");
        assert_eq!(statement.to_string(), "number:dot:comma 'unit price'");
        assert_eq!(parse_one(&statement.to_string()), statement);
    }

    #[test]
    fn test_quoted_text_keeps_its_spacing() {
        let Statement::Select { columns } = parse_one("select 'a  b' as 'x  as  y', 'p|q'") else {
            panic!("Expected Select statement");
        };
        assert_eq!(columns[0], Column::renamed("a  b", "x  as  y"));
        assert_eq!(columns[1], Column::new("p|q"));

        let Statement::Filter { column, condition } = parse_one("filter f = 'x  y'") else {
            panic!("Expected Filter statement");
        };
        assert_eq!(column, Column::new("f"));
        assert_eq!(condition.op(), crate::filter::Operator::Eq);
        assert_eq!(condition.literal(), "'x  y'");

        let t = Table::from_strs(&[&["a  b", "f"], &["1", "x  y"], &["2", "x y"]]);
        assert_eq!(
            run_program("filter f = 'x  y' | select 'a  b'", t).unwrap(),
            Table::from_strs(&[&["a  b"], &["1"]])
        );
        assert!(parse_statements("filter name = O'Brien | sort name").unwrap().len() == 2);
    }

    #[test]
    fn test_programs() {
        let cases = [
            (
                "select name, age | filter name ~ '[a-z]*'",
                Table::from_strs(&[
                    &["name", "age"],
                    &["Alice", "25"],
                    &["Bob", "30"],
                    &["Charlie", ""],
                ]),
            ),
            (
                "select * | filter age = 30 | select name | filter name = 'Bob' | filter name like 'B%'",
                Table::from_strs(&[&["name"], &["Bob"]]),
            ),
            (
                "select 'full name' as name2 | select name2 -> name | filter name ~ 'Bob'",
                Table::from_strs(&[&["name"], &["Bob B."]]),
            ),
            (
                "select name, date | dates iso | date:iso:slash date | date:slash:dot date | date:iso date | filter name = 'Bob'",
                Table::from_strs(&[&["name", "date"], &["Bob", "2023-03-03"]]),
            ),
            (
                "select name, age | number:dot age | sort:num age | select name",
                Table::from_strs(&[&["name"], &["Charlie"], &["Alice"], &["Bob"]]),
            ),
            (
                "select name, age | number:dot age | sort:num:desc age | select name",
                Table::from_strs(&[&["name"], &["Bob"], &["Alice"], &["Charlie"]]),
            ),
        ];

        for (program, want) in cases {
            assert_eq!(run_program(program, people()).unwrap(), want, "{program}");
        }
    }

    #[test]
    fn test_filter_and_numeric_sort() {
        let t = Table::from_strs(&[
            &["name", "age", "city"],
            &["Alice", "30", "Oslo"],
            &["Bob", "17", "Rome"],
            &["Cara", "45", "Bern"],
        ]);
        let got = run_program("select name, age | filter age >= 18 | sort:num:desc age", t).unwrap();
        assert_eq!(
            got,
            Table::from_strs(&[&["name", "age"], &["Cara", "45"], &["Alice", "30"]])
        );
    }

    #[test]
    fn test_date_column_conversion() {
        let t = Table::from_strs(&[&["d"], &["2023-03-04"]]);
        let got = run_program("date:iso:slash d", t).unwrap();
        assert_eq!(got, Table::from_strs(&[&["d"], &["04/03/2023"]]));
    }

    #[test]
    fn test_bad_statement_aborts_before_running() {
        let t = Table::from_strs(&[&["a"], &["1"]]);
        assert!(matches!(
            run_program("select a | filter a between 1", t.clone()),
            Err(ConvertError::UnknownOperator(_))
        ));
        assert!(matches!(
            run_program("select b | frobnicate", t),
            Err(ConvertError::UnknownStatement(_))
        ));
    }

    #[test]
    fn test_empty_program_is_identity() {
        let t = people();
        assert_eq!(run_program("  ", t.clone()).unwrap(), t);
    }

    #[test]
    fn test_converter_and_program_words() {
        let statements = parse_program(&["select", "name,", "age", "|", "filter", "age", ">", "26"]).unwrap();
        assert_eq!(statements.len(), 2);
        let table = statements
            .iter()
            .map(Statement::converter)
            .try_fold(people(), |table, convert| convert(table))
            .unwrap();
        assert_eq!(table, Table::from_strs(&[&["name", "age"], &["Bob", "30"]]));
    }
}
