//! Row filtering with typed comparisons.
//!
//! If both the field and the literal are valid `dot` numbers, ordering
//! operators compare numerically. Everything else compares as text against
//! the unquoted literal. Two `comma` numbers cannot be compared; convert
//! them with `number`/`numbers` first.

use std::fmt;
use std::str::FromStr;

use log::debug;
use regex::Regex;

use crate::column::{Column, resolve_one};
use crate::error::{ConvertError, Result};
use crate::number::{NumberFormat, is_number, parse_number};
use crate::table::{Table, field};
use crate::text::{trim_split, unquote, unwrap};

/// Filter operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    Contains,
    StartsWith,
    EndsWith,
    Like,
    Regexp,
    NotRegexp,
    In,
    Is,
}

impl Operator {
    /// Operators that have a numeric meaning.
    pub fn is_ordering(self) -> bool {
        matches!(
            self,
            Operator::Eq | Operator::Ne | Operator::Lt | Operator::Le | Operator::Gt | Operator::Ge
        )
    }

    fn holds<T: PartialOrd + ?Sized>(self, a: &T, b: &T) -> bool {
        match self {
            Operator::Eq => a == b,
            Operator::Ne => a != b,
            Operator::Lt => a < b,
            Operator::Le => a <= b,
            Operator::Gt => a > b,
            Operator::Ge => a >= b,
            _ => false,
        }
    }
}

impl FromStr for Operator {
    type Err = ConvertError;

    fn from_str(s: &str) -> Result<Self> {
        let op = match s.trim().to_lowercase().as_str() {
            "=" | "==" | "eq" => Operator::Eq,
            "!=" | "<>" | "neq" => Operator::Ne,
            "<" | "lt" => Operator::Lt,
            "<=" | "le" | "lte" => Operator::Le,
            ">" | "gt" => Operator::Gt,
            ">=" | "ge" | "gte" => Operator::Ge,
            "contains" => Operator::Contains,
            "startswith" => Operator::StartsWith,
            "endswith" => Operator::EndsWith,
            "like" => Operator::Like,
            "~" | "regexp" => Operator::Regexp,
            "!~" | "notregexp" => Operator::NotRegexp,
            "in" => Operator::In,
            "is" => Operator::Is,
            _ => return Err(ConvertError::UnknownOperator(s.to_string())),
        };
        Ok(op)
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let token = match self {
            Operator::Eq => "=",
            Operator::Ne => "!=",
            Operator::Lt => "<",
            Operator::Le => "<=",
            Operator::Gt => ">",
            Operator::Ge => ">=",
            Operator::Contains => "contains",
            Operator::StartsWith => "startswith",
            Operator::EndsWith => "endswith",
            Operator::Like => "like",
            Operator::Regexp => "~",
            Operator::NotRegexp => "!~",
            Operator::In => "in",
            Operator::Is => "is",
        };
        write!(f, "{token}")
    }
}

/// What an `is` literal tests for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IsCheck {
    Empty,
    NotEmpty,
    Equals(&'static str),
    NotEquals(&'static str),
}

impl IsCheck {
    fn parse(literal: &str) -> Option<Self> {
        let check = match literal.to_lowercase().as_str() {
            "null" | "nil" | "none" | "empty" => IsCheck::Empty,
            "not null" | "not nil" | "not none" | "not empty" => IsCheck::NotEmpty,
            "true" => IsCheck::Equals("true"),
            "false" => IsCheck::Equals("false"),
            "not true" => IsCheck::NotEquals("true"),
            "not false" => IsCheck::NotEquals("false"),
            _ => return None,
        };
        Some(check)
    }

    fn holds(self, value: &str) -> bool {
        match self {
            IsCheck::Empty => value.is_empty(),
            IsCheck::NotEmpty => !value.is_empty(),
            IsCheck::Equals(s) => value == s,
            IsCheck::NotEquals(s) => value != s,
        }
    }
}

#[derive(Debug, Clone)]
enum Operand {
    Text(String),
    Pattern(Regex),
    List(Vec<String>),
    Is(IsCheck),
}

/// An operator with its prepared literal, ready to test fields.
///
/// Patterns and lists are compiled once, so a malformed literal is
/// rejected before any row is looked at.
#[derive(Debug, Clone)]
pub struct Condition {
    op: Operator,
    literal: String,
    operand: Operand,
}

impl Condition {
    pub fn new(op: Operator, literal: &str) -> Result<Self> {
        let literal = literal.trim().to_string();
        let text = unquote(&literal);
        let invalid = |reason: String| ConvertError::InvalidOperand {
            op: op.to_string(),
            operand: literal.clone(),
            reason,
        };

        let operand = match op {
            Operator::Like => {
                let pattern = format!("^{}$", text.replace('.', "\\.").replace('%', ".*"));
                Operand::Pattern(Regex::new(&pattern).map_err(|e| invalid(e.to_string()))?)
            }
            Operator::Regexp | Operator::NotRegexp => {
                Operand::Pattern(Regex::new(text).map_err(|e| invalid(e.to_string()))?)
            }
            Operator::In => {
                if text.starts_with('(') != text.ends_with(')') {
                    return Err(invalid("unbalanced parentheses".to_string()));
                }
                let list: Vec<String> = trim_split(unwrap(text, "(", ")"), &[","])
                    .iter()
                    .map(|item| unquote(item).trim().to_string())
                    .collect();
                if list.is_empty() {
                    return Err(invalid("empty list".to_string()));
                }
                Operand::List(list)
            }
            Operator::Is => match IsCheck::parse(text) {
                Some(check) => Operand::Is(check),
                None => return Err(invalid("expected null, empty, true or false".to_string())),
            },
            _ => Operand::Text(text.to_string()),
        };

        Ok(Self {
            op,
            literal,
            operand,
        })
    }

    /// Parse both the operator token and the literal.
    pub fn parse(op: &str, literal: &str) -> Result<Self> {
        Self::new(op.parse()?, literal)
    }

    pub fn op(&self) -> Operator {
        self.op
    }

    pub fn literal(&self) -> &str {
        &self.literal
    }

    /// Test one field against the condition.
    pub fn matches(&self, value: &str) -> Result<bool> {
        let literal = self.literal.as_str();
        if is_number(value, NumberFormat::Dot) && is_number(literal, NumberFormat::Dot) {
            if self.op.is_ordering()
                && let (Some(a), Some(b)) = (
                    parse_number(value, NumberFormat::Dot),
                    parse_number(literal, NumberFormat::Dot),
                )
            {
                return Ok(self.op.holds(&a, &b));
            }
        } else if is_number(value, NumberFormat::Comma) && is_number(literal, NumberFormat::Comma)
        {
            return Err(ConvertError::UnnormalizedNumbers {
                left: value.to_string(),
                right: literal.to_string(),
            });
        }
        Ok(self.matches_text(value))
    }

    fn matches_text(&self, value: &str) -> bool {
        match (&self.operand, self.op) {
            (Operand::Text(b), Operator::Contains) => value.contains(b.as_str()),
            (Operand::Text(b), Operator::StartsWith) => value.starts_with(b.as_str()),
            (Operand::Text(b), Operator::EndsWith) => value.ends_with(b.as_str()),
            (Operand::Text(b), op) => op.holds(value, b.as_str()),
            (Operand::Pattern(re), Operator::NotRegexp) => !re.is_match(value),
            (Operand::Pattern(re), _) => re.is_match(value),
            (Operand::List(list), _) => {
                let search = unquote(value);
                list.iter().any(|item| item == search)
            }
            (Operand::Is(check), _) => check.holds(value),
        }
    }
}

impl PartialEq for Condition {
    fn eq(&self, other: &Self) -> bool {
        self.op == other.op && self.literal == other.literal
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.op, self.literal)
    }
}

/// Keep the header and the data rows whose `column` satisfies `condition`.
///
/// Rows shorter than the column compare as the empty string.
pub fn filter(table: Table, column: &Column, condition: &Condition) -> Result<Table> {
    let header = table.header().map(Vec::as_slice).unwrap_or_default();
    let index = resolve_one(header, column)?;
    debug!("filter {column} {condition} (index {index})");

    let mut failure = None;
    let result = table.filter(|row| {
        if failure.is_some() {
            return false;
        }
        match condition.matches(field(row, index)) {
            Ok(keep) => keep,
            Err(e) => {
                failure = Some(e);
                false
            }
        }
    });

    match failure {
        Some(e) => Err(e),
        None => Ok(result),
    }
}
