//! WHERE conditions.
//!
//! A [`Condition`] names a column, an [`Operator`] and an optional operand.
//! Conditions are usually built through [`Col`]:
//!
//! ```
//! use litequery_db::query::{Col, Operator};
//!
//! let cond = Col::new("stock").gt(50);
//! assert_eq!(cond.operator, Operator::Gt);
//! ```
//!
//! Nothing here validates column names or operand types; mistakes surface as
//! SQLite errors when the statement runs.

use std::fmt;

use rusqlite::types::Value;

use crate::value::IntoValue;

/// Comparison operators understood by the clause compiler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Eq,
    Ne,
    Gt,
    Lt,
    Gte,
    Lte,
    Like,
    NotLike,
    In,
    NotIn,
    IsNull,
    IsNotNull,
}

impl Operator {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Operator::Eq => "=",
            Operator::Ne => "!=",
            Operator::Gt => ">",
            Operator::Lt => "<",
            Operator::Gte => ">=",
            Operator::Lte => "<=",
            Operator::Like => "LIKE",
            Operator::NotLike => "NOT LIKE",
            Operator::In => "IN",
            Operator::NotIn => "NOT IN",
            Operator::IsNull => "IS NULL",
            Operator::IsNotNull => "IS NOT NULL",
        }
    }

    /// Null tests take no operand and bind no parameter.
    pub const fn is_null_test(&self) -> bool {
        matches!(self, Operator::IsNull | Operator::IsNotNull)
    }

    pub const fn is_membership(&self) -> bool {
        matches!(self, Operator::In | Operator::NotIn)
    }

    /// Parses the SQL spelling of an operator, ignoring case and extra spaces.
    pub fn parse(s: &str) -> Option<Self> {
        let normalized = s.split_whitespace().collect::<Vec<_>>().join(" ");
        let op = match normalized.to_ascii_uppercase().as_str() {
            "=" | "==" => Operator::Eq,
            "!=" | "<>" => Operator::Ne,
            ">" => Operator::Gt,
            "<" => Operator::Lt,
            ">=" => Operator::Gte,
            "<=" => Operator::Lte,
            "LIKE" => Operator::Like,
            "NOT LIKE" => Operator::NotLike,
            "IN" => Operator::In,
            "NOT IN" => Operator::NotIn,
            "IS NULL" => Operator::IsNull,
            "IS NOT NULL" => Operator::IsNotNull,
            _ => return None,
        };
        Some(op)
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Right-hand side of a condition.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Scalar(Value),
    List(Vec<Value>),
}

/// A single `column operator operand` test.
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    pub column: String,
    pub operator: Operator,
    pub value: Option<Operand>,
}

impl Condition {
    pub fn new(column: impl Into<String>, operator: Operator, value: Option<Operand>) -> Self {
        Self {
            column: column.into(),
            operator,
            value,
        }
    }

    fn scalar(column: impl Into<String>, operator: Operator, value: impl IntoValue) -> Self {
        Self::new(column, operator, Some(Operand::Scalar(value.into_value())))
    }

    fn list<I, T>(column: impl Into<String>, operator: Operator, values: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: IntoValue,
    {
        let values = values.into_iter().map(IntoValue::into_value).collect();
        Self::new(column, operator, Some(Operand::List(values)))
    }

    pub fn eq(column: impl Into<String>, value: impl IntoValue) -> Self {
        Self::scalar(column, Operator::Eq, value)
    }

    pub fn ne(column: impl Into<String>, value: impl IntoValue) -> Self {
        Self::scalar(column, Operator::Ne, value)
    }

    pub fn gt(column: impl Into<String>, value: impl IntoValue) -> Self {
        Self::scalar(column, Operator::Gt, value)
    }

    pub fn lt(column: impl Into<String>, value: impl IntoValue) -> Self {
        Self::scalar(column, Operator::Lt, value)
    }

    pub fn gte(column: impl Into<String>, value: impl IntoValue) -> Self {
        Self::scalar(column, Operator::Gte, value)
    }

    pub fn lte(column: impl Into<String>, value: impl IntoValue) -> Self {
        Self::scalar(column, Operator::Lte, value)
    }

    /// `LIKE` with the pattern passed through verbatim; add `%` yourself.
    pub fn like(column: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self::scalar(column, Operator::Like, pattern.into())
    }

    pub fn not_like(column: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self::scalar(column, Operator::NotLike, pattern.into())
    }

    pub fn is_in<I, T>(column: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: IntoValue,
    {
        Self::list(column, Operator::In, values)
    }

    pub fn not_in<I, T>(column: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: IntoValue,
    {
        Self::list(column, Operator::NotIn, values)
    }

    pub fn is_null(column: impl Into<String>) -> Self {
        Self::new(column, Operator::IsNull, None)
    }

    pub fn is_not_null(column: impl Into<String>) -> Self {
        Self::new(column, Operator::IsNotNull, None)
    }
}

/// A named column reference that builds [`Condition`]s.
///
/// `Col` is `Copy` and usable in `const` items, which is what
/// [`define_table!`](crate::define_table) generates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Col {
    pub name: &'static str,
}

impl Col {
    pub const fn new(name: &'static str) -> Self {
        Self { name }
    }

    pub fn eq(self, value: impl IntoValue) -> Condition {
        Condition::eq(self.name, value)
    }

    pub fn ne(self, value: impl IntoValue) -> Condition {
        Condition::ne(self.name, value)
    }

    pub fn gt(self, value: impl IntoValue) -> Condition {
        Condition::gt(self.name, value)
    }

    pub fn lt(self, value: impl IntoValue) -> Condition {
        Condition::lt(self.name, value)
    }

    pub fn gte(self, value: impl IntoValue) -> Condition {
        Condition::gte(self.name, value)
    }

    pub fn lte(self, value: impl IntoValue) -> Condition {
        Condition::lte(self.name, value)
    }

    pub fn like(self, pattern: impl Into<String>) -> Condition {
        Condition::like(self.name, pattern)
    }

    pub fn not_like(self, pattern: impl Into<String>) -> Condition {
        Condition::not_like(self.name, pattern)
    }

    pub fn is_in<I, T>(self, values: I) -> Condition
    where
        I: IntoIterator<Item = T>,
        T: IntoValue,
    {
        Condition::is_in(self.name, values)
    }

    pub fn not_in<I, T>(self, values: I) -> Condition
    where
        I: IntoIterator<Item = T>,
        T: IntoValue,
    {
        Condition::not_in(self.name, values)
    }

    pub fn is_null(self) -> Condition {
        Condition::is_null(self.name)
    }

    pub fn is_not_null(self) -> Condition {
        Condition::is_not_null(self.name)
    }
}

impl fmt::Display for Col {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}
