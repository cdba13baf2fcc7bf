//! Parsing of `--where` / `--or` conditions and bound values typed on the
//! command line.
//!
//! Two forms are accepted:
//!
//! - compact comparisons: `stock>=50`, `name!=bob`, `deleted_at=null`
//! - word operators: `name like %ham%`, `id in 1,2,3`, `email is not null`

use litequery_db::{
    query::{Condition, Operand, Operator},
    Value,
};

use crate::error::{CliError, CliResult};

const SYMBOLS: [&str; 7] = ["!=", "<>", ">=", "<=", "=", ">", "<"];

/// Interprets a command line token as a SQLite value.
///
/// `null` becomes NULL, integers and floats keep their numeric type, and
/// anything else is text. Surrounding single or double quotes force text.
pub fn parse_value(raw: &str) -> Value {
    let trimmed = raw.trim();

    for quote in ['\'', '"'] {
        if trimmed.len() >= 2 && trimmed.starts_with(quote) && trimmed.ends_with(quote) {
            return Value::Text(trimmed[1..trimmed.len() - 1].to_string());
        }
    }

    if trimmed.eq_ignore_ascii_case("null") {
        return Value::Null;
    }
    if let Ok(i) = trimmed.parse::<i64>() {
        return Value::Integer(i);
    }
    if let Ok(f) = trimmed.parse::<f64>() {
        if f.is_finite() {
            return Value::Real(f);
        }
    }
    Value::Text(trimmed.to_string())
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.')
}

/// Earliest operator symbol in `input`, preferring the longer one on ties.
fn find_symbol(input: &str) -> Option<(usize, &'static str)> {
    SYMBOLS
        .iter()
        .filter_map(|sym| input.find(sym).map(|idx| (idx, *sym)))
        .min_by(|a, b| a.0.cmp(&b.0).then(b.1.len().cmp(&a.1.len())))
}

fn parse_compact(input: &str) -> Option<Condition> {
    let (idx, sym) = find_symbol(input)?;
    let column = input[..idx].trim();
    if !is_identifier(column) {
        return None;
    }

    let operator = Operator::parse(sym)?;
    let value = parse_value(&input[idx + sym.len()..]);

    let cond = match (operator, value) {
        (Operator::Eq, Value::Null) => Condition::is_null(column),
        (Operator::Ne, Value::Null) => Condition::is_not_null(column),
        (operator, value) => Condition::new(column, operator, Some(Operand::Scalar(value))),
    };
    Some(cond)
}

fn parse_words(input: &str) -> Option<Condition> {
    let input = input.trim();
    let (column, rest) = input.split_once(char::is_whitespace)?;
    if !is_identifier(column) {
        return None;
    }
    let rest = rest.trim();

    if let Some(op) = Operator::parse(rest).filter(Operator::is_null_test) {
        return Some(Condition::new(column, op, None));
    }

    let words: Vec<&str> = rest.splitn(3, char::is_whitespace).collect();
    let (operator, value) = match words.as_slice() {
        [first, second, value] => match Operator::parse(&format!("{first} {second}")) {
            Some(op) => (op, *value),
            None => (Operator::parse(first)?, rest[first.len()..].trim()),
        },
        [first, value] => (Operator::parse(first)?, *value),
        _ => return None,
    };

    let cond = if operator.is_membership() {
        let values = value.split(',').map(parse_value).collect();
        Condition::new(column, operator, Some(Operand::List(values)))
    } else {
        Condition::new(column, operator, Some(Operand::Scalar(parse_value(value))))
    };
    Some(cond)
}

/// Parses one command line condition.
pub fn parse_condition(input: &str) -> CliResult<Condition> {
    parse_words(input)
        .or_else(|| parse_compact(input))
        .ok_or_else(|| CliError::InvalidCondition(input.to_string()))
}
