//! Internal representation of query clauses.
//!
//! Conditions are rendered into [`Fragment`]s as soon as they are added to a
//! builder. Each fragment keeps the parameters it binds, so joining fragments
//! in order also yields the parameter list in placeholder order.

use rusqlite::types::Value;

use crate::query::condition::{Condition, Operand};

/// How a fragment attaches to the expression before it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Joiner {
    And,
    Or,
}

/// One rendered WHERE condition.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Fragment {
    pub sql: String,
    pub params: Vec<Value>,
    pub joiner: Joiner,
}

impl Fragment {
    pub fn new(cond: &Condition, joiner: Joiner) -> Self {
        let mut params = Vec::new();
        let sql = render_condition(cond, &mut params);
        Self {
            sql,
            params,
            joiner,
        }
    }
}

/// An ORDER BY clause.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct OrderClause {
    pub column: String,
    pub desc: bool,
}

/// Renders `cond` and pushes its bound values onto `params`.
///
/// - null tests: `col IS NULL`, nothing bound
/// - membership with a list: `col IN (?, ?, ...)`, one value per element
/// - everything else: `col op ?`, a missing operand binds `NULL`
pub(crate) fn render_condition(cond: &Condition, params: &mut Vec<Value>) -> String {
    let op = cond.operator;

    if op.is_null_test() {
        return format!("{} {}", cond.column, op);
    }

    match &cond.value {
        Some(Operand::List(values)) => {
            let placeholders = vec!["?"; values.len()].join(", ");
            params.extend(values.iter().cloned());
            format!("{} {} ({})", cond.column, op, placeholders)
        }
        Some(Operand::Scalar(value)) if op.is_membership() => {
            params.push(value.clone());
            format!("{} {} (?)", cond.column, op)
        }
        Some(Operand::Scalar(value)) => {
            params.push(value.clone());
            format!("{} {} ?", cond.column, op)
        }
        None => {
            params.push(Value::Null);
            format!("{} {} ?", cond.column, op)
        }
    }
}

/// Joins fragments into the text following `WHERE`, appending their
/// parameters to `params` in the same order.
///
/// Every fragment after the first is preceded by its own connector, `AND` or
/// `OR`; the first fragment gets none, even when it came from `or`. No
/// parentheses are added, so SQLite's own precedence (AND before OR) applies
/// to the flat chain: `a AND b OR c` reads as `(a AND b) OR c`, and
/// `a OR b AND c` as `a OR (b AND c)`.
pub(crate) fn join_fragments(fragments: &[Fragment], params: &mut Vec<Value>) -> String {
    let mut parts: Vec<&str> = Vec::with_capacity(fragments.len() * 2);

    for (idx, frag) in fragments.iter().enumerate() {
        if idx > 0 {
            parts.push(match frag.joiner {
                Joiner::And => "AND",
                Joiner::Or => "OR",
            });
        }
        parts.push(&frag.sql);
        params.extend(frag.params.iter().cloned());
    }

    parts.join(" ")
}
