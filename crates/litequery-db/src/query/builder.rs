//! The fluent query builder.

use std::sync::{Arc, Mutex};

use rusqlite::{types::Value, Connection};
use tracing::trace;

use crate::{
    connection::fetch_rows,
    error::Result,
    query::{
        clause::{join_fragments, Fragment, Joiner, OrderClause},
        condition::Condition,
    },
    row::Row,
    value::IntoValue,
};

/// `LIMIT` emitted when only an offset was requested; SQLite needs a LIMIT
/// before OFFSET and treats a negative one as unbounded.
const UNBOUNDED_LIMIT: i64 = -1;

/// Accumulates the parts of one statement and compiles them on execution.
///
/// Obtained from [`Database::query`](crate::Database::query). Builder calls can
/// come in any order: `select`, `order_by`, `limit` and `offset` replace any
/// earlier value, while `filter`, `and` and `or` append. A terminal call
/// ([`execute`](Self::execute) or [`execute_one`](Self::execute_one)) consumes
/// the builder, so no state carries over to the next query.
///
/// When several statement kinds are requested on one builder, INSERT wins over
/// UPDATE, which wins over DELETE, then raw SQL, then SELECT. Nothing is
/// validated beforehand.
///
/// # Example
///
/// ```
/// use litequery_db::{query::Condition, Database};
///
/// let db = Database::open_in_memory().unwrap();
/// let (sql, params) = db
///     .query()
///     .select(["id", "name"])
///     .from("products")
///     .filter(Condition::eq("category", "tools"))
///     .and(Condition::gt("stock", 50))
///     .order_by("name", false)
///     .limit(10)
///     .build();
///
/// assert_eq!(
///     sql,
///     "SELECT id, name FROM products WHERE category = ? AND stock > ? ORDER BY name ASC LIMIT 10"
/// );
/// assert_eq!(params.len(), 2);
/// ```
pub struct QueryBuilder {
    db: Arc<Mutex<Connection>>,
    columns: Vec<String>,
    table: String,
    wheres: Vec<Fragment>,
    order: Option<OrderClause>,
    limit: Option<u32>,
    offset: Option<u32>,
    insert: Option<Vec<(String, Value)>>,
    update: Option<Vec<(String, Value)>>,
    delete: bool,
    raw: Option<(String, Vec<Value>)>,
}

fn collect_payload<I, K, V>(data: I) -> Vec<(String, Value)>
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: IntoValue,
{
    data.into_iter()
        .map(|(col, val)| (col.into(), val.into_value()))
        .collect()
}

impl QueryBuilder {
    pub(crate) fn new(db: Arc<Mutex<Connection>>) -> Self {
        Self {
            db,
            columns: vec![],
            table: String::new(),
            wheres: vec![],
            order: None,
            limit: None,
            offset: None,
            insert: None,
            update: None,
            delete: false,
            raw: None,
        }
    }

    /// Selects specific columns. An empty list selects `*`.
    pub fn select<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns = columns.into_iter().map(Into::into).collect();
        self
    }

    /// Selects all columns.
    pub fn select_all(mut self) -> Self {
        self.columns.clear();
        self
    }

    pub fn from(mut self, table: impl Into<String>) -> Self {
        self.table = table.into();
        self
    }

    /// Adds a WHERE condition, joined to the previous ones with `AND`.
    pub fn filter(mut self, cond: Condition) -> Self {
        self.wheres.push(Fragment::new(&cond, Joiner::And));
        self
    }

    /// Adds several conditions at once, each joined with `AND`.
    pub fn filter_all<I>(mut self, conds: I) -> Self
    where
        I: IntoIterator<Item = Condition>,
    {
        self.wheres.extend(
            conds
                .into_iter()
                .map(|cond| Fragment::new(&cond, Joiner::And)),
        );
        self
    }

    /// Same as [`filter`](Self::filter).
    pub fn and(self, cond: Condition) -> Self {
        self.filter(cond)
    }

    /// Adds a condition joined with `OR`.
    ///
    /// No grouping is applied: `a AND b OR c` is evaluated by SQLite as
    /// `(a AND b) OR c`.
    pub fn or(mut self, cond: Condition) -> Self {
        self.wheres.push(Fragment::new(&cond, Joiner::Or));
        self
    }

    pub fn order_by(mut self, column: impl Into<String>, desc: bool) -> Self {
        self.order = Some(OrderClause {
            column: column.into(),
            desc,
        });
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: u32) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Sets limit and offset for a 1-based page. The offset saturates at
    /// `u32::MAX`.
    pub fn page(mut self, page: u32, per_page: u32) -> Self {
        self.limit = Some(per_page);
        self.offset = Some(page.saturating_sub(1).saturating_mul(per_page));
        self
    }

    /// Turns the builder into an INSERT of `data` into `table`.
    ///
    /// An empty payload inserts a row of defaults.
    pub fn insert<I, K, V>(mut self, table: impl Into<String>, data: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: IntoValue,
    {
        self.table = table.into();
        self.insert = Some(collect_payload(data));
        self
    }

    /// Turns the builder into an UPDATE of `table` setting `data`.
    ///
    /// SET values are bound ahead of any WHERE values.
    pub fn update<I, K, V>(mut self, table: impl Into<String>, data: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: IntoValue,
    {
        self.table = table.into();
        self.update = Some(collect_payload(data));
        self
    }

    pub fn delete(mut self, table: impl Into<String>) -> Self {
        self.table = table.into();
        self.delete = true;
        self
    }

    /// Replaces the SELECT this builder would produce with `sql`.
    ///
    /// Ignored when an INSERT, UPDATE or DELETE was requested on the same
    /// builder.
    pub fn raw<I, V>(mut self, sql: impl Into<String>, params: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: IntoValue,
    {
        let params = params.into_iter().map(IntoValue::into_value).collect();
        self.raw = Some((sql.into(), params));
        self
    }

    fn where_clause(&self, sql: &mut String, params: &mut Vec<Value>) {
        if !self.wheres.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&join_fragments(&self.wheres, params));
        }
    }

    fn build_insert(&self, data: &[(String, Value)]) -> (String, Vec<Value>) {
        if data.is_empty() {
            return (format!("INSERT INTO {} DEFAULT VALUES", self.table), vec![]);
        }

        let columns = data
            .iter()
            .map(|(col, _)| col.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        let placeholders = vec!["?"; data.len()].join(", ");
        let params = data.iter().map(|(_, val)| val.clone()).collect();

        (
            format!(
                "INSERT INTO {} ({}) VALUES ({})",
                self.table, columns, placeholders
            ),
            params,
        )
    }

    fn build_update(&self, data: &[(String, Value)]) -> (String, Vec<Value>) {
        let mut params = Vec::new();

        let sets: Vec<String> = data
            .iter()
            .map(|(col, val)| {
                params.push(val.clone());
                format!("{} = ?", col)
            })
            .collect();

        let mut sql = format!("UPDATE {} SET {}", self.table, sets.join(", "));
        self.where_clause(&mut sql, &mut params);

        (sql, params)
    }

    fn build_delete(&self) -> (String, Vec<Value>) {
        let mut params = Vec::new();
        let mut sql = format!("DELETE FROM {}", self.table);
        self.where_clause(&mut sql, &mut params);
        (sql, params)
    }

    fn build_select(&self) -> (String, Vec<Value>) {
        let mut params = vec![];

        let select = if self.columns.is_empty() {
            "*".to_string()
        } else {
            self.columns.join(", ")
        };

        let mut sql = format!("SELECT {} FROM {}", select, self.table);
        self.where_clause(&mut sql, &mut params);

        if let Some(order) = &self.order {
            sql.push_str(&format!(
                " ORDER BY {} {}",
                order.column,
                if order.desc { "DESC" } else { "ASC" }
            ));
        }

        match (self.limit, self.offset) {
            (Some(limit), _) => sql.push_str(&format!(" LIMIT {}", limit)),
            (None, Some(_)) => sql.push_str(&format!(" LIMIT {}", UNBOUNDED_LIMIT)),
            (None, None) => {}
        }

        if let Some(offset) = self.offset {
            sql.push_str(&format!(" OFFSET {}", offset));
        }

        (sql, params)
    }

    /// Compiles the accumulated state into SQL text and its bound parameters
    /// without running anything.
    pub fn build(&self) -> (String, Vec<Value>) {
        if let Some(data) = &self.insert {
            self.build_insert(data)
        } else if let Some(data) = &self.update {
            self.build_update(data)
        } else if self.delete {
            self.build_delete()
        } else if let Some((sql, params)) = &self.raw {
            (sql.clone(), params.clone())
        } else {
            self.build_select()
        }
    }

    /// Compiles and runs the statement, returning every row it produced.
    ///
    /// INSERT, UPDATE and DELETE statements return an empty list.
    pub fn execute(self) -> Result<Vec<Row>> {
        let (sql, params) = self.build();
        trace!(table = %self.table, fragments = self.wheres.len(), "compiled query");
        let conn = self.db.lock()?;
        fetch_rows(&conn, &sql, &params)
    }

    /// Like [`execute`](Self::execute) but returns only the first row.
    pub fn execute_one(self) -> Result<Option<Row>> {
        Ok(self.execute()?.into_iter().next())
    }

    /// Runs `sql` directly, leaving the builder's own state untouched.
    pub fn execute_raw<I, V>(&self, sql: &str, params: I) -> Result<Vec<Row>>
    where
        I: IntoIterator<Item = V>,
        V: IntoValue,
    {
        let params: Vec<Value> = params.into_iter().map(IntoValue::into_value).collect();
        let conn = self.db.lock()?;
        fetch_rows(&conn, sql, &params)
    }
}
