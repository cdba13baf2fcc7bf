//! Convenience operations built on top of [`QueryBuilder`](crate::query::QueryBuilder).
//!
//! These cover the common single-table cases: look up rows by equality, insert
//! and read back, update or delete by `id`, and run a closure inside a
//! transaction. Tables are expected to have an integer `id` primary key for the
//! id-based helpers.

use rusqlite::types::Value;
use tracing::{debug, warn};

use crate::{
    connection::Database,
    error::{DbError, Result},
    query::Condition,
    row::Row,
    value::IntoValue,
};

fn equality_conditions<I, K, V>(conditions: I) -> Vec<Condition>
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: IntoValue,
{
    conditions
        .into_iter()
        .map(|(col, val)| Condition::eq(col, val))
        .collect()
}

/// Rolls back an open transaction unless it was marked finished.
struct TransactionGuard<'a> {
    db: &'a Database,
    finished: bool,
}

impl TransactionGuard<'_> {
    fn rollback(&mut self) {
        self.finished = true;
        if let Err(err) = self.db.exec("ROLLBACK") {
            warn!("failed to roll back transaction: {}", err);
        }
    }
}

impl Drop for TransactionGuard<'_> {
    fn drop(&mut self) {
        if !self.finished {
            self.rollback();
        }
    }
}

impl Database {
    /// Returns every row of `table` where each `(column, value)` pair matches
    /// with `=`. No pairs means no filter.
    pub fn find<I, K, V>(&self, table: &str, conditions: I) -> Result<Vec<Row>>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: IntoValue,
    {
        self.query()
            .from(table)
            .filter_all(equality_conditions(conditions))
            .execute()
    }

    /// Like [`find`](Self::find) but stops at the first match.
    pub fn find_one<I, K, V>(&self, table: &str, conditions: I) -> Result<Option<Row>>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: IntoValue,
    {
        self.query()
            .from(table)
            .filter_all(equality_conditions(conditions))
            .limit(1)
            .execute_one()
    }

    pub fn find_by_id(&self, table: &str, id: impl IntoValue) -> Result<Option<Row>> {
        self.query()
            .from(table)
            .filter(Condition::eq("id", id))
            .limit(1)
            .execute_one()
    }

    pub fn all(&self, table: &str) -> Result<Vec<Row>> {
        self.query().from(table).execute()
    }

    /// Inserts `data` into `table` and reads the new row back by its rowid.
    ///
    /// The read-back uses the connection's last insert rowid, so another
    /// insert on the same connection in between would be picked up instead.
    pub fn insert<I, K, V>(&self, table: &str, data: I) -> Result<Option<Row>>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: IntoValue,
    {
        self.query().insert(table, data).execute()?;

        let id = self
            .execute_scalar("SELECT last_insert_rowid() AS id")?
            .and_then(|row| row.value("id").cloned())
            .unwrap_or(Value::Null);

        self.find_by_id(table, id)
    }

    /// Updates the row with the given `id` and returns it as stored afterwards.
    ///
    /// Returns `Ok(None)` when no such row exists.
    pub fn update<I, K, V>(&self, table: &str, id: impl IntoValue, data: I) -> Result<Option<Row>>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: IntoValue,
    {
        let id = id.into_value();
        self.query()
            .update(table, data)
            .filter(Condition::eq("id", id.clone()))
            .execute()?;
        self.find_by_id(table, id)
    }

    /// Deletes the row with the given `id`.
    ///
    /// Returns `true` whenever the statement succeeds, whether or not a row
    /// matched.
    pub fn delete(&self, table: &str, id: impl IntoValue) -> Result<bool> {
        self.query()
            .delete(table)
            .filter(Condition::eq("id", id))
            .execute()?;
        Ok(true)
    }

    /// Counts rows of `table` matching every `(column, value)` pair.
    pub fn count<I, K, V>(&self, table: &str, conditions: I) -> Result<u64>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: IntoValue,
    {
        let row = self
            .query()
            .select(["COUNT(*) AS count"])
            .from(table)
            .filter_all(equality_conditions(conditions))
            .execute_one()?;

        let count = match row {
            Some(row) => row.get::<i64>("count")?,
            None => 0,
        };
        Ok(count.max(0) as u64)
    }

    /// Runs `sql` with bound `params`, returning all rows.
    pub fn raw<I, V>(&self, sql: &str, params: I) -> Result<Vec<Row>>
    where
        I: IntoIterator<Item = V>,
        V: IntoValue,
    {
        self.execute(sql, params)
    }

    pub fn raw_one<I, V>(&self, sql: &str, params: I) -> Result<Option<Row>>
    where
        I: IntoIterator<Item = V>,
        V: IntoValue,
    {
        Ok(self.execute(sql, params)?.into_iter().next())
    }

    /// Runs `f` inside `BEGIN TRANSACTION` / `COMMIT`.
    ///
    /// If `f` returns an error the transaction is rolled back and that error is
    /// returned. A failing rollback is logged and does not replace it. The
    /// rollback also runs if `f` panics.
    ///
    /// Transactions do not nest; calling this from inside `f` fails with the
    /// SQLite error for a nested `BEGIN`.
    ///
    /// # Example
    ///
    /// ```
    /// use litequery_db::{record, Database, DbError};
    ///
    /// let db = Database::open_in_memory().unwrap();
    /// db.exec("CREATE TABLE t (id INTEGER PRIMARY KEY, n INTEGER)").unwrap();
    ///
    /// let res: Result<(), DbError> = db.transaction(|tx| {
    ///     tx.insert("t", record! { "n" => 1 })?;
    ///     tx.exec("INSERT INTO missing VALUES (1)")
    /// });
    /// assert!(res.is_err());
    /// assert_eq!(db.count("t", record! {}).unwrap(), 0);
    /// ```
    pub fn transaction<T, E, F>(&self, f: F) -> std::result::Result<T, E>
    where
        F: FnOnce(&Database) -> std::result::Result<T, E>,
        E: From<DbError>,
    {
        self.exec("BEGIN TRANSACTION")?;
        let mut guard = TransactionGuard {
            db: self,
            finished: false,
        };

        match f(self) {
            Ok(value) => {
                self.exec("COMMIT")?;
                guard.finished = true;
                debug!("transaction committed");
                Ok(value)
            }
            Err(err) => {
                guard.rollback();
                debug!("transaction rolled back");
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        record,
        schema::{integer, table, text, Member},
    };

    fn setup() -> Database {
        let mut db = Database::open_in_memory().unwrap();
        db.define_schema(table(
            "users",
            [
                Member::from(integer("id").primary_key(true)),
                text("name").not_null().into(),
                text("role").default_value("member").into(),
                integer("active").default_value(true).into(),
            ],
        ))
        .unwrap();
        db.define_schema(table(
            "posts",
            [
                Member::from(integer("id").primary_key(true)),
                integer("user_id")
                    .not_null()
                    .references("users", "id")
                    .into(),
                text("title").into(),
            ],
        ))
        .unwrap();
        db
    }

    #[test]
    fn test_insert_reads_back_defaults() {
        let db = setup();
        let row = db.insert("users", record! { "name" => "ada" }).unwrap().unwrap();

        assert_eq!(row.get::<i64>("id").unwrap(), 1);
        assert_eq!(row.get::<String>("name").unwrap(), "ada");
        assert_eq!(row.get::<String>("role").unwrap(), "member");
        assert!(row.get::<bool>("active").unwrap());
    }

    #[test]
    fn test_insert_all_defaults() {
        let mut db = Database::open_in_memory().unwrap();
        db.define_schema(table(
            "events",
            [
                Member::from(integer("id").primary_key(true)),
                text("kind").default_value("ping").into(),
            ],
        ))
        .unwrap();

        let row = db.insert("events", record! {}).unwrap().unwrap();
        assert_eq!(row.get::<i64>("id").unwrap(), 1);
        assert_eq!(row.get::<String>("kind").unwrap(), "ping");
    }

    #[test]
    fn test_find_variants() {
        let db = setup();
        db.insert("users", record! { "name" => "ada", "role" => "admin" })
            .unwrap();
        db.insert("users", record! { "name" => "bob" }).unwrap();
        db.insert("users", record! { "name" => "cyd" }).unwrap();

        assert_eq!(db.all("users").unwrap().len(), 3);
        assert_eq!(db.find("users", record! { "role" => "member" }).unwrap().len(), 2);
        assert_eq!(db.find("users", record! {}).unwrap().len(), 3);

        let one = db
            .find_one("users", record! { "role" => "member" })
            .unwrap()
            .unwrap();
        assert_eq!(one.get::<String>("name").unwrap(), "bob");

        assert!(db
            .find_one("users", record! { "name" => "zed" })
            .unwrap()
            .is_none());
        assert!(db.find_by_id("users", 99).unwrap().is_none());
        assert_eq!(
            db.count("users", record! { "role" => "member", "active" => true })
                .unwrap(),
            2
        );
    }

    #[test]
    fn test_update_and_delete() {
        let db = setup();
        db.insert("users", record! { "name" => "ada" }).unwrap();

        let updated = db
            .update("users", 1, record! { "role" => "owner", "active" => false })
            .unwrap()
            .unwrap();
        assert_eq!(updated.get::<String>("role").unwrap(), "owner");
        assert_eq!(updated.get::<i64>("active").unwrap(), 0);

        assert!(db
            .update("users", 42, record! { "role" => "x" })
            .unwrap()
            .is_none());

        assert!(db.delete("users", 1).unwrap());
        assert!(db.delete("users", 1).unwrap());
        assert!(db.find_by_id("users", 1).unwrap().is_none());
    }

    #[test]
    fn test_raw_helpers() {
        let db = setup();
        db.insert("users", record! { "name" => "ada" }).unwrap();

        let rows = db
            .raw("SELECT name FROM users WHERE id = ?", [1])
            .unwrap();
        assert_eq!(rows.len(), 1);

        let row = db
            .raw_one("SELECT upper(name) AS n FROM users WHERE id = ?", [1])
            .unwrap()
            .unwrap();
        assert_eq!(row.get::<String>("n").unwrap(), "ADA");
    }

    #[test]
    fn test_foreign_key_enforced() {
        let db = setup();
        let err = db
            .insert("posts", record! { "user_id" => 7, "title" => "orphan" })
            .unwrap_err();
        assert!(matches!(err, DbError::Sqlite(_)));
    }

    #[test]
    fn test_transaction_commits() {
        let db = setup();
        let id: i64 = db
            .transaction(|tx| {
                let user = tx.insert("users", record! { "name" => "ada" })?;
                let id = user.map(|u| u.get::<i64>("id")).transpose()?.unwrap_or(0);
                tx.insert("posts", record! { "user_id" => id, "title" => "hello" })?;
                Ok::<_, DbError>(id)
            })
            .unwrap();

        assert_eq!(id, 1);
        assert_eq!(db.all("posts").unwrap().len(), 1);
    }

    #[test]
    fn test_transaction_rolls_back_on_error() {
        let db = setup();
        let result = db.transaction(|tx| {
            tx.insert("users", record! { "name" => "ada" })?;
            tx.insert("posts", record! { "user_id" => 99, "title" => "bad" })?;
            Ok::<_, DbError>(())
        });

        assert!(matches!(result, Err(DbError::Sqlite(_))));
        assert!(db.all("users").unwrap().is_empty());

        // connection is usable again after rollback
        db.transaction(|tx| tx.exec("INSERT INTO users (name) VALUES ('bob')"))
            .unwrap();
        assert_eq!(db.count("users", record! {}).unwrap(), 1);
    }

    #[derive(Debug)]
    enum AppError {
        #[allow(dead_code)]
        Db(DbError),
        Rejected,
    }

    impl From<DbError> for AppError {
        fn from(err: DbError) -> Self {
            AppError::Db(err)
        }
    }

    #[test]
    fn test_transaction_returns_caller_error() {
        let db = setup();
        let result: std::result::Result<(), AppError> = db.transaction(|tx| {
            tx.insert("users", record! { "name" => "ada" })?;
            Err(AppError::Rejected)
        });

        assert!(matches!(result, Err(AppError::Rejected)));
        assert_eq!(db.count("users", record! {}).unwrap(), 0);
    }

    #[test]
    fn test_failed_rollback_keeps_original_error() {
        let db = setup();
        let result: Result<()> = db.transaction(|tx| {
            tx.insert("users", record! { "name" => "ada" })?;
            tx.exec("COMMIT")?;
            Err(DbError::Connection("original".into()))
        });

        assert!(matches!(result, Err(DbError::Connection(ref msg)) if msg == "original"));
        // the callback committed itself, so the ROLLBACK had nothing to undo
        assert_eq!(db.count("users", record! {}).unwrap(), 1);
        db.transaction(|tx| tx.exec("INSERT INTO users (name) VALUES ('bob')"))
            .unwrap();
        assert_eq!(db.count("users", record! {}).unwrap(), 2);
    }

    #[test]
    fn test_nested_transaction_fails() {
        let db = setup();
        let result = db.transaction(|tx| tx.transaction(|_| Ok::<_, DbError>(())));
        assert!(matches!(result, Err(DbError::Sqlite(_))));
    }

    #[test]
    fn test_transaction_rolls_back_on_panic() {
        let db = setup();
        let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _: std::result::Result<(), DbError> = db.transaction(|tx| {
                tx.insert("users", record! { "name" => "ada" }).unwrap();
                panic!("boom");
            });
        }));

        assert!(outcome.is_err());
        assert!(db.all("users").unwrap().is_empty());
    }
}
