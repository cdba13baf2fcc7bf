//! Database connection management.
//!
//! [`Database`] owns one SQLite connection behind an `Arc<Mutex<_>>` together
//! with the [`SchemaRegistry`] of tables defined through it. Query builders
//! hold a clone of the connection handle, so the mutex is taken once per
//! statement and never across calls.

use std::{
    fs,
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
    time::Duration,
};

use rusqlite::{params_from_iter, types::Value, Connection};
use tracing::{debug, info};

use crate::{
    error::{DbError, Result},
    query::QueryBuilder,
    registry::SchemaRegistry,
    row::Row,
    schema::{create_index_sql, create_table_sql, TableSchema},
    value::IntoValue,
};

/// Path understood as "no file, keep everything in memory".
pub const MEMORY_PATH: &str = ":memory:";

/// Options applied when a connection is opened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbSettings {
    /// Database file. `None` opens an in-memory database.
    pub path: Option<PathBuf>,
    pub foreign_keys: bool,
    /// Value for `PRAGMA journal_mode`, e.g. `wal`. `None` keeps SQLite's default.
    pub journal_mode: Option<String>,
    pub busy_timeout_ms: Option<u64>,
}

impl Default for DbSettings {
    fn default() -> Self {
        Self {
            path: None,
            foreign_keys: true,
            journal_mode: None,
            busy_timeout_ms: None,
        }
    }
}

impl DbSettings {
    pub fn memory() -> Self {
        Self::default()
    }

    pub fn file<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: Some(path.as_ref().to_path_buf()),
            ..Self::default()
        }
    }
}

/// Runs `sql` with `params` and collects every row it produces.
pub(crate) fn fetch_rows(conn: &Connection, sql: &str, params: &[Value]) -> Result<Vec<Row>> {
    debug!(sql, params = params.len(), "executing statement");

    let mut stmt = conn.prepare(sql)?;
    let columns: Vec<String> = stmt
        .column_names()
        .into_iter()
        .map(String::from)
        .collect();

    let rows = stmt
        .query_map(params_from_iter(params.iter()), |row| {
            Row::from_sqlite(&columns, row)
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(rows)
}

/// A SQLite database plus the schemas defined on it.
pub struct Database {
    conn: Arc<Mutex<Connection>>,
    registry: SchemaRegistry,
}

impl Database {
    /// Opens (or creates) the database file at `path` with default settings.
    ///
    /// The path `:memory:` opens an in-memory database instead.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if path.as_os_str() == MEMORY_PATH {
            return Self::open_in_memory();
        }
        Self::with_settings(&DbSettings::file(path))
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::with_settings(&DbSettings::memory())
    }

    /// Opens a database and applies the pragmas from `settings`.
    pub fn with_settings(settings: &DbSettings) -> Result<Self> {
        let conn = match &settings.path {
            Some(path) if path.as_os_str() != MEMORY_PATH => {
                if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                    fs::create_dir_all(parent).map_err(|err| {
                        DbError::Connection(format!(
                            "Failed to create directory {}: {}",
                            parent.display(),
                            err
                        ))
                    })?;
                }
                debug!(path = %path.display(), "opening database");
                Connection::open(path)?
            }
            _ => {
                debug!("opening in-memory database");
                Connection::open_in_memory()?
            }
        };

        configure(&conn, settings)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            registry: SchemaRegistry::new(),
        })
    }

    /// Closes the connection, reporting any failure SQLite raises while doing so.
    ///
    /// Fails if a builder created from this handle is still alive.
    pub fn close(self) -> Result<()> {
        let conn = Arc::try_unwrap(self.conn)
            .map_err(|_| DbError::Connection("connection is still in use".into()))?
            .into_inner()?;

        conn.close()
            .map_err(|(_, err)| DbError::Connection(format!("Failed to close database: {err}")))
    }

    /// Starts a new query builder on this connection.
    pub fn query(&self) -> QueryBuilder {
        QueryBuilder::new(self.conn.clone())
    }

    pub fn registry(&self) -> &SchemaRegistry {
        &self.registry
    }

    /// Registers `schema` and creates its table and indexes if they do not
    /// exist yet.
    ///
    /// A name that is already registered is replaced, not merged. Existing
    /// tables are never altered.
    pub fn define_schema(&mut self, schema: TableSchema) -> Result<()> {
        let create_table = create_table_sql(&schema);
        let create_indexes = create_index_sql(&schema);
        let name = schema.name.clone();

        self.registry.insert(schema);

        let conn = self.conn.lock()?;
        debug!(sql = %create_table, "creating table");
        conn.execute(&create_table, [])?;
        for sql in &create_indexes {
            debug!(sql = %sql, "creating index");
            conn.execute(sql, [])?;
        }

        info!(table = %name, indexes = create_indexes.len(), "defined table");
        Ok(())
    }

    pub fn define_schemas<I>(&mut self, schemas: I) -> Result<()>
    where
        I: IntoIterator<Item = TableSchema>,
    {
        for schema in schemas {
            self.define_schema(schema)?;
        }
        Ok(())
    }

    pub fn get_schema(&self, name: &str) -> Option<&TableSchema> {
        self.registry.get(name)
    }

    /// Lists user tables in the database file, sorted by name.
    ///
    /// This reads the SQLite catalog, so tables created outside this handle
    /// show up too.
    pub fn list_tables(&self) -> Result<Vec<String>> {
        let conn = self.conn.lock()?;
        let mut stmt = conn.prepare(
            "SELECT name FROM sqlite_master
            WHERE type = 'table' AND name NOT LIKE 'sqlite_%'
            ORDER BY name",
        )?;
        let names = stmt
            .query_map([], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<String>>>()?;
        Ok(names)
    }

    /// Drops `name` if it exists and forgets its registered schema.
    pub fn drop_table(&mut self, name: &str) -> Result<()> {
        {
            let conn = self.conn.lock()?;
            conn.execute(&format!("DROP TABLE IF EXISTS {name}"), [])?;
        }
        self.registry.remove(name);
        info!(table = name, "dropped table");
        Ok(())
    }

    /// Runs one statement and returns the rows it produced.
    ///
    /// Statements that produce no rows (INSERT, UPDATE, DDL) return an empty
    /// list.
    pub fn execute<I, V>(&self, sql: &str, params: I) -> Result<Vec<Row>>
    where
        I: IntoIterator<Item = V>,
        V: IntoValue,
    {
        let params: Vec<Value> = params.into_iter().map(IntoValue::into_value).collect();
        let conn = self.conn.lock()?;
        fetch_rows(&conn, sql, &params)
    }

    /// Runs a parameterless statement and returns its first row.
    pub fn execute_scalar(&self, sql: &str) -> Result<Option<Row>> {
        let conn = self.conn.lock()?;
        Ok(fetch_rows(&conn, sql, &[])?.into_iter().next())
    }

    /// Runs one or more `;`-separated statements, discarding any results.
    pub fn exec(&self, sql: &str) -> Result<()> {
        debug!(sql, "executing batch");
        let conn = self.conn.lock()?;
        conn.execute_batch(sql)?;
        Ok(())
    }

    /// Rowid of the most recent successful INSERT on this connection.
    pub fn last_insert_rowid(&self) -> Result<i64> {
        let conn = self.conn.lock()?;
        Ok(conn.last_insert_rowid())
    }
}

fn configure(conn: &Connection, settings: &DbSettings) -> Result<()> {
    let fk = if settings.foreign_keys { "ON" } else { "OFF" };
    conn.execute_batch(&format!("PRAGMA foreign_keys = {fk};"))?;

    if let Some(mode) = &settings.journal_mode {
        if mode.is_empty() || !mode.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(DbError::Connection(format!(
                "Invalid journal mode '{mode}'"
            )));
        }
        let applied: String =
            conn.query_row(&format!("PRAGMA journal_mode = {mode}"), [], |row| {
                row.get(0)
            })?;
        debug!(requested = %mode, applied = %applied, "set journal mode");
    }

    if let Some(ms) = settings.busy_timeout_ms {
        conn.busy_timeout(Duration::from_millis(ms))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;
    use crate::schema::{index, integer, table, text, unique, Member};

    fn users() -> TableSchema {
        table(
            "users",
            [
                Member::from(integer("id").primary_key(true)),
                text("email").not_null().into(),
                text("name").into(),
                unique(["email", "name"]).into(),
                index("idx_users_name", ["name"], false).into(),
            ],
        )
        .with_index(index("idx_users_email", ["email"], true))
    }

    #[test]
    fn test_define_schema_creates_table_and_indexes() {
        let mut db = Database::open_in_memory().unwrap();
        db.define_schema(users()).unwrap();

        assert_eq!(db.list_tables().unwrap(), ["users"]);
        assert!(db.get_schema("users").is_some());

        let rows = db
            .execute(
                "SELECT name FROM sqlite_master WHERE type = 'index' AND name LIKE 'idx_%' ORDER BY name",
                Vec::<Value>::new(),
            )
            .unwrap();
        let names: Vec<String> = rows.iter().map(|r| r.get("name").unwrap()).collect();
        assert_eq!(names, ["idx_users_email", "idx_users_name"]);
    }

    #[test]
    fn test_define_schema_is_idempotent() {
        let mut db = Database::open_in_memory().unwrap();
        db.define_schema(users()).unwrap();
        db.define_schema(users()).unwrap();
        assert_eq!(db.registry().len(), 1);
    }

    #[test]
    fn test_list_tables_skips_internal() {
        let mut db = Database::open_in_memory().unwrap();
        db.define_schema(table(
            "counters",
            [Member::from(integer("id").primary_key(true))],
        ))
        .unwrap();
        db.exec("CREATE TABLE notes (body TEXT)").unwrap();

        // AUTOINCREMENT creates sqlite_sequence
        assert_eq!(db.list_tables().unwrap(), ["counters", "notes"]);
    }

    #[test]
    fn test_drop_table_evicts_registry() {
        let mut db = Database::open_in_memory().unwrap();
        db.define_schema(users()).unwrap();
        db.drop_table("users").unwrap();

        assert!(db.list_tables().unwrap().is_empty());
        assert!(db.get_schema("users").is_none());

        db.drop_table("users").unwrap();
    }

    #[test]
    fn test_execute_and_scalar() {
        let db = Database::open_in_memory().unwrap();
        db.exec("CREATE TABLE kv (k TEXT, v INTEGER)").unwrap();

        let rows = db
            .execute("INSERT INTO kv (k, v) VALUES (?, ?)", [Value::from("a".to_string()), Value::Integer(1)])
            .unwrap();
        assert!(rows.is_empty());
        assert_eq!(db.last_insert_rowid().unwrap(), 1);

        let row = db.execute_scalar("SELECT COUNT(*) AS n FROM kv").unwrap().unwrap();
        assert_eq!(row.get::<i64>("n").unwrap(), 1);

        assert!(db
            .execute_scalar("SELECT k FROM kv WHERE v > 10")
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_foreign_keys_enabled() {
        let db = Database::open_in_memory().unwrap();
        let row = db.execute_scalar("PRAGMA foreign_keys").unwrap().unwrap();
        assert_eq!(row.get::<i64>("foreign_keys").unwrap(), 1);

        let db = Database::with_settings(&DbSettings {
            foreign_keys: false,
            ..DbSettings::memory()
        })
        .unwrap();
        let row = db.execute_scalar("PRAGMA foreign_keys").unwrap().unwrap();
        assert_eq!(row.get::<i64>("foreign_keys").unwrap(), 0);
    }

    #[test]
    fn test_file_database_with_pragmas() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("app.db");

        let settings = DbSettings {
            journal_mode: Some("wal".into()),
            busy_timeout_ms: Some(250),
            ..DbSettings::file(&path)
        };

        let mut db = Database::with_settings(&settings).unwrap();
        db.define_schema(users()).unwrap();
        let mode = db.execute_scalar("PRAGMA journal_mode").unwrap().unwrap();
        assert_eq!(mode.get::<String>("journal_mode").unwrap(), "wal");
        db.close().unwrap();

        assert!(path.exists());
        let db = Database::open(&path).unwrap();
        assert_eq!(db.list_tables().unwrap(), ["users"]);
    }

    #[test]
    fn test_invalid_journal_mode() {
        let settings = DbSettings {
            journal_mode: Some("wal; DROP TABLE x".into()),
            ..DbSettings::memory()
        };
        assert!(matches!(
            Database::with_settings(&settings),
            Err(DbError::Connection(_))
        ));
    }

    #[test]
    fn test_close_while_builder_alive() {
        let db = Database::open_in_memory().unwrap();
        let builder = db.query();
        assert!(matches!(db.close(), Err(DbError::Connection(_))));
        drop(builder);
    }

    #[test]
    fn test_invalid_utf8_text_is_an_error() {
        let db = Database::open_in_memory().unwrap();
        let err = db
            .execute("SELECT CAST(X'FF' AS TEXT) AS t", Vec::<Value>::new())
            .unwrap_err();
        assert!(matches!(
            err,
            DbError::Sqlite(rusqlite::Error::Utf8Error(_))
        ));

        // the connection is still usable afterwards
        let row = db.execute_scalar("SELECT 'ok' AS t").unwrap().unwrap();
        assert_eq!(row.get::<String>("t").unwrap(), "ok");
    }

    #[test]
    fn test_memory_path() {
        let db = Database::open(MEMORY_PATH).unwrap();
        assert!(db.list_tables().unwrap().is_empty());
    }
}
