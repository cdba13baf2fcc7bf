use std::{fs, path::Path};

use litequery_db::{
    schema::{create_index_sql, create_table_sql},
    Database, TableSchema,
};
use nu_ansi_term::Color::{Blue, Green};
use serde::Deserialize;
use tracing::{debug, info};

use crate::{
    error::{CliError, CliResult, ErrorContext},
    utils::Colored,
};

/// Contents of a schema file: a `[[tables]]` array.
#[derive(Debug, Deserialize)]
pub struct SchemaFile {
    #[serde(default)]
    pub tables: Vec<TableSchema>,
}

impl SchemaFile {
    pub fn from_str(path: &str, content: &str) -> CliResult<Self> {
        toml::from_str(content).map_err(|source| CliError::SchemaFile {
            path: path.to_string(),
            source,
        })
    }

    pub fn load<P: AsRef<Path>>(path: P) -> CliResult<Self> {
        let path = path.as_ref();
        debug!("reading schema file {}", path.display());
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading schema file {}", path.display()))?;
        Self::from_str(&path.display().to_string(), &content)
    }
}

/// All statements needed to create `table`, each terminated by `;`.
pub fn ddl_statements(table: &TableSchema) -> Vec<String> {
    std::iter::once(create_table_sql(table))
        .chain(create_index_sql(table))
        .map(|sql| format!("{sql};"))
        .collect()
}

pub fn print_ddl<P: AsRef<Path>>(path: P, json: bool) -> CliResult<()> {
    let file = SchemaFile::load(path)?;

    if json {
        let statements: Vec<String> = file.tables.iter().flat_map(ddl_statements).collect();
        println!("{}", serde_json::to_string_pretty(&statements)?);
        return Ok(());
    }

    for table in &file.tables {
        info!("-- {}", Colored(Blue, &table.name));
        for statement in ddl_statements(table) {
            info!("{statement}");
        }
    }
    Ok(())
}

pub fn apply_schemas<P: AsRef<Path>>(db: &mut Database, paths: &[P]) -> CliResult<()> {
    if paths.is_empty() {
        return Err(CliError::NoSchemaFiles);
    }

    for path in paths {
        let file = SchemaFile::load(path)?;
        for table in file.tables {
            let name = table.name.clone();
            let index_count = table.all_indexes().count();
            db.define_schema(table)?;
            info!(
                "{} table {} ({} index{})",
                Colored(Green, "Defined"),
                Colored(Blue, &name),
                index_count,
                if index_count == 1 { "" } else { "es" }
            );
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;

    const SHOP: &str = r#"
[[tables]]
name = "customers"

[[tables.members]]
kind = "column"
name = "id"
type = "INTEGER"
primary_key = true
auto_increment = true

[[tables.members]]
kind = "column"
name = "email"
type = "TEXT"
not_null = true
unique = true

[[tables]]
name = "orders"

[[tables.members]]
kind = "column"
name = "id"
type = "INTEGER"
primary_key = true

[[tables.members]]
kind = "column"
name = "customer_id"
type = "INTEGER"
not_null = true
references = { table = "customers", column = "id", on_delete = "CASCADE" }

[[tables.members]]
kind = "column"
name = "status"
type = "TEXT"
default = "pending"

[[tables.members]]
kind = "index"
name = "idx_orders_customer"
columns = ["customer_id"]
"#;

    #[test]
    fn test_schema_file_parses() {
        let file = SchemaFile::from_str("shop.toml", SHOP).unwrap();
        assert_eq!(file.tables.len(), 2);
        assert_eq!(file.tables[1].columns().count(), 3);
        assert_eq!(file.tables[1].all_indexes().count(), 1);
    }

    #[test]
    fn test_ddl_statements() {
        let file = SchemaFile::from_str("shop.toml", SHOP).unwrap();
        let statements = ddl_statements(&file.tables[1]);

        assert_eq!(
            statements,
            vec![
                "CREATE TABLE IF NOT EXISTS orders (id INTEGER PRIMARY KEY, \
                 customer_id INTEGER NOT NULL REFERENCES customers(id) ON DELETE CASCADE, \
                 status TEXT DEFAULT 'pending');"
                    .to_string(),
                "CREATE INDEX IF NOT EXISTS idx_orders_customer ON orders (customer_id);"
                    .to_string(),
            ]
        );
    }

    #[test]
    fn test_invalid_schema_file() {
        let err = SchemaFile::from_str("bad.toml", "[[tables]]\nname = 5").unwrap_err();
        assert!(matches!(err, CliError::SchemaFile { ref path, .. } if path == "bad.toml"));
    }

    #[test]
    fn test_apply_schemas() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("shop.toml");
        fs::write(&path, SHOP).unwrap();

        let mut db = Database::open_in_memory().unwrap();
        apply_schemas(&mut db, &[&path]).unwrap();
        assert_eq!(db.list_tables().unwrap(), ["customers", "orders"]);

        // applying twice is harmless
        apply_schemas(&mut db, &[&path]).unwrap();

        let empty: [&Path; 0] = [];
        assert!(matches!(
            apply_schemas(&mut db, &empty),
            Err(CliError::NoSchemaFiles)
        ));
    }
}
