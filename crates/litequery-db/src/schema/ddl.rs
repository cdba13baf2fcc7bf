//! Schema to DDL compilation.

use crate::{
    schema::{
        column::Column,
        table::{Index, TableSchema},
    },
    value::sql_literal,
};

/// Renders one column definition, e.g. `id INTEGER PRIMARY KEY AUTOINCREMENT`.
///
/// Clause order is fixed: primary key, not null, unique, default, references.
/// A primary key column never gets an extra `NOT NULL`.
pub fn column_definition(col: &Column) -> String {
    let mut def = format!("{} {}", col.name, col.column_type);

    if col.primary_key {
        def.push_str(" PRIMARY KEY");
        if col.auto_increment {
            def.push_str(" AUTOINCREMENT");
        }
    }

    if col.not_null && !col.primary_key {
        def.push_str(" NOT NULL");
    }

    if col.unique {
        def.push_str(" UNIQUE");
    }

    if let Some(default) = &col.default {
        def.push_str(" DEFAULT ");
        def.push_str(&sql_literal(default));
    }

    if let Some(fk) = &col.references {
        def.push_str(&format!(" REFERENCES {}({})", fk.table, fk.column));
        if let Some(action) = fk.on_delete {
            def.push_str(&format!(" ON DELETE {action}"));
        }
        if let Some(action) = fk.on_update {
            def.push_str(&format!(" ON UPDATE {action}"));
        }
    }

    def
}

/// Builds the `CREATE TABLE IF NOT EXISTS` statement for `schema`.
///
/// Column definitions come first, then one `UNIQUE (...)` clause per composite
/// constraint, each group in declaration order. Index members are not part of
/// this statement; see [`create_index_sql`].
pub fn create_table_sql(schema: &TableSchema) -> String {
    let defs = schema
        .columns()
        .map(column_definition)
        .chain(
            schema
                .unique_constraints()
                .map(|u| format!("UNIQUE ({})", u.columns.join(", "))),
        )
        .collect::<Vec<_>>();

    format!(
        "CREATE TABLE IF NOT EXISTS {} ({})",
        schema.name,
        defs.join(", ")
    )
}

fn index_statement(table: &str, index: &Index) -> String {
    let kind = if index.unique { "UNIQUE INDEX" } else { "INDEX" };
    format!(
        "CREATE {} IF NOT EXISTS {} ON {} ({})",
        kind,
        index.name,
        table,
        index.columns.join(", ")
    )
}

/// Builds one `CREATE [UNIQUE] INDEX IF NOT EXISTS` statement per index,
/// inline index members first, then the `indexes` list.
pub fn create_index_sql(schema: &TableSchema) -> Vec<String> {
    schema
        .all_indexes()
        .map(|idx| index_statement(&schema.name, idx))
        .collect()
}
