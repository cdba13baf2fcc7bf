use litequery_db::{Database, DbError};
use nu_ansi_term::Color::{Blue, Cyan, Green, Red};
use serde::Serialize;
use tabled::{
    builder::Builder,
    settings::{peaker::PriorityMax, themes::BorderCorrection, Panel, Style, Width},
};
use tracing::info;

use crate::{
    error::CliResult,
    utils::{term_width, Colored},
};

#[derive(Debug, Serialize)]
pub struct TableSummary {
    pub name: String,
    pub columns: i64,
    pub rows: i64,
}

fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

pub fn table_summaries(db: &Database) -> CliResult<Vec<TableSummary>> {
    let mut summaries = Vec::new();

    for name in db.list_tables()? {
        let columns = db
            .raw_one(
                "SELECT COUNT(*) AS n FROM pragma_table_info(?)",
                [name.as_str()],
            )?
            .map(|row| row.get::<i64>("n"))
            .transpose()
            .map_err(DbError::from)?
            .unwrap_or(0);

        let rows = db
            .query()
            .select(["COUNT(*) AS n"])
            .from(quote_identifier(&name))
            .execute_one()?
            .map(|row| row.get::<i64>("n"))
            .transpose()
            .map_err(DbError::from)?
            .unwrap_or(0);

        summaries.push(TableSummary {
            name,
            columns,
            rows,
        });
    }

    Ok(summaries)
}

pub fn list_tables(db: &Database, json: bool) -> CliResult<()> {
    let summaries = table_summaries(db)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&summaries)?);
        return Ok(());
    }

    if summaries.is_empty() {
        info!("No tables");
        return Ok(());
    }

    let mut builder = Builder::new();
    builder.push_record([
        format!("{}", Colored(Green, "Table")),
        format!("{}", Colored(Green, "Columns")),
        format!("{}", Colored(Green, "Rows")),
    ]);
    for summary in &summaries {
        builder.push_record([
            format!("{}", Colored(Blue, &summary.name)),
            format!("{}", Colored(Cyan, summary.columns)),
            format!("{}", Colored(Cyan, summary.rows)),
        ]);
    }

    let table = builder
        .build()
        .with(Panel::header("Tables"))
        .with(Style::rounded())
        .with(BorderCorrection {})
        .with(Width::wrap(term_width()).priority(PriorityMax::default()))
        .to_string();

    info!("\n{table}");
    Ok(())
}

pub fn drop_table(db: &mut Database, name: &str) -> CliResult<()> {
    if !db.list_tables()?.iter().any(|t| t == name) {
        info!("Table {} does not exist", Colored(Red, name));
        return Ok(());
    }

    db.drop_table(name)?;
    info!("{} table {}", Colored(Red, "Dropped"), Colored(Blue, name));
    Ok(())
}

#[cfg(test)]
mod tests {
    use litequery_db::record;

    use super::*;

    #[test]
    fn test_table_summaries() {
        let db = Database::open_in_memory().unwrap();
        db.exec(
            "CREATE TABLE notes (id INTEGER PRIMARY KEY, body TEXT);
             CREATE TABLE \"odd name\" (x INTEGER);",
        )
        .unwrap();
        db.insert("notes", record! { "body" => "a" }).unwrap();
        db.insert("notes", record! { "body" => "b" }).unwrap();

        let summaries = table_summaries(&db).unwrap();
        assert_eq!(summaries.len(), 2);

        let notes = summaries.iter().find(|s| s.name == "notes").unwrap();
        assert_eq!((notes.columns, notes.rows), (2, 2));

        let odd = summaries.iter().find(|s| s.name == "odd name").unwrap();
        assert_eq!((odd.columns, odd.rows), (1, 0));
    }

    #[test]
    fn test_drop_table() {
        let mut db = Database::open_in_memory().unwrap();
        db.exec("CREATE TABLE t (x INTEGER)").unwrap();

        drop_table(&mut db, "t").unwrap();
        assert!(db.list_tables().unwrap().is_empty());

        // missing tables are reported, not an error
        drop_table(&mut db, "t").unwrap();
    }
}
