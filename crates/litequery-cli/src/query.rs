use clap::ArgMatches;
use litequery_config::display::DisplaySettings;
use litequery_db::{Database, Row};
use tracing::{debug, info};

use crate::{
    error::CliResult,
    filter::{parse_condition, parse_value},
    output::print_rows,
};

/// How a condition joins the ones before it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Connective {
    And,
    Or,
}

/// Options collected from `litequery select`.
#[derive(Debug, Default)]
pub struct SelectOptions {
    pub columns: Vec<String>,
    /// Raw conditions in command-line order.
    pub conditions: Vec<(Connective, String)>,
    pub order_by: Option<String>,
    pub desc: bool,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

/// Merges the `--where` and `--or` values into one list in the order they were
/// given. Without matches, every `--where` comes before every `--or`.
pub fn ordered_conditions(
    matches: Option<&ArgMatches>,
    filter: Vec<String>,
    or: Vec<String>,
) -> Vec<(Connective, String)> {
    let positions = |id: &str| -> Vec<usize> {
        matches
            .and_then(|m| m.indices_of(id))
            .map(|indices| indices.collect())
            .unwrap_or_default()
    };
    let tagged = |values: Vec<String>, connective: Connective, at: Vec<usize>| {
        values
            .into_iter()
            .enumerate()
            .map(move |(i, raw)| {
                let at = at.get(i).copied().unwrap_or(usize::MAX);
                (at, connective, raw)
            })
    };

    let mut conditions: Vec<_> = tagged(filter, Connective::And, positions("filter"))
        .chain(tagged(or, Connective::Or, positions("or")))
        .collect();
    conditions.sort_by_key(|(at, ..)| *at);
    conditions
        .into_iter()
        .map(|(_, connective, raw)| (connective, raw))
        .collect()
}

pub fn fetch_rows(db: &Database, table: &str, opts: &SelectOptions) -> CliResult<Vec<Row>> {
    let mut query = db.query().from(table);

    if !opts.columns.is_empty() {
        query = query.select(opts.columns.iter().map(String::as_str));
    }
    for (connective, raw) in &opts.conditions {
        let cond = parse_condition(raw)?;
        query = match connective {
            Connective::And => query.and(cond),
            Connective::Or => query.or(cond),
        };
    }
    if let Some(column) = &opts.order_by {
        query = query.order_by(column, opts.desc);
    }
    if let Some(limit) = opts.limit {
        query = query.limit(limit);
    }
    if let Some(offset) = opts.offset {
        query = query.offset(offset);
    }

    let (sql, params) = query.build();
    debug!(sql, params = params.len(), "select");

    Ok(query.execute()?)
}

pub fn select_rows(
    db: &Database,
    table: &str,
    opts: &SelectOptions,
    json: bool,
    display: &DisplaySettings,
) -> CliResult<()> {
    let rows = fetch_rows(db, table, opts)?;
    print_rows(&rows, json, display)
}

pub fn run_sql(
    db: &Database,
    statement: &str,
    params: &[String],
    json: bool,
    display: &DisplaySettings,
) -> CliResult<()> {
    let values: Vec<_> = params.iter().map(|p| parse_value(p)).collect();
    let rows = db.execute(statement, values)?;

    if rows.is_empty() && !json {
        info!("Statement executed");
        return Ok(());
    }
    print_rows(&rows, json, display)
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;
    use litequery_db::{record, Value};

    use super::*;
    use crate::cli::Args;

    fn and(raw: &str) -> (Connective, String) {
        (Connective::And, raw.to_string())
    }

    fn or(raw: &str) -> (Connective, String) {
        (Connective::Or, raw.to_string())
    }

    fn products() -> Database {
        let db = Database::open_in_memory().unwrap();
        db.exec(
            "CREATE TABLE products (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                category TEXT,
                stock INTEGER DEFAULT 0
            )",
        )
        .unwrap();
        for (name, category, stock) in [
            ("Hammer", "tools", 50),
            ("Wrench", "tools", 10),
            ("Drill", "power", 80),
            ("Saw", "tools", 100),
        ] {
            db.insert(
                "products",
                record! { "name" => name, "category" => category, "stock" => stock },
            )
            .unwrap();
        }
        db
    }

    fn names(rows: &[Row]) -> Vec<String> {
        rows.iter()
            .map(|r| r.get::<String>("name").unwrap())
            .collect()
    }

    #[test]
    fn test_fetch_with_filters() {
        let db = products();
        let opts = SelectOptions {
            conditions: vec![and("category=tools"), and("stock >= 50")],
            order_by: Some("stock".into()),
            desc: true,
            ..Default::default()
        };

        let rows = fetch_rows(&db, "products", &opts).unwrap();
        assert_eq!(names(&rows), ["Saw", "Hammer"]);
    }

    #[test]
    fn test_fetch_with_or_and_paging() {
        let db = products();
        let opts = SelectOptions {
            columns: vec!["name".into()],
            conditions: vec![and("stock<20"), or("category = power")],
            order_by: Some("id".into()),
            limit: Some(1),
            offset: Some(1),
            ..Default::default()
        };

        let rows = fetch_rows(&db, "products", &opts).unwrap();
        assert_eq!(names(&rows), ["Drill"]);
        assert_eq!(rows[0].columns(), ["name"]);
    }

    #[test]
    fn test_conditions_keep_command_line_order() {
        let matches = Args::command().get_matches_from([
            "litequery",
            "select",
            "products",
            "--or",
            "category=tools",
            "-w",
            "stock>=50",
            "--or",
            "name=Drill",
        ]);
        let select = matches.subcommand_matches("select");
        let conditions = ordered_conditions(
            select,
            vec!["stock>=50".into()],
            vec!["category=tools".into(), "name=Drill".into()],
        );
        assert_eq!(
            conditions,
            [or("category=tools"), and("stock>=50"), or("name=Drill")]
        );

        // category = tools AND stock >= 50 OR name = Drill
        let db = products();
        let opts = SelectOptions {
            conditions,
            order_by: Some("id".into()),
            ..Default::default()
        };
        let rows = fetch_rows(&db, "products", &opts).unwrap();
        assert_eq!(names(&rows), ["Hammer", "Drill", "Saw"]);
    }

    #[test]
    fn test_conditions_without_matches() {
        let conditions = ordered_conditions(None, vec!["a=1".into()], vec!["b=2".into()]);
        assert_eq!(conditions, [and("a=1"), or("b=2")]);
    }

    #[test]
    fn test_fetch_rejects_bad_condition() {
        let db = products();
        let opts = SelectOptions {
            conditions: vec![and("nonsense")],
            ..Default::default()
        };
        assert!(fetch_rows(&db, "products", &opts).is_err());
    }

    #[test]
    fn test_run_sql_binds_params() {
        let db = products();
        run_sql(
            &db,
            "UPDATE products SET stock = ? WHERE name = ?",
            &["0".into(), "Saw".into()],
            false,
            &DisplaySettings::default(),
        )
        .unwrap();

        let saw = db.find_one("products", [("name", "Saw")]).unwrap().unwrap();
        assert_eq!(saw.value("stock"), Some(&Value::Integer(0)));
    }
}
