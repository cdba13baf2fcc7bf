use std::{
    env, fs,
    path::{Path, PathBuf},
};

use clap::{CommandFactory, FromArgMatches};
use cli::{Args, Commands};
use error::{CliError, CliResult, ErrorContext};
use litequery_config::{
    config::{default_config_path, generate_default_config, Config, MEMORY_DB},
    path::resolve_path,
};
use litequery_db::{Database, DbSettings};
use logging::setup_logging;
use query::{ordered_conditions, run_sql, select_rows, SelectOptions};
use schema::{apply_schemas, print_ddl};
use tables::{drop_table, list_tables};
use tracing::{debug, info, warn};
use utils::set_color;

mod cli;
mod error;
mod filter;
mod logging;
mod output;
mod query;
mod schema;
mod tables;
mod utils;

fn config_path(args: &Args) -> CliResult<PathBuf> {
    let Some(ref c) = args.config else {
        return Ok(default_config_path());
    };

    let path = resolve_path(c)?;
    if path.is_absolute() {
        Ok(path)
    } else {
        Ok(env::current_dir()
            .with_context(|| "retrieving current directory".into())?
            .join(path))
    }
}

fn db_settings(args: &Args, config: &Config) -> CliResult<DbSettings> {
    let path = match args.db.as_deref() {
        Some(db) if db.trim() == MEMORY_DB => PathBuf::from(MEMORY_DB),
        Some(db) => resolve_path(db)?,
        None => config.get_db_path()?,
    };

    Ok(DbSettings {
        path: Some(path),
        foreign_keys: config.foreign_keys(),
        journal_mode: config.journal_mode.clone(),
        busy_timeout_ms: Some(config.busy_timeout_ms()),
    })
}

fn open_database(args: &Args, config: &Config) -> CliResult<Database> {
    let settings = db_settings(args, config)?;
    debug!(path = ?settings.path, "opening database");
    Ok(Database::with_settings(&settings)?)
}

fn print_config(path: &Path) -> CliResult<()> {
    let content = match fs::read_to_string(path) {
        Ok(v) => v,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            warn!("Config file {} not found", path.display());
            Config::default_config().to_annotated_document()?.to_string()
        }
        Err(err) => {
            return Err(CliError::IoError {
                action: "reading config".to_string(),
                source: err,
            });
        }
    };
    info!("{}", content);
    Ok(())
}

fn handle_cli() -> CliResult<()> {
    let matches = Args::command().get_matches();
    let args = Args::from_arg_matches(&matches).unwrap_or_else(|err| err.exit());

    setup_logging(&args);

    if args.no_color {
        set_color(false);
    }

    let config_path = config_path(&args)?;

    match &args.command {
        Commands::DefConfig => {
            generate_default_config(&config_path)?;
            return Ok(());
        }
        Commands::Config => return print_config(&config_path),
        Commands::Ddl {
            schema,
        } => return print_ddl(resolve_path(schema)?, args.json),
        _ => {}
    }

    let config = Config::from_path(&config_path)?;
    let display = config.display();
    let mut db = open_database(&args, &config)?;

    match args.command {
        Commands::Apply {
            schemas,
        } => {
            let paths = if schemas.is_empty() {
                config.get_schema_paths()?
            } else {
                schemas
                    .iter()
                    .map(|s| resolve_path(s))
                    .collect::<Result<Vec<_>, _>>()?
            };
            apply_schemas(&mut db, &paths)?;
        }
        Commands::Tables => list_tables(&db, args.json)?,
        Commands::Drop {
            table,
        } => drop_table(&mut db, &table)?,
        Commands::Select {
            table,
            columns,
            filter,
            or,
            order_by,
            desc,
            limit,
            offset,
        } => {
            let opts = SelectOptions {
                columns,
                conditions: ordered_conditions(matches.subcommand_matches("select"), filter, or),
                order_by,
                desc,
                limit,
                offset,
            };
            select_rows(&db, &table, &opts, args.json, &display)?;
        }
        Commands::Sql {
            statement,
            params,
        } => run_sql(&db, &statement, &params, args.json, &display)?,
        Commands::DefConfig | Commands::Config | Commands::Ddl { .. } => unreachable!(),
    }

    db.close()?;
    Ok(())
}

fn main() {
    // Install miette's fancy error handler for beautiful error output
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(2)
                .build(),
        )
    }))
    .ok();

    if let Err(err) = handle_cli() {
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    #[test]
    fn test_db_settings_from_args() {
        let config = Config {
            db_path: Some("/tmp/litequery-test.db".into()),
            journal_mode: Some("wal".into()),
            ..Config::default_config()
        };

        let args = Args::parse_from(["litequery", "tables"]);
        let settings = db_settings(&args, &config).unwrap();
        if env::var("LITEQUERY_DB").is_err() {
            assert_eq!(settings.path, Some(PathBuf::from("/tmp/litequery-test.db")));
        }
        assert_eq!(settings.journal_mode.as_deref(), Some("wal"));
        assert!(settings.foreign_keys);
        assert_eq!(settings.busy_timeout_ms, Some(5000));

        let args = Args::parse_from(["litequery", "-d", ":memory:", "tables"]);
        let settings = db_settings(&args, &config).unwrap();
        assert_eq!(settings.path, Some(PathBuf::from(":memory:")));
    }

    #[test]
    fn test_select_args() {
        let args = Args::parse_from([
            "litequery",
            "select",
            "products",
            "--columns",
            "id,name",
            "-w",
            "stock>=50",
            "--where",
            "category=tools",
            "--order-by",
            "stock",
            "--desc",
            "-l",
            "5",
        ]);

        let Commands::Select {
            table,
            columns,
            filter,
            desc,
            limit,
            ..
        } = args.command
        else {
            panic!("expected select");
        };
        assert_eq!(table, "products");
        assert_eq!(columns, ["id", "name"]);
        assert_eq!(filter, ["stock>=50", "category=tools"]);
        assert!(desc);
        assert_eq!(limit, Some(5));
    }
}
