use litequery_config::error::{ConfigError, PathError};
use litequery_db::DbError;
use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Diagnostic, Debug)]
pub enum CliError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Db(#[from] DbError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Path(#[from] PathError),

    #[error("Error while {action}")]
    #[diagnostic(code(litequery::io), help("Check file permissions and paths"))]
    IoError {
        action: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid schema file {path}")]
    #[diagnostic(
        code(litequery::schema_file),
        help("Schema files hold a [[tables]] array; each table has a name and [[tables.members]]")
    )]
    SchemaFile {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid condition `{0}`")]
    #[diagnostic(
        code(litequery::condition),
        help("Use forms like `age>=18`, `name like %ann%`, `id in 1,2,3` or `deleted_at is null`")
    )]
    InvalidCondition(String),

    #[error("No schema files given")]
    #[diagnostic(
        code(litequery::no_schema),
        help("Pass schema files to `apply` or set `schema_paths` in the config")
    )]
    NoSchemaFiles,

    #[error(transparent)]
    #[diagnostic(code(litequery::json))]
    Json(#[from] serde_json::Error),
}

/// Attaches what was being attempted to an IO error.
pub trait ErrorContext<T> {
    fn with_context<C>(self, context: C) -> Result<T, CliError>
    where
        C: FnOnce() -> String;
}

impl<T> ErrorContext<T> for std::io::Result<T> {
    fn with_context<C>(self, context: C) -> Result<T, CliError>
    where
        C: FnOnce() -> String,
    {
        self.map_err(|err| CliError::IoError {
            action: context(),
            source: err,
        })
    }
}

pub type CliResult<T> = std::result::Result<T, CliError>;
