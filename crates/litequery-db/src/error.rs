//! Error types for litequery-db.

use miette::Diagnostic;
use thiserror::Error;

/// Database error type for litequery-db operations.
///
/// Engine failures (bad SQL, constraint violations, unknown columns) are
/// carried through [`DbError::Sqlite`] untouched. Missing rows are never an
/// error; lookups return `Ok(None)` instead.
#[derive(Error, Diagnostic, Debug)]
pub enum DbError {
    #[error(transparent)]
    #[diagnostic(
        code(litequery_db::sqlite),
        help("Check the generated SQL, column names and constraint definitions")
    )]
    Sqlite(#[from] rusqlite::Error),

    #[error("Database connection failed: {0}")]
    #[diagnostic(
        code(litequery_db::connection),
        help("Check if the database file exists and is accessible")
    )]
    Connection(String),

    #[error("Connection lock poisoned")]
    #[diagnostic(
        code(litequery_db::poison),
        help("A previous operation panicked while holding the connection")
    )]
    PoisonError,
}

impl<T> From<std::sync::PoisonError<T>> for DbError {
    fn from(_: std::sync::PoisonError<T>) -> Self {
        DbError::PoisonError
    }
}

/// Result type alias for litequery-db operations.
pub type Result<T> = std::result::Result<T, DbError>;
