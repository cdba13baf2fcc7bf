//! Macros for naming tables and columns.
//!
//! The [`define_table!`] macro generates a module of column constants for a
//! table so queries can refer to columns without repeating string literals.

/// Defines a module with column constants for a database table.
///
/// # Syntax
///
/// ```
/// litequery_db::define_table!(
///     users {
///         table: "users",
///         columns: {
///             ID => "id",
///             NAME => "name",
///         }
///     }
/// );
///
/// assert_eq!(users::TABLE, "users");
/// assert_eq!(users::NAME.name, "name");
/// ```
///
/// This expands to:
///
/// ```ignore
/// pub mod users {
///     pub const TABLE: &str = "users";
///     pub const ID: litequery_db::query::Col = litequery_db::query::Col::new("id");
///     pub const NAME: litequery_db::query::Col = litequery_db::query::Col::new("name");
/// }
/// ```
///
/// # Usage
///
/// ```
/// use litequery_db::{define_table, Database};
///
/// define_table!(
///     users {
///         table: "users",
///         columns: { NAME => "name" }
///     }
/// );
///
/// let db = Database::open_in_memory().unwrap();
/// let (sql, _) = db
///     .query()
///     .from(users::TABLE)
///     .filter(users::NAME.eq("alice"))
///     .build();
/// assert_eq!(sql, "SELECT * FROM users WHERE name = ?");
/// ```
#[macro_export]
macro_rules! define_table {
    (
        $entity:ident {
            table: $table:literal,
            columns: {
                $($col_name:ident => $db_col:literal),* $(,)?
            }
        }
    ) => {
        pub mod $entity {
            #[allow(unused_imports)]
            use $crate::query::Col;

            pub const TABLE: &str = $table;

            $(
                pub const $col_name: Col = Col::new($db_col);
            )*
        }
    };
}
