//! Schema DSL, DDL generation and a fluent query builder over SQLite.
//!
//! ```
//! use litequery_db::{
//!     query::Condition,
//!     record,
//!     schema::{integer, real, table, text, Member},
//!     Database,
//! };
//!
//! let mut db = Database::open_in_memory().unwrap();
//! db.define_schema(table(
//!     "products",
//!     [
//!         Member::from(integer("id").primary_key(true)),
//!         text("name").not_null().into(),
//!         real("price").default_value(0.0).into(),
//!     ],
//! ))
//! .unwrap();
//!
//! let hammer = db
//!     .insert("products", record! { "name" => "Hammer", "price" => 19.99 })
//!     .unwrap()
//!     .unwrap();
//! assert_eq!(hammer.get::<i64>("id").unwrap(), 1);
//!
//! let cheap = db
//!     .query()
//!     .from("products")
//!     .filter(Condition::lt("price", 20.0))
//!     .execute()
//!     .unwrap();
//! assert_eq!(cheap.len(), 1);
//! ```

pub mod connection;
pub mod error;
pub mod facade;
pub mod macros;
pub mod query;
pub mod registry;
pub mod row;
pub mod schema;
pub mod value;

pub use connection::{Database, DbSettings, MEMORY_PATH};
pub use error::{DbError, Result};
pub use query::{Col, Condition, Operator, QueryBuilder};
pub use registry::SchemaRegistry;
pub use row::Row;
pub use rusqlite::types::Value;
pub use schema::TableSchema;
pub use value::IntoValue;
