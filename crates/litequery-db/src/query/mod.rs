//! The query builder.
//!
//! A single [`QueryBuilder`] type covers SELECT, INSERT, UPDATE, DELETE and raw
//! statements. Chain methods to accumulate state, then call
//! [`QueryBuilder::execute`] or [`QueryBuilder::execute_one`]. Values never
//! appear in the SQL text; each one is bound to a `?` placeholder.
//!
//! # Example
//!
//! ```
//! use litequery_db::{query::Col, record, schema::{integer, table, text, Member}, Database};
//!
//! const NAME: Col = Col::new("name");
//!
//! let mut db = Database::open_in_memory().unwrap();
//! db.define_schema(table(
//!     "users",
//!     [Member::from(integer("id").primary_key(true)), text("name").into()],
//! ))
//! .unwrap();
//!
//! db.query()
//!     .insert("users", record! { "name" => "alice" })
//!     .execute()
//!     .unwrap();
//!
//! let rows = db.query().from("users").filter(NAME.eq("alice")).execute().unwrap();
//! assert_eq!(rows.len(), 1);
//! ```
//!
//! # Submodules
//!
//! - [`condition`]: [`Condition`], [`Operator`] and the [`Col`] helper.
//! - [`builder`]: Implementation of [`QueryBuilder`].

pub mod builder;
pub(crate) mod clause;
pub mod condition;

pub use builder::QueryBuilder;
pub use condition::{Col, Condition, Operand, Operator};
