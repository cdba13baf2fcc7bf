//! Schema declaration DSL and DDL generation.
//!
//! Tables are declared from small immutable descriptors:
//!
//! ```
//! use litequery_db::schema::{index, integer, real, table, text, unique, Member};
//!
//! let products = table(
//!     "products",
//!     [
//!         Member::from(integer("id").primary_key(true)),
//!         text("name").not_null().into(),
//!         real("price").default_value(0.0).into(),
//!         unique(["name"]).into(),
//!         index("idx_products_price", ["price"], false).into(),
//!     ],
//! );
//! assert_eq!(products.columns().count(), 3);
//! ```
//!
//! [`ddl`] turns a [`TableSchema`] into `CREATE TABLE` / `CREATE INDEX` text.

pub mod column;
pub mod ddl;
pub mod table;

pub use column::{
    blob, column, integer, numeric, real, text, Column, ColumnType, FkAction, ForeignKey,
};
pub use ddl::{create_index_sql, create_table_sql};
pub use table::{index, table, unique, Index, Member, TableSchema, UniqueConstraint};

/// Serde adapter for `Option<Value>` column defaults.
///
/// Schema files carry defaults as plain scalars: strings, integers, floats
/// or booleans.
pub(crate) mod serde_value {
    use rusqlite::types::Value;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    #[derive(Serialize, Deserialize)]
    #[serde(untagged)]
    enum Scalar {
        Bool(bool),
        Integer(i64),
        Real(f64),
        Text(String),
        Blob(Vec<u8>),
    }

    pub fn serialize<S: Serializer>(value: &Option<Value>, serializer: S) -> Result<S::Ok, S::Error> {
        let scalar = match value {
            None | Some(Value::Null) => return serializer.serialize_none(),
            Some(Value::Integer(i)) => Scalar::Integer(*i),
            Some(Value::Real(f)) => Scalar::Real(*f),
            Some(Value::Text(s)) => Scalar::Text(s.clone()),
            Some(Value::Blob(b)) => Scalar::Blob(b.clone()),
        };
        serializer.serialize_some(&scalar)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Value>, D::Error> {
        let scalar = Option::<Scalar>::deserialize(deserializer)?;
        Ok(scalar.map(|s| match s {
            Scalar::Bool(b) => Value::Integer(b as i64),
            Scalar::Integer(i) => Value::Integer(i),
            Scalar::Real(f) => Value::Real(f),
            Scalar::Text(s) => Value::Text(s),
            Scalar::Blob(b) => Value::Blob(b),
        }))
    }
}
