//! Column descriptors and their modifiers.

use std::fmt;

use rusqlite::types::Value;
use serde::{Deserialize, Serialize};

use crate::value::IntoValue;

/// SQLite storage classes a column may be declared with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ColumnType {
    Integer,
    Text,
    Real,
    Blob,
    Numeric,
}

impl ColumnType {
    pub const fn as_str(&self) -> &'static str {
        match self {
            ColumnType::Integer => "INTEGER",
            ColumnType::Text => "TEXT",
            ColumnType::Real => "REAL",
            ColumnType::Blob => "BLOB",
            ColumnType::Numeric => "NUMERIC",
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Referential action for `ON DELETE` / `ON UPDATE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FkAction {
    Cascade,
    #[serde(alias = "SET NULL")]
    SetNull,
    Restrict,
    #[serde(alias = "NO ACTION")]
    NoAction,
    #[serde(alias = "SET DEFAULT")]
    SetDefault,
}

impl FkAction {
    pub const fn as_str(&self) -> &'static str {
        match self {
            FkAction::Cascade => "CASCADE",
            FkAction::SetNull => "SET NULL",
            FkAction::Restrict => "RESTRICT",
            FkAction::NoAction => "NO ACTION",
            FkAction::SetDefault => "SET DEFAULT",
        }
    }
}

impl fmt::Display for FkAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Target of a `REFERENCES` clause.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForeignKey {
    pub table: String,
    pub column: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_delete: Option<FkAction>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_update: Option<FkAction>,
}

impl ForeignKey {
    pub fn new(table: impl Into<String>, column: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            column: column.into(),
            on_delete: None,
            on_update: None,
        }
    }

    pub fn on_delete(mut self, action: FkAction) -> Self {
        self.on_delete = Some(action);
        self
    }

    pub fn on_update(mut self, action: FkAction) -> Self {
        self.on_update = Some(action);
        self
    }
}

/// Describes a single table column.
///
/// Modifiers take the descriptor by value and hand back the changed copy:
///
/// ```
/// use litequery_db::schema::{integer, text};
///
/// let id = integer("id").primary_key(true);
/// let email = text("email").not_null().unique();
/// assert!(id.primary_key && id.auto_increment);
/// assert!(email.not_null && email.unique);
/// ```
///
/// `auto_increment` is only rendered alongside `primary_key`. Whether a
/// default fits the declared type is left to SQLite.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    #[serde(rename = "type")]
    pub column_type: ColumnType,
    #[serde(default)]
    pub primary_key: bool,
    #[serde(default)]
    pub auto_increment: bool,
    #[serde(default)]
    pub not_null: bool,
    #[serde(default)]
    pub unique: bool,
    #[serde(
        default,
        with = "crate::schema::serde_value",
        skip_serializing_if = "Option::is_none"
    )]
    pub default: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub references: Option<ForeignKey>,
}

impl Column {
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            column_type,
            primary_key: false,
            auto_increment: false,
            not_null: false,
            unique: false,
            default: None,
            references: None,
        }
    }

    /// Marks the column as the primary key, optionally with `AUTOINCREMENT`.
    pub fn primary_key(self, auto_increment: bool) -> Self {
        Self {
            primary_key: true,
            auto_increment,
            ..self
        }
    }

    pub fn not_null(self) -> Self {
        Self {
            not_null: true,
            ..self
        }
    }

    pub fn unique(self) -> Self {
        Self {
            unique: true,
            ..self
        }
    }

    /// Sets the `DEFAULT` value. Pass `Value::Null` for `DEFAULT NULL`.
    pub fn default_value(self, value: impl IntoValue) -> Self {
        Self {
            default: Some(value.into_value()),
            ..self
        }
    }

    /// Adds a `REFERENCES table(column)` clause.
    pub fn references(self, table: impl Into<String>, column: impl Into<String>) -> Self {
        self.foreign_key(ForeignKey::new(table, column))
    }

    /// Adds a fully specified foreign key, including referential actions.
    pub fn foreign_key(self, fk: ForeignKey) -> Self {
        Self {
            references: Some(fk),
            ..self
        }
    }
}

pub fn column(name: impl Into<String>, column_type: ColumnType) -> Column {
    Column::new(name, column_type)
}

pub fn integer(name: impl Into<String>) -> Column {
    Column::new(name, ColumnType::Integer)
}

pub fn text(name: impl Into<String>) -> Column {
    Column::new(name, ColumnType::Text)
}

pub fn real(name: impl Into<String>) -> Column {
    Column::new(name, ColumnType::Real)
}

pub fn blob(name: impl Into<String>) -> Column {
    Column::new(name, ColumnType::Blob)
}

pub fn numeric(name: impl Into<String>) -> Column {
    Column::new(name, ColumnType::Numeric)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_helpers() {
        assert_eq!(integer("a").column_type, ColumnType::Integer);
        assert_eq!(text("a").column_type, ColumnType::Text);
        assert_eq!(real("a").column_type, ColumnType::Real);
        assert_eq!(blob("a").column_type, ColumnType::Blob);
        assert_eq!(numeric("a").column_type, ColumnType::Numeric);
        assert_eq!(column("a", ColumnType::Text), text("a"));
    }

    #[test]
    fn test_modifiers_return_copies() {
        let base = text("email");
        let modified = base.clone().not_null().unique();

        assert!(!base.not_null && !base.unique);
        assert!(modified.not_null && modified.unique);
        assert_eq!(modified.name, "email");
    }

    #[test]
    fn test_primary_key() {
        let plain = integer("id").primary_key(false);
        assert!(plain.primary_key);
        assert!(!plain.auto_increment);

        let auto = integer("id").primary_key(true);
        assert!(auto.auto_increment);
    }

    #[test]
    fn test_default_and_references() {
        let col = integer("user_id")
            .default_value(0)
            .foreign_key(ForeignKey::new("users", "id").on_delete(FkAction::Cascade));

        assert_eq!(col.default, Some(Value::Integer(0)));
        let fk = col.references.unwrap();
        assert_eq!(fk.table, "users");
        assert_eq!(fk.column, "id");
        assert_eq!(fk.on_delete, Some(FkAction::Cascade));
        assert_eq!(fk.on_update, None);
    }

    #[test]
    fn test_action_names() {
        assert_eq!(FkAction::SetNull.to_string(), "SET NULL");
        assert_eq!(FkAction::NoAction.to_string(), "NO ACTION");
        assert_eq!(FkAction::SetDefault.to_string(), "SET DEFAULT");
    }
}
