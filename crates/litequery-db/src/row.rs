//! Loosely-typed result rows.

use rusqlite::types::{FromSql, FromSqlError, Value, ValueRef};
use serde::{ser::SerializeMap, Serialize, Serializer};

/// A single result row: column names paired with the values SQLite returned.
///
/// Columns keep the order of the result set. Typed access goes through
/// [`Row::get`], which uses rusqlite's [`FromSql`] conversions.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Row {
    columns: Vec<String>,
    values: Vec<Value>,
}

impl Row {
    pub(crate) fn from_sqlite(columns: &[String], row: &rusqlite::Row) -> rusqlite::Result<Self> {
        let mut values = Vec::with_capacity(columns.len());
        for idx in 0..columns.len() {
            values.push(owned_value(row.get_ref(idx)?)?);
        }
        Ok(Self {
            columns: columns.to_vec(),
            values,
        })
    }

    /// Column names in result-set order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Values in result-set order.
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Returns the raw value of `column`, if the row has it.
    pub fn value(&self, column: &str) -> Option<&Value> {
        self.columns
            .iter()
            .position(|c| c == column)
            .map(|idx| &self.values[idx])
    }

    /// Reads `column` converted to `T`.
    ///
    /// Fails with [`rusqlite::Error::InvalidColumnName`] when the column is
    /// absent and with a conversion error when the stored type does not fit.
    pub fn get<T: FromSql>(&self, column: &str) -> rusqlite::Result<T> {
        let idx = self
            .columns
            .iter()
            .position(|c| c == column)
            .ok_or_else(|| rusqlite::Error::InvalidColumnName(column.to_string()))?;

        let value = &self.values[idx];
        T::column_result(ValueRef::from(value)).map_err(|err| match err {
            FromSqlError::InvalidType => rusqlite::Error::InvalidColumnType(
                idx,
                column.to_string(),
                ValueRef::from(value).data_type(),
            ),
            FromSqlError::OutOfRange(i) => rusqlite::Error::IntegralValueOutOfRange(idx, i),
            other => rusqlite::Error::FromSqlConversionFailure(
                idx,
                ValueRef::from(value).data_type(),
                Box::new(other),
            ),
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.columns
            .iter()
            .map(String::as_str)
            .zip(self.values.iter())
    }

    /// Converts the row to a JSON object, keeping column order.
    ///
    /// Blobs are rendered as arrays of byte values.
    pub fn to_json(&self) -> serde_json::Value {
        let map = self
            .iter()
            .map(|(col, val)| (col.to_string(), value_to_json(val)))
            .collect::<serde_json::Map<_, _>>();
        serde_json::Value::Object(map)
    }
}

/// Copies a borrowed SQLite value. TEXT that is not valid UTF-8 is an error.
fn owned_value(value: ValueRef<'_>) -> rusqlite::Result<Value> {
    Ok(match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::Integer(i),
        ValueRef::Real(f) => Value::Real(f),
        ValueRef::Text(bytes) => Value::Text(
            std::str::from_utf8(bytes)
                .map_err(rusqlite::Error::Utf8Error)?
                .to_string(),
        ),
        ValueRef::Blob(bytes) => Value::Blob(bytes.to_vec()),
    })
}

pub(crate) fn value_to_json(value: &Value) -> serde_json::Value {
    match value {
        Value::Null => serde_json::Value::Null,
        Value::Integer(i) => serde_json::Value::from(*i),
        Value::Real(f) => serde_json::Value::from(*f),
        Value::Text(s) => serde_json::Value::from(s.as_str()),
        Value::Blob(b) => serde_json::Value::from(b.clone()),
    }
}

impl Serialize for Row {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (col, val) in self.iter() {
            map.serialize_entry(col, &value_to_json(val))?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Row {
        Row {
            columns: vec!["id".into(), "name".into(), "price".into(), "note".into()],
            values: vec![
                Value::Integer(7),
                Value::Text("Hammer".into()),
                Value::Real(9.5),
                Value::Null,
            ],
        }
    }

    #[test]
    fn test_typed_get() {
        let row = sample();
        assert_eq!(row.get::<i64>("id").unwrap(), 7);
        assert_eq!(row.get::<String>("name").unwrap(), "Hammer");
        assert_eq!(row.get::<f64>("price").unwrap(), 9.5);
        assert_eq!(row.get::<Option<String>>("note").unwrap(), None);
    }

    #[test]
    fn test_get_missing_column() {
        let row = sample();
        assert!(matches!(
            row.get::<i64>("missing"),
            Err(rusqlite::Error::InvalidColumnName(_))
        ));
    }

    #[test]
    fn test_get_wrong_type() {
        let row = sample();
        assert!(matches!(
            row.get::<i64>("name"),
            Err(rusqlite::Error::InvalidColumnType(1, _, _))
        ));
    }

    #[test]
    fn test_json_keeps_column_order() {
        let row = sample();
        let json = serde_json::to_string(&row).unwrap();
        assert_eq!(
            json,
            r#"{"id":7,"name":"Hammer","price":9.5,"note":null}"#
        );
    }
}
