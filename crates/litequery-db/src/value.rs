//! Conversions into SQLite values.
//!
//! The builder accepts anything implementing [`IntoValue`], so callers can pass
//! string slices, integers, floats, booleans, byte buffers and `Option`s
//! without wrapping them in [`Value`] by hand.

use rusqlite::types::Value;

/// Converts a Rust value into a bindable SQLite [`Value`].
///
/// Booleans become `Integer(0 | 1)`, the way SQLite stores them. Reading them
/// back yields integers, not booleans.
pub trait IntoValue {
    fn into_value(self) -> Value;
}

impl IntoValue for Value {
    fn into_value(self) -> Value {
        self
    }
}

impl IntoValue for &Value {
    fn into_value(self) -> Value {
        self.clone()
    }
}

impl IntoValue for &str {
    fn into_value(self) -> Value {
        Value::Text(self.to_string())
    }
}

impl IntoValue for String {
    fn into_value(self) -> Value {
        Value::Text(self)
    }
}

impl IntoValue for &String {
    fn into_value(self) -> Value {
        Value::Text(self.clone())
    }
}

impl IntoValue for bool {
    fn into_value(self) -> Value {
        Value::Integer(self as i64)
    }
}

impl IntoValue for f32 {
    fn into_value(self) -> Value {
        Value::Real(self as f64)
    }
}

impl IntoValue for f64 {
    fn into_value(self) -> Value {
        Value::Real(self)
    }
}

impl IntoValue for Vec<u8> {
    fn into_value(self) -> Value {
        Value::Blob(self)
    }
}

impl IntoValue for &[u8] {
    fn into_value(self) -> Value {
        Value::Blob(self.to_vec())
    }
}

impl<T: IntoValue> IntoValue for Option<T> {
    fn into_value(self) -> Value {
        match self {
            Some(v) => v.into_value(),
            None => Value::Null,
        }
    }
}

macro_rules! integer_into_value {
    ($($t:ty),*) => {
        $(
            impl IntoValue for $t {
                fn into_value(self) -> Value {
                    Value::Integer(self as i64)
                }
            }
        )*
    };
}

integer_into_value!(i8, i16, i32, i64, u8, u16, u32, isize);

/// Builds an ordered `Vec<(String, Value)>` payload for insert and update.
///
/// # Example
///
/// ```
/// use litequery_db::record;
///
/// let data = record! { "name" => "Hammer", "price" => 9.99, "stock" => 100 };
/// assert_eq!(data.len(), 3);
/// assert_eq!(data[0].0, "name");
/// ```
#[macro_export]
macro_rules! record {
    () => {
        ::std::vec::Vec::<(::std::string::String, $crate::Value)>::new()
    };
    ($($col:expr => $val:expr),+ $(,)?) => {
        vec![$((::std::string::String::from($col), $crate::value::IntoValue::into_value($val))),+]
    };
}

/// Renders a value as a SQL literal.
///
/// Text is single-quoted with embedded quotes doubled, blobs use the `X'..'`
/// hex form. Reals keep their decimal point; NaN and infinities have no SQL
/// literal and render as `NULL`.
pub fn sql_literal(value: &Value) -> String {
    match value {
        Value::Null => "NULL".to_string(),
        Value::Integer(i) => i.to_string(),
        Value::Real(f) if f.is_finite() => format!("{f:?}"),
        Value::Real(_) => "NULL".to_string(),
        Value::Text(s) => format!("'{}'", s.replace('\'', "''")),
        Value::Blob(b) => {
            let hex: String = b.iter().map(|byte| format!("{byte:02X}")).collect();
            format!("X'{hex}'")
        }
    }
}
