//! Scalar values bound to statement placeholders.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// A scalar column value carried by a change record.
///
/// Values decoded from JSON only ever produce `Null`, `Boolean`, `Int`,
/// `Double` and `Text`; the remaining variants are built from Rust values.
/// JSON arrays and objects are kept as their compact JSON text.
#[derive(Debug, Clone, PartialEq, Serialize, serde::Deserialize)]
#[serde(untagged, from = "serde_json::Value")]
pub enum Value {
    Null,
    Boolean(bool),
    Int(i64),
    Double(f64),
    Text(String),
    Timestamp(DateTime<Utc>),
    Uuid(Uuid),
    Blob(Vec<u8>),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Short type name, used in logs and coercion errors.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Boolean(_) => "boolean",
            Value::Int(_) => "int",
            Value::Double(_) => "double",
            Value::Text(_) => "text",
            Value::Timestamp(_) => "timestamp",
            Value::Uuid(_) => "uuid",
            Value::Blob(_) => "blob",
        }
    }
}

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        match v {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Boolean(b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Value::Int(i)
                } else if n.is_u64() {
                    // past i64::MAX; an f64 would drop the low digits
                    Value::Text(n.to_string())
                } else if let Some(f) = n.as_f64() {
                    Value::Double(f)
                } else {
                    Value::Text(n.to_string())
                }
            }
            serde_json::Value::String(s) => Value::Text(s),
            other @ (serde_json::Value::Array(_) | serde_json::Value::Object(_)) => {
                Value::Text(other.to_string())
            }
        }
    }
}

macro_rules! impl_from_int {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Value {
                fn from(v: $t) -> Self {
                    Value::Int(i64::from(v))
                }
            }
        )*
    };
}

impl_from_int!(i8, i16, i32, i64, u8, u16, u32);

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Boolean(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Double(f64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Double(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(v: DateTime<Utc>) -> Self {
        Value::Timestamp(v)
    }
}

impl From<Uuid> for Value {
    fn from(v: Uuid) -> Self {
        Value::Uuid(v)
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Blob(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_json_scalars() {
        assert_eq!(Value::from(json!(null)), Value::Null);
        assert_eq!(Value::from(json!(true)), Value::Boolean(true));
        assert_eq!(Value::from(json!(22)), Value::Int(22));
        assert_eq!(Value::from(json!(1.5)), Value::Double(1.5));
        assert_eq!(Value::from(json!("6")), Value::Text("6".into()));
    }

    #[test]
    fn test_from_json_large_integers_stay_exact() {
        assert_eq!(Value::from(json!(i64::MAX)), Value::Int(i64::MAX));
        assert_eq!(Value::from(json!(i64::MIN)), Value::Int(i64::MIN));
        assert_eq!(
            Value::from(json!(18446744073709551615u64)),
            Value::Text("18446744073709551615".into())
        );

        let v: Value = serde_json::from_str("9223372036854775808").unwrap();
        assert_eq!(v, Value::Text("9223372036854775808".into()));
    }

    #[test]
    fn test_from_json_nested_keeps_json_text() {
        assert_eq!(
            Value::from(json!({"a": [1, 2]})),
            Value::Text(r#"{"a":[1,2]}"#.into())
        );
    }

    #[test]
    fn test_deserialize_and_serialize_untagged() {
        let v: Value = serde_json::from_str("33").unwrap();
        assert_eq!(v, Value::Int(33));
        assert_eq!(serde_json::to_string(&Value::Text("x".into())).unwrap(), "\"x\"");
        assert_eq!(serde_json::to_string(&Value::Null).unwrap(), "null");
    }

    #[test]
    fn test_option_maps_none_to_null() {
        assert_eq!(Value::from(None::<i32>), Value::Null);
        assert_eq!(Value::from(Some(7i32)), Value::Int(7));
    }
}
