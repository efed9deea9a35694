//! Scalar values carried by field comparisons.

use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

/// A single JSON scalar compared against a field.
///
/// Filters arrive as JSON, so a scalar keeps the JSON number representation
/// untouched: `5` and `5.0` stay distinct and are rendered back exactly as the
/// caller wrote them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Null,
    Bool(bool),
    Number(Number),
    String(String),
}

impl Scalar {
    /// Converts a JSON value into a scalar. Returns `None` for arrays and objects.
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Null => Some(Scalar::Null),
            Value::Bool(b) => Some(Scalar::Bool(*b)),
            Value::Number(n) => Some(Scalar::Number(n.clone())),
            Value::String(s) => Some(Scalar::String(s.clone())),
            Value::Array(_) | Value::Object(_) => None,
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            Scalar::Null => Value::Null,
            Scalar::Bool(b) => Value::Bool(*b),
            Scalar::Number(n) => Value::Number(n.clone()),
            Scalar::String(s) => Value::String(s.clone()),
        }
    }
}

/// Renders the scalar as plain text: strings without quotes, numbers as written.
impl std::fmt::Display for Scalar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Scalar::Null => write!(f, "null"),
            Scalar::Bool(b) => write!(f, "{b}"),
            Scalar::Number(n) => write!(f, "{n}"),
            Scalar::String(s) => write!(f, "{s}"),
        }
    }
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Scalar::String(value.to_string())
    }
}

impl From<String> for Scalar {
    fn from(value: String) -> Self {
        Scalar::String(value)
    }
}

impl From<bool> for Scalar {
    fn from(value: bool) -> Self {
        Scalar::Bool(value)
    }
}

impl From<i64> for Scalar {
    fn from(value: i64) -> Self {
        Scalar::Number(value.into())
    }
}

impl From<i32> for Scalar {
    fn from(value: i32) -> Self {
        Scalar::Number(value.into())
    }
}

impl From<u64> for Scalar {
    fn from(value: u64) -> Self {
        Scalar::Number(value.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_json_scalars() {
        assert_eq!(Scalar::from_json(&json!(null)), Some(Scalar::Null));
        assert_eq!(Scalar::from_json(&json!(true)), Some(Scalar::Bool(true)));
        assert_eq!(Scalar::from_json(&json!(42)), Some(Scalar::from(42)));
        assert_eq!(Scalar::from_json(&json!("a")), Some(Scalar::from("a")));
    }

    #[test]
    fn test_from_json_rejects_containers() {
        assert_eq!(Scalar::from_json(&json!([1, 2])), None);
        assert_eq!(Scalar::from_json(&json!({"a": 1})), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(Scalar::from("say \"hi\"").to_string(), "say \"hi\"");
        assert_eq!(Scalar::from(10).to_string(), "10");
        assert_eq!(Scalar::from_json(&json!(2.5)).unwrap().to_string(), "2.5");
        assert_eq!(Scalar::Bool(false).to_string(), "false");
        assert_eq!(Scalar::Null.to_string(), "null");
    }

    #[test]
    fn test_serializes_as_plain_json() {
        assert_eq!(serde_json::to_value(Scalar::from("x")).unwrap(), json!("x"));
        assert_eq!(serde_json::to_value(Scalar::from(7)).unwrap(), json!(7));
        assert_eq!(Scalar::from(7).to_json(), json!(7));
    }
}
