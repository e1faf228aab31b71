use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

/// A string, number or boolean carried by the control plane.
///
/// Serialized untagged, so on the wire it is just the bare JSON value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScalarValue {
    Boolean(bool),
    Number(Number),
    String(String),
}

impl ScalarValue {
    /// Build a number scalar from a float. Returns `None` for NaN and infinities.
    pub fn float(v: f64) -> Option<Self> {
        Number::from_f64(v).map(ScalarValue::Number)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ScalarValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ScalarValue::Number(n) => n.as_f64(),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ScalarValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Short name of the carried type, for logs and error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            ScalarValue::Boolean(_) => "boolean",
            ScalarValue::Number(_) => "number",
            ScalarValue::String(_) => "string",
        }
    }
}

impl From<ScalarValue> for Value {
    fn from(v: ScalarValue) -> Self {
        match v {
            ScalarValue::Boolean(b) => Value::Bool(b),
            ScalarValue::Number(n) => Value::Number(n),
            ScalarValue::String(s) => Value::String(s),
        }
    }
}

impl From<&str> for ScalarValue {
    fn from(v: &str) -> Self {
        ScalarValue::String(v.to_string())
    }
}

impl From<String> for ScalarValue {
    fn from(v: String) -> Self {
        ScalarValue::String(v)
    }
}

impl From<bool> for ScalarValue {
    fn from(v: bool) -> Self {
        ScalarValue::Boolean(v)
    }
}

impl From<i64> for ScalarValue {
    fn from(v: i64) -> Self {
        ScalarValue::Number(v.into())
    }
}
