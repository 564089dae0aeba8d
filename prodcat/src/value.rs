//! Tagged representation of the free-form `details` payload.
//!
//! Product details arrive as arbitrary JSON. Rather than passing
//! `serde_json::Value` around, the pipeline works on [`DetailValue`] so that
//! dates are a first-class variant and consumers can match exhaustively.

use std::collections::BTreeMap;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

/// A product's details object: field name to value.
pub type DetailMap = BTreeMap<String, DetailValue>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "Value", into = "Value")]
pub enum DetailValue {
    Null,
    String(String),
    Number(f64),
    Bool(bool),
    Date(DateTime<Utc>),
    Array(Vec<DetailValue>),
    Object(DetailMap),
}

impl DetailValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            DetailValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            DetailValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&DetailMap> {
        match self {
            DetailValue::Object(map) => Some(map),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, DetailValue::Null)
    }

    /// Display form of the value, as it would be typed into the admin form.
    ///
    /// Integral numbers drop the fractional part (`5`, not `5.0`), dates use
    /// RFC 3339 and nested values are compact JSON.
    pub fn to_raw_string(&self) -> String {
        match self {
            DetailValue::Null => String::new(),
            DetailValue::String(s) => s.clone(),
            DetailValue::Number(n) => format_number(*n),
            DetailValue::Bool(b) => b.to_string(),
            DetailValue::Date(dt) => dt.to_rfc3339_opts(SecondsFormat::AutoSi, true),
            DetailValue::Array(_) | DetailValue::Object(_) => Value::from(self.clone()).to_string(),
        }
    }
}

pub(crate) fn format_number(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

impl From<Value> for DetailValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => DetailValue::Null,
            Value::Bool(b) => DetailValue::Bool(b),
            // Integers beyond 2^53 lose precision.
            Value::Number(n) => DetailValue::Number(n.as_f64().unwrap_or(f64::NAN)),
            Value::String(s) => DetailValue::String(s),
            Value::Array(items) => DetailValue::Array(items.into_iter().map(DetailValue::from).collect()),
            Value::Object(map) => DetailValue::Object(map.into_iter().map(|(k, v)| (k, DetailValue::from(v))).collect()),
        }
    }
}

impl From<DetailValue> for Value {
    fn from(value: DetailValue) -> Self {
        match value {
            DetailValue::Null => Value::Null,
            DetailValue::String(s) => Value::String(s),
            DetailValue::Number(n) => number_to_json(n),
            DetailValue::Bool(b) => Value::Bool(b),
            DetailValue::Date(dt) => Value::String(dt.to_rfc3339_opts(SecondsFormat::AutoSi, true)),
            DetailValue::Array(items) => Value::Array(items.into_iter().map(Value::from).collect()),
            DetailValue::Object(map) => Value::Object(map.into_iter().map(|(k, v)| (k, Value::from(v))).collect()),
        }
    }
}

/// Integral values serialize as JSON integers so `5` stays `5` on the wire.
/// Non-finite values have no JSON form and become `null`.
fn number_to_json(n: f64) -> Value {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 9_007_199_254_740_992.0 {
        Value::Number(Number::from(n as i64))
    } else {
        Number::from_f64(n).map(Value::Number).unwrap_or(Value::Null)
    }
}

impl From<&str> for DetailValue {
    fn from(value: &str) -> Self {
        DetailValue::String(value.to_string())
    }
}

impl From<String> for DetailValue {
    fn from(value: String) -> Self {
        DetailValue::String(value)
    }
}

impl From<f64> for DetailValue {
    fn from(value: f64) -> Self {
        DetailValue::Number(value)
    }
}

impl From<i64> for DetailValue {
    fn from(value: i64) -> Self {
        DetailValue::Number(value as f64)
    }
}

impl From<bool> for DetailValue {
    fn from(value: bool) -> Self {
        DetailValue::Bool(value)
    }
}

impl From<DateTime<Utc>> for DetailValue {
    fn from(value: DateTime<Utc>) -> Self {
        DetailValue::Date(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn converts_from_json() {
        let value = DetailValue::from(json!({"rate": 5.5, "tags": ["a", "b"], "active": true, "note": null}));
        let map = value.as_object().expect("object");
        assert_eq!(map["rate"], DetailValue::Number(5.5));
        assert_eq!(
            map["tags"],
            DetailValue::Array(vec![DetailValue::from("a"), DetailValue::from("b")])
        );
        assert_eq!(map["active"], DetailValue::Bool(true));
        assert!(map["note"].is_null());
    }

    #[test]
    fn integral_numbers_serialize_as_integers() {
        assert_eq!(Value::from(DetailValue::Number(5.0)), json!(5));
        assert_eq!(Value::from(DetailValue::Number(2.75)), json!(2.75));
        assert_eq!(Value::from(DetailValue::Number(f64::NAN)), Value::Null);
    }

    #[test]
    fn raw_strings() {
        assert_eq!(DetailValue::Number(5.0).to_raw_string(), "5");
        assert_eq!(DetailValue::Number(5.5).to_raw_string(), "5.5");
        assert_eq!(DetailValue::Bool(false).to_raw_string(), "false");
        assert_eq!(DetailValue::Null.to_raw_string(), "");
        let nested = DetailValue::from(json!({"a": [1, 2]}));
        assert_eq!(nested.to_raw_string(), r#"{"a":[1,2]}"#);
    }

    #[test]
    fn serde_round_trip_through_json_text() {
        let text = r#"{"b":[1,"x"],"a":{"k":false}}"#;
        let value: DetailValue = serde_json::from_str(text).unwrap();
        assert_eq!(serde_json::to_string(&value).unwrap(), r#"{"a":{"k":false},"b":[1,"x"]}"#);
    }
}
