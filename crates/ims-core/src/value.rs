//! RPC value model and its mapping to and from JSON
//!
//! The gateway receives JSON from the browser and speaks XML-RPC to the
//! backend. [`RpcValue`] is the XML-RPC data model; the conversions here are
//! the only place where the two type systems meet.

use std::collections::BTreeMap;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::NaiveDateTime;
use serde_json::{Map, Number, Value};

/// A single XML-RPC value
#[derive(Debug, Clone, PartialEq)]
pub enum RpcValue {
    /// `<nil/>` extension; used for absent arguments and `None` results
    Nil,
    Bool(bool),
    /// `<int>`, `<i4>` or `<i8>`
    Int(i64),
    Double(f64),
    String(String),
    /// `<dateTime.iso8601>`, no timezone on the wire
    DateTime(NaiveDateTime),
    Base64(Vec<u8>),
    Array(Vec<RpcValue>),
    Struct(BTreeMap<String, RpcValue>),
}

impl RpcValue {
    pub fn is_nil(&self) -> bool {
        matches!(self, RpcValue::Nil)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            RpcValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[RpcValue]> {
        match self {
            RpcValue::Array(items) => Some(items),
            _ => None,
        }
    }

    /// Convert a JSON argument into the value sent to the backend.
    ///
    /// Integers that fit `i64` become `Int`; every other number becomes
    /// `Double`. Objects become structs with sorted member names.
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Null => RpcValue::Nil,
            Value::Bool(b) => RpcValue::Bool(*b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => RpcValue::Int(i),
                None => RpcValue::Double(n.as_f64().unwrap_or(f64::NAN)),
            },
            Value::String(s) => RpcValue::String(s.clone()),
            Value::Array(items) => RpcValue::Array(items.iter().map(Self::from_json).collect()),
            Value::Object(members) => RpcValue::Struct(
                members
                    .iter()
                    .map(|(k, v)| (k.clone(), Self::from_json(v)))
                    .collect(),
            ),
        }
    }

    /// Convert a backend result into JSON for the browser.
    ///
    /// Non-finite doubles have no JSON form and become `null`. Date-times are
    /// rendered as `YYYY-MM-DDTHH:MM:SS`, binary data as standard base64.
    pub fn to_json(&self) -> Value {
        match self {
            RpcValue::Nil => Value::Null,
            RpcValue::Bool(b) => Value::Bool(*b),
            RpcValue::Int(i) => Value::Number((*i).into()),
            RpcValue::Double(d) => Number::from_f64(*d).map_or(Value::Null, Value::Number),
            RpcValue::String(s) => Value::String(s.clone()),
            RpcValue::DateTime(dt) => Value::String(dt.format("%Y-%m-%dT%H:%M:%S").to_string()),
            RpcValue::Base64(bytes) => Value::String(STANDARD.encode(bytes)),
            RpcValue::Array(items) => Value::Array(items.iter().map(Self::to_json).collect()),
            RpcValue::Struct(members) => {
                let map: Map<String, Value> = members
                    .iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect();
                Value::Object(map)
            }
        }
    }
}

impl From<&Value> for RpcValue {
    fn from(value: &Value) -> Self {
        RpcValue::from_json(value)
    }
}

impl From<RpcValue> for Value {
    fn from(value: RpcValue) -> Self {
        value.to_json()
    }
}

impl From<&str> for RpcValue {
    fn from(s: &str) -> Self {
        RpcValue::String(s.to_string())
    }
}

impl From<String> for RpcValue {
    fn from(s: String) -> Self {
        RpcValue::String(s)
    }
}

impl From<i64> for RpcValue {
    fn from(i: i64) -> Self {
        RpcValue::Int(i)
    }
}

impl From<i32> for RpcValue {
    fn from(i: i32) -> Self {
        RpcValue::Int(i64::from(i))
    }
}

impl From<f64> for RpcValue {
    fn from(d: f64) -> Self {
        RpcValue::Double(d)
    }
}

impl From<bool> for RpcValue {
    fn from(b: bool) -> Self {
        RpcValue::Bool(b)
    }
}

impl From<Vec<RpcValue>> for RpcValue {
    fn from(items: Vec<RpcValue>) -> Self {
        RpcValue::Array(items)
    }
}

impl<T: Into<RpcValue>> From<Option<T>> for RpcValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(RpcValue::Nil, Into::into)
    }
}
