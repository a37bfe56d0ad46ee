//! Typed preference values
//!
//! Preferences are persisted as flat strings. `PreferenceValue` is the typed
//! view handed to and returned from the capability.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Canonical string form of dates written to the store
pub const STORE_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A typed preference value
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PreferenceValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    /// Structured data produced by the `object`, `array` and `json` tags
    Json(Value),
    Collection(Collection),
    DateTime(DateTime<Utc>),
}

impl PreferenceValue {
    /// Plain string conversion used when no outbound cast applies
    pub fn to_store_string(&self) -> String {
        match self {
            PreferenceValue::Bool(true) => "1".to_string(),
            PreferenceValue::Bool(false) => "0".to_string(),
            PreferenceValue::Int(i) => i.to_string(),
            PreferenceValue::Float(f) => f.to_string(),
            PreferenceValue::String(s) => s.clone(),
            PreferenceValue::Json(v) => v.to_string(),
            PreferenceValue::Collection(c) => c.to_json().to_string(),
            PreferenceValue::DateTime(dt) => dt.format(STORE_DATE_FORMAT).to_string(),
        }
    }

    /// JSON representation used by the structured-data tags
    pub fn to_json(&self) -> Value {
        match self {
            PreferenceValue::Bool(b) => Value::Bool(*b),
            PreferenceValue::Int(i) => Value::from(*i),
            // Non-finite floats have no JSON form.
            PreferenceValue::Float(f) => serde_json::Number::from_f64(*f)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            PreferenceValue::String(s) => Value::String(s.clone()),
            PreferenceValue::Json(v) => v.clone(),
            PreferenceValue::Collection(c) => c.to_json(),
            PreferenceValue::DateTime(dt) => {
                Value::String(dt.format(STORE_DATE_FORMAT).to_string())
            }
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            PreferenceValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            PreferenceValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            PreferenceValue::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            PreferenceValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_json(&self) -> Option<&Value> {
        match self {
            PreferenceValue::Json(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_collection(&self) -> Option<&Collection> {
        match self {
            PreferenceValue::Collection(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_datetime(&self) -> Option<&DateTime<Utc>> {
        match self {
            PreferenceValue::DateTime(dt) => Some(dt),
            _ => None,
        }
    }
}

impl From<bool> for PreferenceValue {
    fn from(value: bool) -> Self {
        PreferenceValue::Bool(value)
    }
}

impl From<i64> for PreferenceValue {
    fn from(value: i64) -> Self {
        PreferenceValue::Int(value)
    }
}

impl From<i32> for PreferenceValue {
    fn from(value: i32) -> Self {
        PreferenceValue::Int(i64::from(value))
    }
}

impl From<u32> for PreferenceValue {
    fn from(value: u32) -> Self {
        PreferenceValue::Int(i64::from(value))
    }
}

impl From<f64> for PreferenceValue {
    fn from(value: f64) -> Self {
        PreferenceValue::Float(value)
    }
}

impl From<&str> for PreferenceValue {
    fn from(value: &str) -> Self {
        PreferenceValue::String(value.to_string())
    }
}

impl From<String> for PreferenceValue {
    fn from(value: String) -> Self {
        PreferenceValue::String(value)
    }
}

impl From<Value> for PreferenceValue {
    fn from(value: Value) -> Self {
        PreferenceValue::Json(value)
    }
}

impl From<Collection> for PreferenceValue {
    fn from(value: Collection) -> Self {
        PreferenceValue::Collection(value)
    }
}

impl From<DateTime<Utc>> for PreferenceValue {
    fn from(value: DateTime<Utc>) -> Self {
        PreferenceValue::DateTime(value)
    }
}

/// Ordered sequence container returned by the `collection` tag
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Collection(Vec<Value>);

impl Collection {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Wrap decoded JSON: arrays become the items, `null` is empty, and any
    /// other value becomes a single item.
    pub fn from_json(value: Value) -> Self {
        match value {
            Value::Array(items) => Self(items),
            Value::Null => Self::new(),
            other => Self(vec![other]),
        }
    }

    pub fn to_json(&self) -> Value {
        Value::Array(self.0.clone())
    }

    pub fn items(&self) -> &[Value] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Value> {
        self.0.iter()
    }

    pub fn push(&mut self, item: impl Into<Value>) {
        self.0.push(item.into());
    }

    pub fn into_vec(self) -> Vec<Value> {
        self.0
    }
}

impl<T: Into<Value>> From<Vec<T>> for Collection {
    fn from(items: Vec<T>) -> Self {
        items.into_iter().collect()
    }
}

impl<T: Into<Value>> FromIterator<T> for Collection {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

impl IntoIterator for Collection {
    type Item = Value;
    type IntoIter = std::vec::IntoIter<Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}
