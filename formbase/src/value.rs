//! Boundary values and row representations.
//!
//! [`Value`] is the only thing a row cell can hold; it covers exactly the
//! scalar set the external driver speaks (null, bool, integer, float, text,
//! blob, timestamp, JSON). [`Row`] is the flat column→value mapping
//! exchanged with the driver. [`FieldValues`] is the codec's working
//! representation keyed by *field* name, where a relation field may still
//! hold an unreduced nested record.
//!
//! Absence from a map means "undefined" and is always distinct from an
//! explicit [`Value::Null`]: undefined fields are dropped on encode, null
//! fields are preserved.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use crate::error::SchemaError;

/// A single scalar cell value as exchanged with the external driver.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Blob(Vec<u8>),
    Timestamp(DateTime<Utc>),
    Json(serde_json::Value),
}

impl Value {
    /// Short name of the variant, for error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "integer",
            Value::Float(_) => "float",
            Value::Text(_) => "text",
            Value::Blob(_) => "blob",
            Value::Timestamp(_) => "timestamp",
            Value::Json(_) => "json",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v as i64)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Blob(v)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(v: DateTime<Utc>) -> Self {
        Value::Timestamp(v)
    }
}

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        Value::Json(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(v) => v.into(),
            None => Value::Null,
        }
    }
}

/// Conversion out of a [`Value`] into a concrete Rust type.
///
/// Coercions are limited to what a SQLite-shaped backend makes necessary:
/// `INTEGER 0/1` → `bool`, RFC 3339 `TEXT` → timestamp, `TEXT` → JSON.
/// Everything else is a [`SchemaError::TypeMismatch`].
pub trait FromValue: Sized {
    fn from_value(value: Value) -> Result<Self, SchemaError>;
}

fn mismatch<T>(expected: &'static str, value: &Value) -> Result<T, SchemaError> {
    Err(SchemaError::TypeMismatch {
        expected,
        got: value.kind_name(),
    })
}

impl FromValue for String {
    fn from_value(value: Value) -> Result<Self, SchemaError> {
        match value {
            Value::Text(s) => Ok(s),
            other => mismatch("text", &other),
        }
    }
}

impl FromValue for i64 {
    fn from_value(value: Value) -> Result<Self, SchemaError> {
        match value {
            Value::Int(i) => Ok(i),
            other => mismatch("integer", &other),
        }
    }
}

impl FromValue for i32 {
    fn from_value(value: Value) -> Result<Self, SchemaError> {
        match value {
            Value::Int(i) => i.try_into().map_err(|_| SchemaError::TypeMismatch {
                expected: "32-bit integer",
                got: "integer",
            }),
            other => mismatch("integer", &other),
        }
    }
}

impl FromValue for f64 {
    fn from_value(value: Value) -> Result<Self, SchemaError> {
        match value {
            Value::Float(f) => Ok(f),
            Value::Int(i) => Ok(i as f64),
            other => mismatch("float", &other),
        }
    }
}

impl FromValue for bool {
    fn from_value(value: Value) -> Result<Self, SchemaError> {
        match value {
            Value::Bool(b) => Ok(b),
            // SQLite stores booleans as 0/1 INTEGER
            Value::Int(0) => Ok(false),
            Value::Int(1) => Ok(true),
            other => mismatch("bool", &other),
        }
    }
}

impl FromValue for Vec<u8> {
    fn from_value(value: Value) -> Result<Self, SchemaError> {
        match value {
            Value::Blob(b) => Ok(b),
            other => mismatch("blob", &other),
        }
    }
}

impl FromValue for DateTime<Utc> {
    fn from_value(value: Value) -> Result<Self, SchemaError> {
        match value {
            Value::Timestamp(ts) => Ok(ts),
            Value::Text(s) => DateTime::parse_from_rfc3339(&s)
                .map(|ts| ts.with_timezone(&Utc))
                .map_err(|_| SchemaError::TypeMismatch {
                    expected: "timestamp",
                    got: "text",
                }),
            other => mismatch("timestamp", &other),
        }
    }
}

impl FromValue for serde_json::Value {
    fn from_value(value: Value) -> Result<Self, SchemaError> {
        match value {
            Value::Json(v) => Ok(v),
            Value::Text(s) => serde_json::from_str(&s).map_err(|_| SchemaError::TypeMismatch {
                expected: "json",
                got: "text",
            }),
            other => mismatch("json", &other),
        }
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: Value) -> Result<Self, SchemaError> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
}

/// Serialize any `Serialize` type into a JSON cell.
///
/// Used by `#[record(json)]` fields. A value that serializes to JSON null
/// (e.g. `None`) becomes [`Value::Null`], so optional JSON fields map to
/// nullable columns.
pub fn to_json<T: serde::Serialize>(value: &T) -> Result<Value, SchemaError> {
    match serde_json::to_value(value) {
        Ok(serde_json::Value::Null) => Ok(Value::Null),
        Ok(json) => Ok(Value::Json(json)),
        Err(err) => Err(SchemaError::InvalidJson {
            message: err.to_string(),
        }),
    }
}

/// Deserialize a JSON cell back into a `DeserializeOwned` type.
///
/// Accepts `Json` directly, `Text` holding serialized JSON (how a SQLite
/// backend stores the column), and `Null` (deserialized as JSON null).
pub fn from_json<T: serde::de::DeserializeOwned>(value: Value) -> Result<T, SchemaError> {
    let json = match value {
        Value::Json(json) => json,
        Value::Null => serde_json::Value::Null,
        Value::Text(s) => serde_json::from_str(&s).map_err(|err| SchemaError::InvalidJson {
            message: err.to_string(),
        })?,
        other => return mismatch("json", &other),
    };
    serde_json::from_value(json).map_err(|err| SchemaError::InvalidJson {
        message: err.to_string(),
    })
}

/// A flat column-name → value mapping, the only representation exchanged
/// with the external driver.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Row {
    cells: BTreeMap<String, Value>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, column: impl Into<String>, value: Value) {
        self.cells.insert(column.into(), value);
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.cells.get(column)
    }

    pub fn contains(&self, column: &str) -> bool {
        self.cells.contains_key(column)
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.cells.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.cells.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

impl FromIterator<(String, Value)> for Row {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self {
            cells: iter.into_iter().collect(),
        }
    }
}

/// The value a single field carries before encoding / after decoding.
///
/// `Nested` only ever appears on relation fields, holding the related
/// record's own field values; the codec reduces it to the referenced
/// foreign-key scalar when producing a [`Row`].
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Scalar(Value),
    Nested(FieldValues),
}

/// A field-name → [`FieldValue`] mapping, the codec's working shape.
///
/// A field that is absent from the map is *undefined* and will be omitted
/// from any encoded row; a field holding [`Value::Null`] is an explicit
/// null and is preserved.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FieldValues {
    fields: BTreeMap<String, FieldValue>,
}

impl FieldValues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, field: impl Into<String>, value: FieldValue) {
        self.fields.insert(field.into(), value);
    }

    /// Shorthand for setting a scalar field.
    pub fn set_scalar(&mut self, field: impl Into<String>, value: impl Into<Value>) {
        self.set(field, FieldValue::Scalar(value.into()));
    }

    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.fields.get(field)
    }

    pub fn take(&mut self, field: &str) -> Option<FieldValue> {
        self.fields.remove(field)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl FromIterator<(String, FieldValue)> for FieldValues {
    fn from_iter<I: IntoIterator<Item = (String, FieldValue)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}
