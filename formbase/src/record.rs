//! The typed side of the mapping: the [`Record`] trait, relation values,
//! and partial results.
//!
//! `#[derive(Record)]` (from `formbase-macros`) implements [`Record`] for an
//! annotated struct, producing its [`SchemaDef`] plus the conversions to and
//! from [`FieldValues`]. Hand-written implementations are equally valid;
//! nothing in the engine is macro-aware.

use crate::error::SchemaError;
use crate::schema::SchemaDef;
use crate::value::{FieldValues, FromValue, Value};

/// A struct mapped to one relational table.
pub trait Record: Sized + Send + Sync + 'static {
    /// Registry key for this type. Must be unique per process.
    const TYPE_NAME: &'static str;

    /// The schema descriptor registered for this type.
    fn schema() -> SchemaDef;

    /// Serialize every *set* field. Unset relation fields are omitted
    /// entirely; `None` option fields become explicit nulls. Fails only
    /// when a `#[record(json)]` field cannot be serialized.
    fn to_values(&self) -> Result<FieldValues, SchemaError>;

    /// Rebuild a fully-hydrated instance. Missing non-optional fields are a
    /// [`SchemaError::MissingField`]; callers that fetched a partial column
    /// set should decode into [`Partial`] instead.
    fn from_values(values: FieldValues) -> Result<Self, SchemaError>;
}

/// The value of a relation field on a typed record.
///
/// `Unset` is "undefined": the field is dropped from any encoded row,
/// which is how an UPDATE that should not touch the foreign key is
/// expressed. `Key` holds the bare foreign-key scalar (possibly null);
/// `Record` holds a full nested instance that the codec will reduce to its
/// foreign-key scalar on encode.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Rel<T> {
    #[default]
    Unset,
    Key(Value),
    Record(Box<T>),
}

impl<T> Rel<T> {
    pub fn key(value: impl Into<Value>) -> Self {
        Rel::Key(value.into())
    }

    pub fn record(record: T) -> Self {
        Rel::Record(Box::new(record))
    }

    pub fn is_set(&self) -> bool {
        !matches!(self, Rel::Unset)
    }

    /// The foreign-key scalar, when this holds a bare key.
    pub fn key_value(&self) -> Option<&Value> {
        match self {
            Rel::Key(v) => Some(v),
            _ => None,
        }
    }

    /// The nested record, when one is attached.
    pub fn as_record(&self) -> Option<&T> {
        match self {
            Rel::Record(r) => Some(r),
            _ => None,
        }
    }
}

/// A projected query result carrying exactly the requested fields.
///
/// Fields outside the projection are *absent* (not null): `get` returns
/// `None` and `contains` returns `false` for them, matching the shape the
/// projection asked for.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Partial {
    values: FieldValues,
}

impl Partial {
    pub fn new(values: FieldValues) -> Self {
        Self { values }
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        match self.values.get(field) {
            Some(crate::value::FieldValue::Scalar(v)) => Some(v),
            _ => None,
        }
    }

    /// Typed accessor. Absent fields and explicit nulls both yield
    /// `Ok(None)`; use [`Partial::contains`] to tell them apart.
    pub fn get_as<T: FromValue>(&self, field: &str) -> Result<Option<T>, SchemaError> {
        match self.get(field) {
            None | Some(Value::Null) => Ok(None),
            Some(v) => T::from_value(v.clone()).map(Some),
        }
    }

    pub fn contains(&self, field: &str) -> bool {
        self.values.contains(field)
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.values.fields()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn into_values(self) -> FieldValues {
        self.values
    }
}
