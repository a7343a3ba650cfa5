//! Row codec: the bidirectional bridge between driver rows and field values.
//!
//! Decoding is tolerant by design: unknown columns are ignored (the same
//! function serves full and partial projections) and absent columns simply
//! leave their field unset. Encoding is where relation reduction happens: a
//! nested record is encoded recursively and collapsed to the scalar of its
//! referenced foreign-key field, so a nested blob can never reach the
//! database.

use crate::error::SchemaError;
use crate::record::Record;
use crate::schema::{FieldKind, Registry, ScalarKind, Schema};
use crate::value::{FieldValue, FieldValues, Row, Value};

/// Decode a driver row into field values for `schema`.
///
/// Columns the schema does not know are skipped; fields whose column is
/// absent from the row stay unset. Driver scalars are coerced to the
/// field's declared kind where a SQLite backend makes that necessary
/// (INTEGER → bool, TEXT → timestamp/JSON); a cell that resists coercion is
/// kept as-is and surfaces as a `TypeMismatch` at typed access time.
pub fn decode(schema: &Schema, row: &Row) -> FieldValues {
    let mut values = FieldValues::new();
    for (column, value) in row.iter() {
        let Some(field) = schema.field_for_column(column) else {
            continue;
        };
        values.set(
            field.name.clone(),
            FieldValue::Scalar(coerce(&field.kind, value.clone())),
        );
    }
    values
}

/// Decode a full row into a typed record.
pub fn decode_record<R: Record>(schema: &Schema, row: &Row) -> Result<R, SchemaError> {
    R::from_values(decode(schema, row))
}

fn coerce(kind: &FieldKind, value: Value) -> Value {
    let FieldKind::Scalar(kind) = kind else {
        // Relation columns hold the raw foreign-key scalar
        return value;
    };
    match (kind, value) {
        (ScalarKind::Bool, Value::Int(0)) => Value::Bool(false),
        (ScalarKind::Bool, Value::Int(1)) => Value::Bool(true),
        (ScalarKind::Timestamp, Value::Text(s)) => {
            match chrono::DateTime::parse_from_rfc3339(&s) {
                Ok(ts) => Value::Timestamp(ts.with_timezone(&chrono::Utc)),
                Err(_) => Value::Text(s),
            }
        }
        (ScalarKind::Json, Value::Text(s)) => match serde_json::from_str(&s) {
            Ok(v) => Value::Json(v),
            Err(_) => Value::Text(s),
        },
        (_, value) => value,
    }
}

/// Encode field values into a driver row for `schema`.
///
/// Declared fields absent from `values` are omitted from the row entirely
/// (an UPDATE built from the row will not touch them); explicit nulls are
/// preserved. A `Nested` value on a relation field is encoded against the
/// target schema and reduced to its referenced foreign-key scalar, which is
/// also where an unregistered target or unknown `references` field fails.
pub fn encode(registry: &Registry, schema: &Schema, values: &FieldValues) -> Result<Row, SchemaError> {
    let mut row = Row::new();
    for field in schema.fields() {
        let Some(value) = values.get(&field.name) else {
            continue;
        };
        let scalar = match value {
            FieldValue::Scalar(v) => v.clone(),
            FieldValue::Nested(nested) => {
                if !field.is_relation() {
                    return Err(SchemaError::NotARelation {
                        type_name: schema.type_name().to_string(),
                        field: field.name.clone(),
                    });
                }
                let (target, fk_field) = registry.resolve_relation(schema, field)?;
                let nested_row = encode(registry, target, nested)?;
                nested_row
                    .get(&fk_field.column)
                    .cloned()
                    .unwrap_or(Value::Null)
            }
        };
        row.insert(field.column.clone(), scalar);
    }
    Ok(row)
}

/// Encode a typed record into a driver row.
pub fn encode_record<R: Record>(registry: &Registry, record: &R) -> Result<Row, SchemaError> {
    let schema = registry.lookup(R::TYPE_NAME)?;
    encode(registry, schema, &record.to_values()?)
}
