//! Error types for the data-mapping core.
//!
//! Two families exist and they are never mixed: [`SchemaError`] marks a
//! programmer defect (bad registration, unknown field, decode mismatch) and
//! is raised before any I/O happens; [`DriverError`] carries whatever the
//! external driver reported, unmodified. Neither is retried by this layer.

use thiserror::Error;

/// Malformed or inconsistent record-type metadata, or a reference to
/// metadata that was never registered.
///
/// Always fatal at the point raised. Registration is validated up front, so
/// a `SchemaError` escaping `Registry::register` means the registry was left
/// exactly as it was before the call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("record type `{type_name}` declares no columns")]
    NoColumns { type_name: String },

    #[error("duplicate column `{column}` on table `{table}`")]
    DuplicateColumn { table: String, column: String },

    #[error("duplicate field `{field}` on record type `{type_name}`")]
    DuplicateField { type_name: String, field: String },

    #[error("record type `{type_name}` declares no primary key")]
    MissingPrimaryKey { type_name: String },

    #[error("record type `{type_name}` declares more than one primary key")]
    MultiplePrimaryKeys { type_name: String },

    #[error("primary key `{field}` of record type `{type_name}` cannot be a relation")]
    RelationAsPrimaryKey { type_name: String, field: String },

    #[error("record type `{type_name}` is already registered with a different schema")]
    ConflictingRegistration { type_name: String },

    #[error("unknown record type `{0}`")]
    UnknownType(String),

    #[error("unknown field `{field}` on record type `{type_name}`")]
    UnknownField { type_name: String, field: String },

    #[error("field `{field}` on record type `{type_name}` is not a relation")]
    NotARelation { type_name: String, field: String },

    #[error("field `{field}` missing while decoding record type `{type_name}`")]
    MissingField { type_name: String, field: String },

    #[error("value type mismatch: expected {expected}, got {got}")]
    TypeMismatch {
        expected: &'static str,
        got: &'static str,
    },

    #[error("invalid JSON value: {message}")]
    InvalidJson { message: String },
}

/// An error surfaced verbatim from the external driver.
///
/// The core neither inspects nor retries these; recovery policy belongs to
/// the calling application.
#[derive(Debug, Error)]
#[error(transparent)]
pub struct DriverError(#[from] pub anyhow::Error);

impl DriverError {
    /// Wrap an arbitrary driver-side failure.
    pub fn new<E>(source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self(anyhow::Error::new(source))
    }
}

/// Top-level error for repository and query operations.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Driver(#[from] DriverError),
}

impl Error {
    /// The schema error inside, if this is one.
    pub fn as_schema(&self) -> Option<&SchemaError> {
        match self {
            Error::Schema(e) => Some(e),
            Error::Driver(_) => None,
        }
    }
}
