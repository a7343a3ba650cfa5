//! Record-type metadata and the registry that owns it.
//!
//! A [`SchemaDef`] is the raw, unvalidated descriptor a record type supplies
//! (usually via `#[derive(Record)]`). [`Registry::register`] validates it in
//! full before touching any state, so a failed registration never leaves a
//! partial entry behind. Registration is idempotent and order-independent:
//! re-registering an identical schema is a no-op, and relation targets are
//! resolved lazily so types can be registered in any order.
//!
//! The registry is an explicit object owned by the repository layer, not a
//! process-wide singleton. Populate it during startup, then share it
//! immutably (`Arc<Registry>`) with every query path.

use std::collections::HashMap;

use crate::error::SchemaError;

/// The scalar kinds a column can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarKind {
    Text,
    Int,
    Float,
    Bool,
    Timestamp,
    Blob,
    Json,
}

/// What a field is: a plain scalar column, or a relation to another record
/// type stored as a foreign-key scalar in this table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldKind {
    Scalar(ScalarKind),
    Relation {
        /// Type name of the related record type.
        target: String,
        /// Field on the target that supplies the foreign-key value.
        /// `None` means the target's primary key, resolved lazily.
        references: Option<String>,
    },
}

/// One field of a record type: its name, backing column, and kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDef {
    pub name: String,
    pub column: String,
    pub kind: FieldKind,
    pub primary_key: bool,
}

impl FieldDef {
    /// A scalar field whose column defaults to the field name.
    pub fn scalar(name: impl Into<String>, kind: ScalarKind) -> Self {
        let name = name.into();
        Self {
            column: name.clone(),
            name,
            kind: FieldKind::Scalar(kind),
            primary_key: false,
        }
    }

    /// A relation field referencing `target` (a record type name).
    pub fn relation(name: impl Into<String>, target: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            column: name.clone(),
            name,
            kind: FieldKind::Relation {
                target: target.into(),
                references: None,
            },
            primary_key: false,
        }
    }

    /// Override the backing column name.
    pub fn column(mut self, column: impl Into<String>) -> Self {
        self.column = column.into();
        self
    }

    /// Name the target field that supplies the foreign-key value
    /// (defaults to the target's primary key).
    pub fn references(mut self, field: impl Into<String>) -> Self {
        if let FieldKind::Relation { references, .. } = &mut self.kind {
            *references = Some(field.into());
        }
        self
    }

    /// Mark this field as the primary key.
    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }

    pub fn is_relation(&self) -> bool {
        matches!(self.kind, FieldKind::Relation { .. })
    }
}

/// Unvalidated schema descriptor for one record type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaDef {
    pub type_name: String,
    pub table: String,
    pub fields: Vec<FieldDef>,
}

impl SchemaDef {
    pub fn new(type_name: impl Into<String>, table: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            table: table.into(),
            fields: Vec::new(),
        }
    }

    pub fn field(mut self, field: FieldDef) -> Self {
        self.fields.push(field);
        self
    }
}

/// Validated, immutable metadata for one record type.
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    def: SchemaDef,
    primary_key: usize,
    by_field: HashMap<String, usize>,
    by_column: HashMap<String, usize>,
}

impl Schema {
    fn validate(def: SchemaDef) -> Result<Self, SchemaError> {
        if def.fields.is_empty() {
            return Err(SchemaError::NoColumns {
                type_name: def.type_name.clone(),
            });
        }

        let mut by_field = HashMap::new();
        let mut by_column = HashMap::new();
        let mut primary_key = None;

        for (idx, field) in def.fields.iter().enumerate() {
            if by_field.insert(field.name.clone(), idx).is_some() {
                return Err(SchemaError::DuplicateField {
                    type_name: def.type_name.clone(),
                    field: field.name.clone(),
                });
            }
            if by_column.insert(field.column.clone(), idx).is_some() {
                return Err(SchemaError::DuplicateColumn {
                    table: def.table.clone(),
                    column: field.column.clone(),
                });
            }
            if field.primary_key {
                if primary_key.is_some() {
                    return Err(SchemaError::MultiplePrimaryKeys {
                        type_name: def.type_name.clone(),
                    });
                }
                if field.is_relation() {
                    return Err(SchemaError::RelationAsPrimaryKey {
                        type_name: def.type_name.clone(),
                        field: field.name.clone(),
                    });
                }
                primary_key = Some(idx);
            }
        }

        let primary_key = primary_key.ok_or_else(|| SchemaError::MissingPrimaryKey {
            type_name: def.type_name.clone(),
        })?;

        Ok(Self {
            def,
            primary_key,
            by_field,
            by_column,
        })
    }

    pub fn type_name(&self) -> &str {
        &self.def.type_name
    }

    pub fn table(&self) -> &str {
        &self.def.table
    }

    /// Fields in declaration order.
    pub fn fields(&self) -> &[FieldDef] {
        &self.def.fields
    }

    /// Columns in field-declaration order.
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.def.fields.iter().map(|f| f.column.as_str())
    }

    pub fn primary_key(&self) -> &FieldDef {
        &self.def.fields[self.primary_key]
    }

    /// Look up a field by name, failing fast on unknown names.
    pub fn field(&self, name: &str) -> Result<&FieldDef, SchemaError> {
        self.by_field
            .get(name)
            .map(|&idx| &self.def.fields[idx])
            .ok_or_else(|| SchemaError::UnknownField {
                type_name: self.def.type_name.clone(),
                field: name.to_string(),
            })
    }

    /// Look up the field backing a column, if any.
    pub fn field_for_column(&self, column: &str) -> Option<&FieldDef> {
        self.by_column.get(column).map(|&idx| &self.def.fields[idx])
    }
}

/// The process-wide table of registered record types.
///
/// Writes happen only during startup; afterwards the registry is shared
/// read-only, so the query path needs no synchronization.
#[derive(Debug, Default)]
pub struct Registry {
    types: HashMap<String, Schema>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a record type from its derived schema.
    pub fn register<R: crate::record::Record>(&mut self) -> Result<(), SchemaError> {
        self.register_schema(R::schema())
    }

    /// Validate and store a schema descriptor.
    ///
    /// Re-registering an identical descriptor is a no-op; a conflicting one
    /// is rejected. Either way, a failed call leaves the registry untouched.
    pub fn register_schema(&mut self, def: SchemaDef) -> Result<(), SchemaError> {
        if let Some(existing) = self.types.get(&def.type_name) {
            if existing.def == def {
                return Ok(());
            }
            return Err(SchemaError::ConflictingRegistration {
                type_name: def.type_name,
            });
        }

        let schema = Schema::validate(def)?;
        tracing::debug!(
            type_name = %schema.type_name(),
            table = %schema.table(),
            fields = schema.fields().len(),
            "registered record type"
        );
        self.types.insert(schema.type_name().to_string(), schema);
        Ok(())
    }

    /// Look up a registered record type.
    pub fn lookup(&self, type_name: &str) -> Result<&Schema, SchemaError> {
        self.types
            .get(type_name)
            .ok_or_else(|| SchemaError::UnknownType(type_name.to_string()))
    }

    /// Resolve a relation field to its target schema and the target field
    /// that supplies the foreign-key value.
    ///
    /// Targets are resolved lazily so registration order does not matter;
    /// an unregistered target surfaces as `UnknownType` here.
    pub fn resolve_relation<'a>(
        &'a self,
        owner: &Schema,
        field: &FieldDef,
    ) -> Result<(&'a Schema, &'a FieldDef), SchemaError> {
        let FieldKind::Relation { target, references } = &field.kind else {
            return Err(SchemaError::NotARelation {
                type_name: owner.type_name().to_string(),
                field: field.name.clone(),
            });
        };
        let target_schema = self.lookup(target)?;
        let fk_field = match references {
            Some(name) => target_schema.field(name)?,
            None => target_schema.primary_key(),
        };
        Ok((target_schema, fk_field))
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}
