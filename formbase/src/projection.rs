//! Projection algebra: which fields of a record type a query fetches.
//!
//! A projection maps field names to [`Select`] marks. The mode is inferred
//! per call: if *any* field is literally `Include` the projection is in
//! include-mode and yields exactly the included columns; otherwise it is in
//! exclude-mode and yields every column not marked `Exclude`. A relation
//! given a nested sub-projection contributes its own foreign-key column at
//! this level. Only a literal `Include` flips the mode: a projection holding
//! nothing but `Nested` marks stays in exclude-mode.

use std::collections::BTreeMap;

use crate::error::SchemaError;
use crate::schema::{Registry, Schema};

/// How one field participates in a projection.
#[derive(Debug, Clone, PartialEq)]
pub enum Select {
    /// Field marked `true`.
    Include,
    /// Field marked `false`.
    Exclude,
    /// Relation field with its own sub-projection.
    Nested(Projection),
}

/// A per-query selection of fields, possibly nested through relations.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Projection {
    fields: BTreeMap<String, Select>,
}

impl Projection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Include-mode shorthand: exactly these fields.
    pub fn include<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut p = Self::new();
        for f in fields {
            p.fields.insert(f.into(), Select::Include);
        }
        p
    }

    /// Exclude-mode shorthand: everything but these fields.
    pub fn exclude<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut p = Self::new();
        for f in fields {
            p.fields.insert(f.into(), Select::Exclude);
        }
        p
    }

    /// Set one field's mark.
    pub fn with(mut self, field: impl Into<String>, select: Select) -> Self {
        self.fields.insert(field.into(), select);
        self
    }

    /// Attach a sub-projection to a relation field.
    pub fn nested(self, field: impl Into<String>, sub: Projection) -> Self {
        self.with(field, Select::Nested(sub))
    }

    pub fn get(&self, field: &str) -> Option<&Select> {
        self.fields.get(field)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Select)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Include-mode iff any field is literally marked `Include`.
    pub fn is_include_mode(&self) -> bool {
        self.fields.values().any(|s| matches!(s, Select::Include))
    }
}

/// Compute the exact column list a projection fetches, in field-declaration
/// order.
///
/// `None` means the full column set. Every field named by the projection
/// must exist on `schema`, and nested marks must sit on relation fields
/// whose sub-projection validates against the registered target. All of
/// this is checked here, before any SQL is built.
pub fn resolve_columns(
    registry: &Registry,
    schema: &Schema,
    projection: Option<&Projection>,
) -> Result<Vec<String>, SchemaError> {
    let Some(projection) = projection else {
        return Ok(schema.columns().map(str::to_string).collect());
    };

    for (name, select) in projection.iter() {
        let field = schema.field(name)?;
        if let Select::Nested(sub) = select {
            let (target, _) = registry.resolve_relation(schema, field)?;
            // Validate the sub-projection recursively; its columns belong
            // to the target's own query, not this one.
            resolve_columns(registry, target, Some(sub))?;
        }
    }

    let include_mode = projection.is_include_mode();
    let mut columns = Vec::new();
    for field in schema.fields() {
        let selected = match projection.get(&field.name) {
            Some(Select::Include) => true,
            Some(Select::Exclude) => false,
            // A nested relation contributes its foreign-key column here
            Some(Select::Nested(_)) => true,
            None => !include_mode,
        };
        if selected {
            columns.push(field.column.clone());
        }
    }
    Ok(columns)
}
