//! ORDER BY terms, built from field names via [`asc`] / [`desc`].
//!
//! Multiple terms apply left to right as primary, secondary, … sort keys
//! and are joined with commas when rendered.

use crate::driver::Driver;
use crate::error::SchemaError;
use crate::schema::Schema;

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

impl Direction {
    pub fn to_sql(self) -> &'static str {
        match self {
            Direction::Asc => "ASC",
            Direction::Desc => "DESC",
        }
    }
}

/// One ordering term over a record type's field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ordering {
    pub field: String,
    pub direction: Direction,
}

pub fn asc(field: impl Into<String>) -> Ordering {
    Ordering {
        field: field.into(),
        direction: Direction::Asc,
    }
}

pub fn desc(field: impl Into<String>) -> Ordering {
    Ordering {
        field: field.into(),
        direction: Direction::Desc,
    }
}

impl Ordering {
    pub(crate) fn to_sql(&self, schema: &Schema, driver: &dyn Driver) -> Result<String, SchemaError> {
        let field = schema.field(&self.field)?;
        Ok(format!(
            "{} {}",
            driver.quote_identifier(&field.column),
            self.direction.to_sql()
        ))
    }
}

/// Render a full ORDER BY clause body from one or many terms.
pub(crate) fn render_order(
    terms: &[Ordering],
    schema: &Schema,
    driver: &dyn Driver,
) -> Result<String, SchemaError> {
    let rendered: Result<Vec<_>, _> = terms.iter().map(|t| t.to_sql(schema, driver)).collect();
    Ok(rendered?.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::test_support::StubDriver;
    use crate::schema::{FieldDef, Registry, ScalarKind, SchemaDef};
    use assert_matches::assert_matches;

    fn registry() -> Registry {
        let mut registry = Registry::new();
        registry
            .register_schema(
                SchemaDef::new("Form", "forms")
                    .field(FieldDef::scalar("id", ScalarKind::Text).primary_key())
                    .field(FieldDef::scalar("name", ScalarKind::Text))
                    .field(FieldDef::scalar("created_at", ScalarKind::Timestamp).column("created")),
            )
            .unwrap();
        registry
    }

    #[test]
    fn test_multiple_terms_join_left_to_right() {
        let registry = registry();
        let schema = registry.lookup("Form").unwrap();
        let sql = render_order(
            &[asc("name"), desc("created_at")],
            schema,
            &StubDriver,
        )
        .unwrap();
        assert_eq!(sql, r#""name" ASC, "created" DESC"#);
    }

    #[test]
    fn test_unknown_field_rejected() {
        let registry = registry();
        let schema = registry.lookup("Form").unwrap();
        assert_matches!(
            render_order(&[asc("nope")], schema, &StubDriver),
            Err(SchemaError::UnknownField { .. })
        );
    }
}
