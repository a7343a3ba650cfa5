//! Parameterized SELECT builder.
//!
//! Assembles `SELECT col, … FROM table WHERE … ORDER BY … LIMIT … OFFSET …`
//! from registry metadata, a projection, a predicate tree, and ordering
//! terms. Identifier resolution failures are `SchemaError`s raised here, at
//! build time; execution failures come back from the driver untouched.

use crate::driver::Driver;
use crate::error::{Error, SchemaError};
use crate::projection::{resolve_columns, Projection};
use crate::query::order::{render_order, Ordering};
use crate::query::predicate::Predicate;
use crate::record::Record;
use crate::schema::Registry;
use crate::value::{Row, Value};

/// A one-shot SELECT against a registered record type.
#[derive(Debug, Clone, Default)]
pub struct SelectQuery {
    type_name: String,
    projection: Option<Projection>,
    filter: Option<Predicate>,
    order: Vec<Ordering>,
    limit: Option<i64>,
    offset: Option<i64>,
}

impl SelectQuery {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            ..Default::default()
        }
    }

    pub fn of<R: Record>() -> Self {
        Self::new(R::TYPE_NAME)
    }

    pub fn projection(mut self, projection: Projection) -> Self {
        self.projection = Some(projection);
        self
    }

    pub fn filter(mut self, predicate: Predicate) -> Self {
        self.filter = Some(predicate);
        self
    }

    pub fn order_by(mut self, terms: impl IntoIterator<Item = Ordering>) -> Self {
        self.order.extend(terms);
        self
    }

    pub fn limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: i64) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Render the statement text and its bound parameters.
    pub fn build(
        &self,
        registry: &Registry,
        driver: &dyn Driver,
    ) -> Result<(String, Vec<Value>), SchemaError> {
        let schema = registry.lookup(&self.type_name)?;

        let columns = resolve_columns(registry, schema, self.projection.as_ref())?;
        let column_list = columns
            .iter()
            .map(|c| driver.quote_identifier(c))
            .collect::<Vec<_>>()
            .join(", ");

        let mut sql = format!(
            "SELECT {} FROM {}",
            column_list,
            driver.quote_identifier(schema.table())
        );
        let mut params = Vec::new();

        if let Some(filter) = &self.filter {
            let fragment = filter.to_sql(schema, driver, &mut params)?;
            if !fragment.is_empty() {
                sql.push_str(" WHERE ");
                sql.push_str(&fragment);
            }
        }

        if !self.order.is_empty() {
            sql.push_str(" ORDER BY ");
            sql.push_str(&render_order(&self.order, schema, driver)?);
        }

        if let Some(limit) = self.limit {
            sql.push_str(&format!(" LIMIT {}", limit));
        }

        if let Some(offset) = self.offset {
            if offset > 0 {
                sql.push_str(&format!(" OFFSET {}", offset));
            }
        }

        Ok((sql, params))
    }

    /// Build and execute, returning the raw rows.
    pub async fn fetch(&self, registry: &Registry, driver: &dyn Driver) -> Result<Vec<Row>, Error> {
        let (sql, params) = self.build(registry, driver)?;
        tracing::debug!(sql = %sql, params = params.len(), "executing select");
        Ok(driver.execute(&sql, &params).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::test_support::StubDriver;
    use crate::query::{and, asc, desc, eq, gt};
    use crate::schema::{FieldDef, ScalarKind, SchemaDef};
    use assert_matches::assert_matches;
    use pretty_assertions::assert_eq;

    fn registry() -> Registry {
        let mut registry = Registry::new();
        registry
            .register_schema(
                SchemaDef::new("Form", "forms")
                    .field(FieldDef::scalar("id", ScalarKind::Text).primary_key())
                    .field(FieldDef::scalar("name", ScalarKind::Text))
                    .field(FieldDef::scalar("slug", ScalarKind::Text))
                    .field(FieldDef::scalar("active", ScalarKind::Bool))
                    .field(FieldDef::scalar("age", ScalarKind::Int)),
            )
            .unwrap();
        registry
    }

    #[test]
    fn test_bare_select_lists_all_columns() {
        let registry = registry();
        let (sql, params) = SelectQuery::new("Form")
            .build(&registry, &StubDriver)
            .unwrap();
        assert_eq!(
            sql,
            r#"SELECT "id", "name", "slug", "active", "age" FROM "forms""#
        );
        assert!(params.is_empty());
    }

    #[test]
    fn test_projection_narrows_column_list() {
        let registry = registry();
        let (sql, _) = SelectQuery::new("Form")
            .projection(Projection::include(["name", "slug"]))
            .build(&registry, &StubDriver)
            .unwrap();
        assert_eq!(sql, r#"SELECT "name", "slug" FROM "forms""#);
    }

    #[test]
    fn test_filter_order_limit_offset() {
        let registry = registry();
        let (sql, params) = SelectQuery::new("Form")
            .filter(and([eq("name", "Bob"), gt("age", 18)]))
            .order_by([asc("name"), desc("age")])
            .limit(10)
            .offset(20)
            .build(&registry, &StubDriver)
            .unwrap();
        assert_eq!(
            sql,
            r#"SELECT "id", "name", "slug", "active", "age" FROM "forms" WHERE ("name" = ? AND "age" > ?) ORDER BY "name" ASC, "age" DESC LIMIT 10 OFFSET 20"#
        );
        assert_eq!(params, vec![Value::Text("Bob".into()), Value::Int(18)]);
    }

    #[test]
    fn test_empty_combinator_emits_no_where_clause() {
        let registry = registry();
        let (sql, params) = SelectQuery::new("Form")
            .filter(and([]))
            .build(&registry, &StubDriver)
            .unwrap();
        assert!(!sql.contains("WHERE"));
        assert!(params.is_empty());
    }

    #[test]
    fn test_zero_offset_omitted() {
        let registry = registry();
        let (sql, _) = SelectQuery::new("Form")
            .limit(5)
            .offset(0)
            .build(&registry, &StubDriver)
            .unwrap();
        assert!(sql.ends_with("LIMIT 5"));
    }

    #[test]
    fn test_unknown_type_and_field_fail_at_build() {
        let registry = registry();
        assert_matches!(
            SelectQuery::new("Nope").build(&registry, &StubDriver),
            Err(SchemaError::UnknownType(_))
        );
        assert_matches!(
            SelectQuery::new("Form")
                .filter(eq("nope", 1))
                .build(&registry, &StubDriver),
            Err(SchemaError::UnknownField { .. })
        );
    }
}
