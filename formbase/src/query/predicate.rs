//! Composable filter predicates.
//!
//! Comparisons name a *field* (not a column) and carry their value as a
//! bound parameter. `and`/`or` with zero branches render to an empty
//! always-true fragment, with one branch pass through unchanged, and with
//! two or more join and parenthesize. Field names are resolved through the
//! schema when the fragment is rendered, so a typo fails with a
//! `SchemaError` before any I/O.

use crate::driver::Driver;
use crate::error::SchemaError;
use crate::schema::Schema;
use crate::value::Value;

/// Comparison operator of a leaf predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cmp {
    Eq,
    Ne,
    Lt,
    Lte,
    Gt,
    Gte,
}

impl Cmp {
    fn sql(self) -> &'static str {
        match self {
            Cmp::Eq => "=",
            Cmp::Ne => "<>",
            Cmp::Lt => "<",
            Cmp::Lte => "<=",
            Cmp::Gt => ">",
            Cmp::Gte => ">=",
        }
    }
}

/// A boolean expression tree over one record type's fields.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    Cmp {
        field: String,
        op: Cmp,
        value: Value,
    },
    And(Vec<Predicate>),
    Or(Vec<Predicate>),
    Not(Box<Predicate>),
}

fn cmp(field: impl Into<String>, op: Cmp, value: impl Into<Value>) -> Predicate {
    Predicate::Cmp {
        field: field.into(),
        op,
        value: value.into(),
    }
}

pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Predicate {
    cmp(field, Cmp::Eq, value)
}

pub fn ne(field: impl Into<String>, value: impl Into<Value>) -> Predicate {
    cmp(field, Cmp::Ne, value)
}

pub fn lt(field: impl Into<String>, value: impl Into<Value>) -> Predicate {
    cmp(field, Cmp::Lt, value)
}

pub fn lte(field: impl Into<String>, value: impl Into<Value>) -> Predicate {
    cmp(field, Cmp::Lte, value)
}

pub fn gt(field: impl Into<String>, value: impl Into<Value>) -> Predicate {
    cmp(field, Cmp::Gt, value)
}

pub fn gte(field: impl Into<String>, value: impl Into<Value>) -> Predicate {
    cmp(field, Cmp::Gte, value)
}

pub fn and(branches: impl IntoIterator<Item = Predicate>) -> Predicate {
    Predicate::And(branches.into_iter().collect())
}

pub fn or(branches: impl IntoIterator<Item = Predicate>) -> Predicate {
    Predicate::Or(branches.into_iter().collect())
}

pub fn not(inner: Predicate) -> Predicate {
    Predicate::Not(Box::new(inner))
}

impl Predicate {
    /// Render the SQL fragment, appending bound values to `params` in
    /// left-to-right declaration order. An empty string means "always
    /// true": the caller emits no WHERE clause at all.
    pub(crate) fn to_sql(
        &self,
        schema: &Schema,
        driver: &dyn Driver,
        params: &mut Vec<Value>,
    ) -> Result<String, SchemaError> {
        match self {
            Predicate::Cmp { field, op, value } => {
                let field = schema.field(field)?;
                params.push(value.clone());
                Ok(format!(
                    "{} {} ?",
                    driver.quote_identifier(&field.column),
                    op.sql()
                ))
            }
            Predicate::And(branches) => join(branches, " AND ", schema, driver, params),
            Predicate::Or(branches) => join(branches, " OR ", schema, driver, params),
            Predicate::Not(inner) => {
                let fragment = inner.to_sql(schema, driver, params)?;
                if fragment.is_empty() {
                    // NOT over an always-true empty combinator: also
                    // rendered empty, mirroring the combinator itself
                    Ok(String::new())
                } else {
                    Ok(format!("NOT ({})", fragment))
                }
            }
        }
    }
}

fn join(
    branches: &[Predicate],
    sep: &str,
    schema: &Schema,
    driver: &dyn Driver,
    params: &mut Vec<Value>,
) -> Result<String, SchemaError> {
    let mut fragments = Vec::with_capacity(branches.len());
    for branch in branches {
        let fragment = branch.to_sql(schema, driver, params)?;
        if !fragment.is_empty() {
            fragments.push(fragment);
        }
    }
    Ok(match fragments.len() {
        0 => String::new(),
        1 => fragments.remove(0),
        _ => format!("({})", fragments.join(sep)),
    })
}
