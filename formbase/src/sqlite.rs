//! SQLite implementation of the [`Driver`] capability, over a sqlx pool.
//!
//! Binding follows SQLite's storage model: booleans as 0/1 INTEGER,
//! timestamps as RFC 3339 TEXT, JSON as serialized TEXT. Result cells are
//! read back through sqlx's raw value type info, so the codec (which knows
//! the declared field kinds) can finish the coercion on the way up.

use async_trait::async_trait;
use sqlx::sqlite::{SqlitePool, SqliteRow};
use sqlx::{Column, Row as SqlxRow, TypeInfo, ValueRef};

use crate::driver::Driver;
use crate::error::DriverError;
use crate::value::{Row, Value};

/// A [`Driver`] backed by a `sqlx::SqlitePool`.
#[derive(Clone)]
pub struct SqliteDriver {
    pool: SqlitePool,
}

impl SqliteDriver {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Connect to a SQLite database URL (e.g. `sqlite::memory:`).
    pub async fn connect(url: &str) -> Result<Self, DriverError> {
        let pool = SqlitePool::connect(url).await.map_err(DriverError::new)?;
        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl Driver for SqliteDriver {
    async fn execute(&self, sql: &str, params: &[Value]) -> Result<Vec<Row>, DriverError> {
        let mut query = sqlx::query(sql);
        for value in params {
            query = bind_value(query, value);
        }

        let rows = query
            .fetch_all(&self.pool)
            .await
            .map_err(DriverError::new)?;
        rows.iter().map(decode_row).collect()
    }
}

type SqliteQuery<'q> = sqlx::query::Query<'q, sqlx::Sqlite, sqlx::sqlite::SqliteArguments<'q>>;

fn bind_value<'q>(query: SqliteQuery<'q>, value: &'q Value) -> SqliteQuery<'q> {
    match value {
        Value::Null => query.bind(None::<String>),
        Value::Bool(b) => query.bind(if *b { 1i32 } else { 0i32 }),
        Value::Int(i) => query.bind(*i),
        Value::Float(f) => query.bind(*f),
        Value::Text(s) => query.bind(s.as_str()),
        Value::Blob(b) => query.bind(b.as_slice()),
        Value::Timestamp(ts) => query.bind(ts.to_rfc3339()),
        Value::Json(v) => query.bind(v.to_string()),
    }
}

fn decode_row(row: &SqliteRow) -> Result<Row, DriverError> {
    let mut out = Row::new();
    for (i, column) in row.columns().iter().enumerate() {
        let raw = row.try_get_raw(i).map_err(DriverError::new)?;
        let value = if raw.is_null() {
            Value::Null
        } else {
            let type_info = raw.type_info();
            match type_info.name() {
                "INTEGER" => Value::Int(row.try_get::<i64, _>(i).map_err(DriverError::new)?),
                "REAL" => Value::Float(row.try_get::<f64, _>(i).map_err(DriverError::new)?),
                "BLOB" => Value::Blob(row.try_get::<Vec<u8>, _>(i).map_err(DriverError::new)?),
                "BOOLEAN" => Value::Bool(row.try_get::<bool, _>(i).map_err(DriverError::new)?),
                _ => Value::Text(row.try_get::<String, _>(i).map_err(DriverError::new)?),
            }
        };
        out.insert(column.name().to_string(), value);
    }
    Ok(out)
}
