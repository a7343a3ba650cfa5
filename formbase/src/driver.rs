//! The external driver capability this core consumes.
//!
//! One suspending call per query, parameter binding mandatory, identifier
//! quoting supplied by the driver. Connection management, pooling, and
//! transactions live behind this trait and are none of this layer's
//! business.

use async_trait::async_trait;

use crate::error::DriverError;
use crate::value::{Row, Value};

/// A SQL-speaking execution capability.
#[async_trait]
pub trait Driver: Send + Sync {
    /// Execute one parameterized statement and return the resulting rows.
    ///
    /// Values are bound positionally to `?` placeholders; the driver must
    /// never interpolate them into the statement text. Errors come back
    /// unmodified, wrapped only for transport.
    async fn execute(&self, sql: &str, params: &[Value]) -> Result<Vec<Row>, DriverError>;

    /// Quote an identifier (table or column name) for safe embedding in
    /// statement text. The default is ANSI double-quoting with embedded
    /// quotes doubled, which SQLite and PostgreSQL both accept.
    fn quote_identifier(&self, ident: &str) -> String {
        format!("\"{}\"", ident.replace('"', "\"\""))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct DefaultQuoting;

    #[async_trait]
    impl Driver for DefaultQuoting {
        async fn execute(&self, _sql: &str, _params: &[Value]) -> Result<Vec<Row>, DriverError> {
            unreachable!("quoting-only test driver")
        }
    }

    #[test]
    fn test_default_quoting_doubles_embedded_quotes() {
        let d = DefaultQuoting;
        assert_eq!(d.quote_identifier("name"), "\"name\"");
        assert_eq!(d.quote_identifier("se\"lect"), "\"se\"\"lect\"");
    }
}
