//! Formbase data-mapping core.
//!
//! A miniature object-relational mapping engine: record types register
//! their structural metadata once at startup, a row codec converts between
//! typed records and flat driver rows (reducing nested related records to
//! foreign-key scalars), a projection algebra computes exact column sets,
//! and an injection-safe builder assembles parameterized SELECTs that run
//! through an external driver capability. The repository facade on top is
//! the only surface the surrounding application touches.
//!
//! # Usage
//!
//! ```rust,ignore
//! use formbase::{asc, eq, Projection, Query, Record, Registry, Repository, SqliteDriver};
//!
//! #[derive(Record, Clone, Debug)]
//! #[record(table = "forms")]
//! struct Form {
//!     #[record(primary_key)]
//!     id: String,
//!     name: String,
//!     slug: String,
//!     active: bool,
//! }
//!
//! let mut registry = Registry::new();
//! registry.register::<Form>()?;
//!
//! let repo = Repository::new(Arc::new(registry), SqliteDriver::new(pool));
//! let forms = repo
//!     .of::<Form>()
//!     .find_projected(
//!         Projection::include(["name", "slug"]),
//!         Query::new().filter(eq("active", true)).order_by([asc("name")]),
//!     )
//!     .await?;
//! ```

// Lets the derive macro emit `formbase::` paths that also resolve inside
// this crate's own tests.
extern crate self as formbase;

pub mod codec;
pub mod driver;
pub mod error;
pub mod projection;
pub mod query;
pub mod record;
pub mod repository;
pub mod schema;
#[cfg(feature = "sqlite")]
pub mod sqlite;
pub mod value;

pub use driver::Driver;
pub use error::{DriverError, Error, SchemaError};
pub use projection::{resolve_columns, Projection, Select};
pub use query::{and, asc, desc, eq, gt, gte, lt, lte, ne, not, or};
pub use query::{Direction, Ordering, Predicate, SelectQuery};
pub use record::{Partial, Record, Rel};
pub use repository::{Query, RecordSet, Repository};
pub use schema::{FieldDef, FieldKind, Registry, ScalarKind, Schema, SchemaDef};
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteDriver;
pub use value::{from_json, to_json, FieldValue, FieldValues, FromValue, Row, Value};

// Derive macro for implementing `Record` on annotated structs.
pub use formbase_macros::Record;
