//! Query construction: predicates, ordering, and the SELECT builder.
//!
//! Everything here is purely computational: a builder is an inert value
//! until handed to a driver and holds no shared state, so it can be used
//! freely across tasks. Identifiers are resolved through the registry and
//! quoted by the driver; values only ever travel as bound parameters.

mod builder;
mod order;
mod predicate;

pub use builder::SelectQuery;
pub use order::{asc, desc, Direction, Ordering};
pub use predicate::{and, eq, gt, gte, lt, lte, ne, not, or, Cmp, Predicate};
