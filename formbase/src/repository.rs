//! Repository facade: the only surface the surrounding application touches.
//!
//! A [`Repository`] owns the registry and a driver; `repo.of::<R>()` yields
//! the per-record-type handle. Result shapes form a small closed set: `find`
//! / `find_one` return fully-hydrated records, `find_projected` /
//! `find_one_projected` return [`Partial`]s carrying exactly the requested
//! fields. Every call is one-shot; no caching, no identity map, no retries.

use std::marker::PhantomData;
use std::sync::Arc;

use crate::codec;
use crate::driver::Driver;
use crate::error::Error;
use crate::projection::Projection;
use crate::query::{Ordering, Predicate, SelectQuery};
use crate::record::{Partial, Record};
use crate::schema::Registry;

/// Filtering, ordering, and pagination for a single `find` call.
#[derive(Debug, Clone, Default)]
pub struct Query {
    pub(crate) filter: Option<Predicate>,
    pub(crate) order_by: Vec<Ordering>,
    pub(crate) limit: Option<i64>,
    pub(crate) offset: Option<i64>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filter(mut self, predicate: Predicate) -> Self {
        self.filter = Some(predicate);
        self
    }

    pub fn order_by(mut self, terms: impl IntoIterator<Item = Ordering>) -> Self {
        self.order_by.extend(terms);
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

    fn into_select(self, type_name: &str, projection: Option<Projection>) -> SelectQuery {
        let mut select = SelectQuery::new(type_name);
        if let Some(projection) = projection {
            select = select.projection(projection);
        }
        if let Some(filter) = self.filter {
            select = select.filter(filter);
        }
        select = select.order_by(self.order_by);
        if let Some(limit) = self.limit {
            select = select.limit(limit);
        }
        if let Some(offset) = self.offset {
            select = select.offset(offset);
        }
        select
    }
}

/// Entry point for data access, constructed once at startup with a fully
/// populated registry and shared from there.
pub struct Repository<D: Driver> {
    registry: Arc<Registry>,
    driver: D,
}

impl<D: Driver> Repository<D> {
    pub fn new(registry: Arc<Registry>, driver: D) -> Self {
        Self { registry, driver }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    /// The typed handle for one registered record type.
    pub fn of<R: Record>(&self) -> RecordSet<'_, R, D> {
        RecordSet {
            repo: self,
            _marker: PhantomData,
        }
    }
}

/// Per-record-type query surface.
pub struct RecordSet<'a, R: Record, D: Driver> {
    repo: &'a Repository<D>,
    _marker: PhantomData<R>,
}

impl<'a, R: Record, D: Driver> RecordSet<'a, R, D> {
    /// Fetch fully-hydrated records.
    pub async fn find(&self, query: Query) -> Result<Vec<R>, Error> {
        let registry = &self.repo.registry;
        let schema = registry.lookup(R::TYPE_NAME)?;
        let select = query.into_select(R::TYPE_NAME, None);
        let rows = select.fetch(registry, &self.repo.driver).await?;
        rows.iter()
            .map(|row| codec::decode_record::<R>(schema, row).map_err(Error::from))
            .collect()
    }

    /// Fetch the first matching record, or `None`.
    ///
    /// `limit` is forced to 1 regardless of what the query carries.
    pub async fn find_one(&self, query: Query) -> Result<Option<R>, Error> {
        let query = query.limit(1);
        Ok(self.find(query).await?.into_iter().next())
    }

    /// Fetch partial records shaped exactly by `projection`.
    pub async fn find_projected(
        &self,
        projection: Projection,
        query: Query,
    ) -> Result<Vec<Partial>, Error> {
        let registry = &self.repo.registry;
        let schema = registry.lookup(R::TYPE_NAME)?;
        let select = query.into_select(R::TYPE_NAME, Some(projection));
        let rows = select.fetch(registry, &self.repo.driver).await?;
        Ok(rows
            .iter()
            .map(|row| Partial::new(codec::decode(schema, row)))
            .collect())
    }

    /// Projected variant of [`RecordSet::find_one`]; also forces `limit = 1`.
    pub async fn find_one_projected(
        &self,
        projection: Projection,
        query: Query,
    ) -> Result<Option<Partial>, Error> {
        let query = query.limit(1);
        Ok(self
            .find_projected(projection, query)
            .await?
            .into_iter()
            .next())
    }
}
