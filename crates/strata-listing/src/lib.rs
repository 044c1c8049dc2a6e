//! Backend for flat remote listings.
//!
//! A [`ListingSource`] produces the entire collection in one call, the way
//! a feed endpoint or a paginate-free API does. [`ListingBackend`] filters
//! those rows in memory, but only for pure equality constraints; anything
//! richer is a capability error rather than a silent approximation, since
//! the caller may be relying on backend-side matching semantics.
//!
//! An optional [`TimedCache`] keeps the listing for its TTL and coalesces
//! concurrent refetches.

mod json;
mod visitor;

pub use json::rows_from_json;
pub use visitor::EqualityVisitor;

use strata_cache::TimedCache;
use strata_core::{
    Backend, ConstraintSet, ConstraintVisitor, Error, ModelSchema, NamePair, NamingConvention,
    Record, Result, Value,
};

use std::fmt::Debug;

/// A remote collection fetched whole.
pub trait ListingSource: Debug + Send + Sync + 'static {
    /// Stable key identifying this listing for caching.
    fn cache_key(&self) -> String;

    /// Fetch and decode every row of the listing.
    fn rows(&self) -> Result<Vec<Record>>;
}

#[derive(Debug)]
pub struct ListingBackend<S> {
    source: S,
    identity_key: Option<String>,
    cache: Option<TimedCache<String, Vec<Record>>>,
}

impl<S: ListingSource> ListingBackend<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            identity_key: None,
            cache: None,
        }
    }

    /// Declare which backend key carries the record identity. Listings
    /// without one still filter; they just have no by-id operations.
    pub fn identity_key(mut self, key: impl Into<String>) -> Self {
        self.identity_key = Some(key.into());
        self
    }

    /// Cache fetched listings. The cache's TTL and clock come with it, so
    /// tests can drive expiry manually.
    pub fn cache(mut self, cache: TimedCache<String, Vec<Record>>) -> Self {
        self.cache = Some(cache);
        self
    }

    fn rows(&self) -> Result<Vec<Record>> {
        match &self.cache {
            Some(cache) => cache.get_or_fetch(self.source.cache_key(), || self.source.rows()),
            None => self.source.rows(),
        }
    }
}

impl<S: ListingSource> Backend for ListingBackend<S> {
    fn identity_key(&self, _model: &ModelSchema) -> Option<String> {
        self.identity_key.clone()
    }

    fn conventions(&self) -> NamePair {
        NamePair::new(NamingConvention::Snake, NamingConvention::camel())
    }

    fn fetch_single(&self, model: &ModelSchema, id: &Value) -> Result<Record> {
        let key = self.identity_key.as_deref().ok_or_else(|| {
            Error::schema(format!("{} listing has no identity key", model.name()))
        })?;
        self.rows()?
            .into_iter()
            .find(|record| record.get(key) == Some(id))
            .ok_or_else(|| Error::not_found(format!("{} id={id}", model.name())))
    }

    fn fetch(&self, model: &ModelSchema, constraints: &ConstraintSet) -> Result<Vec<Record>> {
        // Lower every tree before touching the source, so capability
        // errors surface without a fetch.
        let mut requirements = Vec::with_capacity(constraints.len());
        for (name, constraint) in constraints {
            let mut visitor = EqualityVisitor::new();
            visitor.visit(constraint)?;
            requirements.push((name.as_str(), visitor.into_required()));
        }

        let rows = self.rows()?;
        tracing::debug!(
            model = model.name(),
            rows = rows.len(),
            constraints = requirements.len(),
            "filtering listing"
        );
        Ok(rows
            .into_iter()
            .filter(|record| {
                requirements.iter().all(|(name, required)| {
                    let actual = record.get(name).unwrap_or(&Value::Null);
                    required.iter().all(|value| actual == value)
                })
            })
            .collect())
    }
}
