mod builder;
pub use builder::ModelBuilder;

mod identity;
pub(crate) use identity::IdentityCache;

mod instance;
pub use instance::Obj;
pub(crate) use instance::ObjInner;

use crate::backend::Backend;
use crate::constraint::{self, Query};
use crate::field::Field;
use crate::value::{Record, Value};
use crate::{Error, Result};

use indexmap::IndexMap;
use std::sync::{Arc, Weak};

/// A registered model type: an ordered field registry bound to a backend,
/// plus the per-type identity cache. Handles are cheap to clone and share.
#[derive(Clone)]
pub struct Model {
    inner: Arc<ModelInner>,
}

pub(crate) struct ModelInner {
    pub(crate) schema: ModelSchema,
    pub(crate) backend: Arc<dyn Backend>,
    pub(crate) identity: IdentityCache,
}

/// The fixed shape of a model: its name, backend-side source (table, API
/// method, feed), and field registry. This is what backends see.
#[derive(Debug)]
pub struct ModelSchema {
    name: String,
    source: String,
    fields: IndexMap<String, Field>,
    identity_key: Option<String>,
}

impl ModelSchema {
    pub(crate) fn new(
        name: String,
        source: String,
        fields: IndexMap<String, Field>,
        identity_key: Option<String>,
    ) -> Self {
        Self {
            name,
            source,
            fields,
            identity_key,
        }
    }

    pub(crate) fn into_parts(
        self,
    ) -> (String, String, IndexMap<String, Field>, Option<String>) {
        (self.name, self.source, self.fields, self.identity_key)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The backend-side collection this model reads from.
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn field(&self, attr: &str) -> Option<&Field> {
        self.fields.get(attr)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &Field)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Attribute names of fields usable as alternate natural keys.
    pub fn nominal_attrs(&self) -> impl Iterator<Item = &str> {
        self.fields
            .iter()
            .filter(|(_, f)| f.is_nominal())
            .map(|(k, _)| k.as_str())
    }

    /// The backend key name carrying record identity, if the backend
    /// reports one.
    pub fn identity_key(&self) -> Option<&str> {
        self.identity_key.as_deref()
    }

    /// Every non-optional field's backend name must be present in a raw
    /// record before an instance can be constructed from it.
    fn check_required(&self, record: &Record) -> Result<()> {
        for (attr, field) in &self.fields {
            if field.is_optional() {
                continue;
            }
            let name = field
                .get_backend_name()
                .expect("field backend name is assigned at registration");
            if !record.contains_key(name) {
                return Err(Error::schema(format!(
                    "backend did not provide {name} for {}::{attr}",
                    self.name
                )));
            }
        }
        Ok(())
    }
}

/// Reference held by a foreign-key field. The synthetic self-referencing
/// id field must not keep its own model alive, hence the weak variant.
#[derive(Debug, Clone)]
pub(crate) enum ModelTarget {
    Model(Model),
    SelfRef(Weak<ModelInner>),
}

impl ModelTarget {
    pub(crate) fn resolve(&self) -> Result<Model> {
        match self {
            Self::Model(model) => Ok(model.clone()),
            Self::SelfRef(weak) => weak
                .upgrade()
                .map(|inner| Model { inner })
                .ok_or_else(|| Error::schema("model type is no longer alive")),
        }
    }
}

impl Model {
    /// Start registering a new model type against a backend.
    pub fn build(name: impl Into<String>, backend: Arc<dyn Backend>) -> ModelBuilder {
        ModelBuilder::new(name.into(), backend)
    }

    pub(crate) fn from_inner(inner: Arc<ModelInner>) -> Self {
        Self { inner }
    }

    pub fn name(&self) -> &str {
        self.inner.schema.name()
    }

    pub fn schema(&self) -> &ModelSchema {
        &self.inner.schema
    }

    pub fn backend(&self) -> &Arc<dyn Backend> {
        &self.inner.backend
    }

    /// Two handles are the same model iff they share the registration.
    pub fn same_as(&self, other: &Model) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    pub(crate) fn downgrade(inner: &Arc<ModelInner>) -> Weak<ModelInner> {
        Arc::downgrade(inner)
    }

    /// Parse predicates into backend-native constraints and fetch. The
    /// returned sequence materializes records through the identity cache
    /// one at a time.
    pub fn filter(&self, query: Query) -> Result<Objects> {
        let constraints = constraint::parse(&self.inner.schema, &query)?;
        tracing::debug!(
            model = self.name(),
            constraints = constraints.len(),
            "fetching"
        );
        let rows = self
            .inner
            .backend
            .fetch(&self.inner.schema, &constraints)?;
        Ok(Objects {
            model: self.clone(),
            rows: rows.into_iter(),
        })
    }

    /// Unconstrained fetch.
    pub fn all(&self) -> Result<Objects> {
        self.filter(Query::new())
    }

    /// Fetch by identity. A cache hit returns the live instance without
    /// touching the backend.
    pub fn get(&self, id: impl Into<Value>) -> Result<Obj> {
        let id = id.into();
        if self.inner.schema.identity_key().is_none() {
            return Err(Error::schema(format!(
                "{} backend reports no identity key; cannot fetch by id",
                self.name()
            )));
        }

        if let Some(existing) = self.inner.identity.get(&id) {
            tracing::trace!(model = self.name(), id = %id, "identity cache hit");
            return Ok(Obj::from_inner(existing));
        }

        let record = self.inner.backend.fetch_single(&self.inner.schema, &id)?;
        self.construct(Some(id), record)
    }

    /// Exactly-one-match filter.
    pub fn get_one(&self, query: Query) -> Result<Obj> {
        let mut objs = self.filter(query)?;
        let first = objs
            .next()
            .ok_or_else(|| Error::query(format!("no {} matches the query", self.name())))??;
        if objs.next().is_some() {
            return Err(Error::query(format!(
                "more than one {} matches the query",
                self.name()
            )));
        }
        Ok(first)
    }

    /// Construct an instance from caller-supplied raw data. Instances with
    /// an extractable identity go through the identity cache; records with
    /// no identity at all are legal and simply never cached.
    pub fn from_record(&self, record: Record) -> Result<Obj> {
        self.materialize(record)
    }

    pub(crate) fn materialize(&self, record: Record) -> Result<Obj> {
        let id = self
            .inner
            .schema
            .identity_key()
            .and_then(|key| record.get(key))
            .cloned();

        if let Some(id) = &id {
            if let Some(existing) = self.inner.identity.get(id) {
                // Raced or repeated materialization: the fresh record is
                // discarded in favor of the live instance.
                tracing::trace!(model = self.name(), id = %id, "identity cache hit");
                return Ok(Obj::from_inner(existing));
            }
        }
        self.construct(id, record)
    }

    fn construct(&self, id: Option<Value>, record: Record) -> Result<Obj> {
        self.inner.schema.check_required(&record)?;
        let candidate = Arc::new(ObjInner::new(self.clone(), id.clone(), record));
        match id {
            Some(id) => {
                let winner = self.inner.identity.insert_or_reuse(id, candidate);
                Ok(Obj::from_inner(winner))
            }
            None => Ok(Obj::from_inner(candidate)),
        }
    }
}

impl std::fmt::Debug for Model {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.debug_struct("Model")
            .field("name", &self.name())
            .field("source", &self.inner.schema.source())
            .finish()
    }
}

/// Lazy sequence of materialized instances backing [`Model::filter`].
#[derive(Debug)]
pub struct Objects {
    model: Model,
    rows: std::vec::IntoIter<Record>,
}

impl Iterator for Objects {
    type Item = Result<Obj>;

    fn next(&mut self) -> Option<Self::Item> {
        let record = self.rows.next()?;
        Some(self.model.materialize(record))
    }
}
