use super::{IdentityCache, Model, ModelInner, ModelSchema, ModelTarget};
use crate::backend::Backend;
use crate::field::Field;
use crate::{Error, Result};

use indexmap::IndexMap;
use std::sync::Arc;

/// Registers a model type: collects fields in declaration order, derives
/// missing backend names via the backend's naming conventions, runs the
/// backend's schema verification, and wires up the synthetic
/// self-referencing id field.
///
/// Registration happens once per model type at program initialization; the
/// resulting [`Model`] handle and its fields are immutable.
pub struct ModelBuilder {
    name: String,
    backend: Arc<dyn Backend>,
    source: Option<String>,
    bases: Vec<Model>,
    fields: IndexMap<String, Field>,
}

impl ModelBuilder {
    pub(crate) fn new(name: String, backend: Arc<dyn Backend>) -> Self {
        Self {
            name,
            backend,
            source: None,
            bases: vec![],
            fields: IndexMap::new(),
        }
    }

    /// Name the backend-side collection (table, API method, feed URL).
    pub fn source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Inherit another model's fields. At most one base is allowed, and it
    /// must be bound to the same backend.
    pub fn extend(mut self, base: &Model) -> Self {
        self.bases.push(base.clone());
        self
    }

    /// Declare a field. Declaration order is preserved; a field with the
    /// same attribute name as an inherited one overrides it.
    pub fn field(mut self, attr: impl Into<String>, field: Field) -> Self {
        self.fields.insert(attr.into(), field);
        self
    }

    pub fn finish(self) -> Result<Model> {
        if self.bases.len() > 1 {
            return Err(Error::schema(format!(
                "{} extends more than one model",
                self.name
            )));
        }

        let mut fields = IndexMap::new();
        if let Some(base) = self.bases.first() {
            if !Arc::ptr_eq(&base.inner.backend, &self.backend) {
                return Err(Error::schema(format!(
                    "{} extends {} but is bound to a different backend",
                    self.name,
                    base.name()
                )));
            }
            for (attr, field) in base.schema().fields() {
                // The base's synthetic id field points back at the base;
                // this model re-registers its own below.
                if field.is_self_reference() {
                    continue;
                }
                fields.insert(attr.to_string(), field.clone());
            }
        }
        for (attr, field) in self.fields {
            fields.insert(attr, field);
        }

        // Derive backend names the declaring code left implicit.
        let conventions = self.backend.conventions();
        for (attr, field) in fields.iter_mut() {
            if field.get_backend_name().is_none() {
                field.assign_backend_name(conventions.translate(attr));
            }
        }

        let source = self.source.unwrap_or_else(|| self.name.clone());
        let probe = ModelSchema::new(self.name.clone(), source, fields, None);
        let identity_key = self.backend.identity_key(&probe);
        let (name, source, mut fields, _) = probe.into_parts();

        let backend = self.backend;
        let inner = Arc::new_cyclic(|weak| {
            // The backend's identity key gets a synthetic self-referencing
            // field, so "give me the id back" composes with the
            // foreign-key machinery like any other reference.
            if let Some(key) = &identity_key {
                if !fields.contains_key("id") {
                    let field = Field::named(key.clone())
                        .optional()
                        .self_reference(ModelTarget::SelfRef(weak.clone()));
                    fields.insert("id".to_string(), field);
                }
            }
            ModelInner {
                schema: ModelSchema::new(name, source, fields, identity_key.clone()),
                backend,
                identity: IdentityCache::new(),
            }
        });

        let model = Model::from_inner(inner);
        if model.schema().fields().count() > 0 {
            model.backend().verify_schema(model.schema())?;
        }
        tracing::debug!(model = model.name(), source = model.schema().source(), "registered");
        Ok(model)
    }
}
