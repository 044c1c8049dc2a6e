use crate::constraint::{Constraint, ConstraintKind, Leaf, Query};
use crate::model::{Model, ModelTarget};
use crate::transform::{self, Transform};
use crate::value::Value;
use crate::{Error, Result};

use std::sync::Arc;

/// One named, typed model attribute.
///
/// Fields are declared once at model-definition time and are immutable
/// thereafter. A field whose backend name is not given explicitly gets one
/// derived from the attribute name via the backend's naming conventions.
#[derive(Debug, Clone)]
pub struct Field {
    /// Backend-side key name. `None` until registration derives it.
    backend_name: Option<String>,

    /// Value conversion between model and backend representation.
    transform: Arc<dyn Transform>,

    /// When set, raw values are ids of this target model and decode into
    /// live instances of it.
    foreign_key: Option<ModelTarget>,

    /// True if the field may be absent from a raw record.
    optional: bool,

    /// Value an absent optional field decodes to.
    default: Option<Value>,

    /// Marks the field as usable to resolve a foreign instance from a
    /// non-id value (an alternate natural key, typically a name).
    nominal: bool,

    /// Whether the decoded value is memoized per instance.
    cacheable: bool,
}

impl Field {
    pub fn new() -> Self {
        Self {
            backend_name: None,
            transform: transform::identity(),
            foreign_key: None,
            optional: false,
            default: None,
            nominal: false,
            cacheable: false,
        }
    }

    /// Shorthand for a field with an explicit backend key name.
    pub fn named(backend_name: impl Into<String>) -> Self {
        Self::new().backend_name(backend_name)
    }

    pub fn backend_name(mut self, name: impl Into<String>) -> Self {
        self.backend_name = Some(name.into());
        self
    }

    pub fn transform(mut self, transform: impl Transform + 'static) -> Self {
        self.transform = Arc::new(transform);
        self
    }

    pub fn foreign_key(mut self, target: &Model) -> Self {
        self.foreign_key = Some(ModelTarget::Model(target.clone()));
        self
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn nominal(mut self) -> Self {
        self.nominal = true;
        self
    }

    pub fn cacheable(mut self) -> Self {
        self.cacheable = true;
        self
    }

    pub(crate) fn self_reference(mut self, target: ModelTarget) -> Self {
        self.foreign_key = Some(target);
        self
    }

    pub fn get_backend_name(&self) -> Option<&str> {
        self.backend_name.as_deref()
    }

    pub fn is_optional(&self) -> bool {
        self.optional
    }

    pub fn is_nominal(&self) -> bool {
        self.nominal
    }

    pub fn is_cacheable(&self) -> bool {
        self.cacheable
    }

    pub fn default(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    pub fn is_foreign_key(&self) -> bool {
        self.foreign_key.is_some()
    }

    pub(crate) fn is_self_reference(&self) -> bool {
        matches!(self.foreign_key, Some(ModelTarget::SelfRef(_)))
    }

    pub(crate) fn assign_backend_name(&mut self, name: String) {
        if self.backend_name.is_none() {
            self.backend_name = Some(name);
        }
    }

    /// Decode a raw backend value into its model representation. Foreign
    /// keys resolve through the target model's identity cache, so repeated
    /// access to the same referent yields the same live instance.
    pub(crate) fn decode_value(&self, raw: Value) -> Result<Value> {
        let value = self.transform.decode(raw)?;
        let Some(target) = &self.foreign_key else {
            return Ok(value);
        };
        if value.is_null() {
            return Ok(Value::Null);
        }
        let model = target.resolve()?;
        Ok(Value::Obj(model.get(value)?))
    }

    /// Encode a whole constraint tree into backend-native values,
    /// preserving shape except where nominal resolution expands an
    /// equality leaf into an `Or` of matching ids.
    pub(crate) fn encode_constraint(&self, constraint: &Constraint) -> Result<Constraint> {
        constraint.try_map(&mut |kind, value| self.encode_leaf(kind, value))
    }

    fn encode_leaf(&self, kind: ConstraintKind, value: &Value) -> Result<Leaf> {
        let Some(target) = &self.foreign_key else {
            return Ok(Leaf::Value(self.transform.encode(value.clone())?));
        };
        let model = target.resolve()?;

        if let Value::Obj(obj) = value {
            if !obj.model().same_as(&model) {
                return Err(Error::query(format!(
                    "expected an instance of {}, got one of {}",
                    model.name(),
                    obj.model().name()
                )));
            }
            let id = obj.id().cloned().ok_or_else(|| {
                Error::resolution(format!("{} instance has no identity", model.name()))
            })?;
            return Ok(Leaf::Value(self.transform.encode(id)?));
        }

        // A non-instance value resolves through the target's nominal
        // fields; each match contributes its id to an Or.
        if kind != ConstraintKind::Equal {
            return Err(Error::resolution(format!(
                "{} comparison against {} requires an instance",
                kind.name(),
                model.name()
            )));
        }
        let nominal: Vec<String> = model
            .schema()
            .nominal_attrs()
            .map(str::to_string)
            .collect();
        if nominal.is_empty() {
            return Err(Error::resolution(format!(
                "{} has no nominal field; supply an instance or an id",
                model.name()
            )));
        }

        let mut ids = vec![];
        for attr in nominal {
            for obj in model.filter(Query::new().with(attr, value.clone()))? {
                let obj = obj?;
                let id = obj.id().cloned().ok_or_else(|| {
                    Error::resolution(format!("{} instance has no identity", model.name()))
                })?;
                ids.push(Constraint::Equal(self.transform.encode(id)?));
            }
        }
        Ok(Leaf::Subtree(Constraint::Or(ids)))
    }
}

impl Default for Field {
    fn default() -> Self {
        Self::new()
    }
}
