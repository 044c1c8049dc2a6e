use super::Model;
use crate::value::{Record, Value};
use crate::{Error, Result};

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// A live model instance: one immutable raw backend record plus memoized
/// decoded values. Handles are cheap to clone; two handles for the same
/// identity are the same allocation (see the identity cache).
#[derive(Clone)]
pub struct Obj {
    inner: Arc<ObjInner>,
}

pub(crate) struct ObjInner {
    model: Model,
    id: Option<Value>,
    record: Record,
    memo: Mutex<HashMap<String, Value>>,
}

impl ObjInner {
    pub(crate) fn new(model: Model, id: Option<Value>, record: Record) -> Self {
        Self {
            model,
            id,
            record,
            memo: Mutex::new(HashMap::new()),
        }
    }
}

impl Obj {
    pub(crate) fn from_inner(inner: Arc<ObjInner>) -> Self {
        Self { inner }
    }

    pub fn model(&self) -> &Model {
        &self.inner.model
    }

    /// The raw identity value this instance was constructed with, if any.
    pub fn id(&self) -> Option<&Value> {
        self.inner.id.as_ref()
    }

    /// The raw backend record. Never mutated after construction.
    pub fn record(&self) -> &Record {
        &self.inner.record
    }

    /// True if both handles point at the same live instance.
    pub fn ptr_eq(&self, other: &Obj) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Read an attribute: raw value by backend key name if present, else
    /// the field default; decoded through the field's transform, with
    /// foreign keys resolving to live instances. Cacheable fields memoize
    /// the decoded value.
    pub fn get(&self, attr: &str) -> Result<Value> {
        let schema = self.inner.model.schema();
        let field = schema
            .field(attr)
            .ok_or_else(|| Error::unknown_field(attr))?;

        if field.is_cacheable() {
            let memo = self.inner.memo.lock().unwrap();
            if let Some(value) = memo.get(attr) {
                return Ok(value.clone());
            }
        }

        let name = field
            .get_backend_name()
            .expect("field backend name is assigned at registration");
        let raw = match self.inner.record.get(name) {
            Some(value) => value.clone(),
            None => field.default().cloned().unwrap_or(Value::Null),
        };
        let value = field.decode_value(raw)?;

        if field.is_cacheable() {
            let mut memo = self.inner.memo.lock().unwrap();
            memo.insert(attr.to_string(), value.clone());
        }
        Ok(value)
    }

    /// Decoded values of this model's nominal fields, in declaration
    /// order. Used for instance comparison.
    fn nominal_values(&self) -> Vec<Value> {
        let attrs: Vec<String> = self
            .inner
            .model
            .schema()
            .nominal_attrs()
            .map(str::to_string)
            .collect();
        attrs.iter().filter_map(|attr| self.get(attr).ok()).collect()
    }
}

/// Instances compare by nominal fields first, falling back to identity-key
/// equality. Instances of different models never compare equal.
impl PartialEq for Obj {
    fn eq(&self, other: &Self) -> bool {
        if self.ptr_eq(other) {
            return true;
        }
        if !self.inner.model.same_as(&other.inner.model) {
            return false;
        }
        let mine = self.nominal_values();
        if !mine.is_empty() {
            return mine == other.nominal_values();
        }
        match (self.id(), other.id()) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        }
    }
}

impl PartialOrd for Obj {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        if !self.inner.model.same_as(&other.inner.model) {
            return None;
        }
        let mine = self.nominal_values();
        let theirs = other.nominal_values();
        for (a, b) in mine.iter().zip(theirs.iter()) {
            match a.partial_cmp(b) {
                Some(Ordering::Equal) => continue,
                other => return other,
            }
        }
        if !mine.is_empty() && mine.len() == theirs.len() {
            return Some(Ordering::Equal);
        }
        match (self.id(), other.id()) {
            (Some(a), Some(b)) => a.partial_cmp(b),
            _ => None,
        }
    }
}

impl std::fmt::Debug for Obj {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self.id() {
            Some(id) => write!(f, "<{}: {}>", self.inner.model.name(), id),
            None => write!(f, "<{}: ?>", self.inner.model.name()),
        }
    }
}
