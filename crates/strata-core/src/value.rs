use crate::model::Obj;

use indexmap::IndexMap;
use std::cmp::Ordering;
use std::hash::{Hash, Hasher};

/// A scalar or nested value as produced by a backend or supplied in a
/// query predicate.
#[derive(Debug, Default, Clone)]
pub enum Value {
    /// Boolean value
    Bool(bool),

    /// 64-bit float
    F64(f64),

    /// Signed 64-bit integer
    I64(i64),

    /// A list of values
    List(Vec<Value>),

    /// Null value
    #[default]
    Null,

    /// A live model instance, produced by foreign-key resolution
    Obj(Obj),

    /// A nested raw record
    Record(Record),

    /// String value
    String(String),
}

impl Value {
    pub const fn null() -> Self {
        Self::Null
    }

    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn to_bool(self) -> crate::Result<bool> {
        match self {
            Self::Bool(v) => Ok(v),
            _ => Err(crate::Error::query(format!(
                "cannot convert value to bool; value={self:?}"
            ))),
        }
    }

    pub fn to_i64(self) -> crate::Result<i64> {
        match self {
            Self::I64(v) => Ok(v),
            _ => Err(crate::Error::query(format!(
                "cannot convert value to i64; value={self:?}"
            ))),
        }
    }

    pub fn to_f64(self) -> crate::Result<f64> {
        match self {
            Self::F64(v) => Ok(v),
            Self::I64(v) => Ok(v as f64),
            _ => Err(crate::Error::query(format!(
                "cannot convert value to f64; value={self:?}"
            ))),
        }
    }

    pub fn to_string(self) -> crate::Result<String> {
        match self {
            Self::String(v) => Ok(v),
            _ => Err(crate::Error::query(format!(
                "cannot convert value to String; value={self:?}"
            ))),
        }
    }

    pub fn to_obj(self) -> crate::Result<Obj> {
        match self {
            Self::Obj(v) => Ok(v),
            _ => Err(crate::Error::query(format!(
                "cannot convert value to model instance; value={self:?}"
            ))),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_obj(&self) -> Option<&Obj> {
        match self {
            Self::Obj(v) => Some(v),
            _ => None,
        }
    }
}

// Identity-cache keys and constraint leaves must be comparable and
// hashable. F64 compares and hashes by bit pattern so Eq and Hash agree.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        use Value::*;

        match (self, other) {
            (Bool(a), Bool(b)) => a == b,
            (F64(a), F64(b)) => a.to_bits() == b.to_bits(),
            (I64(a), I64(b)) => a == b,
            (List(a), List(b)) => a == b,
            (Null, Null) => true,
            (Obj(a), Obj(b)) => a == b,
            (Record(a), Record(b)) => a == b,
            (String(a), String(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        use Value::*;

        core::mem::discriminant(self).hash(state);
        match self {
            Bool(v) => v.hash(state),
            F64(v) => v.to_bits().hash(state),
            I64(v) => v.hash(state),
            List(v) => v.hash(state),
            Null => {}
            Obj(v) => {
                v.model().name().hash(state);
                v.id().hash(state);
            }
            Record(v) => {
                for (k, v) in v.iter() {
                    k.hash(state);
                    v.hash(state);
                }
            }
            String(v) => v.hash(state),
        }
    }
}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        use Value::*;

        match (self, other) {
            (Bool(a), Bool(b)) => a.partial_cmp(b),
            (F64(a), F64(b)) => a.partial_cmp(b),
            (I64(a), I64(b)) => a.partial_cmp(b),
            (I64(a), F64(b)) => (*a as f64).partial_cmp(b),
            (F64(a), I64(b)) => a.partial_cmp(&(*b as f64)),
            (Null, Null) => Some(Ordering::Equal),
            (String(a), String(b)) => a.partial_cmp(b),
            _ => None,
        }
    }
}

impl core::fmt::Display for Value {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        use Value::*;

        match self {
            Bool(v) => write!(f, "{v}"),
            F64(v) => write!(f, "{v}"),
            I64(v) => write!(f, "{v}"),
            List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            Null => f.write_str("null"),
            Obj(v) => write!(f, "{v:?}"),
            Record(_) => f.write_str("<record>"),
            String(v) => f.write_str(v),
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Self::I64(v as i64)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::I64(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::F64(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<Obj> for Value {
    fn from(v: Obj) -> Self {
        Self::Obj(v)
    }
}

impl From<Record> for Value {
    fn from(v: Record) -> Self {
        Self::Record(v)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Self::List(v.into_iter().map(Into::into).collect())
    }
}

/// One raw backend record: an ordered mapping of backend key name to value.
///
/// A record is immutable once attached to a model instance; mutation only
/// happens while a backend is assembling it.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Record {
    fields: IndexMap<String, Value>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(key.into(), value.into());
    }

    /// Builder-style insert, mostly useful for tests and listing sources.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.fields.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.fields.keys()
    }
}

impl FromIterator<(String, Value)> for Record {
    fn from_iter<T: IntoIterator<Item = (String, Value)>>(iter: T) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}
