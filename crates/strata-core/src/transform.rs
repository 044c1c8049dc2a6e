//! Bidirectional value conversion between model-side and backend-side
//! representations.
//!
//! `encode` pushes a value toward the backend, `decode` pulls it back out.
//! Composition threads encode left-to-right and decode right-to-left:
//! `compose(t1, t2).encode = t2.encode ∘ t1.encode` and
//! `compose(t1, t2).decode = t1.decode ∘ t2.decode`.

use crate::value::Value;
use crate::Result;

use std::fmt::Debug;
use std::sync::Arc;

pub trait Transform: Debug + Send + Sync {
    /// Convert a model-side value into its backend representation.
    fn encode(&self, value: Value) -> Result<Value>;

    /// Convert a backend-side value into its model representation.
    fn decode(&self, value: Value) -> Result<Value>;
}

/// The do-nothing transform.
#[derive(Debug, Clone, Copy, Default)]
pub struct Identity;

impl Transform for Identity {
    fn encode(&self, value: Value) -> Result<Value> {
        Ok(value)
    }

    fn decode(&self, value: Value) -> Result<Value> {
        Ok(value)
    }
}

pub fn identity() -> Arc<dyn Transform> {
    Arc::new(Identity)
}

/// Explicit composite of two transforms. Composition is a constructor
/// holding its operands, not a captured closure.
#[derive(Debug)]
pub struct Compose {
    first: Arc<dyn Transform>,
    second: Arc<dyn Transform>,
}

impl Compose {
    pub fn new(first: Arc<dyn Transform>, second: Arc<dyn Transform>) -> Self {
        Self { first, second }
    }
}

impl Transform for Compose {
    fn encode(&self, value: Value) -> Result<Value> {
        self.second.encode(self.first.encode(value)?)
    }

    fn decode(&self, value: Value) -> Result<Value> {
        self.first.decode(self.second.decode(value)?)
    }
}

pub fn compose(first: Arc<dyn Transform>, second: Arc<dyn Transform>) -> Arc<dyn Transform> {
    Arc::new(Compose::new(first, second))
}

/// Backend stores 0/1 integers, the model sees booleans. Null passes
/// through for optional fields.
#[derive(Debug, Clone, Copy, Default)]
pub struct IntToBool;

impl Transform for IntToBool {
    fn encode(&self, value: Value) -> Result<Value> {
        match value {
            Value::Bool(v) => Ok(Value::I64(v as i64)),
            Value::Null => Ok(Value::Null),
            other => Err(crate::Error::query(format!(
                "expected a boolean; value={other:?}"
            ))),
        }
    }

    fn decode(&self, value: Value) -> Result<Value> {
        match value {
            Value::I64(v) => Ok(Value::Bool(v != 0)),
            Value::Bool(v) => Ok(Value::Bool(v)),
            Value::Null => Ok(Value::Null),
            other => Err(crate::Error::query(format!(
                "expected a raw integer flag; value={other:?}"
            ))),
        }
    }
}

/// Backend stores decimal strings (common in remote listings), the model
/// sees integers.
#[derive(Debug, Clone, Copy, Default)]
pub struct StringToI64;

impl Transform for StringToI64 {
    fn encode(&self, value: Value) -> Result<Value> {
        match value {
            Value::I64(v) => Ok(Value::String(v.to_string())),
            Value::Null => Ok(Value::Null),
            other => Err(crate::Error::query(format!(
                "expected an integer; value={other:?}"
            ))),
        }
    }

    fn decode(&self, value: Value) -> Result<Value> {
        match value {
            Value::String(v) => {
                let parsed = v.parse::<i64>().map_err(|_| {
                    crate::Error::query(format!("expected a decimal string; value={v:?}"))
                })?;
                Ok(Value::I64(parsed))
            }
            Value::I64(v) => Ok(Value::I64(v)),
            Value::Null => Ok(Value::Null),
            other => Err(crate::Error::query(format!(
                "expected a raw decimal string; value={other:?}"
            ))),
        }
    }
}
