mod parse;
pub(crate) use parse::parse;
pub use parse::Query;

mod visit;
pub use visit::{ConstraintKind, ConstraintVisitor};

use crate::value::Value;
use crate::Result;

/// A backend-agnostic predicate tree. Compound nodes only ever contain
/// constraints; raw values handed to [`Constraint::all`] / [`Constraint::any`]
/// are auto-wrapped in `Equal`.
#[derive(Debug, Clone, PartialEq)]
pub enum Constraint {
    Equal(Value),
    Like(Value),
    Less(Value),
    LessEqual(Value),
    Greater(Value),
    GreaterEqual(Value),
    And(Vec<Constraint>),
    Or(Vec<Constraint>),
}

/// Result of mapping a single leaf: either a replacement value of the same
/// kind, or a subtree standing in for the whole leaf (foreign-key nominal
/// resolution expands one equality into an `Or` of matching ids).
pub enum Leaf {
    Value(Value),
    Subtree(Constraint),
}

impl Constraint {
    pub fn all(items: Vec<impl Into<Constraint>>) -> Self {
        Self::And(items.into_iter().map(Into::into).collect())
    }

    pub fn any(items: Vec<impl Into<Constraint>>) -> Self {
        Self::Or(items.into_iter().map(Into::into).collect())
    }

    pub fn kind(&self) -> ConstraintKind {
        match self {
            Self::Equal(_) => ConstraintKind::Equal,
            Self::Like(_) => ConstraintKind::Like,
            Self::Less(_) => ConstraintKind::Less,
            Self::LessEqual(_) => ConstraintKind::LessEqual,
            Self::Greater(_) => ConstraintKind::Greater,
            Self::GreaterEqual(_) => ConstraintKind::GreaterEqual,
            Self::And(_) => ConstraintKind::And,
            Self::Or(_) => ConstraintKind::Or,
        }
    }

    pub fn is_compound(&self) -> bool {
        matches!(self, Self::And(_) | Self::Or(_))
    }

    fn with_value(kind: ConstraintKind, value: Value) -> Self {
        match kind {
            ConstraintKind::Equal => Self::Equal(value),
            ConstraintKind::Like => Self::Like(value),
            ConstraintKind::Less => Self::Less(value),
            ConstraintKind::LessEqual => Self::LessEqual(value),
            ConstraintKind::Greater => Self::Greater(value),
            ConstraintKind::GreaterEqual => Self::GreaterEqual(value),
            ConstraintKind::And | ConstraintKind::Or => {
                panic!("compound constraint kinds hold children, not a value")
            }
        }
    }

    /// Returns a tree of identical shape with every leaf value replaced by
    /// `f(value)`. The input tree is never mutated.
    pub fn map(&self, f: &impl Fn(&Value) -> Value) -> Constraint {
        match self {
            Self::And(children) => Self::And(children.iter().map(|c| c.map(f)).collect()),
            Self::Or(children) => Self::Or(children.iter().map(|c| c.map(f)).collect()),
            leaf => {
                let value = match leaf {
                    Self::Equal(v)
                    | Self::Like(v)
                    | Self::Less(v)
                    | Self::LessEqual(v)
                    | Self::Greater(v)
                    | Self::GreaterEqual(v) => v,
                    _ => unreachable!(),
                };
                Self::with_value(leaf.kind(), f(value))
            }
        }
    }

    /// Fallible leaf map that may replace a leaf with a subtree. Used by
    /// field encoding, where a foreign-key lookup can expand one leaf into
    /// an `Or` of matching ids.
    pub fn try_map(
        &self,
        f: &mut impl FnMut(ConstraintKind, &Value) -> Result<Leaf>,
    ) -> Result<Constraint> {
        match self {
            Self::And(children) => Ok(Self::And(
                children
                    .iter()
                    .map(|c| c.try_map(f))
                    .collect::<Result<_>>()?,
            )),
            Self::Or(children) => Ok(Self::Or(
                children
                    .iter()
                    .map(|c| c.try_map(f))
                    .collect::<Result<_>>()?,
            )),
            leaf => {
                let value = match leaf {
                    Self::Equal(v)
                    | Self::Like(v)
                    | Self::Less(v)
                    | Self::LessEqual(v)
                    | Self::Greater(v)
                    | Self::GreaterEqual(v) => v,
                    _ => unreachable!(),
                };
                match f(leaf.kind(), value)? {
                    Leaf::Value(v) => Ok(Self::with_value(leaf.kind(), v)),
                    Leaf::Subtree(c) => Ok(c),
                }
            }
        }
    }
}

impl<T: Into<Value>> From<T> for Constraint {
    fn from(value: T) -> Self {
        Self::Equal(value.into())
    }
}
