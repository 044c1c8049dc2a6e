use super::Constraint;
use crate::value::Value;
use crate::{Error, Result};

/// The closed set of constraint node kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintKind {
    Equal,
    Like,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    And,
    Or,
}

impl ConstraintKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Equal => "equal",
            Self::Like => "like",
            Self::Less => "less",
            Self::LessEqual => "less_equal",
            Self::Greater => "greater",
            Self::GreaterEqual => "greater_equal",
            Self::And => "and",
            Self::Or => "or",
        }
    }
}

/// Double-dispatch traversal contract backends implement to lower a
/// constraint tree into their native query representation.
///
/// Dispatch order: the kind-specific method if the backend overrides it,
/// else the generic [`visit_compound`](Self::visit_compound) /
/// [`visit_leaf`](Self::visit_leaf) handler, else a capability error — a
/// backend handed a constraint kind it cannot lower must reject the query
/// rather than silently degrade it.
pub trait ConstraintVisitor {
    type Output;

    fn visit(&mut self, constraint: &Constraint) -> Result<Self::Output> {
        match constraint {
            Constraint::Equal(v) => self.visit_equal(v),
            Constraint::Like(v) => self.visit_like(v),
            Constraint::Less(v) => self.visit_less(v),
            Constraint::LessEqual(v) => self.visit_less_equal(v),
            Constraint::Greater(v) => self.visit_greater(v),
            Constraint::GreaterEqual(v) => self.visit_greater_equal(v),
            Constraint::And(children) => self.visit_and(children),
            Constraint::Or(children) => self.visit_or(children),
        }
    }

    fn visit_equal(&mut self, value: &Value) -> Result<Self::Output> {
        self.visit_leaf(ConstraintKind::Equal, value)
    }

    fn visit_like(&mut self, value: &Value) -> Result<Self::Output> {
        self.visit_leaf(ConstraintKind::Like, value)
    }

    fn visit_less(&mut self, value: &Value) -> Result<Self::Output> {
        self.visit_leaf(ConstraintKind::Less, value)
    }

    fn visit_less_equal(&mut self, value: &Value) -> Result<Self::Output> {
        self.visit_leaf(ConstraintKind::LessEqual, value)
    }

    fn visit_greater(&mut self, value: &Value) -> Result<Self::Output> {
        self.visit_leaf(ConstraintKind::Greater, value)
    }

    fn visit_greater_equal(&mut self, value: &Value) -> Result<Self::Output> {
        self.visit_leaf(ConstraintKind::GreaterEqual, value)
    }

    fn visit_and(&mut self, children: &[Constraint]) -> Result<Self::Output> {
        self.visit_compound(ConstraintKind::And, children)
    }

    fn visit_or(&mut self, children: &[Constraint]) -> Result<Self::Output> {
        self.visit_compound(ConstraintKind::Or, children)
    }

    fn visit_leaf(&mut self, kind: ConstraintKind, _value: &Value) -> Result<Self::Output> {
        Err(Error::capability(format!(
            "constraint {} not supported",
            kind.name()
        )))
    }

    fn visit_compound(
        &mut self,
        kind: ConstraintKind,
        _children: &[Constraint],
    ) -> Result<Self::Output> {
        Err(Error::capability(format!(
            "constraint {} not supported",
            kind.name()
        )))
    }
}
