use strata_core::{ConstraintVisitor, Result, Value};

/// Accepts pure conjunction-of-equality trees and collects the values the
/// record field must equal. Every other constraint kind falls through to
/// the default capability error, `Or` included: a disjunction against a
/// listing could be evaluated here, but only by guessing at the source's
/// matching semantics, so it is refused instead.
pub struct EqualityVisitor {
    required: Vec<Value>,
}

impl EqualityVisitor {
    pub fn new() -> Self {
        Self { required: vec![] }
    }

    pub fn into_required(self) -> Vec<Value> {
        self.required
    }
}

impl Default for EqualityVisitor {
    fn default() -> Self {
        Self::new()
    }
}

impl ConstraintVisitor for EqualityVisitor {
    type Output = ();

    fn visit_equal(&mut self, value: &Value) -> Result<()> {
        self.required.push(value.clone());
        Ok(())
    }

    fn visit_and(&mut self, children: &[strata_core::Constraint]) -> Result<()> {
        for child in children {
            self.visit(child)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_core::Constraint;

    #[test]
    fn equalities_and_conjunctions_are_collected() {
        let tree = Constraint::And(vec![
            Constraint::Equal(Value::I64(1)),
            Constraint::Equal(Value::I64(2)),
        ]);
        let mut visitor = EqualityVisitor::new();
        visitor.visit(&tree).unwrap();
        assert_eq!(visitor.into_required(), vec![Value::I64(1), Value::I64(2)]);
    }

    #[test]
    fn every_other_kind_is_refused() {
        let refused = [
            Constraint::Like(Value::from("Jita%")),
            Constraint::Less(Value::I64(3)),
            Constraint::Or(vec![Constraint::Equal(Value::I64(1))]),
            Constraint::And(vec![Constraint::Greater(Value::I64(0))]),
        ];
        for tree in refused {
            let err = EqualityVisitor::new().visit(&tree).unwrap_err();
            assert!(err.is_capability());
        }
    }
}
