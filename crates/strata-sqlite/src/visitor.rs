use strata_core::{
    Constraint, ConstraintKind, ConstraintSet, ConstraintVisitor, Error, Result, Value,
};

/// Lowers a constraint set into a SQL WHERE clause plus ordered bind
/// parameters. Every supported constraint kind maps onto a SQLite operator;
/// compound nodes parenthesize their children.
pub struct SqlVisitor {
    column: String,
    params: Vec<Value>,
}

impl SqlVisitor {
    /// Produce the WHERE clause body for a whole constraint set. Per-field
    /// trees are joined with `and`; bind parameters come back in the order
    /// their placeholders appear.
    pub fn lower(constraints: &ConstraintSet) -> Result<(String, Vec<Value>)> {
        let mut visitor = SqlVisitor {
            column: String::new(),
            params: vec![],
        };
        let mut clauses = Vec::with_capacity(constraints.len());
        for (column, constraint) in constraints {
            visitor.column = column.clone();
            clauses.push(visitor.visit(constraint)?);
        }
        Ok((clauses.join(" and "), visitor.params))
    }
}

impl ConstraintVisitor for SqlVisitor {
    type Output = String;

    fn visit_leaf(&mut self, kind: ConstraintKind, value: &Value) -> Result<String> {
        let op = match kind {
            ConstraintKind::Equal => "=",
            ConstraintKind::Like => "like",
            ConstraintKind::Less => "<",
            ConstraintKind::LessEqual => "<=",
            ConstraintKind::Greater => ">",
            ConstraintKind::GreaterEqual => ">=",
            ConstraintKind::And | ConstraintKind::Or => {
                return Err(Error::capability(format!(
                    "constraint {} is not a comparison",
                    kind.name()
                )))
            }
        };
        self.params.push(value.clone());
        Ok(format!("{} {} ?", self.column, op))
    }

    fn visit_compound(&mut self, kind: ConstraintKind, children: &[Constraint]) -> Result<String> {
        let joiner = match kind {
            ConstraintKind::And => " and ",
            ConstraintKind::Or => " or ",
            _ => {
                return Err(Error::capability(format!(
                    "constraint {} is not a junction",
                    kind.name()
                )))
            }
        };
        if children.is_empty() {
            // An empty Or matches nothing; it arises when nominal
            // resolution finds no referent. An empty And matches all.
            return Ok(match kind {
                ConstraintKind::Or => "1 = 0".to_string(),
                _ => "1 = 1".to_string(),
            });
        }
        let parts = children
            .iter()
            .map(|child| self.visit(child))
            .collect::<Result<Vec<_>>>()?;
        Ok(format!("({})", parts.join(joiner)))
    }
}
