use super::Constraint;
use crate::backend::ConstraintSet;
use crate::model::ModelSchema;
use crate::value::Value;
use crate::{Error, Result};

use indexmap::IndexMap;

/// An ordered set of filter predicates, keyed by `attribute[__operator]`.
///
/// This is the caller-facing query surface: raw values are auto-wrapped in
/// equality, operator suffixes select richer constraint kinds.
///
/// ```
/// use strata_core::Query;
///
/// let query = Query::new()
///     .with("name__like", "Jita%")
///     .with("security__ge", 0.5);
/// assert_eq!(query.len(), 2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Query {
    items: Vec<(String, Constraint)>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a predicate. `key` is an attribute name, optionally suffixed
    /// with `__` and an operator name (`eq`, `like`, `lt`, `le`, `lte`,
    /// `gt`, `ge`, `gte`, `all`, `any`).
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Constraint>) -> Self {
        self.items.push((key.into(), value.into()));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub(crate) fn items(&self) -> &[(String, Constraint)] {
        &self.items
    }
}

/// Resolve a caller query against a model's field registry, producing a
/// backend-native constraint set: leaves pass through each field's encode
/// direction, keys become backend field names, and multiple constraints
/// on one field merge under `And`.
pub(crate) fn parse(schema: &ModelSchema, query: &Query) -> Result<ConstraintSet> {
    let mut grouped: IndexMap<String, Vec<Constraint>> = IndexMap::new();

    for (key, supplied) in query.items() {
        let (attr, op) = match key.split_once("__") {
            Some((attr, op)) => (attr, Some(op)),
            None => (key.as_str(), None),
        };

        let field = schema
            .field(attr)
            .ok_or_else(|| Error::unknown_field(attr))?;

        let constraint = match op {
            Some(op) => apply_operator(op, supplied.clone())?,
            None => supplied.clone(),
        };
        let encoded = field.encode_constraint(&constraint)?;

        let backend_name = field
            .get_backend_name()
            .expect("field backend name is assigned at registration")
            .to_string();
        grouped.entry(backend_name).or_default().push(encoded);
    }

    let mut set = ConstraintSet::new();
    for (name, mut constraints) in grouped {
        let merged = if constraints.len() == 1 {
            constraints.pop().unwrap()
        } else {
            Constraint::And(constraints)
        };
        set.insert(name, merged);
    }
    Ok(set)
}

/// The fixed operator name table, including aliases.
fn apply_operator(op: &str, operand: Constraint) -> Result<Constraint> {
    fn plain(operand: Constraint) -> Result<Value> {
        match operand {
            Constraint::Equal(v) => Ok(v),
            other => Err(Error::query(format!(
                "operator expects a plain value, not a constraint: {other:?}"
            ))),
        }
    }

    fn children(operand: Constraint) -> Vec<Constraint> {
        match operand {
            Constraint::Equal(Value::List(items)) => {
                items.into_iter().map(Constraint::from).collect()
            }
            other => vec![other],
        }
    }

    match op {
        "equal" | "eq" => Ok(Constraint::Equal(plain(operand)?)),
        "like" => Ok(Constraint::Like(plain(operand)?)),
        "less" | "lt" => Ok(Constraint::Less(plain(operand)?)),
        "less_equal" | "le" | "lte" => Ok(Constraint::LessEqual(plain(operand)?)),
        "greater" | "gt" => Ok(Constraint::Greater(plain(operand)?)),
        "greater_equal" | "ge" | "gte" => Ok(Constraint::GreaterEqual(plain(operand)?)),
        "and" | "all" => Ok(Constraint::And(children(operand))),
        "or" | "any" => Ok(Constraint::Or(children(operand))),
        other => Err(Error::unknown_operator(other)),
    }
}
