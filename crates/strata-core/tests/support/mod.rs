//! A minimal in-memory backend for exercising the model layer without any
//! real data source. Rows live in a table map keyed by source name; the
//! constraint evaluator understands the full constraint algebra.

use strata_core::{
    Backend, Constraint, ConstraintSet, ConstraintVisitor, Error, ModelSchema, NamePair,
    NamingConvention, Record, Result, Value,
};

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

#[derive(Debug, Default)]
pub struct MemoryBackend {
    tables: Mutex<HashMap<String, Vec<Record>>>,
    single_fetches: AtomicUsize,
    last_constraints: Mutex<Option<ConstraintSet>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, source: &str, record: Record) {
        let mut tables = self.tables.lock().unwrap();
        tables.entry(source.to_string()).or_default().push(record);
    }

    /// Number of fetch_single calls that reached the backend.
    pub fn single_fetches(&self) -> usize {
        self.single_fetches.load(Ordering::SeqCst)
    }

    /// The constraint set handed to the most recent fetch.
    pub fn last_constraints(&self) -> Option<ConstraintSet> {
        self.last_constraints.lock().unwrap().clone()
    }
}

impl Backend for MemoryBackend {
    fn identity_key(&self, _model: &ModelSchema) -> Option<String> {
        Some("id".to_string())
    }

    fn conventions(&self) -> NamePair {
        NamePair::new(NamingConvention::Snake, NamingConvention::camel())
    }

    fn fetch_single(&self, model: &ModelSchema, id: &Value) -> Result<Record> {
        self.single_fetches.fetch_add(1, Ordering::SeqCst);
        let tables = self.tables.lock().unwrap();
        tables
            .get(model.source())
            .and_then(|rows| rows.iter().find(|row| row.get("id") == Some(id)))
            .cloned()
            .ok_or_else(|| Error::not_found(format!("{} id={id}", model.name())))
    }

    fn fetch(&self, model: &ModelSchema, constraints: &ConstraintSet) -> Result<Vec<Record>> {
        *self.last_constraints.lock().unwrap() = Some(constraints.clone());
        let tables = self.tables.lock().unwrap();
        let rows = tables.get(model.source()).cloned().unwrap_or_default();

        let mut matched = vec![];
        for row in rows {
            let mut keep = true;
            for (key, constraint) in constraints {
                let value = row.get(key).cloned().unwrap_or(Value::Null);
                let mut matcher = Matcher { value: &value };
                if !matcher.visit(constraint)? {
                    keep = false;
                    break;
                }
            }
            if keep {
                matched.push(row);
            }
        }
        Ok(matched)
    }
}

/// Evaluates one field's constraint tree against a row value.
struct Matcher<'a> {
    value: &'a Value,
}

impl ConstraintVisitor for Matcher<'_> {
    type Output = bool;

    fn visit_equal(&mut self, value: &Value) -> Result<bool> {
        Ok(self.value == value)
    }

    fn visit_like(&mut self, pattern: &Value) -> Result<bool> {
        let (Some(value), Some(pattern)) = (self.value.as_str(), pattern.as_str()) else {
            return Ok(false);
        };
        Ok(like_match(value, pattern))
    }

    fn visit_less(&mut self, value: &Value) -> Result<bool> {
        Ok(self.value.partial_cmp(value) == Some(std::cmp::Ordering::Less))
    }

    fn visit_less_equal(&mut self, value: &Value) -> Result<bool> {
        Ok(matches!(
            self.value.partial_cmp(value),
            Some(std::cmp::Ordering::Less | std::cmp::Ordering::Equal)
        ))
    }

    fn visit_greater(&mut self, value: &Value) -> Result<bool> {
        Ok(self.value.partial_cmp(value) == Some(std::cmp::Ordering::Greater))
    }

    fn visit_greater_equal(&mut self, value: &Value) -> Result<bool> {
        Ok(matches!(
            self.value.partial_cmp(value),
            Some(std::cmp::Ordering::Greater | std::cmp::Ordering::Equal)
        ))
    }

    fn visit_and(&mut self, children: &[Constraint]) -> Result<bool> {
        for child in children {
            if !self.visit(child)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn visit_or(&mut self, children: &[Constraint]) -> Result<bool> {
        for child in children {
            if self.visit(child)? {
                return Ok(true);
            }
        }
        Ok(false)
    }
}

/// `%`-wildcard matching, enough for test patterns.
fn like_match(value: &str, pattern: &str) -> bool {
    let segments: Vec<&str> = pattern.split('%').collect();
    if segments.len() == 1 {
        return value == pattern;
    }

    let mut rest = value;
    for (i, segment) in segments.iter().enumerate() {
        if segment.is_empty() {
            continue;
        }
        if i == 0 {
            match rest.strip_prefix(segment) {
                Some(tail) => rest = tail,
                None => return false,
            }
        } else if i == segments.len() - 1 {
            return rest.ends_with(segment);
        } else {
            match rest.find(segment) {
                Some(pos) => rest = &rest[pos + segment.len()..],
                None => return false,
            }
        }
    }
    true
}
