use crate::constraint::Constraint;
use crate::model::ModelSchema;
use crate::name::NamePair;
use crate::value::{Record, Value};
use crate::Result;

use indexmap::IndexMap;
use std::fmt::Debug;

/// Parsed, backend-native constraints: one tree per backend field name.
pub type ConstraintSet = IndexMap<String, Constraint>;

/// The capability contract each data source implements.
///
/// A backend is stateless or carries only connection/session handles; it is
/// never itself cached. Raw records are mappings from backend key name to
/// scalar or nested values, in whatever shape the backend produces.
pub trait Backend: Debug + Send + Sync + 'static {
    /// The backend key under which this source exposes a stable record
    /// identity, if it has one.
    fn identity_key(&self, model: &ModelSchema) -> Option<String>;

    /// The naming conventions used to derive backend field names from
    /// model attribute names.
    fn conventions(&self) -> NamePair {
        NamePair::default()
    }

    /// Fetch the single record with the given identity value.
    ///
    /// Returns a [`not found`](crate::Error::not_found) error when no such
    /// record exists.
    fn fetch_single(&self, model: &ModelSchema, id: &Value) -> Result<Record>;

    /// Fetch every record matching the constraint set. An empty set means
    /// an unconstrained fetch.
    fn fetch(&self, model: &ModelSchema, constraints: &ConstraintSet) -> Result<Vec<Record>>;

    /// Optional hook invoked once at model registration; backends that can
    /// inspect their schema reject field names the source does not have.
    fn verify_schema(&self, _model: &ModelSchema) -> Result<()> {
        Ok(())
    }
}
