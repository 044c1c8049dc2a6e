pub mod backend;
pub use backend::{Backend, ConstraintSet};

pub mod constraint;
pub use constraint::{Constraint, ConstraintKind, ConstraintVisitor, Query};

mod error;
pub use error::Error;

pub mod field;
pub use field::Field;

pub mod model;
pub use model::{Model, ModelBuilder, ModelSchema, Obj};

pub mod name;
pub use name::{NamePair, NamingConvention};

pub mod transform;
pub use transform::Transform;

pub mod value;
pub use value::{Record, Value};

/// A Result type alias that uses strata's [`Error`] type.
pub type Result<T> = core::result::Result<T, Error>;
