//! Read-only typed models over heterogeneous data stores.
//!
//! Declare a [`Model`] per backend collection, then filter and fetch typed
//! instances through it; field transforms, foreign keys, and per-model
//! identity caching come with the declaration. Backends are enabled by
//! feature:
//!
//! - `sqlite`: local SQLite databases ([`backend::sqlite`])
//! - `listing`: flat remote listings ([`backend::listing`])

pub mod backend {
    pub use strata_core::Backend;

    #[cfg(feature = "listing")]
    pub mod listing {
        pub use strata_listing::{rows_from_json, EqualityVisitor, ListingBackend, ListingSource};
    }

    #[cfg(feature = "sqlite")]
    pub mod sqlite {
        pub use strata_sqlite::{SqlVisitor, SqliteBackend};
    }
}

pub mod cache {
    pub use strata_cache::{Clock, DiskCache, ManualClock, MonotonicClock, TimedCache};
}

pub use strata_core::{
    constraint, field, model, name, transform, value, Constraint, ConstraintKind, ConstraintSet,
    ConstraintVisitor, Error, Field, Model, ModelBuilder, ModelSchema, NamePair, NamingConvention,
    Obj, Query, Record, Result, Transform, Value,
};
