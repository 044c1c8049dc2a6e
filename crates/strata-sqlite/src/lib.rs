//! SQLite backend for strata models.
//!
//! Records live in ordinary SQLite tables; the implicit `rowid` serves as
//! the record identity. Constraint trees lower to WHERE clauses via
//! [`SqlVisitor`], and model schemas are checked against `pragma
//! table_info` at registration.

mod value;
mod visitor;

pub use visitor::SqlVisitor;

use value::{column_value, Param};

use rusqlite::Connection;
use std::path::Path;
use std::sync::Mutex;
use strata_core::{
    Backend, ConstraintSet, Error, ModelSchema, NamePair, NamingConvention, Record, Result, Value,
};
use url::Url;

/// A backend over a single SQLite database.
///
/// The connection is not thread-safe on its own, so it sits behind a
/// `Mutex`; queries are short and the lock is released before any decoded
/// value reaches model code.
#[derive(Debug)]
pub struct SqliteBackend {
    connection: Mutex<Connection>,
}

impl SqliteBackend {
    /// Open from a `sqlite:` connection URL. `sqlite::memory:` yields a
    /// fresh in-memory database.
    pub fn new(url: impl Into<String>) -> Result<Self> {
        let url_str = url.into();
        let url = Url::parse(&url_str)
            .map_err(|err| Error::unavailable(format!("invalid connection URL {url_str}: {err}")))?;
        if url.scheme() != "sqlite" {
            return Err(Error::unavailable(format!(
                "connection URL does not have a `sqlite` scheme; url={url_str}"
            )));
        }
        if url.path() == ":memory:" {
            Self::in_memory()
        } else {
            Self::open(url.path())
        }
    }

    /// Open an existing database file. A missing file is an availability
    /// error rather than an empty database.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(Error::unavailable(format!(
                "database file {} does not exist",
                path.display()
            )));
        }
        let connection = Connection::open(path).map_err(|err| {
            Error::unavailable(format!("cannot open {}: {err}", path.display()))
        })?;
        Ok(Self::from_connection(connection))
    }

    pub fn in_memory() -> Result<Self> {
        let connection = Connection::open_in_memory().map_err(Error::backend)?;
        Ok(Self::from_connection(connection))
    }

    /// Wrap an already-open connection. Useful for tests that seed their
    /// own tables.
    pub fn from_connection(connection: Connection) -> Self {
        Self {
            connection: Mutex::new(connection),
        }
    }

    fn query(&self, sql: &str, params: &[Value]) -> Result<Vec<Record>> {
        let connection = self.connection.lock().unwrap();
        let mut stmt = connection.prepare_cached(sql).map_err(Error::backend)?;
        let columns: Vec<String> = stmt
            .column_names()
            .into_iter()
            .map(str::to_string)
            .collect();

        let params: Vec<Param<'_>> = params.iter().map(Param).collect();
        let mut rows = stmt
            .query(rusqlite::params_from_iter(params.iter()))
            .map_err(Error::backend)?;

        let mut records = vec![];
        while let Some(row) = rows.next().map_err(Error::backend)? {
            let mut record = Record::new();
            for (index, column) in columns.iter().enumerate() {
                record.insert(column.clone(), column_value(row, index).map_err(Error::backend)?);
            }
            records.push(record);
        }
        Ok(records)
    }
}

impl Backend for SqliteBackend {
    fn identity_key(&self, _model: &ModelSchema) -> Option<String> {
        Some("rowid".to_string())
    }

    fn conventions(&self) -> NamePair {
        NamePair::new(NamingConvention::Snake, NamingConvention::camel())
    }

    fn fetch_single(&self, model: &ModelSchema, id: &Value) -> Result<Record> {
        let sql = format!("select rowid, * from {} where rowid = ?", model.source());
        tracing::debug!(model = model.name(), id = %id, "fetch single");
        self.query(&sql, std::slice::from_ref(id))?
            .into_iter()
            .next()
            .ok_or_else(|| Error::not_found(format!("{} id={id}", model.name())))
    }

    fn fetch(&self, model: &ModelSchema, constraints: &ConstraintSet) -> Result<Vec<Record>> {
        let mut sql = format!("select rowid, * from {}", model.source());
        let mut params = vec![];
        if !constraints.is_empty() {
            let (clause, bound) = SqlVisitor::lower(constraints)?;
            sql.push_str(" where ");
            sql.push_str(&clause);
            params = bound;
        }
        tracing::debug!(model = model.name(), sql = %sql, "fetch");
        self.query(&sql, &params)
    }

    fn verify_schema(&self, model: &ModelSchema) -> Result<()> {
        let columns: Vec<String> = {
            let connection = self.connection.lock().unwrap();
            let mut stmt = connection
                .prepare(&format!("pragma table_info({})", model.source()))
                .map_err(Error::backend)?;
            let mut rows = stmt.query([]).map_err(Error::backend)?;
            let mut columns = vec![];
            while let Some(row) = rows.next().map_err(Error::backend)? {
                columns.push(row.get::<_, String>(1).map_err(Error::backend)?);
            }
            columns
        };
        if columns.is_empty() {
            return Err(Error::schema(format!(
                "{} maps to missing table {}",
                model.name(),
                model.source()
            )));
        }
        for (attr, field) in model.fields() {
            let name = field.get_backend_name().unwrap_or(attr);
            // rowid is implicit and never listed by table_info
            if name == "rowid" {
                continue;
            }
            if !columns.iter().any(|column| column == name) {
                return Err(Error::schema(format!(
                    "table {} has no column {name} (attribute {attr} of {})",
                    model.source(),
                    model.name()
                )));
            }
        }
        Ok(())
    }
}
