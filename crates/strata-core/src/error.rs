use std::sync::Arc;

/// An error that can occur in strata.
#[derive(Clone)]
pub struct Error {
    inner: Arc<ErrorInner>,
}

#[derive(Debug)]
struct ErrorInner {
    kind: ErrorKind,
}

#[derive(Debug)]
enum ErrorKind {
    /// Unknown field or operator name in a filter call, or a malformed
    /// predicate combination.
    Query(String),

    /// A backend record is missing a required field, or an id-based
    /// operation was requested against a backend with no identity key.
    Schema(String),

    /// A single-record fetch found nothing for the given id.
    NotFound(String),

    /// Foreign-key encoding was given a non-instance value against a model
    /// that declares no nominal field.
    Resolution(String),

    /// The underlying data source is not currently loaded or reachable.
    Unavailable(String),

    /// A constraint visitor encountered a constraint kind it cannot lower.
    Capability(String),

    /// Backend I/O failure (network, disk, database driver).
    Backend(anyhow::Error),
}

impl Error {
    pub fn query(msg: impl Into<String>) -> Self {
        ErrorKind::Query(msg.into()).into()
    }

    pub fn unknown_field(name: &str) -> Self {
        Self::query(format!("invalid field: {name}"))
    }

    pub fn unknown_operator(name: &str) -> Self {
        Self::query(format!("invalid constraint operator: {name}"))
    }

    pub fn schema(msg: impl Into<String>) -> Self {
        ErrorKind::Schema(msg.into()).into()
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        ErrorKind::NotFound(msg.into()).into()
    }

    pub fn resolution(msg: impl Into<String>) -> Self {
        ErrorKind::Resolution(msg.into()).into()
    }

    pub fn unavailable(msg: impl Into<String>) -> Self {
        ErrorKind::Unavailable(msg.into()).into()
    }

    pub fn capability(msg: impl Into<String>) -> Self {
        ErrorKind::Capability(msg.into()).into()
    }

    /// Wraps an I/O or driver-level failure from a backend.
    pub fn backend(err: impl Into<anyhow::Error>) -> Self {
        ErrorKind::Backend(err.into()).into()
    }

    pub fn is_query(&self) -> bool {
        matches!(self.inner.kind, ErrorKind::Query(_))
    }

    pub fn is_schema(&self) -> bool {
        matches!(self.inner.kind, ErrorKind::Schema(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self.inner.kind, ErrorKind::NotFound(_))
    }

    pub fn is_resolution(&self) -> bool {
        matches!(self.inner.kind, ErrorKind::Resolution(_))
    }

    pub fn is_unavailable(&self) -> bool {
        matches!(self.inner.kind, ErrorKind::Unavailable(_))
    }

    pub fn is_capability(&self) -> bool {
        matches!(self.inner.kind, ErrorKind::Capability(_))
    }

    pub fn is_backend(&self) -> bool {
        matches!(self.inner.kind, ErrorKind::Backend(_))
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match &self.inner.kind {
            ErrorKind::Backend(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        use self::ErrorKind::*;

        match &self.inner.kind {
            Query(msg) => write!(f, "query error: {msg}"),
            Schema(msg) => write!(f, "schema error: {msg}"),
            NotFound(msg) => write!(f, "record not found: {msg}"),
            Resolution(msg) => write!(f, "resolution error: {msg}"),
            Unavailable(msg) => write!(f, "backend unavailable: {msg}"),
            Capability(msg) => write!(f, "capability error: {msg}"),
            Backend(err) => write!(f, "backend error: {err}"),
        }
    }
}

impl core::fmt::Debug for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        if f.alternate() {
            f.debug_struct("Error")
                .field("kind", &self.inner.kind)
                .finish()
        } else {
            core::fmt::Display::fmt(self, f)
        }
    }
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        Self {
            inner: Arc::new(ErrorInner { kind }),
        }
    }
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::backend(err)
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::backend(anyhow::Error::from(err))
    }
}
