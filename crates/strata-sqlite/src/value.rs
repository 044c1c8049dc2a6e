use rusqlite::types::{ToSql, ToSqlOutput, Value as SqlValue, ValueRef};
use rusqlite::Row;
use strata_core::Value;

/// Bind-parameter adapter between [`strata_core::Value`] and rusqlite.
#[derive(Debug)]
pub(crate) struct Param<'a>(pub(crate) &'a Value);

impl ToSql for Param<'_> {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        match self.0 {
            Value::Bool(true) => Ok(ToSqlOutput::Owned(SqlValue::Integer(1))),
            Value::Bool(false) => Ok(ToSqlOutput::Owned(SqlValue::Integer(0))),
            Value::I64(v) => Ok(ToSqlOutput::Owned(SqlValue::Integer(*v))),
            Value::F64(v) => Ok(ToSqlOutput::Owned(SqlValue::Real(*v))),
            Value::String(v) => Ok(ToSqlOutput::Borrowed(ValueRef::Text(v.as_bytes()))),
            Value::Null => Ok(ToSqlOutput::Owned(SqlValue::Null)),
            other => Err(rusqlite::Error::ToSqlConversionFailure(
                format!("{other:?} cannot be bound as a SQL parameter").into(),
            )),
        }
    }
}

/// Converts one column of a result row into a core value. SQLite integers
/// come back as `I64`; any boolean shaping happens in field transforms.
pub(crate) fn column_value(row: &Row<'_>, index: usize) -> rusqlite::Result<Value> {
    let value: SqlValue = row.get(index)?;
    Ok(match value {
        SqlValue::Null => Value::Null,
        SqlValue::Integer(v) => Value::I64(v),
        SqlValue::Real(v) => Value::F64(v),
        SqlValue::Text(v) => Value::String(v),
        SqlValue::Blob(_) => {
            return Err(rusqlite::Error::InvalidColumnType(
                index,
                "blob columns have no model representation".to_string(),
                rusqlite::types::Type::Blob,
            ))
        }
    })
}
