use strata_core::{Error, Record, Result, Value};

use serde_json::Value as Json;

/// Decode a JSON array of objects into raw records, the common shape of a
/// feed endpoint. Nested objects become nested records; numbers decode as
/// `I64` when integral, `F64` otherwise.
pub fn rows_from_json(payload: &str) -> Result<Vec<Record>> {
    let json: Json = serde_json::from_str(payload).map_err(Error::backend)?;
    let Json::Array(items) = json else {
        return Err(Error::schema("listing payload is not a JSON array"));
    };
    items
        .into_iter()
        .map(|item| match convert(item) {
            Value::Record(record) => Ok(record),
            other => Err(Error::schema(format!(
                "listing row is not a JSON object; row={other:?}"
            ))),
        })
        .collect()
}

fn convert(json: Json) -> Value {
    match json {
        Json::Null => Value::Null,
        Json::Bool(v) => Value::Bool(v),
        Json::Number(v) => match v.as_i64() {
            Some(v) => Value::I64(v),
            None => Value::F64(v.as_f64().unwrap_or(f64::NAN)),
        },
        Json::String(v) => Value::String(v),
        Json::Array(items) => Value::List(items.into_iter().map(convert).collect()),
        Json::Object(entries) => Value::Record(
            entries
                .into_iter()
                .map(|(key, value)| (key, convert(value)))
                .collect(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arrays_of_objects_become_records() {
        let rows = rows_from_json(
            r#"[
                {"stationID": 60003760, "stationName": "Jita IV - Moon 4", "standing": 0.5},
                {"stationID": 60008494, "stationName": "Amarr VIII", "services": ["market"]}
            ]"#,
        )
        .unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get("stationID"), Some(&Value::I64(60003760)));
        assert_eq!(rows[0].get("standing"), Some(&Value::F64(0.5)));
        assert_eq!(
            rows[1].get("services"),
            Some(&Value::List(vec![Value::from("market")]))
        );
    }

    #[test]
    fn nested_objects_become_nested_records() {
        let rows = rows_from_json(r#"[{"position": {"x": 1, "y": 2}}]"#).unwrap();
        let Some(Value::Record(position)) = rows[0].get("position") else {
            panic!("expected a nested record");
        };
        assert_eq!(position.get("x"), Some(&Value::I64(1)));
    }

    #[test]
    fn non_array_payloads_are_schema_errors() {
        assert!(rows_from_json(r#"{"not": "an array"}"#).unwrap_err().is_schema());
        assert!(rows_from_json("[1, 2]").unwrap_err().is_schema());
    }

    #[test]
    fn malformed_json_is_a_backend_error() {
        assert!(rows_from_json("[{").unwrap_err().is_backend());
    }
}
