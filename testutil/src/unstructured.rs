//! Typed access to fields of objects whose shape is only known at runtime, held as
//! `serde_json::Value`. Lookups report a missing field or a type mismatch instead of panicking.

use serde_json::{Map, Value};
use snafu::{ensure, OptionExt, Snafu};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum Error {
    #[snafu(display("field '{}' not found", path))]
    FieldNotFound { path: String },

    #[snafu(display("field '{}' is {}, expected {}", path, actual, expected))]
    TypeMismatch {
        path: String,
        expected: &'static str,
        actual: &'static str,
    },
}

/// Returns the value at `fields`, e.g. `&["status", "conditions"]`.
pub fn nested_field<'a>(object: &'a Value, fields: &[&str]) -> Result<&'a Value> {
    let mut current = object;
    for (i, field) in fields.iter().enumerate() {
        let map = current.as_object().context(TypeMismatchSnafu {
            path: join(&fields[..i]),
            expected: "a map",
            actual: type_name(current),
        })?;
        current = map.get(*field).context(FieldNotFoundSnafu {
            path: join(&fields[..=i]),
        })?;
    }
    Ok(current)
}

pub fn nested_bool(object: &Value, fields: &[&str]) -> Result<bool> {
    let value = nested_field(object, fields)?;
    value.as_bool().context(TypeMismatchSnafu {
        path: join(fields),
        expected: "a bool",
        actual: type_name(value),
    })
}

pub fn nested_str<'a>(object: &'a Value, fields: &[&str]) -> Result<&'a str> {
    let value = nested_field(object, fields)?;
    value.as_str().context(TypeMismatchSnafu {
        path: join(fields),
        expected: "a string",
        actual: type_name(value),
    })
}

pub fn nested_i64(object: &Value, fields: &[&str]) -> Result<i64> {
    let value = nested_field(object, fields)?;
    value.as_i64().context(TypeMismatchSnafu {
        path: join(fields),
        expected: "an integer",
        actual: type_name(value),
    })
}

pub fn nested_slice<'a>(object: &'a Value, fields: &[&str]) -> Result<&'a Vec<Value>> {
    let value = nested_field(object, fields)?;
    value.as_array().context(TypeMismatchSnafu {
        path: join(fields),
        expected: "a list",
        actual: type_name(value),
    })
}

pub fn nested_map<'a>(object: &'a Value, fields: &[&str]) -> Result<&'a Map<String, Value>> {
    let value = nested_field(object, fields)?;
    value.as_object().context(TypeMismatchSnafu {
        path: join(fields),
        expected: "a map",
        actual: type_name(value),
    })
}

/// Sets `value` at `fields`, creating intermediate maps where they are missing or null.
pub fn set_nested_field<V>(object: &mut Value, fields: &[&str], value: V) -> Result<()>
where
    V: Into<Value>,
{
    ensure!(!fields.is_empty(), FieldNotFoundSnafu { path: "" });
    let mut current = object;
    for (i, field) in fields.iter().enumerate() {
        if current.is_null() {
            *current = Value::Object(Map::new());
        }
        let actual = type_name(current);
        let map = current.as_object_mut().context(TypeMismatchSnafu {
            path: join(&fields[..i]),
            expected: "a map",
            actual,
        })?;
        if i == fields.len() - 1 {
            map.insert((*field).to_string(), value.into());
            return Ok(());
        }
        current = map.entry(*field).or_insert(Value::Null);
    }
    Ok(())
}

fn join(fields: &[&str]) -> String {
    if fields.is_empty() {
        ".".to_string()
    } else {
        fields.join(".")
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a bool",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "a map",
    }
}
