//! Typed field extraction from `GitLab` JSON objects.

use gitlab_authn_sdk::MalformedUserDataError;
use serde_json::{Map, Value};

pub type Object = Map<String, Value>;

pub fn object(json: &Value) -> Result<&Object, MalformedUserDataError> {
    json.as_object().ok_or(MalformedUserDataError::NotAnObject)
}

pub fn required_i64(obj: &Object, field: &'static str) -> Result<i64, MalformedUserDataError> {
    match obj.get(field) {
        None | Some(Value::Null) => Err(MalformedUserDataError::MissingField(field)),
        Some(value) => value.as_i64().ok_or(MalformedUserDataError::WrongType {
            field,
            expected: "a 64-bit integer",
        }),
    }
}

pub fn required_str<'a>(
    obj: &'a Object,
    field: &'static str,
) -> Result<&'a str, MalformedUserDataError> {
    match obj.get(field) {
        None | Some(Value::Null) => Err(MalformedUserDataError::MissingField(field)),
        Some(Value::String(s)) if s.is_empty() => Err(MalformedUserDataError::EmptyField(field)),
        Some(Value::String(s)) => Ok(s),
        Some(_) => Err(MalformedUserDataError::WrongType {
            field,
            expected: "a string",
        }),
    }
}

/// Absent and `null` both read as `""`.
pub fn optional_str<'a>(
    obj: &'a Object,
    field: &'static str,
) -> Result<&'a str, MalformedUserDataError> {
    match obj.get(field) {
        None | Some(Value::Null) => Ok(""),
        Some(Value::String(s)) => Ok(s),
        Some(_) => Err(MalformedUserDataError::WrongType {
            field,
            expected: "a string",
        }),
    }
}
