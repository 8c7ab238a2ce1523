use serde_json::{Map, Value};

use super::error::EngineError;

/// A response reduced to the one object it describes
#[derive(Debug, Clone, PartialEq)]
pub enum Normalized {
    Object(Map<String, Value>),
    /// Null or scalar body, nothing to populate from
    Empty,
}

pub(crate) fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Decodes a response body. An empty body decodes to null.
pub fn decode(body: &[u8]) -> Result<Value, EngineError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Null);
    }
    serde_json::from_slice(body).map_err(|e| EngineError::malformed("<body>", "JSON", e.to_string()))
}

/// Lists yield their first element; an empty list means the point query matched nothing
pub fn normalize(value: Value) -> Result<Normalized, EngineError> {
    match value {
        Value::Array(items) => match items.into_iter().next() {
            Some(Value::Object(object)) => Ok(Normalized::Object(object)),
            Some(other) => Err(EngineError::malformed("[0]", "object", json_type(&other))),
            None => Err(EngineError::NotFound),
        },
        Value::Object(object) => Ok(Normalized::Object(object)),
        _ => Ok(Normalized::Empty),
    }
}
