//! Conversion between JSON and selector values.
//!
//! Selectors are entered as plain JSON. Integers must fit in an `i64` and
//! floats are refused, since the selector codec has no float type. Byte
//! strings use the DAG-JSON form `{"/": {"bytes": "<unpadded base64>"}}`
//! in both directions.

use base64::engine::general_purpose::STANDARD_NO_PAD as BASE64_ENGINE;
use base64::Engine;
use selstore_codec::Value;
use serde_json::{Map, Number, Value as Json};
use thiserror::Error;

/// Errors converting JSON input into a selector.
#[derive(Debug, Error)]
pub enum JsonError {
    /// The text is not JSON.
    #[error("invalid JSON: {0}")]
    Syntax(#[from] serde_json::Error),

    /// The JSON holds a number the selector codec cannot carry.
    #[error("unsupported number {0}: only integers within i64 are allowed")]
    UnsupportedNumber(Number),

    /// A `{"/": {"bytes": ...}}` object holds invalid base64.
    #[error("invalid bytes: {0}")]
    InvalidBytes(#[from] base64::DecodeError),
}

/// Parses JSON text into a selector value.
pub fn parse_selector(text: &str) -> Result<Value, JsonError> {
    let json: Json = serde_json::from_str(text)?;
    json_to_value(&json)
}

/// Converts parsed JSON into a selector value.
pub fn json_to_value(json: &Json) -> Result<Value, JsonError> {
    Ok(match json {
        Json::Null => Value::Null,
        Json::Bool(b) => Value::Bool(*b),
        Json::Number(n) => Value::Integer(
            n.as_i64()
                .ok_or_else(|| JsonError::UnsupportedNumber(n.clone()))?,
        ),
        Json::String(s) => Value::Text(s.clone()),
        Json::Array(items) => Value::Array(
            items
                .iter()
                .map(json_to_value)
                .collect::<Result<_, _>>()?,
        ),
        Json::Object(fields) => match bytes_literal(fields) {
            Some(text) => Value::Bytes(BASE64_ENGINE.decode(text.trim_end_matches('='))?),
            None => Value::text_map(
                fields
                    .iter()
                    .map(|(k, v)| Ok((k.clone(), json_to_value(v)?)))
                    .collect::<Result<Vec<_>, JsonError>>()?,
            ),
        },
    })
}

/// The base64 text of a `{"/": {"bytes": "..."}}` object, if `fields` is one.
fn bytes_literal(fields: &Map<String, Json>) -> Option<&str> {
    if fields.len() != 1 {
        return None;
    }
    match fields.get("/")? {
        Json::Object(inner) if inner.len() == 1 => inner.get("bytes")?.as_str(),
        _ => None,
    }
}

/// Renders a selector value as JSON.
pub fn value_to_json(value: &Value) -> Json {
    match value {
        Value::Null => Json::Null,
        Value::Bool(b) => Json::Bool(*b),
        Value::Integer(i) => Json::from(*i),
        Value::Bytes(bytes) => {
            let mut inner = Map::new();
            inner.insert("bytes".into(), Json::String(BASE64_ENGINE.encode(bytes)));
            let mut outer = Map::new();
            outer.insert("/".into(), Json::Object(inner));
            Json::Object(outer)
        }
        Value::Text(s) => Json::String(s.clone()),
        Value::Array(items) => Json::Array(items.iter().map(value_to_json).collect()),
        Value::Map(pairs) => Json::Object(
            pairs
                .iter()
                .map(|(k, v)| {
                    let key = match k {
                        Value::Text(s) => s.clone(),
                        other => value_to_json(other).to_string(),
                    };
                    (key, value_to_json(v))
                })
                .collect(),
        ),
    }
}
