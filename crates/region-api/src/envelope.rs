//! Unwrapping of the region API response envelope.
//!
//! Collection endpoints answer `{"list": [...]}` and single-entity endpoints
//! answer `{"bean": {...}}`. Other keys in the envelope (status codes, paging
//! hints) are ignored.

use crate::Result;
use region_core::Error;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Envelope field carrying collections.
pub const LIST_FIELD: &str = "list";
/// Envelope field carrying a single entity.
pub const BEAN_FIELD: &str = "bean";

/// Decode the `list` field of an envelope.
///
/// A `null` list decodes to an empty vector. A missing `list` key, a body
/// that is not a JSON object, or entries not matching `T` are decode errors.
///
/// # Errors
///
/// Returns [`Error::DecodeError`] as described above.
pub fn decode_list<T>(body: &[u8]) -> Result<Vec<T>>
where
    T: DeserializeOwned,
{
    match take_field(body, LIST_FIELD)? {
        Value::Null => Ok(Vec::new()),
        list @ Value::Array(_) => serde_json::from_value(list).map_err(|err| {
            Error::DecodeError(format!("invalid `{LIST_FIELD}` entries: {err}"))
        }),
        other => Err(Error::DecodeError(format!(
            "`{LIST_FIELD}` is not an array: {}",
            type_name(&other)
        ))),
    }
}

/// Decode the `bean` field of an envelope.
///
/// # Errors
///
/// Returns [`Error::DecodeError`] if the body is not JSON, the `bean` key is
/// missing, or its value does not match `T`.
pub fn decode_bean<T>(body: &[u8]) -> Result<T>
where
    T: DeserializeOwned,
{
    let bean = take_field(body, BEAN_FIELD)?;
    serde_json::from_value(bean)
        .map_err(|err| Error::DecodeError(format!("invalid `{BEAN_FIELD}`: {err}")))
}

fn take_field(body: &[u8], field: &str) -> Result<Value> {
    let value: Value = serde_json::from_slice(body)?;
    match value {
        Value::Object(mut map) => map
            .remove(field)
            .ok_or_else(|| Error::DecodeError(format!("response has no `{field}` field"))),
        other => Err(Error::DecodeError(format!(
            "response is not a JSON object: {}",
            type_name(&other)
        ))),
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Item {
        name: String,
    }

    #[test]
    fn decode_list_entries() {
        let items: Vec<Item> =
            decode_list(br#"{"code":200,"list":[{"name":"a"},{"name":"b"}]}"#).unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[1].name, "b");
    }

    #[test]
    fn decode_null_list_is_empty() {
        let items: Vec<Item> = decode_list(br#"{"list":null}"#).unwrap();
        assert!(items.is_empty());
    }

    #[test]
    fn decode_list_missing_field() {
        let err = decode_list::<Item>(br#"{"bean":{}}"#).unwrap_err();
        assert!(matches!(err, Error::DecodeError(msg) if msg.contains("list")));
    }

    #[test]
    fn decode_list_not_an_array() {
        let err = decode_list::<Item>(br#"{"list":{"name":"a"}}"#).unwrap_err();
        assert!(matches!(err, Error::DecodeError(msg) if msg.contains("object")));
    }

    #[test]
    fn decode_list_not_json() {
        let err = decode_list::<Item>(b"<html>bad gateway</html>").unwrap_err();
        assert!(matches!(err, Error::DecodeError(_)));
    }

    #[test]
    fn decode_bean_entity() {
        let item: Item = decode_bean(br#"{"bean":{"name":"solo"}}"#).unwrap();
        assert_eq!(item, Item { name: "solo".into() });
    }

    #[test]
    fn decode_bean_top_level_array() {
        let err = decode_bean::<Item>(br#"[{"name":"solo"}]"#).unwrap_err();
        assert!(matches!(err, Error::DecodeError(msg) if msg.contains("array")));
    }
}
