//! JSON value types shared by variables and response data.

use serde_json_bytes::ByteString;
use serde_json_bytes::Map;
pub use serde_json_bytes::Value;

/// A JSON object, as found in GraphQL variables and response data.
pub type Object = Map<ByteString, Value>;

/// Merge `other` into `value` the way GraphQL merges the results of two selections that share a
/// response key: objects are merged key by key, lists element by element, and for anything else the
/// value already present wins.
pub(crate) fn deep_merge(value: &mut Value, other: Value) {
    match (value, other) {
        (Value::Object(object), Value::Object(other)) => {
            for (key, other_value) in other {
                match object.get_mut(key.as_str()) {
                    Some(existing) => deep_merge(existing, other_value),
                    None => {
                        object.insert(key, other_value);
                    }
                }
            }
        }
        (Value::Array(items), Value::Array(other)) => {
            let mut other = other.into_iter();
            for (item, other_item) in items.iter_mut().zip(other.by_ref()) {
                deep_merge(item, other_item);
            }
            items.extend(other);
        }
        (value, other) if value.is_null() => *value = other,
        _ => {}
    }
}
