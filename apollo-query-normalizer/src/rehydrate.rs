//! Response rehydration.
//!
//! Walks a response tree produced by a normalized operation and puts back the response keys the caller
//! asked for. The walk only needs the [`FieldAliasMap`]: paths are rebuilt from the restored keys, which
//! are the facing names recorded while normalizing.
use serde_json_bytes::ByteString;

use crate::alias_map::FieldAliasMap;
use crate::alias_map::StructuralPath;
use crate::json_ext::Object;
use crate::json_ext::Value;
use crate::json_ext::deep_merge;

/// Restore the caller-facing keys of `data`.
///
/// Without a `field_alias_map` the data is returned unchanged.
pub fn rehydrate(field_alias_map: Option<&FieldAliasMap>, data: Option<Value>) -> Option<Value> {
    match field_alias_map {
        Some(map) => data.map(|data| transform_response(map, data)),
        None => data,
    }
}

pub(crate) fn transform_response(map: &FieldAliasMap, data: Value) -> Value {
    let mut path = StructuralPath::root();
    transform_value(map, &mut path, data)
}

fn transform_value(map: &FieldAliasMap, path: &mut StructuralPath, data: Value) -> Value {
    match data {
        Value::Object(object) => Value::Object(transform_object(map, path, object)),
        // list items stay at the path of the field holding the list
        Value::Array(items) => Value::Array(
            items
                .into_iter()
                .map(|item| transform_value(map, path, item))
                .collect(),
        ),
        scalar => scalar,
    }
}

fn transform_object(map: &FieldAliasMap, path: &mut StructuralPath, object: Object) -> Object {
    let mut result = Object::new();
    for (key, value) in object {
        let key = match map.original(path, key.as_str()) {
            Some(original) => ByteString::from(original.facing_name()),
            None => key,
        };

        path.push(key.as_str());
        let value = transform_value(map, path, value);
        path.pop();

        // two canonical keys can restore to the same response key
        match result.get_mut(key.as_str()) {
            Some(existing) => deep_merge(existing, value),
            None => {
                result.insert(key, value);
            }
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json_bytes::json;

    use super::*;
    use crate::alias_map::OriginalField;

    /// Entries are `(dot-joined path, canonical key, field name, original alias)`.
    fn alias_map(entries: &[(&str, &str, &str, Option<&str>)]) -> FieldAliasMap {
        let mut map = FieldAliasMap::default();
        for (path, canonical, field, alias) in entries {
            let path: StructuralPath = path.split('.').filter(|name| !name.is_empty()).collect();
            let field = apollo_compiler::Name::new(field).unwrap();
            let alias = alias.map(|alias| apollo_compiler::Name::new(alias).unwrap());
            map.scope_mut(&path)
                .insert(canonical.to_string(), OriginalField::new(field, alias));
        }
        map
    }

    #[test]
    fn restores_nested_aliases() {
        let map = alias_map(&[
            ("", "echo", "echo", Some("echo1")),
            ("", "echo1", "echo", Some("echo2")),
            ("echo1", "k", "k", None),
            ("echo1.k", "a", "a", None),
            ("echo2", "k", "k", None),
            ("echo2", "a", "a", Some("value")),
        ]);
        let data = json!({
            "echo": { "k": { "a": "1" } },
            "echo1": { "k": { "a": "2" }, "a": "3" },
        });

        assert_eq!(
            map.rehydrate(data),
            json!({
                "echo1": { "k": { "a": "1" } },
                "echo2": { "k": { "a": "2" }, "value": "3" },
            })
        );
    }

    #[test]
    fn list_items_share_the_parent_path() {
        let map = alias_map(&[
            ("", "items", "items", Some("list")),
            ("list", "id", "id", Some("key")),
        ]);
        let data = json!({ "items": [{ "id": 1 }, null, { "id": 2 }] });

        assert_eq!(
            map.rehydrate(data),
            json!({ "list": [{ "key": 1 }, null, { "key": 2 }] })
        );
    }

    #[test]
    fn duplicated_fields_merge_back() {
        let map = alias_map(&[
            ("", "a", "a", None),
            ("", "a1", "a", None),
            ("a", "x", "x", None),
            ("a", "y", "y", None),
        ]);
        let data = json!({ "a": { "x": 1 }, "a1": { "y": 2 } });

        assert_eq!(map.rehydrate(data), json!({ "a": { "x": 1, "y": 2 } }));
    }

    #[test]
    fn unknown_keys_are_kept() {
        let map = alias_map(&[("", "echo1", "echo", None)]);
        let data = json!({ "__typename": "Query", "echo1": "x" });

        assert_eq!(
            map.rehydrate(data),
            json!({ "__typename": "Query", "echo": "x" })
        );
    }

    #[test]
    fn absent_inputs_pass_through() {
        let map = alias_map(&[("", "a1", "a", Some("b"))]);
        assert_eq!(rehydrate(Some(&map), None), None);
        assert_eq!(rehydrate(Some(&map), Some(Value::Null)), Some(Value::Null));

        let data = json!({ "a1": 1 });
        assert_eq!(rehydrate(None, Some(data.clone())), Some(data));
    }
}
