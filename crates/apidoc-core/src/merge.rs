//! Deep merge of definition templates into authored block data.

use serde_json::{Map, Value};

/// Keys a definition never passes on to the blocks that use it.
const NOT_INHERITED: &[&str] = &["version"];

/// Identity of a list entry: its `field`, else `name`, else `url`.
pub fn identity(entry: &Value) -> Option<&str> {
    ["field", "name", "url"]
        .iter()
        .find_map(|key| entry.get(*key).and_then(Value::as_str))
}

/// Fold one more definition into an inherited template. Values already in
/// the template stay; lists are concatenated in `use` order.
pub fn accumulate(into: &mut Map<String, Value>, from: &Map<String, Value>) {
    for (key, value) in from {
        if NOT_INHERITED.contains(&key.as_str()) {
            continue;
        }
        match (into.get_mut(key), value) {
            (Some(Value::Object(existing)), Value::Object(incoming)) => accumulate(existing, incoming),
            (Some(Value::Array(existing)), Value::Array(incoming)) => {
                existing.extend(incoming.iter().cloned())
            }
            (Some(_), _) => {}
            (None, _) => {
                into.insert(key.clone(), value.clone());
            }
        }
    }
}

/// Lay authored data over an inherited template.
///
/// Authored scalars win. Objects merge key by key. Lists keep inherited
/// entries first and append the authored ones; an inherited entry with the
/// same identity as an authored entry is dropped.
pub fn overlay(inherited: Map<String, Value>, authored: Map<String, Value>) -> Map<String, Value> {
    let mut result = inherited;
    for (key, value) in authored {
        let merged = match (result.remove(&key), value) {
            (Some(Value::Object(base)), Value::Object(own)) => Value::Object(overlay(base, own)),
            (Some(Value::Array(base)), Value::Array(own)) => Value::Array(concat(base, own)),
            (_, own) => own,
        };
        result.insert(key, merged);
    }
    result
}

fn concat(inherited: Vec<Value>, authored: Vec<Value>) -> Vec<Value> {
    let authored_ids: Vec<&str> = authored.iter().filter_map(identity).collect();
    let mut items: Vec<Value> = inherited
        .into_iter()
        .filter(|entry| identity(entry).map_or(true, |id| !authored_ids.contains(&id)))
        .collect();
    items.extend(authored);
    items
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn map(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("not an object"),
        }
    }

    #[test]
    fn authored_scalar_wins() {
        let merged = overlay(
            map(json!({ "title": "From definition", "group": "User" })),
            map(json!({ "title": "Authored" })),
        );
        assert_eq!(Value::Object(merged), json!({ "title": "Authored", "group": "User" }));
    }

    #[test]
    fn lists_inherited_first_then_authored() {
        let merged = overlay(
            map(json!({ "error": { "fields": { "Error 4xx": [{ "field": "NotFound" }] } } })),
            map(json!({ "error": { "fields": { "Error 4xx": [{ "field": "Forbidden" }] } } })),
        );
        assert_eq!(
            merged["error"]["fields"]["Error 4xx"],
            json!([{ "field": "NotFound" }, { "field": "Forbidden" }])
        );
    }

    #[test]
    fn authored_entry_replaces_inherited_one_with_same_identity() {
        let merged = overlay(
            map(json!({ "fields": [{ "field": "id", "description": "inherited" }, { "field": "limit" }] })),
            map(json!({ "fields": [{ "field": "id", "description": "authored" }] })),
        );
        assert_eq!(
            merged["fields"],
            json!([{ "field": "limit" }, { "field": "id", "description": "authored" }])
        );
    }

    #[test]
    fn accumulate_keeps_first_scalar_and_skips_version() {
        let mut template = map(json!({ "title": "A", "see": [{ "name": "x" }] }));
        accumulate(
            &mut template,
            &map(json!({ "title": "B", "version": "2.0.0", "see": [{ "name": "y" }], "group": "G" })),
        );
        assert_eq!(
            Value::Object(template),
            json!({ "title": "A", "see": [{ "name": "x" }, { "name": "y" }], "group": "G" })
        );
    }

    #[test]
    fn identity_preference() {
        assert_eq!(identity(&json!({ "field": "a", "name": "b" })), Some("a"));
        assert_eq!(identity(&json!({ "url": "/x" })), Some("/x"));
        assert_eq!(identity(&json!({ "title": "t" })), None);
    }
}
