//! Merge and path operations on state values.

use crate::types::DELETE;
use serde_json::{Map, Value};

/// Merge `source` into `target` in place.
///
/// Objects are merged key by key. Any other value, arrays included,
/// replaces what was there. A `DELETE` value removes the key at that
/// position instead of being stored.
pub fn merge(target: &mut Map<String, Value>, source: &Map<String, Value>) {
    for (key, value) in source {
        match value {
            v if *v == DELETE => {
                target.remove(key);
            }
            Value::Object(nested) => {
                let slot = target
                    .entry(key.clone())
                    .or_insert_with(|| Value::Object(Map::new()));
                if !slot.is_object() {
                    *slot = Value::Object(Map::new());
                }
                if let Value::Object(slot) = slot {
                    merge(slot, nested);
                }
            }
            other => {
                target.insert(key.clone(), other.clone());
            }
        }
    }
}

fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('.').filter(|s| !s.is_empty())
}

/// Value at a dot-delimited path, if present.
pub fn resolve<'a>(root: &'a Map<String, Value>, path: &str) -> Option<&'a Value> {
    let mut segs = segments(path);
    let mut current = root.get(segs.next()?)?;
    for seg in segs {
        current = current.as_object()?.get(seg)?;
    }
    Some(current)
}

/// Whether a merge of `delta` affects the value at `path`: the delta
/// carries the path itself, or deletes one of its ancestors.
pub fn touches(delta: &Map<String, Value>, path: &str) -> bool {
    let mut current = delta;
    let mut segs = segments(path).peekable();
    while let Some(seg) = segs.next() {
        let Some(value) = current.get(seg) else {
            return false;
        };
        if segs.peek().is_none() || *value == DELETE {
            return true;
        }
        match value {
            Value::Object(next) => current = next,
            // Scalars replace the whole subtree.
            _ => return true,
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn obj(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("Expected object"),
        }
    }

    #[test]
    fn test_merge_nested() {
        let mut state = obj(json!({"page": {"title": "Home", "lang": "en"}}));
        merge(&mut state, &obj(json!({"page": {"title": "About"}, "user": {"id": 1}})));
        assert_eq!(
            Value::Object(state),
            json!({"page": {"title": "About", "lang": "en"}, "user": {"id": 1}})
        );
    }

    #[test]
    fn test_merge_deletes_key() {
        let mut state = obj(json!({"a": {"b": 1}, "c": 2}));
        merge(&mut state, &obj(json!({"a": null})));
        assert_eq!(Value::Object(state), json!({"c": 2}));
    }

    #[test]
    fn test_merge_deletes_nested_key() {
        let mut state = obj(json!({"a": {"b": 1, "c": 2}}));
        merge(&mut state, &obj(json!({"a": {"b": null}})));
        assert_eq!(Value::Object(state), json!({"a": {"c": 2}}));
    }

    #[test]
    fn test_merge_delete_missing_key() {
        let mut state = obj(json!({"a": 1}));
        merge(&mut state, &obj(json!({"z": null, "y": {"x": null}})));
        assert_eq!(Value::Object(state), json!({"a": 1, "y": {}}));
    }

    #[test]
    fn test_merge_replaces_arrays() {
        let mut state = obj(json!({"items": [1, 2, 3]}));
        merge(&mut state, &obj(json!({"items": [4]})));
        assert_eq!(Value::Object(state), json!({"items": [4]}));
    }

    #[test]
    fn test_merge_object_over_scalar() {
        let mut state = obj(json!({"a": 5}));
        merge(&mut state, &obj(json!({"a": {"b": 1, "c": null}})));
        assert_eq!(Value::Object(state), json!({"a": {"b": 1}}));
    }

    #[test]
    fn test_resolve() {
        let state = obj(json!({"page": {"title": "Home"}, "n": 0}));
        assert_eq!(resolve(&state, "page.title"), Some(&json!("Home")));
        assert_eq!(resolve(&state, "n"), Some(&json!(0)));
        assert_eq!(resolve(&state, "page.missing"), None);
        assert_eq!(resolve(&state, "n.deeper"), None);
        assert_eq!(resolve(&state, ""), None);
    }

    #[test]
    fn test_touches() {
        let delta = obj(json!({"page": {"title": "About"}}));
        assert!(touches(&delta, "page"));
        assert!(touches(&delta, "page.title"));
        assert!(!touches(&delta, "page.lang"));
        assert!(!touches(&delta, "user"));
    }

    #[test]
    fn test_touches_removed_ancestor() {
        let delta = obj(json!({"page": null}));
        assert!(touches(&delta, "page.title"));
    }

    #[test]
    fn test_touches_scalar_replacing_subtree() {
        let delta = obj(json!({"page": "gone"}));
        assert!(touches(&delta, "page.title"));
    }
}
