//! Path operations on a JSON value tree.
//!
//! The store never holds `null` or empty objects: writing either removes the
//! node, and removing the last child of an object removes the object. Both
//! the in-memory store and the realtime stream decoder maintain their trees
//! through these helpers so they agree on that rule.

use serde_json::{Map, Value};

/// Value at `segments` below `root`, if any.
pub fn get_at<'a>(root: &'a Value, segments: &[String]) -> Option<&'a Value> {
    let mut node = root;
    for segment in segments {
        node = node.as_object()?.get(segment)?;
    }
    if node.is_null() {
        None
    } else {
        Some(node)
    }
}

/// Replace the value at `segments`. Writing `null` removes the node.
pub fn set_at(root: &mut Value, segments: &[String], value: Value) {
    let value = normalize(value);
    let Some((first, rest)) = segments.split_first() else {
        *root = value;
        return;
    };

    if !root.is_object() {
        if value.is_null() {
            return;
        }
        *root = Value::Object(Map::new());
    }
    let Value::Object(children) = &mut *root else {
        return;
    };

    let child = children.entry(first.clone()).or_insert(Value::Null);
    set_at(child, rest, value);
    if child.is_null() {
        children.remove(first);
    }
    if children.is_empty() {
        *root = Value::Null;
    }
}

/// Merge `fields` into the object at `segments`. Each key of `fields` may
/// itself be a slash-separated relative path.
pub fn update_at(root: &mut Value, segments: &[String], fields: Map<String, Value>) {
    for (key, value) in fields {
        let mut path = segments.to_vec();
        path.extend(key.split('/').filter(|s| !s.is_empty()).map(str::to_string));
        set_at(root, &path, value);
    }
}

/// Drop `null` members and empty objects, recursively. An object that ends
/// up empty becomes `null`.
pub fn normalize(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let cleaned: Map<String, Value> = map
                .into_iter()
                .map(|(k, v)| (k, normalize(v)))
                .filter(|(_, v)| !v.is_null())
                .collect();
            if cleaned.is_empty() {
                Value::Null
            } else {
                Value::Object(cleaned)
            }
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn segs(path: &str) -> Vec<String> {
        path.split('/')
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn set_creates_intermediate_objects() {
        let mut root = Value::Null;
        set_at(&mut root, &segs("services/s1/title"), json!("SEO"));
        assert_eq!(root, json!({"services": {"s1": {"title": "SEO"}}}));
        assert_eq!(get_at(&root, &segs("services/s1/title")), Some(&json!("SEO")));
    }

    #[test]
    fn null_write_prunes_empty_parents() {
        let mut root = json!({"services": {"s1": {"title": "SEO"}}, "posts": {"p": {"t": 1}}});
        set_at(&mut root, &segs("services/s1/title"), Value::Null);
        assert_eq!(root, json!({"posts": {"p": {"t": 1}}}));
    }

    #[test]
    fn removing_missing_path_is_a_no_op() {
        let mut root = json!({"posts": {"p": {"t": 1}}});
        let before = root.clone();
        set_at(&mut root, &segs("posts/nope"), Value::Null);
        set_at(&mut root, &segs("skills/x/y"), Value::Null);
        assert_eq!(root, before);
    }

    #[test]
    fn update_touches_only_named_fields() {
        let mut root = json!({"posts": {"p1": {"title": "Old", "content": "Body"}}});
        let mut fields = Map::new();
        fields.insert("title".into(), json!("New"));
        update_at(&mut root, &segs("posts/p1"), fields);
        assert_eq!(root, json!({"posts": {"p1": {"title": "New", "content": "Body"}}}));
    }

    #[test]
    fn update_keys_may_be_relative_paths() {
        let mut root = Value::Null;
        let mut fields = Map::new();
        fields.insert("a/b".into(), json!(1));
        update_at(&mut root, &[], fields);
        assert_eq!(root, json!({"a": {"b": 1}}));
    }

    #[test]
    fn normalize_strips_nulls_and_empties() {
        let value = normalize(json!({"a": null, "b": {}, "c": {"d": null}, "e": 1}));
        assert_eq!(value, json!({"e": 1}));
        assert_eq!(normalize(json!({})), Value::Null);
    }

    #[test]
    fn get_on_scalar_parent_is_none() {
        let root = json!({"a": 1});
        assert_eq!(get_at(&root, &segs("a/b")), None);
        assert_eq!(get_at(&Value::Null, &[]), None);
    }
}
