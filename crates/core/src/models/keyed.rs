//! Materializing keyed-object values into lists of entities.
//!
//! The store holds a collection as `{ key: { ...fields } }`. Application
//! state wants `[{ id: key, ...fields }]`. The store key always wins over any
//! `id` field already present in the stored value.

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Field name the store key is copied into.
pub const ID_FIELD: &str = "id";

/// Result of materializing a keyed-object value.
#[derive(Debug)]
pub struct Materialized<T> {
    /// Entities in store key order.
    pub items: Vec<T>,
    /// Keys whose value could not be decoded as an entity.
    pub skipped: Vec<String>,
}

impl<T> Default for Materialized<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            skipped: Vec::new(),
        }
    }
}

/// Copy `key` into the `id` field of an object value.
///
/// Returns `None` when `value` is not an object.
pub fn with_key(key: &str, value: &Value) -> Option<Value> {
    let mut object = value.as_object()?.clone();
    object.insert(ID_FIELD.to_string(), Value::String(key.to_string()));
    Some(Value::Object(object))
}

/// Materialize a keyed-object value.
///
/// `None`, `null` and non-object values yield an empty list. Entries that
/// are not objects or fail to decode are reported in `skipped`.
pub fn materialize<T: DeserializeOwned>(value: Option<&Value>) -> Materialized<T> {
    let Some(Value::Object(entries)) = value else {
        return Materialized::default();
    };

    let mut out = Materialized::default();
    for (key, entry) in entries {
        match with_key(key, entry).map(serde_json::from_value::<T>) {
            Some(Ok(item)) => out.items.push(item),
            _ => out.skipped.push(key.clone()),
        }
    }
    out
}

/// `deserialize_with` helper for nested keyed maps such as
/// `Service.reviews`: each child gets its key as `id`, undecodable children
/// are dropped and a non-object value is an empty map.
pub fn deserialize_keyed_map<'de, D, T>(deserializer: D) -> Result<BTreeMap<String, T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    let Value::Object(entries) = value else {
        return Ok(BTreeMap::new());
    };

    Ok(entries
        .iter()
        .filter_map(|(key, entry)| {
            let item = serde_json::from_value(with_key(key, entry)?).ok()?;
            Some((key.clone(), item))
        })
        .collect())
}
