//! Response envelope - dataset-keyed query results
//!
//! Query results are wrapped in a top-level map keyed by dataset name
//! (`"unihan"`). The contract for empty results: a key is simply absent,
//! never present with an empty container. That pruning happens in
//! [`Response::insert_non_empty`] and nowhere else.

use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

/// Dataset key under which Unihan results appear
pub const DATASET_KEY: &str = "unihan";

/// A dataset-keyed response map.
///
/// Ephemeral: constructed per request, never persisted.
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Response(BTreeMap<String, Value>);

impl Response {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `value` under `key` unless it is empty.
    ///
    /// Null, empty objects and empty arrays all count as empty; for those
    /// the key is not inserted at all.
    pub fn insert_non_empty(&mut self, key: impl Into<String>, value: Value) {
        let empty = match &value {
            Value::Null => true,
            Value::Object(map) => map.is_empty(),
            Value::Array(items) => items.is_empty(),
            _ => false,
        };
        if !empty {
            self.0.insert(key.into(), value);
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_values_are_omitted() {
        let mut response = Response::new();
        response.insert_non_empty("a", json!({}));
        response.insert_non_empty("b", json!([]));
        response.insert_non_empty("c", Value::Null);
        assert!(response.is_empty());
    }

    #[test]
    fn test_non_empty_values_are_kept() {
        let mut response = Response::new();
        response.insert_non_empty(DATASET_KEY, json!({"kDefinition": "good"}));
        assert!(response.contains_key(DATASET_KEY));
        assert_eq!(response.get(DATASET_KEY).unwrap()["kDefinition"], "good");
    }

    #[test]
    fn test_serializes_transparently() {
        let mut response = Response::new();
        response.insert_non_empty(DATASET_KEY, json!({"kDefinition": "good"}));
        let text = serde_json::to_string(&response).unwrap();
        assert_eq!(text, r#"{"unihan":{"kDefinition":"good"}}"#);
    }
}
