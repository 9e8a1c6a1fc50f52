//! services/api/src/adapters/memory.rs
//!
//! An in-process implementation of the `DocumentStore` port: one JSON tree
//! guarded by a lock. Used for local development (optionally seeded from a
//! JSON export of the real database) and by the tests.

use std::path::Path;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::{Map, Value};
use studio_booking_core::ports::{resolve_server_values, DocumentStore, PortError, PortResult};
use tokio::sync::RwLock;
use tracing::info;

use super::{push_key, segments};

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

#[derive(Default)]
pub struct MemoryDocumentStore {
    root: RwLock<Value>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self {
            root: RwLock::new(Value::Null),
        }
    }

    /// Starts from an existing tree, e.g. `{ "courses": ..., "classes": ... }`.
    pub fn with_seed(seed: Value) -> Self {
        Self {
            root: RwLock::new(seed),
        }
    }

    /// Loads the starting tree from a JSON file.
    pub async fn from_file(path: &Path) -> PortResult<Self> {
        let raw = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| PortError::Unexpected(format!("Failed to read seed {}: {}", path.display(), e)))?;
        let seed: Value = serde_json::from_str(&raw)
            .map_err(|e| PortError::Unexpected(format!("Seed {} is not JSON: {}", path.display(), e)))?;
        info!("Seeded in-memory store from {}", path.display());
        Ok(Self::with_seed(seed))
    }
}

//=========================================================================================
// Tree helpers
//=========================================================================================

fn child<'a>(node: &'a Value, key: &str) -> Option<&'a Value> {
    match node {
        Value::Object(map) => map.get(key),
        Value::Array(items) => key.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    }
}

/// Turns an array node into an object keyed by index so it can take
/// arbitrary child keys.
fn as_object_mut(node: &mut Value) -> &mut Map<String, Value> {
    if !node.is_object() {
        let map = match node.take() {
            Value::Array(items) => items
                .into_iter()
                .enumerate()
                .filter(|(_, v)| !v.is_null())
                .map(|(i, v)| (i.to_string(), v))
                .collect(),
            _ => Map::new(),
        };
        *node = Value::Object(map);
    }
    match node {
        Value::Object(map) => map,
        _ => unreachable!("node was just replaced with an object"),
    }
}

fn set_at(node: &mut Value, path: &[&str], value: Value) {
    let Some((first, rest)) = path.split_first() else {
        *node = value;
        return;
    };
    let map = as_object_mut(node);
    if rest.is_empty() {
        if value.is_null() {
            map.remove(*first);
        } else {
            map.insert(first.to_string(), value);
        }
        return;
    }
    let next = map.entry(first.to_string()).or_insert(Value::Null);
    set_at(next, rest, value);
}

//=========================================================================================
// `DocumentStore` Trait Implementation
//=========================================================================================

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn read(&self, path: &str) -> PortResult<Option<Value>> {
        let root = self.root.read().await;
        let mut node = &*root;
        for key in segments(path) {
            match child(node, key) {
                Some(next) => node = next,
                None => return Ok(None),
            }
        }
        if node.is_null() {
            Ok(None)
        } else {
            Ok(Some(node.clone()))
        }
    }

    async fn write(&self, path: &str, mut value: Value) -> PortResult<()> {
        resolve_server_values(&mut value, Utc::now().timestamp_millis());
        let mut root = self.root.write().await;
        set_at(&mut root, &segments(path), value);
        Ok(())
    }

    async fn generate_key(&self, _parent: &str) -> PortResult<String> {
        Ok(push_key())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use studio_booking_core::ports::server_timestamp;

    #[tokio::test]
    async fn reads_back_subtrees() {
        let store = MemoryDocumentStore::new();
        store.write("bookings/u1/7", json!({ "price": 10.0 })).await.unwrap();
        store.write("bookings/u1/9", json!({ "price": 15.5 })).await.unwrap();

        assert_eq!(
            store.read("bookings/u1").await.unwrap(),
            Some(json!({ "7": { "price": 10.0 }, "9": { "price": 15.5 } }))
        );
        assert_eq!(store.read("bookings/u2").await.unwrap(), None);
    }

    #[tokio::test]
    async fn writes_replace_the_subtree() {
        let store = MemoryDocumentStore::new();
        store.write("users/a", json!({ "name": "A", "email": "a" })).await.unwrap();
        store.write("users/a", json!({ "name": "B" })).await.unwrap();
        assert_eq!(store.read("users/a").await.unwrap(), Some(json!({ "name": "B" })));

        store.write("users/a", Value::Null).await.unwrap();
        assert_eq!(store.read("users/a").await.unwrap(), None);
    }

    #[tokio::test]
    async fn seeded_arrays_accept_new_children() {
        let store = MemoryDocumentStore::with_seed(json!({ "courses": [null, { "id": 1 }] }));
        assert_eq!(store.read("courses/1").await.unwrap(), Some(json!({ "id": 1 })));

        store.write("courses/extra", json!({ "id": 2 })).await.unwrap();
        assert_eq!(
            store.read("courses").await.unwrap(),
            Some(json!({ "1": { "id": 1 }, "extra": { "id": 2 } }))
        );
    }

    #[tokio::test]
    async fn resolves_server_timestamps_on_write() {
        let store = MemoryDocumentStore::new();
        store
            .write("bookings/u1/7", json!({ "bookingTime": server_timestamp() }))
            .await
            .unwrap();
        let stored = store.read("bookings/u1/7/bookingTime").await.unwrap().unwrap();
        assert!(stored.as_i64().unwrap() > 0);
    }
}
