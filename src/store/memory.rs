//! In-memory [`CollectionStore`] for tests and dry runs.
//!
//! Documents are kept as parsed [`Value`]s in a `BTreeMap` behind a
//! `RwLock`, so [`names`](CollectionStore::names) is sorted for free.

use std::collections::BTreeMap;
use std::sync::RwLock;

use serde_json::Value;

use super::{checked_name, collection_name, CollectionStore};
use crate::error::{Result, SnapshotError};

#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: RwLock<BTreeMap<String, Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored collections.
    pub fn len(&self) -> usize {
        self.collections.read().map(|c| c.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl CollectionStore for MemoryStore {
    fn write_value(&self, name: &str, value: &Value) -> Result<()> {
        let name = checked_name(name)?;
        let mut collections = self
            .collections
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        collections.insert(name.to_string(), value.clone());
        Ok(())
    }

    fn read_value(&self, name: &str) -> Result<Value> {
        let name = collection_name(name);
        let collections = self
            .collections
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        collections
            .get(name)
            .cloned()
            .ok_or_else(|| SnapshotError::NotFound(format!("{}.json", name)))
    }

    fn contains(&self, name: &str) -> bool {
        self.collections
            .read()
            .map(|c| c.contains_key(collection_name(name)))
            .unwrap_or(false)
    }

    fn names(&self) -> Result<Vec<String>> {
        let collections = self
            .collections
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        Ok(collections.keys().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_roundtrip_and_names() {
        let store = MemoryStore::new();
        assert!(store.is_empty());
        store.write_value("users.json", &json!([{"id": 1}])).unwrap();
        store.write_value("albums", &json!([])).unwrap();

        assert!(store.contains("users"));
        assert_eq!(store.read_value("users").unwrap(), json!([{"id": 1}]));
        assert_eq!(store.names().unwrap(), vec!["albums", "users"]);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_missing_is_not_found() {
        let store = MemoryStore::new();
        let err = store.read_value("posts").unwrap_err();
        assert_eq!(err.to_string(), "posts.json not found");
    }

    #[test]
    fn test_rejects_path_like_names() {
        let store = MemoryStore::new();
        let err = store.write_value("../users", &json!([])).unwrap_err();
        assert!(matches!(err, SnapshotError::InvalidName(_)));
        assert!(store.is_empty());
    }

    #[test]
    fn test_render_uses_indent() {
        let store = MemoryStore::new();
        store.write_value("x", &json!([1])).unwrap();
        assert_eq!(store.render("x", 2).unwrap(), "[\n  1\n]");
    }
}
